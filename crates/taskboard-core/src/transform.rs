//! Pure transforms over task and comment snapshots.
//!
//! Every function here takes a borrowed snapshot and returns a fresh value;
//! nothing mutates its input and nothing reads the clock unless the clock is
//! passed in. Order is preserved wherever a subsequence is returned.

use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::model::{Comment, Priority, Status, Task};
use crate::outcome::Maybe;
use crate::timestamp::{TimestampError, format_iso, parse_timestamp};

/// Returns a new snapshot with `task` appended.
#[must_use]
pub fn add_task(tasks: &[Task], task: Task) -> Vec<Task> {
    let mut next = Vec::with_capacity(tasks.len() + 1);
    next.extend_from_slice(tasks);
    next.push(task);
    next
}

/// Tasks with the given status, in snapshot order.
#[must_use]
pub fn filter_by_status(tasks: &[Task], status: Status) -> Vec<Task> {
    tasks.iter().filter(|t| t.status == status).cloned().collect()
}

/// Mean number of tasks per distinct assignee.
///
/// Unassigned tasks count toward neither the total nor the number of users.
/// Returns `0.0` when nobody is assigned anything.
#[must_use]
pub fn average_tasks_per_user(tasks: &[Task]) -> f64 {
    let per_user = tasks
        .iter()
        .filter(|t| t.is_assigned())
        .filter_map(|t| t.assignee.as_deref())
        .fold(HashMap::<&str, usize>::new(), |mut acc, assignee| {
            *acc.entry(assignee).or_default() += 1;
            acc
        });

    if per_user.is_empty() {
        return 0.0;
    }

    let total: usize = per_user.values().sum();
    #[allow(clippy::cast_precision_loss)]
    let average = total as f64 / per_user.len() as f64;
    average
}

/// Predicate matching tasks of one priority.
pub fn by_priority(priority: Priority) -> impl Fn(&Task) -> bool {
    move |task| task.priority == priority
}

/// Predicate matching tasks assigned to `user_id`.
pub fn by_assignee(user_id: impl Into<String>) -> impl Fn(&Task) -> bool {
    let user_id = user_id.into();
    move |task| task.assignee.as_deref() == Some(user_id.as_str())
}

/// Predicate matching tasks created within `[start, end]`, both inclusive.
///
/// The bounds are parsed once, up front. Each call re-parses the task's
/// `created` stamp and hands a parse failure back to the caller.
///
/// # Errors
///
/// Fails immediately if either bound is not a valid timestamp.
pub fn by_date_range(
    start: &str,
    end: &str,
) -> Result<impl Fn(&Task) -> Result<bool, TimestampError>, TimestampError> {
    let start = parse_timestamp(start)?;
    let end = parse_timestamp(end)?;
    Ok(move |task: &Task| {
        let created = parse_timestamp(&task.created)?;
        Ok(start <= created && created <= end)
    })
}

/// Comments attached to `task_id`, in original order.
#[must_use]
pub fn walk_comments(comments: &[Comment], task_id: &str) -> Vec<Comment> {
    comments
        .iter()
        .filter(|c| c.task_id == task_id)
        .cloned()
        .collect()
}

/// Ids of the tasks whose status appears in `statuses`.
///
/// Only membership matters: the ids come out in snapshot order, not in the
/// order of `statuses`.
#[must_use]
pub fn traverse_tasks(tasks: &[Task], statuses: &[Status]) -> Vec<String> {
    tasks
        .iter()
        .filter(|t| statuses.contains(&t.status))
        .map(|t| t.id.clone())
        .collect()
}

/// Look a task up by id.
#[must_use]
pub fn find_task(tasks: &[Task], task_id: &str) -> Maybe<Task> {
    tasks.iter().find(|t| t.id == task_id).cloned().into()
}

/// Returns a new snapshot where task `task_id` has `status` and `updated = now`.
///
/// An unknown id yields an unchanged copy of the snapshot.
#[must_use]
pub fn change_status(
    tasks: &[Task],
    task_id: &str,
    status: Status,
    now: NaiveDateTime,
) -> Vec<Task> {
    let stamp = format_iso(now);
    tasks
        .iter()
        .map(|t| {
            if t.id == task_id {
                t.with_status(status, stamp.clone())
            } else {
                t.clone()
            }
        })
        .collect()
}
