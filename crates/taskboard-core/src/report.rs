//! Aggregate views composed from the transforms.
//!
//! Reports hold no state of their own. The only stateful input is the
//! [`OverdueCache`] passed to the overdue-based reports.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::model::{Priority, Project, Status, Task, TaskDraft, User};
use crate::outcome::{Maybe, Outcome};
use crate::overdue::{DEFAULT_RULES, OverdueCache, SlaRule};
use crate::timestamp::TimestampError;
use crate::transform::{
    average_tasks_per_user, by_assignee, by_date_range, by_priority, filter_by_status, find_task,
};
use crate::validate::{ValidationErrors, ValidationRule, validate_task};

/// Task counts per status, plus the total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub todo: usize,
    pub in_progress: usize,
    pub review: usize,
    pub done: usize,
}

impl StatusCounts {
    /// Count `tasks` by status.
    #[must_use]
    pub fn tally(tasks: &[Task]) -> Self {
        let count = |status| filter_by_status(tasks, status).len();
        Self {
            total: tasks.len(),
            todo: count(Status::Todo),
            in_progress: count(Status::InProgress),
            review: count(Status::Review),
            done: count(Status::Done),
        }
    }

    #[must_use]
    pub const fn get(&self, status: Status) -> usize {
        match status {
            Status::Todo => self.todo,
            Status::InProgress => self.in_progress,
            Status::Review => self.review,
            Status::Done => self.done,
        }
    }
}

/// Headline numbers for a loaded dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewStats {
    pub projects_count: usize,
    pub users_count: usize,
    pub tasks_count: usize,
    pub status_distribution: StatusCounts,
    pub avg_tasks_per_user: f64,
}

#[must_use]
pub fn overview_stats(projects: &[Project], users: &[User], tasks: &[Task]) -> OverviewStats {
    OverviewStats {
        projects_count: projects.len(),
        users_count: users.len(),
        tasks_count: tasks.len(),
        status_distribution: StatusCounts::tally(tasks),
        avg_tasks_per_user: average_tasks_per_user(tasks),
    }
}

/// Status counts restricted to one project.
#[must_use]
pub fn project_overview(tasks: &[Task], project_id: &str) -> StatusCounts {
    let in_project: Vec<Task> = tasks
        .iter()
        .filter(|t| t.project_id == project_id)
        .cloned()
        .collect();
    StatusCounts::tally(&in_project)
}

/// Inclusive creation-date bounds, as ISO-8601 text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// Optional narrowing filters; an unset field is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilters {
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub date_range: Option<DateRange>,
}

/// Apply the set filters in turn: priority, then assignee, then date range.
///
/// # Errors
///
/// Returns [`TimestampError`] if a date bound is malformed, or if the date
/// filter meets a task whose `created` stamp does not parse.
pub fn filtered_tasks_report(
    tasks: &[Task],
    filters: &TaskFilters,
) -> Result<Vec<Task>, TimestampError> {
    let mut filtered = tasks.to_vec();

    if let Some(priority) = filters.priority {
        let matches = by_priority(priority);
        filtered.retain(|t| matches(t));
    }

    if let Some(assignee) = &filters.assignee {
        let matches = by_assignee(assignee.as_str());
        filtered.retain(|t| matches(t));
    }

    if let Some(range) = &filters.date_range {
        let matches = by_date_range(&range.start, &range.end)?;
        let mut kept = Vec::with_capacity(filtered.len());
        for task in filtered {
            if matches(&task)? {
                kept.push(task);
            }
        }
        filtered = kept;
    }

    Ok(filtered)
}

/// Per-user status counts keyed by display name.
///
/// Two users sharing a name collapse into one entry; the later user in
/// `users` wins.
#[must_use]
pub fn user_workload_report(tasks: &[Task], users: &[User]) -> BTreeMap<String, StatusCounts> {
    users
        .iter()
        .map(|user| {
            let theirs: Vec<Task> = tasks
                .iter()
                .filter(|t| t.assignee.as_deref() == Some(user.id.as_str()))
                .cloned()
                .collect();
            (user.name.clone(), StatusCounts::tally(&theirs))
        })
        .collect()
}

/// Look up each id; misses come back as [`Maybe::Absent`].
#[must_use]
pub fn find_tasks_report(tasks: &[Task], ids: &[String]) -> BTreeMap<String, Maybe<Task>> {
    ids.iter()
        .map(|id| (id.clone(), find_task(tasks, id)))
        .collect()
}

/// Validate every task in a snapshot, keyed by task id.
#[must_use]
pub fn validation_report(
    tasks: &[Task],
    rules: &[ValidationRule],
) -> BTreeMap<String, Outcome<ValidationErrors, Task>> {
    tasks
        .iter()
        .map(|task| (task.id.clone(), validate_task(&TaskDraft::from(task), rules)))
        .collect()
}

/// Compact row for listing overdue tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverdueRow {
    pub id: String,
    pub title: String,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverdueSummary {
    pub count: usize,
    pub tasks: Vec<OverdueRow>,
}

impl OverdueSummary {
    fn from_tasks(tasks: &[Task]) -> Self {
        Self {
            count: tasks.len(),
            tasks: tasks
                .iter()
                .map(|t| OverdueRow {
                    id: t.id.clone(),
                    title: t.title.clone(),
                    status: t.status,
                })
                .collect(),
        }
    }
}

/// Everything on one page: overview, per-project counts, workload, overdue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    pub overview: OverviewStats,
    pub project_stats: BTreeMap<String, StatusCounts>,
    pub user_workload: BTreeMap<String, StatusCounts>,
    pub overdue_tasks: OverdueSummary,
}

/// Build the summary, evaluating overdue tasks under [`DEFAULT_RULES`].
pub fn summary_report(
    projects: &[Project],
    users: &[User],
    tasks: &[Task],
    cache: &mut OverdueCache,
) -> SummaryReport {
    let project_stats = projects
        .iter()
        .map(|p| (p.name.clone(), project_overview(tasks, &p.id)))
        .collect();
    let overdue = cache.overdue_tasks(tasks, &DEFAULT_RULES);

    SummaryReport {
        overview: overview_stats(projects, users, tasks),
        project_stats,
        user_workload: user_workload_report(tasks, users),
        overdue_tasks: OverdueSummary::from_tasks(&overdue),
    }
}

/// Timing of a cold call against the memoized repeat.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheComparison {
    pub first_call: Duration,
    pub second_call: Duration,
    /// `first / second`; infinite when the second call was too fast to time.
    pub cache_improvement: f64,
    pub overdue_tasks_count: usize,
    pub results_identical: bool,
}

/// Call the overdue computation twice through `cache` and compare.
pub fn cache_comparison_report(
    cache: &mut OverdueCache,
    tasks: &[Task],
    rules: &[SlaRule],
) -> CacheComparison {
    let started = Instant::now();
    let first = cache.overdue_tasks(tasks, rules);
    let first_call = started.elapsed();

    let started = Instant::now();
    let second = cache.overdue_tasks(tasks, rules);
    let second_call = started.elapsed();

    let cache_improvement = if second_call.is_zero() {
        f64::INFINITY
    } else {
        first_call.as_secs_f64() / second_call.as_secs_f64()
    };

    CacheComparison {
        first_call,
        second_call,
        cache_improvement,
        overdue_tasks_count: first.len(),
        results_identical: first == second,
    }
}
