//! Per-session state: the current snapshot, the event bus and its log, and
//! the overdue memo.
//!
//! A [`Session`] is built from a loaded [`Seed`] and owns everything that
//! changes while someone works with the data. Dropping it (or calling
//! [`Session::close`]) ends the session.

use std::cell::RefCell;
use std::rc::Rc;

use uuid::Uuid;

use crate::bus::{Event, EventBus, EventKind, task_payload};
use crate::config::TaskboardConfig;
use crate::model::{Comment, Project, Status, Task, TaskDraft, User};
use crate::outcome::{Maybe, Outcome};
use crate::overdue::{CacheStats, OverdueCache, SlaRule};
use crate::report::{SummaryReport, summary_report};
use crate::seed::Seed;
use crate::timestamp::{now_iso, now_utc};
use crate::transform::{change_status, find_task};
use crate::validate::{ValidationErrors, ValidationRule, create_task_pipeline};

pub struct Session {
    projects: Vec<Project>,
    users: Vec<User>,
    comments: Vec<Comment>,
    tasks: Vec<Task>,
    bus: EventBus,
    log: Rc<RefCell<Vec<Event>>>,
    overdue: OverdueCache,
}

impl Session {
    /// Start a session over `seed`, logging every task event.
    #[must_use]
    pub fn new(seed: Seed, config: &TaskboardConfig) -> Self {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        for kind in EventKind::ALL {
            let log = Rc::clone(&log);
            bus.subscribe(kind.as_str(), move |event: &Event| {
                log.try_borrow_mut()?.push(event.clone());
                Ok(())
            });
        }

        tracing::debug!(
            tasks = seed.tasks.len(),
            cache_capacity = config.overdue.cache_capacity,
            "session started"
        );

        Self {
            projects: seed.projects,
            users: seed.users,
            comments: seed.comments,
            tasks: seed.tasks,
            bus,
            log,
            overdue: OverdueCache::new(config.overdue.cache_capacity),
        }
    }

    #[must_use]
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    #[must_use]
    pub fn users(&self) -> &[User] {
        &self.users
    }

    #[must_use]
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// The current task snapshot.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Events published so far, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.log.borrow().clone()
    }

    /// Access to the bus for additional subscribers.
    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    /// A candidate with a fresh id and the current time as both stamps.
    #[must_use]
    pub fn draft(
        &self,
        project_id: &str,
        title: &str,
        desc: &str,
        status: &str,
        priority: &str,
        assignee: Option<&str>,
    ) -> TaskDraft {
        let now = now_iso();
        TaskDraft {
            id: format!("t-{}", Uuid::new_v4().simple()),
            project_id: project_id.to_string(),
            title: title.to_string(),
            desc: desc.to_string(),
            status: status.to_string(),
            priority: priority.to_string(),
            assignee: assignee.map(ToString::to_string),
            created: now.clone(),
            updated: now,
        }
    }

    /// Run `draft` through [`create_task_pipeline`] and adopt the new
    /// snapshot, publishing `task_created` on success.
    ///
    /// On failure the snapshot is unchanged and nothing is published.
    pub fn create_task(
        &mut self,
        draft: &TaskDraft,
        rules: &[ValidationRule],
    ) -> Outcome<ValidationErrors, Task> {
        let created = create_task_pipeline(&self.tasks, draft, rules).flat_map(|next| {
            match find_task(&next, &draft.id) {
                Maybe::Present(task) => {
                    self.tasks = next;
                    Outcome::Success(task)
                }
                // Not reachable: the pipeline only succeeds by appending this id.
                Maybe::Absent => Outcome::Failure(ValidationErrors {
                    task_id: draft.id.clone(),
                    issues: Vec::new(),
                }),
            }
        });

        match &created {
            Outcome::Success(task) => {
                self.bus
                    .publish(EventKind::TaskCreated.as_str(), task_payload(task));
                tracing::info!(task_id = %task.id, "task created");
            }
            Outcome::Failure(errors) => {
                tracing::info!(
                    task_id = %errors.task_id,
                    issues = errors.issues.len(),
                    "task rejected"
                );
            }
        }
        created
    }

    /// Move task `task_id` to `status`, publishing `task_updated`.
    pub fn update_status(&mut self, task_id: &str, status: Status) -> Maybe<Task> {
        if find_task(&self.tasks, task_id).is_absent() {
            return Maybe::Absent;
        }

        self.tasks = change_status(&self.tasks, task_id, status, now_utc());
        let updated = find_task(&self.tasks, task_id);
        if let Maybe::Present(task) = &updated {
            self.bus
                .publish(EventKind::TaskUpdated.as_str(), task_payload(task));
        }
        updated
    }

    /// Overdue tasks in the current snapshot, memoized.
    pub fn overdue(&mut self, rules: &[SlaRule]) -> Rc<[Task]> {
        self.overdue.overdue_tasks(&self.tasks, rules)
    }

    pub fn summary(&mut self) -> SummaryReport {
        summary_report(&self.projects, &self.users, &self.tasks, &mut self.overdue)
    }

    /// Mutable access to the memo for cache-comparison reports.
    pub fn overdue_cache_mut(&mut self) -> &mut OverdueCache {
        &mut self.overdue
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.overdue.stats()
    }

    /// End the session and hand back its event log.
    #[must_use]
    pub fn close(self) -> Vec<Event> {
        let events = self.events();
        tracing::debug!(events = events.len(), "session closed");
        events
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("tasks", &self.tasks.len())
            .field("events", &self.log.borrow().len())
            .field("bus", &self.bus)
            .field("overdue", &self.overdue)
            .finish_non_exhaustive()
    }
}
