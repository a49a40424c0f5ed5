//! Task validation and the validate-then-append creation pipeline.
//!
//! Validation never fails fast: every applicable check runs once and all
//! violations are returned together in a single [`ValidationErrors`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::{ParseEnumError, Priority, Status, Task, TaskDraft};
use crate::outcome::Outcome;
use crate::transform::add_task;

const TITLE_MIN_CHARS: usize = 3;
const DESC_MIN_CHARS: usize = 10;

/// Optional checks layered on top of the always-on required-field checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationRule {
    /// Title must be at least 3 characters.
    TitleMinLength,
    /// Description must be at least 10 characters.
    DescMinLength,
    /// Tasks in progress must have an assignee.
    AssigneeRequired,
}

impl ValidationRule {
    pub const ALL: [Self; 3] = [
        Self::TitleMinLength,
        Self::DescMinLength,
        Self::AssigneeRequired,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TitleMinLength => "title_min_length",
            Self::DescMinLength => "desc_min_length",
            Self::AssigneeRequired => "assignee_required",
        }
    }
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationRule {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|rule| rule.as_str() == normalized)
            .ok_or_else(|| ParseEnumError {
                expected: "validation rule",
                got: s.to_string(),
            })
    }
}

/// One violated check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ValidationIssue {
    TitleRequired,
    DescriptionRequired,
    InvalidStatus { got: String },
    InvalidPriority { got: String },
    TitleTooShort { min: usize },
    DescriptionTooShort { min: usize },
    AssigneeRequired,
    DuplicateId { id: String },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TitleRequired => f.write_str("Title is required"),
            Self::DescriptionRequired => f.write_str("Description is required"),
            Self::InvalidStatus { got } => write!(
                f,
                "Invalid status: {got}. Must be one of {}",
                join(Status::ALL.map(Status::as_str))
            ),
            Self::InvalidPriority { got } => write!(
                f,
                "Invalid priority: {got}. Must be one of {}",
                join(Priority::ALL.map(Priority::as_str))
            ),
            Self::TitleTooShort { min } => {
                write!(f, "Title must be at least {min} characters long")
            }
            Self::DescriptionTooShort { min } => {
                write!(f, "Description must be at least {min} characters long")
            }
            Self::AssigneeRequired => f.write_str("Assignee is required for tasks in progress"),
            Self::DuplicateId { id } => write!(f, "Task id {id} already exists"),
        }
    }
}

fn join<const N: usize>(names: [&str; N]) -> String {
    names.join(", ")
}

/// Everything wrong with one candidate task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    pub task_id: String,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationErrors {
    /// Human-readable messages, one per issue.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task {} failed validation: {}", self.task_id, self.messages().join("; "))
    }
}

/// Validate a candidate and, if it passes, promote it to a typed [`Task`].
///
/// Title and description must be non-blank and status/priority must be
/// exactly one of the known names. Each rule in `rules` is then applied
/// once, even if listed more than once.
#[must_use]
pub fn validate_task(
    draft: &TaskDraft,
    rules: &[ValidationRule],
) -> Outcome<ValidationErrors, Task> {
    let mut issues = Vec::new();

    if draft.title.trim().is_empty() {
        issues.push(ValidationIssue::TitleRequired);
    }
    if draft.desc.trim().is_empty() {
        issues.push(ValidationIssue::DescriptionRequired);
    }

    let status = Status::from_name(&draft.status);
    if status.is_none() {
        issues.push(ValidationIssue::InvalidStatus {
            got: draft.status.clone(),
        });
    }
    let priority = Priority::from_name(&draft.priority);
    if priority.is_none() {
        issues.push(ValidationIssue::InvalidPriority {
            got: draft.priority.clone(),
        });
    }

    let has_assignee = draft.assignee.as_deref().is_some_and(|a| !a.is_empty());
    for rule in ValidationRule::ALL.into_iter().filter(|r| rules.contains(r)) {
        let violated = match rule {
            ValidationRule::TitleMinLength => {
                (draft.title.chars().count() < TITLE_MIN_CHARS)
                    .then_some(ValidationIssue::TitleTooShort { min: TITLE_MIN_CHARS })
            }
            ValidationRule::DescMinLength => (draft.desc.chars().count() < DESC_MIN_CHARS)
                .then_some(ValidationIssue::DescriptionTooShort { min: DESC_MIN_CHARS }),
            ValidationRule::AssigneeRequired => {
                (status == Some(Status::InProgress) && !has_assignee)
                    .then_some(ValidationIssue::AssigneeRequired)
            }
        };
        issues.extend(violated);
    }

    match (status, priority) {
        (Some(status), Some(priority)) if issues.is_empty() => Outcome::Success(Task {
            id: draft.id.clone(),
            project_id: draft.project_id.clone(),
            title: draft.title.clone(),
            desc: draft.desc.clone(),
            status,
            priority,
            assignee: draft.assignee.clone().filter(|a| !a.is_empty()),
            created: draft.created.clone(),
            updated: draft.updated.clone(),
        }),
        _ => Outcome::Failure(ValidationErrors {
            task_id: draft.id.clone(),
            issues,
        }),
    }
}

/// Validate `draft` and append it to `tasks` only if it passes.
///
/// A draft whose id is already taken in `tasks` fails with
/// [`ValidationIssue::DuplicateId`] alongside any other violations. On
/// failure the input snapshot is untouched and no new snapshot exists.
#[must_use]
pub fn create_task_pipeline(
    tasks: &[Task],
    draft: &TaskDraft,
    rules: &[ValidationRule],
) -> Outcome<ValidationErrors, Vec<Task>> {
    let taken = tasks.iter().any(|t| t.id == draft.id);
    match validate_task(draft, rules) {
        Outcome::Success(task) if !taken => Outcome::Success(add_task(tasks, task)),
        Outcome::Success(_) => Outcome::Failure(ValidationErrors {
            task_id: draft.id.clone(),
            issues: vec![duplicate(draft)],
        }),
        Outcome::Failure(mut errors) => {
            if taken {
                errors.issues.push(duplicate(draft));
            }
            Outcome::Failure(errors)
        }
    }
}

fn duplicate(draft: &TaskDraft) -> ValidationIssue {
    ValidationIssue::DuplicateId {
        id: draft.id.clone(),
    }
}

/// Run [`create_task_pipeline`] over `drafts` in order.
///
/// A successful step becomes the snapshot for the next one; a failed step
/// leaves the running snapshot as it was. One result per draft, in input
/// order.
#[must_use]
pub fn pipeline_report(
    tasks: &[Task],
    drafts: &[TaskDraft],
    rules: &[ValidationRule],
) -> Vec<Outcome<ValidationErrors, Vec<Task>>> {
    let mut current = tasks.to_vec();
    drafts
        .iter()
        .map(|draft| {
            let step = create_task_pipeline(&current, draft, rules);
            if let Outcome::Success(next) = &step {
                current.clone_from(next);
            }
            step
        })
        .collect()
}
