//! Immutable domain records loaded from the seed.

mod task;

use serde::{Deserialize, Serialize};

pub use task::{ParseEnumError, Priority, Status, Task, TaskDraft};

/// A project that groups tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub owner: String,
}

/// A user who can be assigned tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct User {
    pub id: String,
    pub name: String,
    pub role: String,
}

/// A comment on a task. `task_id` is not checked against the task set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Comment {
    pub id: String,
    pub task_id: String,
    pub author: String,
    pub text: String,
    pub ts: String,
}
