//! `tb list`: tasks narrowed by status, priority, assignee and creation date.

use std::path::Path;

use clap::Args;
use taskboard_core::model::{Priority, Status};
use taskboard_core::report::{DateRange, TaskFilters, filtered_tasks_report};
use taskboard_core::transform::filter_by_status;

use super::{load_workspace, task_rows};
use crate::output::{CliError, OutputMode, render_error, render_list};

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Only tasks in this status.
    #[arg(long)]
    pub status: Option<Status>,

    /// Only tasks at this priority.
    #[arg(long)]
    pub priority: Option<Priority>,

    /// Only tasks assigned to this user id.
    #[arg(long)]
    pub assignee: Option<String>,

    /// Created on or after this ISO-8601 timestamp.
    #[arg(long, requires = "to")]
    pub from: Option<String>,

    /// Created on or before this ISO-8601 timestamp.
    #[arg(long, requires = "from")]
    pub to: Option<String>,
}

impl ListArgs {
    fn filters(&self) -> TaskFilters {
        TaskFilters {
            priority: self.priority,
            assignee: self.assignee.clone(),
            date_range: self
                .from
                .clone()
                .zip(self.to.clone())
                .map(|(start, end)| DateRange { start, end }),
        }
    }
}

/// Execute `tb list`.
///
/// # Errors
///
/// Returns an error if the seed cannot be loaded, a date bound is malformed,
/// or output fails.
pub fn run_list(
    args: &ListArgs,
    output: OutputMode,
    project_root: &Path,
    seed_override: Option<&Path>,
) -> anyhow::Result<()> {
    let ws = load_workspace(project_root, seed_override, output)?;

    let mut tasks = match filtered_tasks_report(&ws.seed.tasks, &args.filters()) {
        Ok(tasks) => tasks,
        Err(err) => {
            render_error(output, &CliError::from(&err))?;
            return Err(err.into());
        }
    };
    if let Some(status) = args.status {
        tasks = filter_by_status(&tasks, status);
    }

    tracing::debug!(matched = tasks.len(), "list filters applied");
    render_list(&task_rows(&tasks), output)
}
