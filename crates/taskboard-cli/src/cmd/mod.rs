//! One module per subcommand, plus the loader they share.

pub mod completions;
pub mod create;
pub mod list;
pub mod overdue;
pub mod overview;
pub mod pipeline;
pub mod project;
pub mod show;
pub mod status;
pub mod summary;
pub mod traverse;
pub mod validate;
pub mod workload;

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use taskboard_core::ErrorCode;
use taskboard_core::bus::Event;
use taskboard_core::config::{TaskboardConfig, resolve_config};
use taskboard_core::model::Task;
use taskboard_core::seed::{Seed, load_seed};

use crate::output::{CliError, OutputMode, Renderable, render_error};

/// Resolved configuration plus the seed it points at.
pub struct Workspace {
    pub config: TaskboardConfig,
    pub seed: Seed,
}

/// Resolve config and load the seed, rendering any failure before bailing.
///
/// # Errors
///
/// Returns an error if a config file is malformed or the seed cannot be
/// loaded.
pub fn load_workspace(
    project_root: &Path,
    cli_seed: Option<&Path>,
    output: OutputMode,
) -> anyhow::Result<Workspace> {
    let config = match resolve_config(project_root, cli_seed) {
        Ok(config) => config,
        Err(err) => {
            render_error(
                output,
                &CliError::from_code(ErrorCode::ConfigParseError, format!("{err:#}")),
            )?;
            return Err(err);
        }
    };

    let seed = match load_seed(&config.seed.path) {
        Ok(seed) => seed,
        Err(err) => {
            render_error(output, &CliError::from(&err))?;
            return Err(err.into());
        }
    };

    Ok(Workspace { config, seed })
}

/// Compact task row shared by the listing commands.
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct TaskRow<'a> {
    pub task: &'a Task,
}

impl Renderable for TaskRow<'_> {
    fn render_human(&self, w: &mut dyn Write) -> std::io::Result<()> {
        let task = self.task;
        writeln!(
            w,
            "{:<6} {:<12} {:<9} {:<10} {}",
            task.id,
            task.status.as_str(),
            task.priority.as_str(),
            task.assignee.as_deref().unwrap_or("-"),
            task.title
        )
    }

    fn render_table(&self, w: &mut dyn Write) -> std::io::Result<()> {
        let task = self.task;
        writeln!(
            w,
            "{}  {}  {}  {}  {}  {}",
            task.id,
            task.project_id,
            task.status,
            task.priority,
            task.assignee.as_deref().unwrap_or("-"),
            task.title
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["id", "project", "status", "priority", "assignee", "title"]
    }
}

pub fn task_rows(tasks: &[Task]) -> Vec<TaskRow<'_>> {
    tasks.iter().map(|task| TaskRow { task }).collect()
}

/// Write a session's event log, one event per line.
pub fn write_events(w: &mut dyn Write, events: &[Event]) -> std::io::Result<()> {
    for event in events {
        let task_id = event
            .payload
            .get("id")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("-");
        writeln!(
            w,
            "{}  {}  {}  {}",
            event.ts.format("%Y-%m-%dT%H:%M:%SZ"),
            event.name,
            task_id,
            event.id
        )?;
    }
    Ok(())
}
