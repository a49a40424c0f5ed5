//! `tb status <id> <status>`: move a task in a fresh session.

use std::io::Write;
use std::path::Path;

use clap::Args;
use serde::Serialize;
use taskboard_core::ErrorCode;
use taskboard_core::bus::Event;
use taskboard_core::model::{Status, Task};
use taskboard_core::outcome::Maybe;
use taskboard_core::session::Session;

use super::{load_workspace, write_events};
use crate::output::{CliError, OutputMode, pretty_section, render_error, render_mode};

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Task id.
    pub id: String,

    /// New status: todo, in_progress, review or done.
    pub status: Status,
}

#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub previous: Status,
    pub task: Task,
    pub events: Vec<Event>,
}

/// Execute `tb status`.
///
/// # Errors
///
/// Returns an error if the seed cannot be loaded or the task is unknown.
pub fn run_status(
    args: &StatusArgs,
    output: OutputMode,
    project_root: &Path,
    seed_override: Option<&Path>,
) -> anyhow::Result<()> {
    let ws = load_workspace(project_root, seed_override, output)?;
    let mut session = Session::new(ws.seed, &ws.config);

    let previous = session
        .tasks()
        .iter()
        .find(|t| t.id == args.id)
        .map(|t| t.status);

    let (Some(previous), Maybe::Present(task)) =
        (previous, session.update_status(&args.id, args.status))
    else {
        render_error(
            output,
            &CliError::from_code(
                ErrorCode::TaskNotFound,
                format!("task '{}' not found", args.id),
            ),
        )?;
        anyhow::bail!("task '{}' not found", args.id);
    };

    let report = StatusOutput {
        previous,
        task,
        events: session.close(),
    };
    render_mode(output, &report, render_status_text, render_status_human)
}

fn render_status_human(report: &StatusOutput, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        w,
        "✓ {}: {} → {}",
        report.task.id, report.previous, report.task.status
    )?;
    writeln!(w)?;
    pretty_section(w, "Events")?;
    write_events(w, &report.events)
}

fn render_status_text(report: &StatusOutput, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "{}  {}  {}", report.task.id, report.previous, report.task.status)?;
    write_events(w, &report.events)
}
