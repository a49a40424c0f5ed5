//! `tb create`: validate a new task and add it in a fresh session.
//!
//! The seed file is never written; the command prints the created task and
//! the events the session published.

use std::io::Write;
use std::path::Path;

use clap::Args;
use serde::Serialize;
use taskboard_core::bus::Event;
use taskboard_core::model::Task;
use taskboard_core::outcome::Outcome;
use taskboard_core::session::Session;
use taskboard_core::validate::ValidationRule;

use super::{load_workspace, write_events};
use crate::output::{CliError, OutputMode, pretty_kv, pretty_section, render_error, render_mode};

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Task title.
    #[arg(long)]
    pub title: String,

    /// Task description.
    #[arg(long, default_value = "")]
    pub desc: String,

    /// Initial status (checked by validation, not by the parser).
    #[arg(long, default_value = "todo")]
    pub status: String,

    /// Priority (checked by validation, not by the parser).
    #[arg(long, default_value = "medium")]
    pub priority: String,

    /// Assignee user id.
    #[arg(long)]
    pub assignee: Option<String>,

    /// Project id. Defaults to the first project in the seed.
    #[arg(long)]
    pub project: Option<String>,

    /// Validation rule; repeat for several. Defaults to `[validation] rules`.
    #[arg(long = "rule", value_name = "RULE")]
    pub rules: Vec<ValidationRule>,
}

#[derive(Debug, Serialize)]
pub struct CreateOutput {
    pub task: Task,
    pub tasks_count: usize,
    pub events: Vec<Event>,
}

/// Execute `tb create`.
///
/// # Errors
///
/// Returns an error if the seed cannot be loaded or the task fails
/// validation.
pub fn run_create(
    args: &CreateArgs,
    output: OutputMode,
    project_root: &Path,
    seed_override: Option<&Path>,
) -> anyhow::Result<()> {
    let ws = load_workspace(project_root, seed_override, output)?;
    let rules = if args.rules.is_empty() {
        ws.config.validation.rules.clone()
    } else {
        args.rules.clone()
    };
    let project_id = args
        .project
        .clone()
        .or_else(|| ws.seed.projects.first().map(|p| p.id.clone()))
        .unwrap_or_default();

    let mut session = Session::new(ws.seed, &ws.config);
    let draft = session.draft(
        &project_id,
        &args.title,
        &args.desc,
        &args.status,
        &args.priority,
        args.assignee.as_deref(),
    );

    let task = match session.create_task(&draft, &rules) {
        Outcome::Success(task) => task,
        Outcome::Failure(errors) => {
            render_error(output, &CliError::from(&errors))?;
            anyhow::bail!("{errors}");
        }
    };

    let report = CreateOutput {
        task,
        tasks_count: session.tasks().len(),
        events: session.close(),
    };
    render_mode(output, &report, render_create_text, render_create_human)
}

fn render_create_human(report: &CreateOutput, w: &mut dyn Write) -> std::io::Result<()> {
    let task = &report.task;
    writeln!(w, "✓ Created {}: {}", task.id, task.title)?;
    pretty_kv(w, "project", &task.project_id)?;
    pretty_kv(w, "status", task.status.as_str())?;
    pretty_kv(w, "priority", task.priority.as_str())?;
    pretty_kv(w, "tasks", report.tasks_count.to_string())?;
    writeln!(w)?;
    pretty_section(w, "Events")?;
    write_events(w, &report.events)
}

fn render_create_text(report: &CreateOutput, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "{}", report.task.id)?;
    write_events(w, &report.events)
}
