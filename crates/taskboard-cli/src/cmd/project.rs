//! `tb project <id>`: status counts for one project.

use std::io::Write;
use std::path::Path;

use clap::Args;
use serde::Serialize;
use taskboard_core::model::Status;
use taskboard_core::report::{StatusCounts, project_overview};

use super::load_workspace;
use crate::output::{CliError, OutputMode, pretty_kv, pretty_section, render_error, render_mode};

#[derive(Args, Debug)]
pub struct ProjectArgs {
    /// Project id, e.g. `p1`.
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct ProjectOutput {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub counts: StatusCounts,
}

/// Execute `tb project <id>`.
///
/// # Errors
///
/// Returns an error if the seed cannot be loaded or the project is unknown.
pub fn run_project(
    args: &ProjectArgs,
    output: OutputMode,
    project_root: &Path,
    seed_override: Option<&Path>,
) -> anyhow::Result<()> {
    let ws = load_workspace(project_root, seed_override, output)?;

    let Some(project) = ws.seed.projects.iter().find(|p| p.id == args.id) else {
        render_error(
            output,
            &CliError::with_details(
                format!("project '{}' not found", args.id),
                "use `tb overview` to see known projects",
                "project_not_found",
            ),
        )?;
        anyhow::bail!("project '{}' not found", args.id);
    };

    let report = ProjectOutput {
        id: project.id.clone(),
        name: project.name.clone(),
        owner: project.owner.clone(),
        counts: project_overview(&ws.seed.tasks, &project.id),
    };

    render_mode(output, &report, render_project_text, render_project_human)
}

fn render_project_human(report: &ProjectOutput, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Project {} ({})", report.name, report.id))?;
    pretty_kv(w, "owner", &report.owner)?;
    pretty_kv(w, "total", report.counts.total.to_string())?;
    for status in Status::ALL {
        pretty_kv(w, status.as_str(), report.counts.get(status).to_string())?;
    }
    Ok(())
}

fn render_project_text(report: &ProjectOutput, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "total  {}", report.counts.total)?;
    for status in Status::ALL {
        writeln!(w, "{}  {}", status, report.counts.get(status))?;
    }
    Ok(())
}
