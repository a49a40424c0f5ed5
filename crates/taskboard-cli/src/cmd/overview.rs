//! `tb overview`: headline numbers and per-project status counts.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use taskboard_core::model::Status;
use taskboard_core::report::{OverviewStats, StatusCounts, overview_stats, project_overview};

use super::load_workspace;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

#[derive(Debug, Serialize)]
pub struct OverviewOutput {
    #[serde(flatten)]
    pub stats: OverviewStats,
    /// Status counts keyed by project name.
    pub projects: BTreeMap<String, StatusCounts>,
}

/// Execute `tb overview`.
///
/// # Errors
///
/// Returns an error if the seed cannot be loaded or output fails.
pub fn run_overview(
    output: OutputMode,
    project_root: &Path,
    seed_override: Option<&Path>,
) -> anyhow::Result<()> {
    let ws = load_workspace(project_root, seed_override, output)?;
    let seed = &ws.seed;

    let report = OverviewOutput {
        stats: overview_stats(&seed.projects, &seed.users, &seed.tasks),
        projects: seed
            .projects
            .iter()
            .map(|p| (p.name.clone(), project_overview(&seed.tasks, &p.id)))
            .collect(),
    };

    render_mode(output, &report, render_overview_text, render_overview_human)
}

fn render_overview_human(report: &OverviewOutput, w: &mut dyn Write) -> std::io::Result<()> {
    let stats = &report.stats;
    pretty_section(w, "Overview")?;
    pretty_kv(w, "projects", stats.projects_count.to_string())?;
    pretty_kv(w, "users", stats.users_count.to_string())?;
    pretty_kv(w, "tasks", stats.tasks_count.to_string())?;
    pretty_kv(w, "avg/user", format!("{:.2}", stats.avg_tasks_per_user))?;
    writeln!(w)?;

    pretty_section(w, "Status")?;
    for status in Status::ALL {
        pretty_kv(w, status.as_str(), stats.status_distribution.get(status).to_string())?;
    }

    if !report.projects.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Projects")?;
        for (name, counts) in &report.projects {
            writeln!(
                w,
                "{name:<24} total {:>3}  todo {:>3}  doing {:>3}  review {:>3}  done {:>3}",
                counts.total, counts.todo, counts.in_progress, counts.review, counts.done
            )?;
        }
    }
    Ok(())
}

fn render_overview_text(report: &OverviewOutput, w: &mut dyn Write) -> std::io::Result<()> {
    let stats = &report.stats;
    writeln!(w, "projects  {}", stats.projects_count)?;
    writeln!(w, "users  {}", stats.users_count)?;
    writeln!(w, "tasks  {}", stats.tasks_count)?;
    writeln!(w, "avg_tasks_per_user  {:.2}", stats.avg_tasks_per_user)?;
    for status in Status::ALL {
        writeln!(w, "{}  {}", status, stats.status_distribution.get(status))?;
    }
    for (name, counts) in &report.projects {
        writeln!(
            w,
            "project  {name}  {}  {}  {}  {}  {}",
            counts.total, counts.todo, counts.in_progress, counts.review, counts.done
        )?;
    }
    Ok(())
}
