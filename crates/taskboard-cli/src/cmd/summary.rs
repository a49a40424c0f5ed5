//! `tb summary`: overview, per-project counts, workload and overdue tasks.

use std::io::Write;
use std::path::Path;

use taskboard_core::report::SummaryReport;
use taskboard_core::session::Session;

use super::load_workspace;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Execute `tb summary`.
///
/// # Errors
///
/// Returns an error if the seed cannot be loaded or output fails.
pub fn run_summary(
    output: OutputMode,
    project_root: &Path,
    seed_override: Option<&Path>,
) -> anyhow::Result<()> {
    let ws = load_workspace(project_root, seed_override, output)?;
    let mut session = Session::new(ws.seed, &ws.config);
    let report = session.summary();
    render_mode(output, &report, render_summary_text, render_summary_human)
}

fn render_summary_human(report: &SummaryReport, w: &mut dyn Write) -> std::io::Result<()> {
    let overview = &report.overview;
    pretty_section(w, "Summary")?;
    pretty_kv(w, "projects", overview.projects_count.to_string())?;
    pretty_kv(w, "users", overview.users_count.to_string())?;
    pretty_kv(w, "tasks", overview.tasks_count.to_string())?;
    pretty_kv(w, "avg/user", format!("{:.2}", overview.avg_tasks_per_user))?;

    writeln!(w)?;
    pretty_section(w, "Projects")?;
    for (name, c) in &report.project_stats {
        writeln!(w, "{name:<24} {} tasks, {} done", c.total, c.done)?;
    }

    writeln!(w)?;
    pretty_section(w, "Workload")?;
    for (name, c) in &report.user_workload {
        writeln!(
            w,
            "{name:<24} {} open, {} done",
            c.total - c.done,
            c.done
        )?;
    }

    writeln!(w)?;
    pretty_section(w, &format!("Overdue ({})", report.overdue_tasks.count))?;
    for row in &report.overdue_tasks.tasks {
        writeln!(w, "{:<6} {:<12} {}", row.id, row.status.as_str(), row.title)?;
    }
    Ok(())
}

fn render_summary_text(report: &SummaryReport, w: &mut dyn Write) -> std::io::Result<()> {
    let overview = &report.overview;
    writeln!(w, "projects  {}", overview.projects_count)?;
    writeln!(w, "users  {}", overview.users_count)?;
    writeln!(w, "tasks  {}", overview.tasks_count)?;
    writeln!(w, "overdue  {}", report.overdue_tasks.count)?;
    for row in &report.overdue_tasks.tasks {
        writeln!(w, "overdue_task  {}  {}  {}", row.id, row.status, row.title)?;
    }
    Ok(())
}
