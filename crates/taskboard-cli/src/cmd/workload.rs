//! `tb workload`: per-user status counts.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use taskboard_core::report::{StatusCounts, user_workload_report};

use super::load_workspace;
use crate::output::{OutputMode, pretty_section, render_mode};

/// Execute `tb workload`.
///
/// # Errors
///
/// Returns an error if the seed cannot be loaded or output fails.
pub fn run_workload(
    output: OutputMode,
    project_root: &Path,
    seed_override: Option<&Path>,
) -> anyhow::Result<()> {
    let ws = load_workspace(project_root, seed_override, output)?;
    let report = user_workload_report(&ws.seed.tasks, &ws.seed.users);
    render_mode(output, &report, render_workload_text, render_workload_human)
}

fn render_workload_human(
    report: &BTreeMap<String, StatusCounts>,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    pretty_section(w, "Workload")?;
    writeln!(
        w,
        "{:<24} {:>5} {:>5} {:>6} {:>6} {:>5}",
        "user", "total", "todo", "doing", "review", "done"
    )?;
    for (name, c) in report {
        writeln!(
            w,
            "{name:<24} {:>5} {:>5} {:>6} {:>6} {:>5}",
            c.total, c.todo, c.in_progress, c.review, c.done
        )?;
    }
    Ok(())
}

fn render_workload_text(
    report: &BTreeMap<String, StatusCounts>,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    writeln!(w, "user  total  todo  in_progress  review  done")?;
    for (name, c) in report {
        writeln!(
            w,
            "{name}  {}  {}  {}  {}  {}",
            c.total, c.todo, c.in_progress, c.review, c.done
        )?;
    }
    Ok(())
}
