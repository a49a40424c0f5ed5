//! `tb overdue`: tasks breaching SLA rules, optionally with cache timing.

use std::io::Write;
use std::path::Path;

use clap::Args;
use serde::Serialize;
use taskboard_core::model::Task;
use taskboard_core::overdue::{CacheStats, OverdueCache, SlaRule};
use taskboard_core::report::{CacheComparison, cache_comparison_report};

use super::{load_workspace, task_rows};
use crate::output::{OutputMode, Renderable, pretty_kv, pretty_section, render_list, render_mode};

#[derive(Args, Debug)]
pub struct OverdueArgs {
    /// SLA rule to apply; repeat for several. Defaults to `[overdue] rules`.
    #[arg(long = "rule", value_name = "RULE")]
    pub rules: Vec<SlaRule>,

    /// Time a cold evaluation against the memoized repeat.
    #[arg(long)]
    pub compare: bool,
}

#[derive(Debug, Serialize)]
pub struct CompareOutput {
    pub rules: Vec<SlaRule>,
    #[serde(flatten)]
    pub comparison: CacheComparison,
    pub cache: CacheStats,
    pub tasks: Vec<Task>,
}

/// Execute `tb overdue`.
///
/// # Errors
///
/// Returns an error if the seed cannot be loaded or output fails.
pub fn run_overdue(
    args: &OverdueArgs,
    output: OutputMode,
    project_root: &Path,
    seed_override: Option<&Path>,
) -> anyhow::Result<()> {
    let ws = load_workspace(project_root, seed_override, output)?;
    let rules = if args.rules.is_empty() {
        ws.config.overdue.rules.clone()
    } else {
        args.rules.clone()
    };
    let mut cache = OverdueCache::new(ws.config.overdue.cache_capacity);

    if !args.compare {
        let overdue = cache.overdue_tasks(&ws.seed.tasks, &rules);
        return render_list(&task_rows(&overdue), output);
    }

    let comparison = cache_comparison_report(&mut cache, &ws.seed.tasks, &rules);
    let report = CompareOutput {
        tasks: cache.overdue_tasks(&ws.seed.tasks, &rules).to_vec(),
        cache: cache.stats(),
        rules,
        comparison,
    };
    render_mode(output, &report, render_compare_text, render_compare_human)
}

fn render_compare_human(report: &CompareOutput, w: &mut dyn Write) -> std::io::Result<()> {
    let c = &report.comparison;
    let rules: Vec<_> = report.rules.iter().map(|r| r.as_str()).collect();
    pretty_section(w, "Overdue cache comparison")?;
    pretty_kv(w, "rules", rules.join(", "))?;
    pretty_kv(w, "first", format!("{:?}", c.first_call))?;
    pretty_kv(w, "second", format!("{:?}", c.second_call))?;
    pretty_kv(w, "speedup", format_speedup(c.cache_improvement))?;
    pretty_kv(w, "identical", c.results_identical.to_string())?;
    pretty_kv(w, "overdue", c.overdue_tasks_count.to_string())?;
    pretty_kv(
        w,
        "cache",
        format!("{} hits / {} misses", report.cache.hits, report.cache.misses),
    )?;
    if !report.tasks.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Tasks")?;
        for row in task_rows(&report.tasks) {
            row.render_human(w)?;
        }
    }
    Ok(())
}

fn render_compare_text(report: &CompareOutput, w: &mut dyn Write) -> std::io::Result<()> {
    let c = &report.comparison;
    writeln!(w, "first_call_us  {}", c.first_call.as_micros())?;
    writeln!(w, "second_call_us  {}", c.second_call.as_micros())?;
    writeln!(w, "cache_improvement  {}", format_speedup(c.cache_improvement))?;
    writeln!(w, "results_identical  {}", c.results_identical)?;
    writeln!(w, "overdue_tasks_count  {}", c.overdue_tasks_count)?;
    for row in task_rows(&report.tasks) {
        row.render_table(w)?;
    }
    Ok(())
}

fn format_speedup(ratio: f64) -> String {
    if ratio.is_finite() {
        format!("{ratio:.1}x")
    } else {
        "n/a (repeat too fast to time)".to_string()
    }
}
