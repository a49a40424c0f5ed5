//! `tb pipeline <file>`: run a batch of task drafts through validation.
//!
//! Each draft is validated against the snapshot produced by the previous
//! successful step. Rejected drafts are reported and skipped.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use taskboard_core::model::{Task, TaskDraft};
use taskboard_core::outcome::Outcome;
use taskboard_core::timestamp::now_iso;
use taskboard_core::validate::{ValidationErrors, ValidationRule, pipeline_report};

use super::load_workspace;
use crate::output::{CliError, OutputMode, pretty_kv, pretty_section, render_error, render_mode};

#[derive(Args, Debug)]
pub struct PipelineArgs {
    /// JSON file holding an array of task drafts.
    pub file: PathBuf,

    /// Validation rule; repeat for several. Defaults to `[validation] rules`.
    #[arg(long = "rule", value_name = "RULE")]
    pub rules: Vec<ValidationRule>,
}

#[derive(Debug, Serialize)]
pub struct StepRow {
    pub id: String,
    pub ok: bool,
    /// Snapshot size after this step.
    pub tasks_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PipelineOutput {
    pub initial_count: usize,
    pub final_count: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub steps: Vec<StepRow>,
}

fn read_drafts(path: &Path) -> anyhow::Result<Vec<TaskDraft>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut drafts: Vec<TaskDraft> = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse drafts in {}", path.display()))?;

    let now = now_iso();
    for draft in &mut drafts {
        if draft.created.is_empty() {
            draft.created.clone_from(&now);
        }
        if draft.updated.is_empty() {
            draft.updated.clone_from(&draft.created);
        }
    }
    Ok(drafts)
}

fn summarize(
    initial_count: usize,
    drafts: &[TaskDraft],
    steps: Vec<Outcome<ValidationErrors, Vec<Task>>>,
) -> PipelineOutput {
    let mut current = initial_count;
    let rows: Vec<StepRow> = drafts
        .iter()
        .zip(steps)
        .map(|(draft, step)| match step {
            Outcome::Success(snapshot) => {
                current = snapshot.len();
                StepRow {
                    id: draft.id.clone(),
                    ok: true,
                    tasks_count: current,
                    errors: Vec::new(),
                }
            }
            Outcome::Failure(errors) => StepRow {
                id: draft.id.clone(),
                ok: false,
                tasks_count: current,
                errors: errors.messages(),
            },
        })
        .collect();

    let accepted = rows.iter().filter(|r| r.ok).count();
    PipelineOutput {
        initial_count,
        final_count: current,
        accepted,
        rejected: rows.len() - accepted,
        steps: rows,
    }
}

/// Execute `tb pipeline <file>`.
///
/// # Errors
///
/// Returns an error if the seed or the drafts file cannot be loaded.
pub fn run_pipeline(
    args: &PipelineArgs,
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

    let drafts = match read_drafts(&args.file) {
        Ok(drafts) => drafts,
        Err(err) => {
            render_error(
                output,
                &CliError::with_details(
                    format!("{err:#}"),
                    "expected a JSON array of task drafts",
                    "drafts_malformed",
                ),
            )?;
            return Err(err);
        }
    };

    let steps = pipeline_report(&ws.seed.tasks, &drafts, &rules);
    let report = summarize(ws.seed.tasks.len(), &drafts, steps);
    tracing::info!(
        accepted = report.accepted,
        rejected = report.rejected,
        "pipeline finished"
    );

    render_mode(output, &report, render_pipeline_text, render_pipeline_human)
}

fn render_pipeline_human(report: &PipelineOutput, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Pipeline")?;
    for step in &report.steps {
        if step.ok {
            writeln!(w, "✓ {:<10} tasks={}", step.id, step.tasks_count)?;
        } else {
            writeln!(w, "✗ {:<10} tasks={}", step.id, step.tasks_count)?;
            for error in &step.errors {
                writeln!(w, "    {error}")?;
            }
        }
    }
    writeln!(w)?;
    pretty_kv(w, "accepted", report.accepted.to_string())?;
    pretty_kv(w, "rejected", report.rejected.to_string())?;
    pretty_kv(
        w,
        "tasks",
        format!("{} → {}", report.initial_count, report.final_count),
    )
}

fn render_pipeline_text(report: &PipelineOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for step in &report.steps {
        let verdict = if step.ok { "ok" } else { "failed" };
        writeln!(
            w,
            "{}  {verdict}  {}  {}",
            step.id,
            step.tasks_count,
            step.errors.join("; ")
        )?;
    }
    Ok(())
}
