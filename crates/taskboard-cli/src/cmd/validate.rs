//! `tb validate`: run the validation rules over every seeded task.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use clap::Args;
use taskboard_core::model::Task;
use taskboard_core::outcome::Outcome;
use taskboard_core::report::validation_report;
use taskboard_core::validate::{ValidationErrors, ValidationRule};

use super::load_workspace;
use crate::output::{OutputMode, pretty_section, render_mode};

type Report = BTreeMap<String, Outcome<ValidationErrors, Task>>;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Rule to enforce; repeat for several. Defaults to `[validation] rules`.
    #[arg(long = "rule", value_name = "RULE")]
    pub rules: Vec<ValidationRule>,
}

/// Execute `tb validate`.
///
/// Failing tasks are part of the report, not a command failure.
///
/// # Errors
///
/// Returns an error if the seed cannot be loaded or output fails.
pub fn run_validate(
    args: &ValidateArgs,
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

    let report = validation_report(&ws.seed.tasks, &rules);
    let failed = report.values().filter(|o| o.is_failure()).count();
    tracing::info!(tasks = report.len(), failed, "validation report built");

    render_mode(output, &report, render_validate_text, render_validate_human)
}

fn render_validate_human(report: &Report, w: &mut dyn Write) -> std::io::Result<()> {
    let failed = report.values().filter(|o| o.is_failure()).count();
    pretty_section(
        w,
        &format!("Validation ({} ok, {failed} failed)", report.len() - failed),
    )?;
    for (id, outcome) in report {
        match outcome {
            Outcome::Success(_) => writeln!(w, "✓ {id}")?,
            Outcome::Failure(errors) => {
                writeln!(w, "✗ {id}")?;
                for message in errors.messages() {
                    writeln!(w, "    {message}")?;
                }
            }
        }
    }
    Ok(())
}

fn render_validate_text(report: &Report, w: &mut dyn Write) -> std::io::Result<()> {
    for (id, outcome) in report {
        match outcome {
            Outcome::Success(_) => writeln!(w, "{id}  ok")?,
            Outcome::Failure(errors) => {
                writeln!(w, "{id}  failed  {}", errors.messages().join("; "))?;
            }
        }
    }
    Ok(())
}
