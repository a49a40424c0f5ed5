//! `tb traverse --status ...`: ids of tasks in any of the given statuses.

use std::io::Write;
use std::path::Path;

use clap::Args;
use taskboard_core::model::Status;
use taskboard_core::transform::traverse_tasks;

use super::load_workspace;
use crate::output::{OutputMode, render};

#[derive(Args, Debug)]
pub struct TraverseArgs {
    /// Status to include; repeat or comma-separate for several.
    #[arg(long = "status", value_name = "STATUS", required = true, value_delimiter = ',')]
    pub statuses: Vec<Status>,
}

/// Execute `tb traverse`.
///
/// Ids come out in seed order regardless of the order statuses are given.
///
/// # Errors
///
/// Returns an error if the seed cannot be loaded or output fails.
pub fn run_traverse(
    args: &TraverseArgs,
    output: OutputMode,
    project_root: &Path,
    seed_override: Option<&Path>,
) -> anyhow::Result<()> {
    let ws = load_workspace(project_root, seed_override, output)?;
    let ids = traverse_tasks(&ws.seed.tasks, &args.statuses);
    render(output, &ids, |ids, w: &mut dyn Write| {
        for id in ids {
            writeln!(w, "{id}")?;
        }
        Ok(())
    })
}
