//! `tb show <id>`: one task with its comment thread.

use std::io::Write;
use std::path::Path;

use chrono::{Local, TimeZone, Utc};
use clap::Args;
use serde::Serialize;
use taskboard_core::ErrorCode;
use taskboard_core::model::{Comment, Task};
use taskboard_core::outcome::Maybe;
use taskboard_core::timestamp::parse_timestamp;
use taskboard_core::transform::{find_task, walk_comments};

use super::load_workspace;
use crate::output::{
    CliError, OutputMode, pretty_kv, pretty_rule, pretty_section, render_error, render_mode,
};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Task id to display.
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct ShowItem {
    #[serde(flatten)]
    pub task: Task,
    pub comments: Vec<Comment>,
}

/// Render a stored UTC stamp in local time, or verbatim if it does not parse.
fn local_stamp(raw: &str) -> String {
    parse_timestamp(raw).map_or_else(
        |_| raw.to_string(),
        |naive| {
            Utc.from_utc_datetime(&naive)
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M")
                .to_string()
        },
    )
}

/// Execute `tb show <id>`.
///
/// # Errors
///
/// Returns an error if the seed cannot be loaded or the task is unknown.
pub fn run_show(
    args: &ShowArgs,
    output: OutputMode,
    project_root: &Path,
    seed_override: Option<&Path>,
) -> anyhow::Result<()> {
    let ws = load_workspace(project_root, seed_override, output)?;

    let Maybe::Present(task) = find_task(&ws.seed.tasks, &args.id) else {
        render_error(
            output,
            &CliError::from_code(
                ErrorCode::TaskNotFound,
                format!("task '{}' not found", args.id),
            ),
        )?;
        anyhow::bail!("task '{}' not found", args.id);
    };

    let item = ShowItem {
        comments: walk_comments(&ws.seed.comments, &task.id),
        task,
    };

    render_mode(output, &item, render_show_text, render_show_human)
}

fn render_show_human(item: &ShowItem, w: &mut dyn Write) -> std::io::Result<()> {
    let task = &item.task;
    pretty_section(w, &format!("Task {}", task.id))?;
    writeln!(w, "{}", task.title)?;
    pretty_rule(w)?;
    pretty_kv(w, "project", &task.project_id)?;
    pretty_kv(w, "status", task.status.as_str())?;
    pretty_kv(w, "priority", task.priority.as_str())?;
    pretty_kv(w, "assignee", task.assignee.as_deref().unwrap_or("(unassigned)"))?;
    pretty_kv(w, "created", local_stamp(&task.created))?;
    pretty_kv(w, "updated", local_stamp(&task.updated))?;

    if !task.desc.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Description")?;
        for line in task.desc.lines() {
            writeln!(w, "{line}")?;
        }
    }

    if !item.comments.is_empty() {
        writeln!(w)?;
        pretty_section(w, &format!("Comments ({})", item.comments.len()))?;
        for comment in &item.comments {
            writeln!(
                w,
                "[{}] {}: {}",
                local_stamp(&comment.ts),
                comment.author,
                comment.text
            )?;
        }
    }
    Ok(())
}

fn render_show_text(item: &ShowItem, w: &mut dyn Write) -> std::io::Result<()> {
    let task = &item.task;
    writeln!(w, "id:        {}", task.id)?;
    writeln!(w, "title:     {}", task.title)?;
    writeln!(w, "project:   {}", task.project_id)?;
    writeln!(w, "status:    {}", task.status)?;
    writeln!(w, "priority:  {}", task.priority)?;
    writeln!(w, "assignee:  {}", task.assignee.as_deref().unwrap_or("-"))?;
    writeln!(w, "created:   {}", task.created)?;
    writeln!(w, "updated:   {}", task.updated)?;
    writeln!(w, "desc:      {}", task.desc)?;
    for comment in &item.comments {
        writeln!(w, "comment:   {}  {}  {}", comment.ts, comment.author, comment.text)?;
    }
    Ok(())
}
