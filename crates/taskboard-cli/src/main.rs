#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::{OutputMode, resolve_output_mode};
use std::env;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "taskboard: reports, SLA checks and task pipelines over a seeded task set",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format. Overrides `--json` and the FORMAT env var.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Seed file to load. Overrides TASKBOARD_SEED and taskboard.toml.
    #[arg(long, global = true, value_name = "PATH")]
    seed: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Reports",
        about = "Show headline numbers",
        long_about = "Show project, user and task counts, the status distribution and per-project counts.",
        after_help = "EXAMPLES:\n    # Overview of the default seed\n    tb overview\n\n    # Emit machine-readable output\n    tb overview --json"
    )]
    Overview,

    #[command(
        next_help_heading = "Reports",
        about = "Show status counts for one project",
        after_help = "EXAMPLES:\n    # Counts for project p1\n    tb project p1"
    )]
    Project(cmd::project::ProjectArgs),

    #[command(
        next_help_heading = "Reports",
        about = "List tasks",
        long_about = "List tasks, optionally narrowed by status, priority, assignee and creation date.",
        after_help = "EXAMPLES:\n    # High-priority tasks for u2\n    tb list --priority high --assignee u2\n\n    # Tasks created in March 2024\n    tb list --from 2024-03-01 --to 2024-03-31T23:59:59\n\n    # Emit machine-readable output\n    tb list --status todo --json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Reports",
        about = "Show one task and its comments",
        after_help = "EXAMPLES:\n    # Show a task\n    tb show t2"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Reports",
        about = "Show per-user status counts"
    )]
    Workload,

    #[command(
        next_help_heading = "Reports",
        about = "List tasks that breach SLA rules",
        long_about = "List tasks breaching any of the given SLA rules. With --compare, time a cold evaluation against the cached repeat.",
        after_help = "EXAMPLES:\n    # Default rules from taskboard.toml\n    tb overdue\n\n    # Only the 14-day rule\n    tb overdue --rule overdue_14_days\n\n    # Cache timing\n    tb overdue --compare --json"
    )]
    Overdue(cmd::overdue::OverdueArgs),

    #[command(
        next_help_heading = "Reports",
        about = "Print ids of tasks in the given statuses",
        after_help = "EXAMPLES:\n    # Everything not yet done\n    tb traverse --status todo,in_progress,review"
    )]
    Traverse(cmd::traverse::TraverseArgs),

    #[command(
        next_help_heading = "Reports",
        about = "Validate every seeded task",
        after_help = "EXAMPLES:\n    # Default rules\n    tb validate\n\n    # Only the assignee rule\n    tb validate --rule assignee_required"
    )]
    Validate(cmd::validate::ValidateArgs),

    #[command(
        next_help_heading = "Reports",
        about = "Overview, projects, workload and overdue tasks in one report"
    )]
    Summary,

    #[command(
        next_help_heading = "Session",
        about = "Validate and add a task",
        long_about = "Validate a new task and add it in an in-memory session. Prints the task and the published events; the seed file is not modified.",
        after_help = "EXAMPLES:\n    # Create a task\n    tb create --title \"Dark mode\" --desc \"Support the system theme\"\n\n    # In progress needs an assignee\n    tb create --title \"Dark mode\" --desc \"Support the system theme\" --status in_progress --assignee u3"
    )]
    Create(cmd::create::CreateArgs),

    #[command(
        next_help_heading = "Session",
        about = "Change a task's status",
        after_help = "EXAMPLES:\n    # Move t3 to review\n    tb status t3 review"
    )]
    Status(cmd::status::StatusArgs),

    #[command(
        next_help_heading = "Session",
        about = "Run a batch of task drafts through validation",
        after_help = "EXAMPLES:\n    # Validate and add drafts in order\n    tb pipeline drafts.json"
    )]
    Pipeline(cmd::pipeline::PipelineArgs),

    #[command(
        next_help_heading = "Project Maintenance",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    tb completions bash"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("TASKBOARD_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "taskboard=debug,info"
        } else {
            "taskboard=info,warn"
        })
    });
    let format = env::var("TASKBOARD_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());
    let registry = tracing_subscriber::registry().with(filter);
    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let project_root = env::current_dir()?;
    let output = cli.output_mode();
    let seed = cli.seed.as_deref();

    match cli.command {
        Commands::Overview => cmd::overview::run_overview(output, &project_root, seed),
        Commands::Project(ref args) => {
            cmd::project::run_project(args, output, &project_root, seed)
        }
        Commands::List(ref args) => cmd::list::run_list(args, output, &project_root, seed),
        Commands::Show(ref args) => cmd::show::run_show(args, output, &project_root, seed),
        Commands::Workload => cmd::workload::run_workload(output, &project_root, seed),
        Commands::Overdue(ref args) => {
            cmd::overdue::run_overdue(args, output, &project_root, seed)
        }
        Commands::Traverse(ref args) => {
            cmd::traverse::run_traverse(args, output, &project_root, seed)
        }
        Commands::Validate(ref args) => {
            cmd::validate::run_validate(args, output, &project_root, seed)
        }
        Commands::Summary => cmd::summary::run_summary(output, &project_root, seed),
        Commands::Create(ref args) => cmd::create::run_create(args, output, &project_root, seed),
        Commands::Status(ref args) => cmd::status::run_status(args, output, &project_root, seed),
        Commands::Pipeline(ref args) => {
            cmd::pipeline::run_pipeline(args, output, &project_root, seed)
        }
        Commands::Completions(ref args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskboard_core::model::{Priority, Status};
    use taskboard_core::overdue::SlaRule;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn json_flag_after_subcommand() {
        let cli = Cli::parse_from(["tb", "overview", "--json"]);
        assert!(cli.json);
        assert!(cli.output_mode().is_json());
    }

    #[test]
    fn format_flag_parses() {
        let cli = Cli::parse_from(["tb", "--format", "text", "summary"]);
        assert_eq!(cli.format, Some(OutputMode::Text));
        assert_eq!(cli.output_mode(), OutputMode::Text);
    }

    #[test]
    fn seed_flag_is_global() {
        let cli = Cli::parse_from(["tb", "workload", "--seed", "other.json"]);
        assert_eq!(cli.seed, Some(PathBuf::from("other.json")));
    }

    #[test]
    fn list_parses_typed_filters() {
        let cli = Cli::parse_from(["tb", "list", "--status", "in_progress", "--priority", "high"]);
        let Commands::List(args) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.status, Some(Status::InProgress));
        assert_eq!(args.priority, Some(Priority::High));
    }

    #[test]
    fn list_date_bounds_come_in_pairs() {
        assert!(Cli::try_parse_from(["tb", "list", "--from", "2024-01-01"]).is_err());
    }

    #[test]
    fn list_rejects_unknown_status() {
        assert!(Cli::try_parse_from(["tb", "list", "--status", "blocked"]).is_err());
    }

    #[test]
    fn overdue_collects_repeated_rules() {
        let cli = Cli::parse_from([
            "tb",
            "overdue",
            "--rule",
            "overdue_14_days",
            "--rule",
            "critical_overdue",
            "--compare",
        ]);
        let Commands::Overdue(args) = cli.command else {
            panic!("expected overdue");
        };
        assert_eq!(args.rules, [SlaRule::Overdue14Days, SlaRule::CriticalOverdue]);
        assert!(args.compare);
    }

    #[test]
    fn traverse_requires_a_status() {
        assert!(Cli::try_parse_from(["tb", "traverse"]).is_err());
        let cli = Cli::parse_from(["tb", "traverse", "--status", "review,todo"]);
        let Commands::Traverse(args) = cli.command else {
            panic!("expected traverse");
        };
        assert_eq!(args.statuses, [Status::Review, Status::Todo]);
    }

    #[test]
    fn create_keeps_raw_status_for_validation() {
        let cli = Cli::parse_from(["tb", "create", "--title", "X", "--status", "blocked"]);
        let Commands::Create(args) = cli.command else {
            panic!("expected create");
        };
        assert_eq!(args.status, "blocked");
        assert_eq!(args.priority, "medium");
    }

    #[test]
    fn status_subcommand_parses() {
        let cli = Cli::parse_from(["tb", "status", "t3", "done"]);
        let Commands::Status(args) = cli.command else {
            panic!("expected status");
        };
        assert_eq!(args.id, "t3");
        assert_eq!(args.status, Status::Done);
    }

    #[test]
    fn pipeline_takes_a_file() {
        let cli = Cli::parse_from(["tb", "pipeline", "drafts.json"]);
        assert!(matches!(cli.command, Commands::Pipeline(_)));
    }
}
