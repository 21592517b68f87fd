//! trawl CLI - List, parse, and search assistant conversation logs.
//!
//! Every subcommand prints to stdout for scripting; pass `--json` for
//! machine-readable output. Diagnostics go to stderr via `RUST_LOG`.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use trawl_scan::Scope;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "trawl")]
#[command(author, version, about = "List, parse, and search assistant conversation logs", long_about = None)]
struct Cli {
    /// Directory holding one log directory per project [default: ~/.claude/projects]
    #[arg(long, global = true, env = "TRAWL_PROJECTS_DIR")]
    projects_dir: Option<PathBuf>,

    /// Log pipeline details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List sessions, newest first
    List {
        /// Which projects to include (project, parent, children, personal, all)
        #[arg(short, long, default_value = "personal")]
        scope: Scope,

        /// Maximum number of sessions to show (0 for no limit)
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,

        /// Number of newest sessions to skip
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Only sessions starting on or after this date (e.g. "yesterday", "2 days ago", 2024-01-31)
        #[arg(long)]
        after: Option<String>,

        /// Only sessions starting on or before this date
        #[arg(long)]
        before: Option<String>,

        /// Working directory used to resolve the scope
        #[arg(long)]
        cwd: Option<PathBuf>,

        /// Output as JSON (for machine consumption)
        #[arg(long)]
        json: bool,
    },

    /// Show the turns and statistics of one session
    Parse {
        /// Path to the session log
        path: PathBuf,

        /// Output as JSON (for machine consumption)
        #[arg(long)]
        json: bool,

        /// Omit the turns
        #[arg(long)]
        stats_only: bool,
    },

    /// Search session content for a literal string
    Search {
        /// Text to look for
        query: String,

        /// Which projects to include (project, parent, children, personal, all)
        #[arg(short, long, default_value = "all")]
        scope: Scope,

        /// Maximum number of sessions to show (0 for no limit)
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,

        /// Only sessions starting on or after this date
        #[arg(long)]
        after: Option<String>,

        /// Only sessions starting on or before this date
        #[arg(long)]
        before: Option<String>,

        /// Working directory used to resolve the scope
        #[arg(long)]
        cwd: Option<PathBuf>,

        /// Match case exactly
        #[arg(long)]
        case_sensitive: bool,

        /// Output as JSON (for machine consumption)
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "warn,trawl=debug,trawl_scan=debug,trawl_format=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn projects_dir(flag: Option<PathBuf>) -> Result<PathBuf> {
    let dir = match flag {
        Some(dir) => dir,
        None => trawl_scan::default_projects_dir()?,
    };
    tracing::debug!(dir = %dir.display(), "projects directory");
    Ok(dir)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::List {
            scope,
            limit,
            offset,
            after,
            before,
            cwd,
            json,
        } => {
            let query = trawl_scan::DiscoverQuery {
                scope,
                limit,
                offset,
                dates: trawl_scan::DateRange::parse(after.as_deref(), before.as_deref()),
                cwd,
            };
            commands::list::run(&projects_dir(cli.projects_dir)?, &query, json)
        }
        Commands::Parse {
            path,
            json,
            stats_only,
        } => commands::parse::run(&path, json, stats_only),
        Commands::Search {
            query,
            scope,
            limit,
            after,
            before,
            cwd,
            case_sensitive,
            json,
        } => {
            let query = trawl_scan::SearchQuery {
                text: query,
                case_sensitive,
                scope,
                limit,
                dates: trawl_scan::DateRange::parse(after.as_deref(), before.as_deref()),
                cwd,
            };
            commands::search::run(&projects_dir(cli.projects_dir)?, &query, json)
        }
    }
}
