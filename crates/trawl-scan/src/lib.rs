//! # trawl-scan
//!
//! Discovery, parsing and search over assistant conversation logs.
//!
//! Logs live under a projects directory, one subdirectory per working
//! directory, one `*.jsonl` file per session:
//! - [`scope`] picks the project directories a query covers
//! - [`filter`] picks the primary session logs inside them
//! - [`quick`] summarizes a log in one pass for listings
//! - [`parse`] builds the full transcript with tool results and stats
//! - [`search`] finds literal matches with surrounding context
//! - [`discover`] runs listings and searches across every session in scope
//!
//! ## Example
//!
//! ```rust,no_run
//! use trawl_scan::{default_projects_dir, discover_sessions, DiscoverQuery};
//!
//! let projects = default_projects_dir()?;
//! for session in discover_sessions(&projects, &DiscoverQuery::default()) {
//!     println!("{} {}", session.date_formatted, session.preview);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod discover;
pub mod filter;
pub mod parse;
pub mod quick;
pub mod scope;
pub mod search;
pub mod text;
pub mod time;

#[cfg(test)]
mod testutil;

pub use discover::{discover_sessions, search_sessions, DateRange, DiscoverQuery, SearchQuery};
pub use parse::{load_session, parse_session};
pub use quick::quick_metadata;
pub use scope::{resolve_scope, Scope};
pub use search::{search_session, Matcher};

use anyhow::{Context, Result};
use std::path::PathBuf;

/// The default projects directory, `~/.claude/projects`.
pub fn default_projects_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(".claude").join("projects"))
}
