//! # trawl-format
//!
//! Record model and derived views for assistant conversation logs.
//!
//! A session log is a JSONL file, one record per line. This crate provides:
//! - Typed records ([`LogRecord`], [`ContentBlock`], ...)
//! - A lazy, error-tolerant [`RecordReader`]
//! - The derived views built by `trawl-scan` ([`SessionQuickMetadata`],
//!   [`ParsedSession`], [`SearchResult`], ...)
//!
//! ## Example
//!
//! ```rust,no_run
//! use trawl_format::RecordReader;
//!
//! for record in RecordReader::open("session.jsonl")? {
//!     if let Some(content) = record.content() {
//!         println!("{}: {}", record.role().unwrap_or("?"), content.joined_text());
//!     }
//! }
//! # Ok::<(), trawl_format::TrawlError>(())
//! ```

mod error;
mod file;
mod record;
mod session;

pub use error::*;
pub use file::*;
pub use record::*;
pub use session::*;

/// File extension for session logs
pub const FILE_EXTENSION: &str = "jsonl";
