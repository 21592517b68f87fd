//! Selecting primary session logs among the files in a project directory.

use std::fs;
use std::path::{Path, PathBuf};
use trawl_format::FILE_EXTENSION;

/// Files smaller than this are stubs, not sessions.
pub const MIN_SESSION_BYTES: u64 = 1024;

/// Prefix of subagent session files.
pub const AGENT_PREFIX: &str = "agent-";

/// Marker (case-insensitive) in the names of warm-up sessions.
pub const WARMUP_MARKER: &str = "warmup";

/// Whether a file is a primary session log.
///
/// Excludes subagent logs (`agent-*.jsonl`), warm-up logs, and files under
/// [`MIN_SESSION_BYTES`]. A file that cannot be stat'ed is excluded.
pub fn is_valid_session_file(path: &Path) -> bool {
    let name = match path.file_name() {
        Some(name) => name.to_string_lossy(),
        None => return false,
    };

    if !name.ends_with(&format!(".{FILE_EXTENSION}")) {
        return false;
    }
    if name.starts_with(AGENT_PREFIX) {
        return false;
    }
    if name.to_lowercase().contains(WARMUP_MARKER) {
        return false;
    }

    match fs::metadata(path) {
        Ok(meta) => meta.len() >= MIN_SESSION_BYTES,
        Err(_) => false,
    }
}

/// Hidden files are never session logs.
fn match_options() -> glob::MatchOptions {
    glob::MatchOptions {
        require_literal_leading_dot: true,
        ..Default::default()
    }
}

/// Primary session logs directly inside each directory (non-recursive).
pub fn session_files(dirs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for dir in dirs {
        let pattern = format!(
            "{}/*.{}",
            glob::Pattern::escape(&dir.to_string_lossy()),
            FILE_EXTENSION
        );
        let paths = match glob::glob_with(&pattern, match_options()) {
            Ok(paths) => paths,
            Err(e) => {
                tracing::debug!(dir = %dir.display(), error = %e, "bad glob pattern");
                continue;
            }
        };

        for path in paths.filter_map(|p| p.ok()) {
            if is_valid_session_file(&path) {
                files.push(path);
            } else {
                tracing::debug!(path = %path.display(), "not a primary session log");
            }
        }
    }

    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::TempProjects;

    #[test]
    fn test_session_file_rules() {
        let projects = TempProjects::new();
        let dir = projects.project("-p");
        let big = "x".repeat(2048);

        let write = |name: &str, body: &str| {
            let path = dir.join(name);
            fs::write(&path, body).unwrap();
            path
        };

        assert!(is_valid_session_file(&write("abc.jsonl", &big)));
        assert!(!is_valid_session_file(&write("agent-1.jsonl", &big)));
        assert!(!is_valid_session_file(&write("my-WarmUp-1.jsonl", &big)));
        assert!(!is_valid_session_file(&write("notes.json", &big)));
        assert!(!is_valid_session_file(&write("tiny.jsonl", "{}")));
        assert!(!is_valid_session_file(&dir.join("missing.jsonl")));
    }

    #[test]
    fn test_size_threshold_is_inclusive() {
        let projects = TempProjects::new();
        let dir = projects.project("-p");
        let path = dir.join("edge.jsonl");

        fs::write(&path, "x".repeat(1023)).unwrap();
        assert!(!is_valid_session_file(&path));

        fs::write(&path, "x".repeat(1024)).unwrap();
        assert!(is_valid_session_file(&path));
    }

    #[test]
    fn test_session_files_is_not_recursive() {
        let projects = TempProjects::new();
        let dir = projects.project("-p[1]");
        let nested = dir.join("sub");
        fs::create_dir_all(&nested).unwrap();
        let big = "x".repeat(2048);
        fs::write(dir.join("top.jsonl"), &big).unwrap();
        fs::write(nested.join("deep.jsonl"), &big).unwrap();
        fs::write(dir.join("agent-x.jsonl"), &big).unwrap();

        let files = session_files(&[dir.clone()]);
        assert_eq!(files, vec![dir.join("top.jsonl")]);
    }

    #[test]
    fn test_session_files_skips_hidden_files() {
        let projects = TempProjects::new();
        let dir = projects.project("-p");
        let big = "x".repeat(2048);
        fs::write(dir.join(".draft.jsonl"), &big).unwrap();
        fs::write(dir.join("real.jsonl"), &big).unwrap();

        let files = session_files(&[dir.clone()]);
        assert_eq!(files, vec![dir.join("real.jsonl")]);
    }
}
