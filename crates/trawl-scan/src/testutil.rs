//! Fixture helpers for unit tests: a throwaway projects directory and a
//! builder for session log lines.

use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A temporary projects directory removed on drop.
pub struct TempProjects {
    root: PathBuf,
}

impl TempProjects {
    pub fn new() -> Self {
        let root = std::env::temp_dir().join(format!("trawl-test-{}", Uuid::new_v4()));
        fs::create_dir_all(&root).expect("failed to create temp dir");
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create (or reuse) a project storage directory.
    pub fn project(&self, name: &str) -> PathBuf {
        let dir = self.root.join(name);
        fs::create_dir_all(&dir).expect("failed to create project dir");
        dir
    }

    /// Write a session log padded past the minimum session size.
    pub fn session(&self, project: &str, file_name: &str, lines: &[Value]) -> PathBuf {
        let path = self.project(project).join(file_name);
        write_session(&path, lines);
        path
    }
}

impl Drop for TempProjects {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

/// Write records as JSONL followed by an untimed padding record so the file
/// clears the 1 KiB session threshold.
pub fn write_session(path: &Path, lines: &[Value]) {
    let mut out = String::new();
    for line in lines {
        out.push_str(&line.to_string());
        out.push('\n');
    }
    let padding = json!({"type": "file-history-snapshot", "padding": "x".repeat(1100)});
    out.push_str(&padding.to_string());
    out.push('\n');
    fs::write(path, out).expect("failed to write session");
}

pub fn user(ts: &str, text: &str) -> Value {
    json!({
        "type": "user",
        "timestamp": ts,
        "sessionId": "sess-1",
        "cwd": "/Users/a/proj",
        "version": "1.0.42",
        "gitBranch": "main",
        "message": {"role": "user", "content": text},
    })
}

pub fn tool_result(ts: &str, tool_use_id: &str, text: &str) -> Value {
    json!({
        "type": "user",
        "timestamp": ts,
        "message": {
            "role": "user",
            "content": [{"type": "tool_result", "tool_use_id": tool_use_id, "content": text}],
        },
    })
}

pub fn assistant(ts: &str, text: &str) -> Value {
    json!({
        "type": "assistant",
        "timestamp": ts,
        "message": {
            "role": "assistant",
            "content": [{"type": "text", "text": text}],
            "usage": {"input_tokens": 10, "output_tokens": 5},
        },
    })
}

pub fn tool_use(ts: &str, id: &str, name: &str, input: Value) -> Value {
    json!({
        "type": "assistant",
        "timestamp": ts,
        "message": {
            "role": "assistant",
            "content": [{"type": "tool_use", "id": id, "name": name, "input": input}],
        },
    })
}
