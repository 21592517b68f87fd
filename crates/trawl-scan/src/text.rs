//! Small text helpers shared by the scanners and the CLI.

use std::path::Path;

/// Truncate to `max_chars` characters, ending in `...` when cut.
///
/// Counts characters, not bytes, so multi-byte text never splits mid-char.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

/// Last path segment of a working directory, `unknown` when there is none.
pub fn project_short(cwd: &str) -> String {
    if cwd.is_empty() {
        return "unknown".to_string();
    }
    Path::new(cwd)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
