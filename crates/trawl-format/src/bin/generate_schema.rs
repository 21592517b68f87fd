use schemars::schema_for;
use schemars::JsonSchema;
use std::fs;
use std::path::{Path, PathBuf};

use trawl_format::{ParsedSession, SearchResult, SessionQuickMetadata, SessionStats};

fn write_schema<T: JsonSchema>(
    out_dir: &Path,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let schema = schema_for!(T);
    let json = serde_json::to_string_pretty(&schema)?;
    fs::write(out_dir.join(format!("{name}.json")), json)?;
    Ok(())
}

fn schema_output_dir() -> PathBuf {
    match std::env::args_os().nth(1) {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../schema"),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = schema_output_dir();
    fs::create_dir_all(&out_dir)?;

    write_schema::<SessionQuickMetadata>(&out_dir, "session_quick_metadata")?;
    write_schema::<ParsedSession>(&out_dir, "parsed_session")?;
    write_schema::<SessionStats>(&out_dir, "session_stats")?;
    write_schema::<SearchResult>(&out_dir, "search_result")?;

    Ok(())
}
