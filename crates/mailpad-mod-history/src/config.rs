/// Data directory and document ID helpers for the history system.
use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "MAILPAD_DATA_DIR";

/// Resolves the data directory path.
///
/// Resolution order:
/// 1. `MAILPAD_DATA_DIR` environment variable
/// 2. `.data/` directory next to the executable
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    let exe = std::env::current_exe().unwrap_or_else(|_| PathBuf::from("."));
    exe.parent().unwrap_or(Path::new(".")).join(".data")
}

/// Document ID under which the history of a template's editing session is
/// stored. Sessions not bound to a template share the `default` ID.
pub fn doc_id_for_template(template_id: Option<u32>) -> String {
    match template_id {
        Some(id) => format!("template-{id}"),
        None => String::from("default"),
    }
}
