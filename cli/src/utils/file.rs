//! Path and input helpers

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::constants::STDIN_PATH;

/// Expand `~` and make relative paths absolute against the working directory.
///
/// ```ignore
/// expand_path("~/.tabula")    // -> /home/user/.tabula
/// expand_path("schema.json")  // -> /current/dir/schema.json
/// expand_path("/etc/tabula")  // -> /etc/tabula
/// ```
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();

    let expanded = if path == "~" {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from(path))
    } else if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path))
    } else {
        PathBuf::from(path)
    };

    if expanded.is_relative() {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    } else {
        expanded
    }
}

/// Read a whole input file, or standard input when the path is `-`
pub fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == STDIN_PATH {
        tracing::debug!("Reading from stdin");
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        return Ok(buf);
    }

    let path = expand_path(&path.to_string_lossy());
    tracing::debug!(path = %path.display(), "Reading input file");
    fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
}
