//! Shared utility functions for the CLI boundary.

use anyhow::{anyhow, Result};
use chrono::Utc;
use std::path::PathBuf;

/// Current UTC time as an RFC 3339 string, used for the indexer's
/// completion-timestamp metadata (spec.md §4.4 step 9).
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

/// Parse `path[:line]` into a path and an optional 1-based line number, for
/// CLI arguments like `symbol-at src/auth.py:12`.
pub fn parse_file_line(arg: &str) -> Result<(PathBuf, Option<usize>)> {
    if let Some((path, line)) = arg.rsplit_once(':') {
        if let Ok(line) = line.parse::<usize>() {
            return Ok((PathBuf::from(path), Some(line)));
        }
    }
    Ok((PathBuf::from(arg), None))
}

/// Require a line number, for commands where it isn't optional.
pub fn require_line(path: &str, line: Option<usize>) -> Result<usize> {
    line.ok_or_else(|| anyhow!("{path}: a line number is required (path:line)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_embedded_line_number() {
        let (path, line) = parse_file_line("src/auth.py:12").unwrap();
        assert_eq!(path, PathBuf::from("src/auth.py"));
        assert_eq!(line, Some(12));
    }

    #[test]
    fn falls_back_to_no_line_number() {
        let (path, line) = parse_file_line("src/auth.py").unwrap();
        assert_eq!(path, PathBuf::from("src/auth.py"));
        assert_eq!(line, None);
    }
}
