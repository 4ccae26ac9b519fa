//! Reading raw allowlist entries.
//!
//! Entries are returned as strings in file order; canonicalization happens
//! when the tree is built.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{AllowlistError, Result};

/// Splits allowlist text into entries.
///
/// A document starting with `[` is read as a JSON array of strings. Anything
/// else is one address per line, with blank lines and `#` comments skipped.
pub fn parse_addresses(contents: &str) -> Result<Vec<String>> {
    if contents.trim_start().starts_with('[') {
        return Ok(serde_json::from_str(contents)?);
    }

    Ok(contents
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

pub fn load_addresses(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path).map_err(|source| AllowlistError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let addresses = parse_addresses(&contents)?;
    debug!(path = %path.display(), entries = addresses.len(), "loaded allowlist");
    Ok(addresses)
}
