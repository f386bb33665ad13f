//! JSONL ledger file.
//!
//! One [`LedgerEntry`] per line. Recording a bill appends its entries; the
//! balance command reads the whole file.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use splitty_core::LedgerEntry;

/// Reads every entry from the ledger. A missing file is an empty ledger.
pub fn load(path: &Path) -> Result<Vec<LedgerEntry>> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = ?path, "ledger file not found, starting empty");
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read {}", path.display()));
        }
    };

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).with_context(|| {
                format!("invalid ledger entry at {}:{}", path.display(), index + 1)
            })
        })
        .collect()
}

/// Appends `entries` to the ledger, creating the file and its directory.
pub fn append(path: &Path, entries: &[LedgerEntry]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ledger directory")?;
    }

    let mut lines = String::new();
    for entry in entries {
        lines.push_str(&serde_json::to_string(entry).context("failed to serialize entry")?);
        lines.push('\n');
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    file.write_all(lines.as_bytes())
        .context("failed to write ledger entries")?;

    tracing::debug!(path = ?path, count = entries.len(), "appended ledger entries");
    Ok(())
}
