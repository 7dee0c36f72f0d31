//! Target file loading

use anyhow::{Context, Result};
use attack_engine::{Target, TargetSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read one URL per line from `path`
pub fn load_targets(path: &Path) -> Result<TargetSet> {
    let file = File::open(path)
        .with_context(|| format!("failed to open targets file {}", path.display()))?;

    let mut lines = Vec::new();
    for line in BufReader::new(file).lines() {
        lines.push(line.with_context(|| format!("failed to read {}", path.display()))?);
    }

    parse_targets(lines.iter().map(String::as_str))
        .with_context(|| format!("no usable targets in {}", path.display()))
}

/// Trim each line, skip blanks and lines that do not parse as a URL, and
/// collapse duplicates by canonical form.
pub fn parse_targets<'a, I>(lines: I) -> Result<TargetSet>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut targets = Vec::new();
    for (number, line) in lines.into_iter().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match Target::parse(line) {
            Ok(target) => targets.push(target),
            Err(e) => tracing::debug!(line = number + 1, error = %e, "Skipping invalid target"),
        }
    }

    Ok(TargetSet::from_targets(targets)?)
}
