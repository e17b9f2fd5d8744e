//! Loading and validating trace data report files.
//!
//! A report is a flat sequence of items exported from the requirements
//! service. The shape contract of [`Item`](crate::models::Item) is enforced
//! while decoding, so a malformed report is rejected before any filtering
//! happens.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::models::Item;

/// Loads trace items from a report file.
///
/// The codec is inferred from the file extension: `.json` is read as JSON,
/// anything else as YAML.
pub fn load_items<P: AsRef<Path>>(path: P) -> Result<Vec<Item>> {
    let path = path.as_ref();
    log::info!("Parsing trace report {:?}...", path);

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read report file: {:?}", path))?;

    let items = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON report: {:?}", path))?,
        _ => serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML report: {:?}", path))?,
    };

    Ok(items)
}

/// Loads and concatenates trace items from several report files, in the
/// order given.
pub fn load_all_items<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Item>> {
    let mut items = Vec::new();
    for path in paths {
        items.extend(load_items(path)?);
    }

    log::info!("Loaded {} items from {} reports", items.len(), paths.len());
    Ok(items)
}
