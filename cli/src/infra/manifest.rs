//! Reading and writing the `Rostifile` manifest.

use std::path::Path;

use anyhow::{Context, Result};
use rosti_common::Rostifile;

/// Manifest location, relative to the working directory.
pub const MANIFEST_FILE: &str = "Rostifile";

/// Parse and validate the manifest at `path`.
///
/// # Errors
///
/// Returns an error if the file is missing, is not valid YAML, or breaks a
/// manifest rule.
pub fn load_manifest(path: &Path) -> Result<Rostifile> {
    let content = std::fs::read_to_string(path).with_context(|| {
        format!(
            "cannot read {}. Run 'rostictl init' to create one",
            path.display()
        )
    })?;
    let manifest: Rostifile = serde_yaml::from_str(&content)
        .with_context(|| format!("cannot parse {}", path.display()))?;
    manifest
        .validate()
        .with_context(|| format!("invalid {}", path.display()))?;
    tracing::debug!(path = %path.display(), name = %manifest.name, "manifest loaded");
    Ok(manifest)
}

/// Write `manifest` to `path` as YAML.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn save_manifest(path: &Path, manifest: &Rostifile) -> Result<()> {
    let content = serde_yaml::to_string(manifest).context("cannot serialize manifest")?;
    std::fs::write(path, content).with_context(|| format!("cannot write {}", path.display()))
}
