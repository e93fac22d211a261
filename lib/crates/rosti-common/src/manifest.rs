// lib/crates/rosti-common/src/manifest.rs

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Technologies the remote `rosti` bootstrap script knows how to set up.
pub const TECHNOLOGIES: &[&str] = &["python", "php", "node", "ruby", "deno", "go", "bun", "static"];

/// Plan slug used when the manifest does not name one.
pub const DEFAULT_PLAN: &str = "start+";

/// Manifest validation failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ManifestError {
    #[error("Invalid application name '{0}': only letters, digits, '-' and '_' are allowed")]
    InvalidName(String),

    #[error("Invalid process name '{0}': only letters, digits, '-' and '_' are allowed")]
    InvalidProcessName(String),

    #[error("Unknown technology '{name}'. Supported: {supported}")]
    UnknownTechnology { name: String, supported: String },

    #[error("Process '{0}' has an empty command")]
    EmptyProcessCommand(String),

    #[error("Extra file entry has an empty path")]
    EmptyFilePath,
}

/// Declarative description of one application (`Rostifile`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Rostifile {
    pub name: String,
    /// Runtime image, e.g. `rosti/runtime:2024.01-1`. Empty means the platform default.
    pub runtime: String,
    /// Primary technology, e.g. `python`. Empty leaves the stack alone.
    #[serde(alias = "type")]
    pub technology: String,
    /// Version of the primary technology. Empty accepts whatever is active.
    pub technology_version: String,
    pub domains: Vec<String>,
    pub https: bool,
    pub plan: String,
    /// Directory uploaded into `/srv/app`.
    #[serde(alias = "source")]
    pub source_path: String,
    /// Entry names skipped anywhere in the source tree.
    pub exclude: Vec<String>,
    pub before_commands: Vec<String>,
    pub after_commands: Vec<String>,
    /// Commands run once, right after the application is created.
    pub initial_commands: Vec<String>,
    pub crontabs: Vec<String>,
    pub processes: Vec<Process>,
    pub files: Vec<ExtraFile>,
}

/// A background process managed by supervisor.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Process {
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub stop_kill_as_group: bool,
}

/// A file written verbatim into the container after the code is unpacked.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtraFile {
    pub path: String,
    pub content: String,
}

impl Rostifile {
    /// Source directory with the `.` default applied.
    #[must_use]
    pub fn source(&self) -> &str {
        if self.source_path.is_empty() {
            "."
        } else {
            &self.source_path
        }
    }

    /// Plan slug with the default applied.
    #[must_use]
    pub fn plan_slug(&self) -> &str {
        if self.plan.is_empty() {
            DEFAULT_PLAN
        } else {
            &self.plan
        }
    }

    /// Traffic mode understood by the API.
    #[must_use]
    pub fn mode(&self) -> &'static str {
        if self.https { "https+le" } else { "http" }
    }

    /// Check the invariants the rest of the client relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), ManifestError> {
        if !is_valid_identifier(&self.name) {
            return Err(ManifestError::InvalidName(self.name.clone()));
        }
        if !self.technology.is_empty() && !TECHNOLOGIES.contains(&self.technology.as_str()) {
            return Err(ManifestError::UnknownTechnology {
                name: self.technology.clone(),
                supported: TECHNOLOGIES.join(", "),
            });
        }
        for process in &self.processes {
            if !is_valid_identifier(&process.name) {
                return Err(ManifestError::InvalidProcessName(process.name.clone()));
            }
            if process.command.trim().is_empty() {
                return Err(ManifestError::EmptyProcessCommand(process.name.clone()));
            }
        }
        if self.files.iter().any(|f| f.path.trim().is_empty()) {
            return Err(ManifestError::EmptyFilePath);
        }
        Ok(())
    }
}

/// Names and process names: non-empty, ASCII letters, digits, `-` and `_`.
#[must_use]
pub fn is_valid_identifier(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
