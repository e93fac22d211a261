//! Local deployment state — links a working directory to one remote application.

use serde::{Deserialize, Serialize};

/// Name of the state file, relative to the project directory.
pub const STATE_FILE: &str = ".rosti.state";

/// Persisted per-project record (`.rosti.state`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LocalDeploymentState {
    /// Remote application id; `0` until the first successful create.
    pub app_id: u64,
    /// Company the application belongs to; `0` until resolved.
    pub company_id: u64,
    /// Private key used for this project. The public half lives at `<path>.pub`.
    pub ssh_key_path: String,
}

impl LocalDeploymentState {
    /// Whether an application has been created from this directory.
    #[must_use]
    pub fn is_deployed(&self) -> bool {
        self.app_id != 0
    }
}
