//! Domain types and validators for the client configuration.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

pub const DEFAULT_API_URL: &str = "https://admin.rosti.cz/api/v1/";

/// API tokens are exactly 40 ASCII letters or digits.
pub const TOKEN_PATTERN: &str = "^[a-zA-Z0-9]{40}$";

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.config/rosti/config.yml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RostiConfig {
    /// API token; empty until the user provides one.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub token: String,
    /// Base URL of the provisioning API, with a trailing slash.
    pub api_url: String,
    pub ssh: SshConfig,
}

impl Default for RostiConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_url: DEFAULT_API_URL.to_string(),
            ssh: SshConfig::default(),
        }
    }
}

/// SSH transport settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SshConfig {
    pub host_key_policy: HostKeyPolicy,
    /// OpenSSH known_hosts file; `~/.ssh/known_hosts` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub known_hosts: Option<String>,
}

/// How the server's host key is checked on connect.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub enum HostKeyPolicy {
    /// Accept any host key. Containers are recreated often and their keys change.
    #[default]
    Insecure,
    /// Require a matching entry in the known_hosts file.
    KnownHosts,
}

impl TryFrom<String> for HostKeyPolicy {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "insecure" => Ok(Self::Insecure),
            "known_hosts" => Ok(Self::KnownHosts),
            _ => Err(ConfigError::UnknownHostKeyPolicy(value)),
        }
    }
}

impl From<HostKeyPolicy> for String {
    fn from(policy: HostKeyPolicy) -> Self {
        match policy {
            HostKeyPolicy::Insecure => "insecure",
            HostKeyPolicy::KnownHosts => "known_hosts",
        }
        .to_string()
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates the shape of an API token.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidToken`] unless the token is 40 letters or digits.
pub fn validate_token(token: &str) -> Result<(), ConfigError> {
    let valid = regex::Regex::new(TOKEN_PATTERN).is_ok_and(|re| re.is_match(token));
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidToken)
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
