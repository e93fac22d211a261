// lib/crates/rosti-common/src/api.rs

use serde::{Deserialize, Serialize};

/// SSH coordinates of a container, as returned by the API.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SshAccess {
    pub hostname: String,
    pub port: u16,
    pub username: String,
}

/// Application resource owned by the platform.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RemoteApplication {
    /// Zero until the platform assigns one; omitted from create requests.
    #[serde(skip_serializing_if = "is_zero")]
    pub id: u64,
    #[serde(skip_serializing)]
    pub date: String,
    pub name: String,
    /// Changed through actions only, never through create/update.
    #[serde(skip_serializing)]
    pub enabled: bool,
    pub image: String,
    pub domains: Vec<String>,
    pub mode: String,
    pub plan: u64,
    #[serde(skip_serializing)]
    pub ssh_access: Vec<SshAccess>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ssh_keys: Vec<String>,
}

impl RemoteApplication {
    /// Whether the application serves its domains over HTTPS.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.mode.starts_with("https")
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde's skip_serializing_if passes a reference
fn is_zero(value: &u64) -> bool {
    *value == 0
}

/// Body of the `apps-action` endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Action {
    pub action: ActionKind,
}

/// Lifecycle action the platform can apply to an application.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Start,
    Stop,
    Restart,
    Rebuild,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
            Self::Rebuild => "rebuild",
        };
        f.write_str(name)
    }
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: serde_json::Value,
}

/// Service plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Plan {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub ram: u64,
    #[serde(default)]
    pub disk: u64,
    #[serde(default)]
    pub price: u64,
    #[serde(default, rename = "cpu_quota")]
    pub cpu_quota: u64,
}

impl Plan {
    /// Slug used in manifests: the lower-cased plan name.
    #[must_use]
    pub fn slug(&self) -> String {
        self.name.to_lowercase()
    }
}

/// Account-level grouping of applications.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Company {
    pub id: u64,
    pub name: String,
}

/// Runtime image available for new containers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Runtime {
    pub id: u64,
    pub image: String,
    #[serde(default)]
    pub default: bool,
}

/// A technology detected inside the container.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tech {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MemoryUsage {
    #[serde(default)]
    pub usage: f64,
    #[serde(default)]
    pub limit: f64,
}

/// Storage in GB. A negative `usage` means the value is not known yet.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StorageUsage {
    #[serde(default)]
    pub usage: f64,
    #[serde(default)]
    pub limit: f64,
    #[serde(default)]
    pub over_limit: f64,
}

/// Read-only runtime snapshot of an application.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppStatus {
    pub running: bool,
    #[serde(rename = "dns_status")]
    pub dns_ok: bool,
    #[serde(rename = "http_status")]
    pub http_ok: bool,
    pub memory: MemoryUsage,
    pub storage: StorageUsage,
    pub primary_tech: Tech,
    pub techs: Vec<Tech>,
    pub errors: Vec<String>,
    pub info: Vec<String>,
}
