//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` and the shared DTO crate —
//! never from `crate::infra`, `crate::commands`, or `crate::output`.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Result;
use rosti_common::{ActionKind, AppStatus, Company, Plan, RemoteApplication, Runtime};

use crate::domain::{LocalDeploymentState, RostiConfig};

// ── Value Types ───────────────────────────────────────────────────────────────

/// Coordinates and credentials for one remote host.
///
/// Owns no connection; every transport operation opens and closes its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDescriptor {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub key_path: PathBuf,
    pub passphrase: Option<String>,
}

/// Local key pair used to authorize and authenticate against the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    pub private_key_path: PathBuf,
    /// Contents of `<private_key_path>.pub`, trimmed.
    pub public_key: String,
    pub passphrase: Option<String>,
}

// ── Provisioning API Port ─────────────────────────────────────────────────────

/// REST calls against the hosting platform.
#[allow(async_fn_in_trait)]
pub trait ProvisioningApi {
    /// Companies the token has access to.
    async fn companies(&self) -> Result<Vec<Company>>;
    async fn plans(&self, company: u64) -> Result<Vec<Plan>>;
    async fn runtimes(&self, company: u64) -> Result<Vec<Runtime>>;
    async fn get_app(&self, company: u64, id: u64) -> Result<RemoteApplication>;
    /// Create an application; the returned resource carries the new id.
    async fn create_app(&self, company: u64, app: &RemoteApplication) -> Result<RemoteApplication>;
    async fn update_app(&self, company: u64, app: &RemoteApplication) -> Result<RemoteApplication>;
    async fn delete_app(&self, company: u64, id: u64) -> Result<()>;
    async fn app_action(&self, company: u64, id: u64, action: ActionKind) -> Result<()>;
    async fn app_status(&self, company: u64, id: u64) -> Result<AppStatus>;
}

// ── Remote Transport Ports ────────────────────────────────────────────────────

/// Command execution and file transfer against one remote host.
#[allow(async_fn_in_trait)]
pub trait RemoteShell {
    /// Run `command` and return its combined stdout and stderr.
    ///
    /// A nonzero exit is an error that carries the captured output.
    async fn run(&self, command: &str) -> Result<String>;
    /// Pipe `reader` into `remote_path` on the host.
    async fn stream_file(&self, remote_path: &str, reader: Box<dyn Read + Send>) -> Result<()>;
    /// Create or truncate `remote_path` and write `content` to it.
    async fn send_file(&self, remote_path: &str, content: &[u8]) -> Result<()>;
}

/// Builds a [`RemoteShell`] once connection coordinates are known.
pub trait RemoteShellFactory {
    type Shell: RemoteShell;

    fn open(&self, descriptor: SessionDescriptor) -> Self::Shell;
}

// ── Packaging Port ────────────────────────────────────────────────────────────

/// Packs a source directory into a single archive stream.
#[allow(async_fn_in_trait)]
pub trait SourcePackager {
    /// Archive `source`, skipping entries whose name is in `exclude`.
    async fn package(&self, source: &Path, exclude: &[String]) -> Result<Box<dyn Read + Send>>;
}

// ── Interactive Selection Port ────────────────────────────────────────────────

/// Asks the user to pick among several companies.
pub trait CompanyChooser {
    /// Return the id of the chosen company.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt cannot be shown or is aborted.
    fn choose_company(&self, companies: &[Company]) -> Result<u64>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── State and Config Ports ────────────────────────────────────────────────────

/// Abstracts persistence of the per-project deployment record.
#[allow(async_fn_in_trait)]
pub trait DeploymentStateStore {
    /// Load the state; a missing file yields the empty state.
    async fn load_async(&self) -> Result<LocalDeploymentState>;
    /// Persist the given state.
    async fn save_async(&self, state: &LocalDeploymentState) -> Result<()>;
    /// Delete the state file if it exists.
    async fn clear_async(&self) -> Result<()>;
}

/// Abstracts the client configuration file.
pub trait ConfigStore {
    /// Load the configuration; a missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    fn load(&self) -> Result<RostiConfig>;
    /// Persist the configuration with owner-only permissions.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn save(&self, config: &RostiConfig) -> Result<()>;
    /// Location of the configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    fn path(&self) -> Result<PathBuf>;
}
