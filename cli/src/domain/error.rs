//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Selection errors ──────────────────────────────────────────────────────────

/// Errors raised while resolving company, plan, and runtime.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("No company found for this API token.")]
    NoCompany,

    #[error("Selected company ({0}) not found.")]
    CompanyNotFound(u64),

    #[error("Plan '{0}' not found. Run 'rostictl plans' to list available slugs.")]
    PlanNotFound(String),

    #[error("No runtime available.")]
    NoRuntime,

    #[error("No suitable runtime found for '{0}'. Run 'rostictl runtimes' to pick one.")]
    RuntimeNotFound(String),
}

// ── Deployment errors ─────────────────────────────────────────────────────────

/// Errors raised by the deployment pipeline itself.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("No SSH access found for the application.")]
    NoSshAccess,

    #[error("SSH daemon has not started in time ({attempts} attempts). Last error: {last_error}")]
    NotReady { attempts: u32, last_error: String },

    #[error("No application deployed from this directory. Run 'rostictl up' first.")]
    NotDeployed,
}

// ── Remote errors ─────────────────────────────────────────────────────────────

/// Errors raised by the remote command/file transport.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Command '{command}' failed with exit code {exit_code}:\n{output}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        output: String,
    },

    #[error("Loading SSH key {path} failed: {reason}")]
    KeyLoad { path: String, reason: String },

    #[error("SSH key {0} is passphrase protected but no passphrase was given.")]
    PassphraseRequired(String),

    #[error("Host key for {host}:{port} {problem}")]
    HostKey {
        host: String,
        port: u16,
        problem: String,
    },
}

// ── API errors ────────────────────────────────────────────────────────────────

/// Non-2xx response from the provisioning API.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("{status} HTTP status code returned ({message})")]
    Status { status: u16, message: String },

    #[error("{status} HTTP status code returned")]
    StatusWithoutMessage { status: u16 },
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to client configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Given API token is not valid: expected 40 letters or digits.")]
    InvalidToken,

    #[error(
        "API token hasn't been found. Generate one at https://admin.rosti.cz/settings/profile/regenerate-token/ and store it in {0}"
    )]
    MissingToken(String),

    #[error("Unknown host key policy '{0}'. Valid values: insecure, known_hosts")]
    UnknownHostKeyPolicy(String),
}

// ── State errors ──────────────────────────────────────────────────────────────

/// Errors related to the local `.rosti.state` record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("State file {path} is corrupted: {reason}. Fix or remove it.")]
    Corrupted { path: String, reason: String },

    #[error("No SSH key configured for this project.")]
    NoKey,
}

// ── Scaffold errors ───────────────────────────────────────────────────────────

/// Errors raised while suggesting a starter manifest.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScaffoldError {
    #[error("No WSGI module given.")]
    MissingWsgiModule,

    #[error("package.json has not been found. Create one with a start script.")]
    MissingPackageJson,

    #[error("package.json is not valid JSON: {0}")]
    InvalidPackageJson(String),

    #[error("package.json has no start script. Add one that starts the HTTP server.")]
    MissingStartScript,

    #[error("Binary '{0}' does not exist in the source directory.")]
    BinaryNotFound(String),
}
