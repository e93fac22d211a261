//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod remote;
pub mod scaffold;
pub mod selection;
pub mod state;
pub mod supervisor;

pub use config::{HostKeyPolicy, RostiConfig, SshConfig, validate_token};
pub use error::{
    ApiError, ConfigError, DeployError, RemoteError, ScaffoldError, SelectionError, StateError,
};
pub use selection::{
    CompanyResolution, TechDrift, detect_drift, resolve_company, resolve_plan, resolve_runtime,
};
pub use state::LocalDeploymentState;
