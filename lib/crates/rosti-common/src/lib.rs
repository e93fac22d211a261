pub mod api;
pub mod manifest;

pub use api::{
    Action, ActionKind, AppStatus, Company, ErrorResponse, MemoryUsage, Plan, RemoteApplication, Runtime,
    SshAccess, StorageUsage, Tech,
};
pub use manifest::{
    DEFAULT_PLAN, ExtraFile, ManifestError, Process, Rostifile, TECHNOLOGIES, is_valid_identifier,
};
