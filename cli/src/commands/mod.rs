//! Command implementations

pub mod catalog;
pub mod init;
pub mod lifecycle;
pub mod rm;
pub mod status;
pub mod up;
pub mod version;

use std::path::Path;

use anyhow::Result;
use rosti_common::Rostifile;

use crate::infra::manifest::{MANIFEST_FILE, load_manifest};
use crate::infra::state::{StateGuard, StateManager};

/// Load and validate `./Rostifile`.
fn manifest() -> Result<Rostifile> {
    load_manifest(Path::new(MANIFEST_FILE))
}

/// Load `./.rosti.state`; it is written back when the guard drops.
async fn local_state() -> Result<StateGuard> {
    StateGuard::acquire(StateManager::new()).await
}
