//! Infrastructure implementation of the `DeploymentStateStore` port.
//!
//! `StateManager` provides async load/save using `tokio::task::spawn_blocking`
//! with atomic write (temp file + rename) to prevent state corruption.
//! `StateGuard` ties the loaded state to a command's scope and persists it on
//! every exit path.

use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::DeploymentStateStore;
use crate::domain::error::StateError;
use crate::domain::state::{LocalDeploymentState, STATE_FILE};

/// State file manager — implements `DeploymentStateStore` for the infra layer.
#[derive(Debug, Clone)]
pub struct StateManager {
    path: PathBuf,
}

impl StateManager {
    /// State manager for `.rosti.state` in the current directory.
    #[must_use]
    pub fn new() -> Self {
        Self::with_path(PathBuf::from(STATE_FILE))
    }

    /// Create a state manager with an explicit path (used in tests).
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Synchronous load — used by `load_async` and `StateGuard`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_sync(&self) -> Result<LocalDeploymentState> {
        if !self.path.exists() {
            return Ok(LocalDeploymentState::default());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading state file {}", self.path.display()))?;
        serde_yaml::from_str(&content).map_err(|e| {
            StateError::Corrupted {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Synchronous save — used by `save_async` and `StateGuard`'s `Drop`.
    ///
    /// # Errors
    ///
    /// Returns an error if the temp file cannot be written or renamed.
    pub fn save_sync(&self, state: &LocalDeploymentState) -> Result<()> {
        let content = serde_yaml::to_string(state).context("serializing state")?;

        let temp_path = self.path.with_extension("state.tmp");
        std::fs::write(&temp_path, &content)
            .with_context(|| format!("writing temp file {}", temp_path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("setting permissions on {}", temp_path.display()))?;
        }

        std::fs::rename(&temp_path, &self.path)
            .with_context(|| format!("finalizing state file {}", self.path.display()))?;
        Ok(())
    }

    /// Remove the state file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn clear_sync(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("removing state file {}", self.path.display()))?;
        }
        Ok(())
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DeploymentStateStore for StateManager {
    async fn load_async(&self) -> Result<LocalDeploymentState> {
        let mgr = self.clone();
        tokio::task::spawn_blocking(move || mgr.load_sync())
            .await
            .context("state load task panicked")?
    }

    async fn save_async(&self, state: &LocalDeploymentState) -> Result<()> {
        let mgr = self.clone();
        let state = state.clone();
        tokio::task::spawn_blocking(move || mgr.save_sync(&state))
            .await
            .context("state save task panicked")?
    }

    async fn clear_async(&self) -> Result<()> {
        let mgr = self.clone();
        tokio::task::spawn_blocking(move || mgr.clear_sync())
            .await
            .context("state clear task panicked")?
    }
}

// ── Scoped persistence ────────────────────────────────────────────────────────

/// Loaded state that is written back when the guard goes out of scope.
///
/// Persisting happens on success and on error alike, so a freshly assigned
/// application id survives a later failing step. An unchanged state is not
/// rewritten. Write failures in `Drop` are logged, never raised.
pub struct StateGuard {
    store: StateManager,
    state: LocalDeploymentState,
    loaded: LocalDeploymentState,
    persist: bool,
}

impl StateGuard {
    /// Load the state behind `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the state file exists but is unreadable.
    pub async fn acquire(store: StateManager) -> Result<Self> {
        let state = store.load_async().await?;
        Ok(Self {
            store,
            loaded: state.clone(),
            state,
            persist: true,
        })
    }

    /// Delete the state file and skip the write-back.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be removed.
    pub async fn discard(mut self) -> Result<()> {
        self.persist = false;
        self.store.clear_async().await
    }
}

impl Deref for StateGuard {
    type Target = LocalDeploymentState;

    fn deref(&self) -> &Self::Target {
        &self.state
    }
}

impl DerefMut for StateGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.state
    }
}

impl Drop for StateGuard {
    fn drop(&mut self) {
        if !self.persist || self.state == self.loaded {
            return;
        }
        if let Err(e) = self.store.save_sync(&self.state) {
            tracing::warn!(path = %self.store.path().display(), error = %format!("{e:#}"), "cannot save local state");
        }
    }
}
