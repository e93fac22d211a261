//! Application service — lifecycle of an already deployed application.

use anyhow::{Context, Result};
use rosti_common::{ActionKind, AppStatus, RemoteApplication};

use crate::application::ports::{ProgressReporter, ProvisioningApi};
use crate::domain::LocalDeploymentState;
use crate::domain::error::DeployError;

/// Company and application a lifecycle command acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub company: u64,
    pub app_id: u64,
}

impl Target {
    /// Build the target from local state, letting `company` override the stored id.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::NotDeployed`] when no application was created
    /// from this directory.
    pub fn from_state(state: &LocalDeploymentState, company: Option<u64>) -> Result<Self> {
        if !state.is_deployed() {
            return Err(DeployError::NotDeployed.into());
        }
        Ok(Self {
            company: company.unwrap_or(state.company_id),
            app_id: state.app_id,
        })
    }
}

/// Apply a start/stop/restart/rebuild action.
///
/// # Errors
///
/// Returns an error if the API rejects the action.
pub async fn apply_action(
    api: &impl ProvisioningApi,
    target: Target,
    action: ActionKind,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    reporter.step(&format!("{action} application {}...", target.app_id));
    api.app_action(target.company, target.app_id, action)
        .await
        .with_context(|| format!("{action} application {}", target.app_id))?;
    reporter.success(&format!("{action} requested"));
    Ok(())
}

/// Delete the remote application.
///
/// # Errors
///
/// Returns an error if the API call fails.
pub async fn remove(
    api: &impl ProvisioningApi,
    target: Target,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    reporter.step(&format!("removing application {}...", target.app_id));
    api.delete_app(target.company, target.app_id)
        .await
        .with_context(|| format!("removing application {}", target.app_id))?;
    reporter.success("application removed");
    Ok(())
}

/// Fetch the application resource together with its runtime status.
///
/// # Errors
///
/// Returns an error if either API call fails.
pub async fn fetch_status(
    api: &impl ProvisioningApi,
    target: Target,
) -> Result<(RemoteApplication, AppStatus)> {
    let app = api
        .get_app(target.company, target.app_id)
        .await
        .context("loading application")?;
    let status = api
        .app_status(target.company, target.app_id)
        .await
        .context("loading application status")?;
    Ok((app, status))
}
