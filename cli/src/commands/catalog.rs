//! `rostictl plans`, `companies`, `runtimes` — list what the account offers.

use anyhow::{Context, Result};

use crate::app::AppContext;
use crate::application::ports::{DeploymentStateStore, ProvisioningApi};
use crate::application::services::identity;
use crate::infra::prompt::DialoguerPrompt;
use crate::infra::state::StateManager;

/// Run `rostictl companies`.
///
/// # Errors
///
/// Returns an error if the API call fails.
pub async fn companies(app: &AppContext) -> Result<()> {
    let config = app.config()?;
    let api = app.api_client(&config)?;
    let companies = api.companies().await.context("loading companies")?;
    app.renderer().render_companies(&companies);
    Ok(())
}

/// Run `rostictl plans`.
///
/// # Errors
///
/// Returns an error if the company cannot be resolved or the API call fails.
pub async fn plans(app: &AppContext) -> Result<()> {
    let config = app.config()?;
    let api = app.api_client(&config)?;
    let company = company(app, &api).await?;
    let plans = api.plans(company).await.context("loading plans")?;
    app.renderer().render_plans(&plans);
    app.output.info("Use the slug as `plan` in your Rostifile.");
    Ok(())
}

/// Run `rostictl runtimes`.
///
/// # Errors
///
/// Returns an error if the company cannot be resolved or the API call fails.
pub async fn runtimes(app: &AppContext) -> Result<()> {
    let config = app.config()?;
    let api = app.api_client(&config)?;
    let company = company(app, &api).await?;
    let runtimes = api.runtimes(company).await.context("loading runtimes")?;
    app.renderer().render_runtimes(&runtimes);
    Ok(())
}

/// Company for listings: `--company`, the one stored for this directory,
/// the only accessible one, or the user's pick. Local state is read, never written.
async fn company(app: &AppContext, api: &impl ProvisioningApi) -> Result<u64> {
    let mut state = StateManager::new().load_async().await?;
    identity::resolve_company(api, &DialoguerPrompt, app.company, &mut state).await
}
