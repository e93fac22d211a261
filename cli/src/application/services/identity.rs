//! Application service — company, plan, and runtime resolution.
//!
//! Fetches the lookup lists through the API port and delegates the decision
//! to `crate::domain::selection`.

use anyhow::{Context, Result};
use rosti_common::Rostifile;

use crate::application::ports::{CompanyChooser, ProvisioningApi};
use crate::domain::selection::{self, CompanyResolution};
use crate::domain::LocalDeploymentState;

/// Plan id and runtime image an application is provisioned with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub plan_id: u64,
    pub image: String,
}

/// Determine the company to work in and record it in `state`.
///
/// Precedence: `explicit` flag, the stored value, the only accessible
/// company, then an interactive choice.
///
/// # Errors
///
/// Returns an error if the company list cannot be fetched, the account has no
/// companies, the requested company is not accessible, or the prompt fails.
pub async fn resolve_company(
    api: &impl ProvisioningApi,
    chooser: &impl CompanyChooser,
    explicit: Option<u64>,
    state: &mut LocalDeploymentState,
) -> Result<u64> {
    let companies = api.companies().await.context("listing companies")?;
    let company = match selection::resolve_company(explicit, state.company_id, &companies)? {
        CompanyResolution::Resolved(id) => id,
        CompanyResolution::Choose(list) => chooser.choose_company(&list)?,
    };
    tracing::debug!(company, "company resolved");
    state.company_id = company;
    Ok(company)
}

/// Map the manifest's plan slug and runtime to platform ids.
///
/// # Errors
///
/// Returns an error if the lookup lists cannot be fetched or nothing matches.
pub async fn resolve_placement(
    api: &impl ProvisioningApi,
    company: u64,
    manifest: &Rostifile,
) -> Result<Placement> {
    let plans = api.plans(company).await.context("listing plans")?;
    let plan_id = selection::resolve_plan(manifest.plan_slug(), &plans)?;
    let runtimes = api.runtimes(company).await.context("listing runtimes")?;
    let image = selection::resolve_runtime(&manifest.runtime, &runtimes)?;
    tracing::debug!(plan_id, image = %image, "placement resolved");
    Ok(Placement { plan_id, image })
}
