//! `rostictl status` — report on the deployed application.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::app_lifecycle::{self as service, Target};

/// Run `rostictl status`.
///
/// # Errors
///
/// Returns an error if nothing was deployed from this directory or an API
/// call fails.
pub async fn run(app: &AppContext) -> Result<()> {
    let state = super::local_state().await?;
    let target = Target::from_state(&state, app.company)?;
    let config = app.config()?;
    let api = app.api_client(&config)?;
    let (remote, status) = service::fetch_status(&api, target).await?;
    app.renderer().render_status(&remote, &status, true);
    Ok(())
}
