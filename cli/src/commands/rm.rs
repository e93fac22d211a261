//! `rostictl rm` — delete the application and forget it locally.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::app_lifecycle::{self as service, Target};

/// Run `rostictl rm`.
///
/// The local state file is removed only after the API confirmed the delete.
///
/// # Errors
///
/// Returns an error if nothing was deployed from this directory, the API
/// call fails, or the state file cannot be removed.
pub async fn run(app: &AppContext) -> Result<()> {
    let state = super::local_state().await?;
    let target = Target::from_state(&state, app.company)?;
    let config = app.config()?;
    let api = app.api_client(&config)?;
    service::remove(&api, target, &app.reporter()).await?;
    state.discard().await?;
    app.output.success("Local state removed.");
    Ok(())
}
