//! `rostictl down`, `start`, `restart` — power actions on the deployed application.

use anyhow::Result;
use rosti_common::ActionKind;

use crate::app::AppContext;
use crate::application::services::app_lifecycle::{self as service, Target};

/// Run `rostictl down`.
///
/// # Errors
///
/// Returns an error if nothing was deployed from this directory or the API
/// rejects the action.
pub async fn stop(app: &AppContext) -> Result<()> {
    apply(app, ActionKind::Stop).await
}

/// Run `rostictl start`.
///
/// # Errors
///
/// Returns an error if nothing was deployed from this directory or the API
/// rejects the action.
pub async fn start(app: &AppContext) -> Result<()> {
    apply(app, ActionKind::Start).await
}

/// Run `rostictl restart`.
///
/// # Errors
///
/// Returns an error if nothing was deployed from this directory or the API
/// rejects the action.
pub async fn restart(app: &AppContext) -> Result<()> {
    apply(app, ActionKind::Restart).await
}

async fn apply(app: &AppContext, action: ActionKind) -> Result<()> {
    let state = super::local_state().await?;
    let target = Target::from_state(&state, app.company)?;
    let config = app.config()?;
    let api = app.api_client(&config)?;
    service::apply_action(&api, target, action, &app.reporter()).await
}
