//! `rostictl up` — create or update the application and deploy the code.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use console::Term;

use crate::app::AppContext;
use crate::application::ports::KeyMaterial;
use crate::application::services::deploy::{self as service, DeployOptions, ProvisionOutcome};
use crate::application::services::readiness::ReadinessPolicy;
use crate::domain::LocalDeploymentState;
use crate::domain::error::RemoteError;
use crate::infra::archive::TarPackager;
use crate::infra::keys;
use crate::infra::prompt::DialoguerPrompt;
use crate::infra::ssh::{self, SshSessionFactory};

/// Environment variable supplying the SSH key passphrase non-interactively.
pub const PASSPHRASE_ENV: &str = "ROSTI_SSH_PASSPHRASE";

/// Arguments for the up command.
#[derive(Args, Default)]
pub struct UpArgs {
    /// Run initial commands even if the application already exists
    #[arg(long)]
    pub force_init: bool,
}

/// Run `rostictl up`.
///
/// # Errors
///
/// Returns an error if the manifest is invalid, no usable SSH key is found,
/// or any deployment step fails. Local state is saved either way.
pub async fn run(args: &UpArgs, app: &AppContext) -> Result<()> {
    let manifest = super::manifest()?;
    let config = app.config()?;
    let api = app.api_client(&config)?;
    let shells = SshSessionFactory::from_config(&config.ssh)?;
    let mut state = super::local_state().await?;

    let key = key_material(&mut state, &DialoguerPrompt)?;
    let reporter = app.reporter();

    let report = service::deploy(
        &api,
        &shells,
        &TarPackager,
        &DialoguerPrompt,
        &mut state,
        DeployOptions {
            reporter: &reporter,
            manifest: &manifest,
            key: &key,
            company: app.company,
            force_init: args.force_init,
            readiness: ReadinessPolicy::default(),
        },
    )
    .await?;
    drop(reporter);

    match report.outcome {
        ProvisionOutcome::Created { app_id } => app
            .output
            .success(&format!("Application {}_{app_id} created and deployed.", manifest.name)),
        ProvisionOutcome::Updated { app_id } => app
            .output
            .success(&format!("Application {}_{app_id} updated and deployed.", manifest.name)),
    }

    let renderer = app.renderer();
    renderer.render_status(&report.app, &report.status, false);
    renderer.render_stale_note();
    Ok(())
}

/// Pick the key pair for this project and unlock it if needed.
///
/// A key chosen once is remembered in `state`.
fn key_material(state: &mut LocalDeploymentState, prompt: &DialoguerPrompt) -> Result<KeyMaterial> {
    let private_key_path = if state.ssh_key_path.is_empty() {
        let path = choose_key(prompt)?;
        keys::ensure_key_pair(&path)?;
        state.ssh_key_path = path.display().to_string();
        path
    } else {
        let path = PathBuf::from(&state.ssh_key_path);
        keys::ensure_key_pair(&path)?;
        path
    };
    tracing::debug!(key = %private_key_path.display(), "using SSH key");

    let public_key = keys::read_public_key(&private_key_path)?;
    let passphrase = passphrase(&private_key_path, prompt)?;
    Ok(KeyMaterial {
        private_key_path,
        public_key,
        passphrase,
    })
}

/// Discovered `~/.ssh/id_*` keys go through the picker, even a single one.
fn choose_key(prompt: &DialoguerPrompt) -> Result<PathBuf> {
    let found = keys::discover_keys(&keys::default_ssh_dir()?)?;
    if found.is_empty() {
        return keys::expand_tilde(&prompt.ask_key_path()?);
    }
    prompt.choose_key(&found)
}

fn passphrase(key: &Path, prompt: &DialoguerPrompt) -> Result<Option<String>> {
    if !ssh::is_passphrase_protected(key)? {
        return Ok(None);
    }
    let passphrase = match std::env::var(PASSPHRASE_ENV) {
        Ok(value) => value,
        Err(_) if Term::stderr().is_term() => prompt.ask_passphrase(key)?,
        Err(_) => {
            return Err(RemoteError::PassphraseRequired(key.display().to_string()).into());
        }
    };
    let valid = ssh::verify_passphrase(key, &passphrase)
        .with_context(|| format!("checking passphrase of {}", key.display()))?;
    if !valid {
        anyhow::bail!("Wrong passphrase for SSH key {}", key.display());
    }
    Ok(Some(passphrase))
}
