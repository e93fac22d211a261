//! Application service — converge a remote container to the manifest.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.
//!
//! The pipeline is fail-fast: the first error aborts the remaining steps and
//! is returned as is. Progress already recorded in the caller's
//! [`LocalDeploymentState`] (company id, a freshly assigned app id) stays
//! there so the caller can persist it on the error path too.

use std::path::PathBuf;

use anyhow::{Context, Result};
use rosti_common::{ActionKind, AppStatus, RemoteApplication, Rostifile};

use crate::application::ports::{
    CompanyChooser, KeyMaterial, ProgressReporter, ProvisioningApi, RemoteShell,
    RemoteShellFactory, SessionDescriptor, SourcePackager,
};
use crate::application::services::identity::{self, Placement};
use crate::application::services::readiness::{ReadinessPolicy, wait_until_ready};
use crate::domain::error::DeployError;
use crate::domain::remote::{
    ARCHIVE_STAGING_PATH, CRONTAB_PATH, SUPERVISOR_CONFIG_PATH, SUPERVISOR_REREAD,
    SUPERVISOR_UPDATE, bootstrap_cleanup_command, crontab_install_command, resolve_remote_path,
    tech_setup_command, unpack_command, wrap_in_shell,
};
use crate::domain::selection::detect_drift;
use crate::domain::supervisor::{render_crontab, render_supervisor_config};
use crate::domain::LocalDeploymentState;

/// Inputs of one `up` run besides the ports.
pub struct DeployOptions<'a, R: ProgressReporter> {
    pub reporter: &'a R,
    pub manifest: &'a Rostifile,
    pub key: &'a KeyMaterial,
    /// Company id given on the command line.
    pub company: Option<u64>,
    /// Run initial commands even though the application already existed.
    pub force_init: bool,
    pub readiness: ReadinessPolicy,
}

/// Whether this run created the application or updated an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    Created { app_id: u64 },
    Updated { app_id: u64 },
}

impl ProvisionOutcome {
    #[must_use]
    pub fn app_id(self) -> u64 {
        match self {
            Self::Created { app_id } | Self::Updated { app_id } => app_id,
        }
    }

    #[must_use]
    pub fn is_created(self) -> bool {
        matches!(self, Self::Created { .. })
    }
}

/// Final view of the application after a successful run.
///
/// The status may be stale: the container can still be booting and DNS may
/// not have propagated yet.
#[derive(Debug, Clone)]
pub struct DeployReport {
    pub outcome: ProvisionOutcome,
    pub app: RemoteApplication,
    pub status: AppStatus,
}

/// Run the convergence pipeline for one application.
///
/// # Errors
///
/// Returns the first failing step's error: selection, API, transport, or a
/// remote command exiting nonzero (with its captured output).
pub async fn deploy<R: ProgressReporter>(
    api: &impl ProvisioningApi,
    shells: &impl RemoteShellFactory,
    packager: &impl SourcePackager,
    chooser: &impl CompanyChooser,
    state: &mut LocalDeploymentState,
    opts: DeployOptions<'_, R>,
) -> Result<DeployReport> {
    let DeployOptions {
        reporter,
        manifest,
        key,
        company,
        force_init,
        readiness,
    } = opts;

    let company = identity::resolve_company(api, chooser, company, state).await?;
    let placement = identity::resolve_placement(api, company, manifest).await?;

    let (outcome, app) = provision(api, company, manifest, &placement, key, state, reporter).await?;
    let access = app.ssh_access.first().ok_or(DeployError::NoSshAccess)?;
    let shell = shells.open(SessionDescriptor {
        host: access.hostname.clone(),
        port: access.port,
        username: access.username.clone(),
        key_path: key.private_key_path.clone(),
        passphrase: key.passphrase.clone(),
    });

    wait_until_ready(&shell, readiness, reporter).await?;

    if outcome.is_created() && !manifest.technology.is_empty() {
        reporter.step("clearing the default application...");
        shell
            .run(&bootstrap_cleanup_command())
            .await
            .context("clearing the default application")?;
    }

    sync_technology(api, &shell, company, outcome.app_id(), manifest, reporter).await?;

    if outcome.is_created() || force_init {
        run_hooks(&shell, &manifest.initial_commands, "initial", reporter).await?;
    }

    push_code(packager, &shell, manifest, reporter).await?;
    run_hooks(&shell, &manifest.before_commands, "before", reporter).await?;

    reporter.step("unpacking code...");
    shell.run(&unpack_command()).await.context("unpacking code")?;
    write_extra_files(&shell, manifest, reporter).await?;

    run_hooks(&shell, &manifest.after_commands, "after", reporter).await?;
    configure_services(&shell, manifest, reporter).await?;

    let status = api
        .app_status(company, outcome.app_id())
        .await
        .context("loading application status")?;
    let app = api
        .get_app(company, outcome.app_id())
        .await
        .context("loading application")?;
    reporter.success("deployment finished");

    Ok(DeployReport {
        outcome,
        app,
        status,
    })
}

/// Create or update the remote application resource.
async fn provision(
    api: &impl ProvisioningApi,
    company: u64,
    manifest: &Rostifile,
    placement: &Placement,
    key: &KeyMaterial,
    state: &mut LocalDeploymentState,
    reporter: &impl ProgressReporter,
) -> Result<(ProvisionOutcome, RemoteApplication)> {
    let mut request = RemoteApplication {
        name: manifest.name.clone(),
        image: placement.image.clone(),
        domains: manifest.domains.clone(),
        mode: manifest.mode().to_string(),
        plan: placement.plan_id,
        ssh_keys: vec![key.public_key.clone()],
        ..RemoteApplication::default()
    };

    if state.is_deployed() {
        let current = api
            .get_app(company, state.app_id)
            .await
            .with_context(|| format!("loading application {}", state.app_id))?;
        if !current.enabled {
            reporter.step("starting the stopped application...");
            api.app_action(company, state.app_id, ActionKind::Start)
                .await
                .context("starting application")?;
        }
        reporter.step(&format!("updating application '{}'...", manifest.name));
        request.id = state.app_id;
        let app = api
            .update_app(company, &request)
            .await
            .context("updating application")?;
        reporter.success(&format!("application {} updated", state.app_id));
        Ok((ProvisionOutcome::Updated { app_id: state.app_id }, app))
    } else {
        reporter.step(&format!("creating application '{}'...", manifest.name));
        let app = api
            .create_app(company, &request)
            .await
            .context("creating application")?;
        state.app_id = app.id;
        reporter.success(&format!("application {} created", app.id));
        Ok((ProvisionOutcome::Created { app_id: app.id }, app))
    }
}

/// Switch the container's technology when it differs from the manifest.
async fn sync_technology(
    api: &impl ProvisioningApi,
    shell: &impl RemoteShell,
    company: u64,
    app_id: u64,
    manifest: &Rostifile,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    if manifest.technology.is_empty() {
        return Ok(());
    }
    let status = api
        .app_status(company, app_id)
        .await
        .context("loading application status")?;
    let Some(drift) = detect_drift(
        &manifest.technology,
        &manifest.technology_version,
        &status.primary_tech,
    ) else {
        tracing::debug!(tech = %status.primary_tech.name, "technology up to date");
        return Ok(());
    };
    reporter.step(&format!("setting up {}...", drift.technology));
    shell
        .run(&tech_setup_command(&drift.technology, &drift.version))
        .await
        .with_context(|| format!("setting up {}", drift.technology))?;
    Ok(())
}

async fn push_code(
    packager: &impl SourcePackager,
    shell: &impl RemoteShell,
    manifest: &Rostifile,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    reporter.step(&format!("packing {}...", manifest.source()));
    let archive = packager
        .package(&PathBuf::from(manifest.source()), &manifest.exclude)
        .await
        .context("packing source code")?;
    reporter.step("uploading code...");
    shell
        .stream_file(ARCHIVE_STAGING_PATH, archive)
        .await
        .context("uploading code")?;
    Ok(())
}

/// Run hook commands in order under `/bin/sh -c`.
async fn run_hooks(
    shell: &impl RemoteShell,
    commands: &[String],
    kind: &str,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    for command in commands {
        reporter.step(&format!("running {kind} command: {command}"));
        let output = shell
            .run(&wrap_in_shell(command))
            .await
            .with_context(|| format!("{kind} command failed"))?;
        tracing::debug!(kind, command = %command, output = %output, "hook finished");
    }
    Ok(())
}

async fn write_extra_files(
    shell: &impl RemoteShell,
    manifest: &Rostifile,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    for file in &manifest.files {
        let path = resolve_remote_path(&file.path);
        reporter.step(&format!("writing {path}..."));
        shell
            .send_file(&path, file.content.as_bytes())
            .await
            .with_context(|| format!("writing {path}"))?;
    }
    Ok(())
}

/// Install the crontab and supervisor programs declared in the manifest.
async fn configure_services(
    shell: &impl RemoteShell,
    manifest: &Rostifile,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    if !manifest.crontabs.is_empty() {
        reporter.step("installing crontab...");
        shell
            .send_file(CRONTAB_PATH, render_crontab(&manifest.crontabs).as_bytes())
            .await
            .context("writing crontab")?;
        shell
            .run(&crontab_install_command())
            .await
            .context("installing crontab")?;
    }

    if !manifest.processes.is_empty() {
        reporter.step("configuring background processes...");
        shell
            .send_file(
                SUPERVISOR_CONFIG_PATH,
                render_supervisor_config(&manifest.processes).as_bytes(),
            )
            .await
            .context("writing supervisor config")?;
        for command in [SUPERVISOR_REREAD, SUPERVISOR_UPDATE] {
            shell
                .run(command)
                .await
                .context("reloading supervisor")?;
        }
    }
    Ok(())
}
