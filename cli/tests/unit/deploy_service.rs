//! Tests for the `deploy` application service.
//!
//! Drives the whole convergence pipeline against the in-memory API and the
//! scripted shell, checking which remote commands run, in which order, and
//! what ends up in the local state.

#![allow(clippy::expect_used)]

use std::path::PathBuf;
use std::time::Duration;

use rosti_cli::application::ports::KeyMaterial;
use rosti_cli::application::services::deploy::{
    DeployOptions, DeployReport, ProvisionOutcome, deploy,
};
use rosti_cli::application::services::readiness::{READINESS_MAX_ATTEMPTS, ReadinessPolicy};
use rosti_cli::domain::LocalDeploymentState;
use rosti_cli::domain::error::{DeployError, RemoteError, SelectionError};
use rosti_cli::domain::remote::{
    ARCHIVE_STAGING_PATH, CRONTAB_PATH, SUPERVISOR_CONFIG_PATH, SUPERVISOR_REREAD,
    SUPERVISOR_UPDATE, bootstrap_cleanup_command, crontab_install_command, tech_setup_command,
    unpack_command, wrap_in_shell,
};
use rosti_common::{Company, ExtraFile, Process, Rostifile};

use crate::mocks::{
    ARCHIVE, COMPANY, FakePackager, FixedChooser, MemoryApi, NoopReporter, Remote, ScriptedShells,
    key, manifest,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn instant_readiness() -> ReadinessPolicy {
    ReadinessPolicy {
        interval: Duration::ZERO,
        max_attempts: READINESS_MAX_ATTEMPTS,
    }
}

struct Run<'a> {
    api: &'a MemoryApi,
    shells: &'a ScriptedShells,
    packager: &'a FakePackager,
    chooser: &'a FixedChooser,
}

impl Run<'_> {
    async fn deploy(
        &self,
        state: &mut LocalDeploymentState,
        manifest: &Rostifile,
        force_init: bool,
    ) -> anyhow::Result<DeployReport> {
        self.deploy_with(state, manifest, force_init, None, &key()).await
    }

    async fn deploy_with(
        &self,
        state: &mut LocalDeploymentState,
        manifest: &Rostifile,
        force_init: bool,
        company: Option<u64>,
        key: &KeyMaterial,
    ) -> anyhow::Result<DeployReport> {
        deploy(
            self.api,
            self.shells,
            self.packager,
            self.chooser,
            state,
            DeployOptions {
                reporter: &NoopReporter,
                manifest,
                key,
                company,
                force_init,
                readiness: instant_readiness(),
            },
        )
        .await
    }
}

macro_rules! run {
    ($api:expr, $shells:expr) => {
        Run {
            api: &$api,
            shells: &$shells,
            packager: &FakePackager::default(),
            chooser: &FixedChooser::new(COMPANY),
        }
    };
}

fn deployed_state(app_id: u64) -> LocalDeploymentState {
    LocalDeploymentState {
        app_id,
        company_id: COMPANY,
        ssh_key_path: "/home/dev/.ssh/id_ed25519".to_string(),
    }
}

// ── Create vs update ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_first_deploy_creates_app_and_records_it() {
    let api = MemoryApi::new();
    let shells = ScriptedShells::new();
    let mut state = LocalDeploymentState::default();

    let report = run!(api, shells)
        .deploy(&mut state, &manifest(), false)
        .await
        .expect("deploy");

    assert_eq!(report.outcome, ProvisionOutcome::Created { app_id: 100 });
    assert_eq!(state.app_id, 100);
    assert_eq!(state.company_id, COMPANY);
    assert_eq!(api.count("create_app"), 1);
    assert_eq!(api.count("update_app"), 0);

    let created = api.app(100).expect("app stored");
    assert_eq!(created.name, "blog");
    assert_eq!(created.plan, 1, "default plan slug resolves to Start+");
    assert_eq!(created.mode, "http");
    assert_eq!(created.image, "docker.io/rosti/runtime:2024.04-1");
    assert_eq!(created.ssh_keys, vec![key().public_key]);
}

#[tokio::test]
async fn test_redeploy_updates_without_initial_commands() {
    let api = MemoryApi::new().with_app(55, true);
    let shells = ScriptedShells::new();
    let mut state = deployed_state(55);
    let manifest = Rostifile {
        technology: "python".to_string(),
        initial_commands: vec!["python manage.py migrate".to_string()],
        ..manifest()
    };

    let report = run!(api, shells)
        .deploy(&mut state, &manifest, false)
        .await
        .expect("deploy");

    assert_eq!(report.outcome, ProvisionOutcome::Updated { app_id: 55 });
    assert_eq!(state.app_id, 55);
    assert_eq!(api.count("create_app"), 0);
    assert_eq!(api.count("update_app"), 1);
    let commands = shells.commands();
    assert!(!commands.contains(&wrap_in_shell("python manage.py migrate")));
    assert!(
        !commands.contains(&bootstrap_cleanup_command()),
        "an existing container must not be wiped"
    );
}

#[tokio::test]
async fn test_two_runs_create_once_and_init_once() {
    let api = MemoryApi::new();
    let shells = ScriptedShells::new();
    let mut state = LocalDeploymentState::default();
    let manifest = Rostifile {
        initial_commands: vec!["touch /srv/app/.seeded".to_string()],
        ..manifest()
    };
    let runner = run!(api, shells);

    runner.deploy(&mut state, &manifest, false).await.expect("first");
    runner.deploy(&mut state, &manifest, false).await.expect("second");

    assert_eq!(api.count("create_app"), 1);
    assert_eq!(api.count("update_app"), 1);
    let init = wrap_in_shell("touch /srv/app/.seeded");
    assert_eq!(shells.commands().iter().filter(|c| **c == init).count(), 1);
}

#[tokio::test]
async fn test_force_init_runs_initial_commands_on_update() {
    let api = MemoryApi::new().with_app(55, true);
    let shells = ScriptedShells::new();
    let mut state = deployed_state(55);
    let manifest = Rostifile {
        initial_commands: vec!["python manage.py migrate".to_string()],
        ..manifest()
    };

    run!(api, shells)
        .deploy(&mut state, &manifest, true)
        .await
        .expect("deploy");

    assert!(shells
        .commands()
        .contains(&wrap_in_shell("python manage.py migrate")));
}

#[tokio::test]
async fn test_stopped_app_is_started_before_update() {
    let api = MemoryApi::new().with_app(55, false);
    let shells = ScriptedShells::new();
    let mut state = deployed_state(55);

    run!(api, shells)
        .deploy(&mut state, &manifest(), false)
        .await
        .expect("deploy");

    let calls = api.calls();
    let start = calls.iter().position(|c| c == "action:start").expect("started");
    let update = calls.iter().position(|c| c == "update_app").expect("updated");
    assert!(start < update);
}

#[tokio::test]
async fn test_running_app_is_not_started_again() {
    let api = MemoryApi::new().with_app(55, true);
    let shells = ScriptedShells::new();
    let mut state = deployed_state(55);

    run!(api, shells)
        .deploy(&mut state, &manifest(), false)
        .await
        .expect("deploy");

    assert_eq!(api.count("action:start"), 0);
}

// ── Pipeline order ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_created_app_runs_every_step_in_order() {
    let api = MemoryApi::new().with_primary_tech("php", "8.2");
    let shells = ScriptedShells::new();
    let packager = FakePackager::default();
    let chooser = FixedChooser::new(COMPANY);
    let mut state = LocalDeploymentState::default();
    let manifest = Rostifile {
        technology: "python".to_string(),
        technology_version: "3.12".to_string(),
        initial_commands: vec!["init-db".to_string()],
        before_commands: vec!["supervisorctl stop app".to_string()],
        after_commands: vec!["supervisorctl start app".to_string()],
        files: vec![ExtraFile {
            path: ".env".to_string(),
            content: "DEBUG=0".to_string(),
        }],
        crontabs: vec!["*/5 * * * * /srv/app/cron.sh".to_string()],
        processes: vec![Process {
            name: "app".to_string(),
            command: "gunicorn app:app".to_string(),
            stop_kill_as_group: false,
        }],
        ..manifest()
    };
    let runner = Run {
        api: &api,
        shells: &shells,
        packager: &packager,
        chooser: &chooser,
    };

    runner.deploy(&mut state, &manifest, false).await.expect("deploy");

    let log: Vec<Remote> = shells
        .log()
        .into_iter()
        .filter(|entry| !matches!(entry, Remote::Run(cmd) if cmd == "echo 1"))
        .collect();
    let send = |path: &str| {
        log.iter()
            .find(|e| matches!(e, Remote::Send { path: p, .. } if p == path))
            .cloned()
            .expect("file sent")
    };
    let expected = vec![
        Remote::Run(bootstrap_cleanup_command()),
        Remote::Run(tech_setup_command("python", "3.12")),
        Remote::Run(wrap_in_shell("init-db")),
        Remote::Stream {
            path: ARCHIVE_STAGING_PATH.to_string(),
            content: ARCHIVE.to_vec(),
        },
        Remote::Run(wrap_in_shell("supervisorctl stop app")),
        Remote::Run(unpack_command()),
        send("/srv/app/.env"),
        Remote::Run(wrap_in_shell("supervisorctl start app")),
        send(CRONTAB_PATH),
        Remote::Run(crontab_install_command()),
        send(SUPERVISOR_CONFIG_PATH),
        Remote::Run(SUPERVISOR_REREAD.to_string()),
        Remote::Run(SUPERVISOR_UPDATE.to_string()),
    ];
    assert_eq!(log, expected);

    let requests = packager.requests.lock().expect("lock").clone();
    assert_eq!(requests, vec![(PathBuf::from("."), Vec::<String>::new())]);
}

#[tokio::test]
async fn test_extra_file_and_crontab_content() {
    let api = MemoryApi::new();
    let shells = ScriptedShells::new();
    let mut state = LocalDeploymentState::default();
    let manifest = Rostifile {
        files: vec![ExtraFile {
            path: "/srv/conf/app.ini".to_string(),
            content: "[app]\n".to_string(),
        }],
        crontabs: vec!["0 * * * * a".to_string(), "30 * * * * b".to_string()],
        ..manifest()
    };

    run!(api, shells)
        .deploy(&mut state, &manifest, false)
        .await
        .expect("deploy");

    let log = shells.log();
    assert!(log.contains(&Remote::Send {
        path: "/srv/conf/app.ini".to_string(),
        content: "[app]\n".to_string(),
    }));
    assert!(log.contains(&Remote::Send {
        path: CRONTAB_PATH.to_string(),
        content: "0 * * * * a\n30 * * * * b\n".to_string(),
    }));
}

#[tokio::test]
async fn test_no_processes_and_no_crontab_skip_service_setup() {
    let api = MemoryApi::new();
    let shells = ScriptedShells::new();
    let mut state = LocalDeploymentState::default();

    run!(api, shells)
        .deploy(&mut state, &manifest(), false)
        .await
        .expect("deploy");

    let commands = shells.commands();
    assert!(!commands.contains(&SUPERVISOR_REREAD.to_string()));
    assert!(!commands.contains(&crontab_install_command()));
    assert!(
        !commands.contains(&bootstrap_cleanup_command()),
        "no technology means the default payload stays"
    );
}

// ── Technology drift ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_matching_technology_is_left_alone() {
    let api = MemoryApi::new().with_app(55, true).with_primary_tech("python", "3.12");
    let shells = ScriptedShells::new();
    let mut state = deployed_state(55);
    let manifest = Rostifile {
        technology: "python".to_string(),
        ..manifest()
    };

    run!(api, shells)
        .deploy(&mut state, &manifest, false)
        .await
        .expect("deploy");

    assert!(!shells.commands().iter().any(|c| c.starts_with("/usr/local/bin/rosti")));
}

#[tokio::test]
async fn test_version_drift_triggers_setup() {
    let api = MemoryApi::new().with_app(55, true).with_primary_tech("node", "18");
    let shells = ScriptedShells::new();
    let mut state = deployed_state(55);
    let manifest = Rostifile {
        technology: "node".to_string(),
        technology_version: "20".to_string(),
        ..manifest()
    };

    run!(api, shells)
        .deploy(&mut state, &manifest, false)
        .await
        .expect("deploy");

    assert!(shells.commands().contains(&tech_setup_command("node", "20")));
}

// ── Readiness ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_readiness_retries_until_container_answers() {
    let api = MemoryApi::new();
    let shells = ScriptedShells::new().probe_failures(3);
    let mut state = LocalDeploymentState::default();

    run!(api, shells)
        .deploy(&mut state, &manifest(), false)
        .await
        .expect("deploy");

    assert_eq!(shells.probes(), 4);
}

#[tokio::test]
async fn test_readiness_gives_up_after_max_attempts_and_keeps_app_id() {
    let api = MemoryApi::new();
    let shells = ScriptedShells::new().probe_failures(u32::MAX);
    let mut state = LocalDeploymentState::default();

    let err = run!(api, shells)
        .deploy(&mut state, &manifest(), false)
        .await
        .expect_err("never ready");

    assert_eq!(shells.probes(), READINESS_MAX_ATTEMPTS as usize);
    match err.downcast_ref::<DeployError>() {
        Some(DeployError::NotReady {
            attempts,
            last_error,
        }) => {
            assert_eq!(*attempts, READINESS_MAX_ATTEMPTS);
            assert!(last_error.contains("connection refused"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(state.app_id, 100, "created app id must survive the failure");
    assert!(shells.commands().is_empty(), "nothing runs after a failed wait");
}

// ── Failures ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_ssh_access_fails_before_connecting() {
    let api = MemoryApi::new().without_ssh_access();
    let shells = ScriptedShells::new();
    let mut state = LocalDeploymentState::default();

    let err = run!(api, shells)
        .deploy(&mut state, &manifest(), false)
        .await
        .expect_err("no ssh access");

    assert!(matches!(
        err.downcast_ref::<DeployError>(),
        Some(DeployError::NoSshAccess)
    ));
    assert!(shells.opened().is_empty());
    assert_eq!(state.app_id, 100);
}

#[tokio::test]
async fn test_failing_hook_stops_the_pipeline() {
    let api = MemoryApi::new();
    let shells = ScriptedShells::new().failing_command("npm ci");
    let mut state = LocalDeploymentState::default();
    let manifest = Rostifile {
        before_commands: vec!["npm ci".to_string()],
        after_commands: vec!["supervisorctl restart app".to_string()],
        ..manifest()
    };

    let err = run!(api, shells)
        .deploy(&mut state, &manifest, false)
        .await
        .expect_err("hook fails");

    let remote = err
        .chain()
        .find_map(|e| e.downcast_ref::<RemoteError>())
        .expect("remote error in chain");
    assert!(matches!(remote, RemoteError::CommandFailed { exit_code: 1, .. }));
    let commands = shells.commands();
    assert!(!commands.contains(&unpack_command()));
    assert!(!commands.contains(&wrap_in_shell("supervisorctl restart app")));
}

#[tokio::test]
async fn test_unknown_plan_is_rejected_before_provisioning() {
    let api = MemoryApi::new();
    let shells = ScriptedShells::new();
    let mut state = LocalDeploymentState::default();
    let manifest = Rostifile {
        plan: "gold".to_string(),
        ..manifest()
    };

    let err = run!(api, shells)
        .deploy(&mut state, &manifest, false)
        .await
        .expect_err("unknown plan");

    assert_eq!(
        err.downcast_ref::<SelectionError>(),
        Some(&SelectionError::PlanNotFound("gold".to_string()))
    );
    assert_eq!(api.count("create_app"), 0);
}

// ── Company and session ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_multiple_companies_ask_the_chooser() {
    let api = MemoryApi::new().with_companies(vec![
        Company {
            id: 1,
            name: "One".to_string(),
        },
        Company {
            id: COMPANY,
            name: "ACME".to_string(),
        },
    ]);
    let shells = ScriptedShells::new();
    let packager = FakePackager::default();
    let chooser = FixedChooser::new(COMPANY);
    let mut state = LocalDeploymentState::default();
    let runner = Run {
        api: &api,
        shells: &shells,
        packager: &packager,
        chooser: &chooser,
    };

    runner.deploy(&mut state, &manifest(), false).await.expect("deploy");

    assert_eq!(chooser.times_asked(), 1);
    assert_eq!(state.company_id, COMPANY);
}

#[tokio::test]
async fn test_explicit_unknown_company_is_rejected() {
    let api = MemoryApi::new();
    let shells = ScriptedShells::new();
    let mut state = LocalDeploymentState::default();

    let err = run!(api, shells)
        .deploy_with(&mut state, &manifest(), false, Some(999), &key())
        .await
        .expect_err("unknown company");

    assert_eq!(
        err.downcast_ref::<SelectionError>(),
        Some(&SelectionError::CompanyNotFound(999))
    );
}

#[tokio::test]
async fn test_session_uses_first_ssh_access_and_key() {
    let api = MemoryApi::new();
    let shells = ScriptedShells::new();
    let mut state = LocalDeploymentState::default();
    let key = KeyMaterial {
        passphrase: Some("secret".to_string()),
        ..key()
    };

    run!(api, shells)
        .deploy_with(&mut state, &manifest(), false, None, &key)
        .await
        .expect("deploy");

    let opened = shells.opened();
    assert_eq!(opened.len(), 1);
    assert_eq!(opened[0].host, "node-1.rosti.cz");
    assert_eq!(opened[0].port, 10100);
    assert_eq!(opened[0].username, "app");
    assert_eq!(opened[0].key_path, key.private_key_path);
    assert_eq!(opened[0].passphrase.as_deref(), Some("secret"));
}
