//! Shared mock infrastructure for unit tests.
//!
//! Provides an in-memory provisioning API, a scripted remote shell that logs
//! every transport call, and no-op collaborators so each test file doesn't
//! have to re-define the same boilerplate.

#![allow(clippy::expect_used)]

use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use rosti_cli::application::ports::{
    CompanyChooser, KeyMaterial, ProgressReporter, ProvisioningApi, RemoteShell,
    RemoteShellFactory, SessionDescriptor, SourcePackager,
};
use rosti_cli::domain::error::RemoteError;
use rosti_cli::domain::remote::READINESS_PROBE;
use rosti_common::{
    ActionKind, AppStatus, Company, Plan, RemoteApplication, Rostifile, Runtime, SshAccess, Tech,
};

pub const COMPANY: u64 = 7;
pub const ARCHIVE: &[u8] = b"fake tar stream";

// ── Fixtures ──────────────────────────────────────────────────────────────────

pub fn manifest() -> Rostifile {
    Rostifile {
        name: "blog".to_string(),
        domains: vec!["blog.example.com".to_string()],
        ..Rostifile::default()
    }
}

pub fn key() -> KeyMaterial {
    KeyMaterial {
        private_key_path: PathBuf::from("/home/dev/.ssh/id_ed25519"),
        public_key: "ssh-ed25519 AAAAC3Nza dev@laptop".to_string(),
        passphrase: None,
    }
}

pub fn tech(name: &str, version: &str) -> Tech {
    Tech {
        name: name.to_string(),
        version: version.to_string(),
    }
}

// ── Mock: in-memory provisioning API ─────────────────────────────────────────

/// Provisioning API holding applications in memory and logging every call.
pub struct MemoryApi {
    pub companies: Vec<Company>,
    apps: Mutex<BTreeMap<u64, RemoteApplication>>,
    next_id: Mutex<u64>,
    primary_tech: Mutex<Tech>,
    calls: Mutex<Vec<String>>,
    ssh_access: Vec<SshAccess>,
}

impl MemoryApi {
    pub fn new() -> Self {
        Self {
            companies: vec![Company {
                id: COMPANY,
                name: "ACME".to_string(),
            }],
            apps: Mutex::new(BTreeMap::new()),
            next_id: Mutex::new(100),
            primary_tech: Mutex::new(tech("python", "3.12")),
            calls: Mutex::new(Vec::new()),
            ssh_access: vec![SshAccess {
                hostname: "node-1.rosti.cz".to_string(),
                port: 10100,
                username: "app".to_string(),
            }],
        }
    }

    /// Containers come up without SSH access.
    pub fn without_ssh_access(mut self) -> Self {
        self.ssh_access.clear();
        self
    }

    pub fn with_companies(mut self, companies: Vec<Company>) -> Self {
        self.companies = companies;
        self
    }

    pub fn with_primary_tech(self, name: &str, version: &str) -> Self {
        *self.primary_tech.lock().expect("lock") = tech(name, version);
        self
    }

    /// Seed an existing application, as left by an earlier deploy.
    pub fn with_app(self, id: u64, enabled: bool) -> Self {
        let app = RemoteApplication {
            id,
            name: "blog".to_string(),
            enabled,
            ssh_access: self.ssh_access.clone(),
            ..RemoteApplication::default()
        };
        self.apps.lock().expect("lock").insert(id, app);
        self
    }

    pub fn app(&self, id: u64) -> Option<RemoteApplication> {
        self.apps.lock().expect("lock").get(&id).cloned()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock").clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().expect("lock").push(call.into());
    }
}

impl ProvisioningApi for MemoryApi {
    async fn companies(&self) -> Result<Vec<Company>> {
        self.record("companies");
        Ok(self.companies.clone())
    }

    async fn plans(&self, _company: u64) -> Result<Vec<Plan>> {
        self.record("plans");
        Ok(vec![
            Plan {
                id: 1,
                name: "Start+".to_string(),
                ..Plan::default()
            },
            Plan {
                id: 2,
                name: "Business".to_string(),
                ..Plan::default()
            },
        ])
    }

    async fn runtimes(&self, _company: u64) -> Result<Vec<Runtime>> {
        self.record("runtimes");
        Ok(vec![Runtime {
            id: 1,
            image: "docker.io/rosti/runtime:2024.04-1".to_string(),
            default: true,
        }])
    }

    async fn get_app(&self, _company: u64, id: u64) -> Result<RemoteApplication> {
        self.record("get_app");
        self.app(id)
            .ok_or_else(|| anyhow::anyhow!("404 HTTP status code returned (not found)"))
    }

    async fn create_app(&self, _company: u64, app: &RemoteApplication) -> Result<RemoteApplication> {
        self.record("create_app");
        let mut next_id = self.next_id.lock().expect("lock");
        let created = RemoteApplication {
            id: *next_id,
            enabled: true,
            ssh_access: self.ssh_access.clone(),
            ..app.clone()
        };
        *next_id += 1;
        self.apps
            .lock()
            .expect("lock")
            .insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_app(&self, _company: u64, app: &RemoteApplication) -> Result<RemoteApplication> {
        self.record("update_app");
        let mut apps = self.apps.lock().expect("lock");
        let current = apps
            .get_mut(&app.id)
            .ok_or_else(|| anyhow::anyhow!("404 HTTP status code returned (not found)"))?;
        let updated = RemoteApplication {
            enabled: current.enabled,
            ssh_access: current.ssh_access.clone(),
            ..app.clone()
        };
        *current = updated.clone();
        Ok(updated)
    }

    async fn delete_app(&self, _company: u64, id: u64) -> Result<()> {
        self.record("delete_app");
        self.apps.lock().expect("lock").remove(&id);
        Ok(())
    }

    async fn app_action(&self, _company: u64, id: u64, action: ActionKind) -> Result<()> {
        self.record(format!("action:{action}"));
        if let Some(app) = self.apps.lock().expect("lock").get_mut(&id) {
            match action {
                ActionKind::Start | ActionKind::Restart => app.enabled = true,
                ActionKind::Stop => app.enabled = false,
                ActionKind::Rebuild => {}
            }
        }
        Ok(())
    }

    async fn app_status(&self, _company: u64, _id: u64) -> Result<AppStatus> {
        self.record("app_status");
        Ok(AppStatus {
            running: true,
            primary_tech: self.primary_tech.lock().expect("lock").clone(),
            ..AppStatus::default()
        })
    }
}

// ── Mock: scripted remote shell ──────────────────────────────────────────────

/// One transport call as seen by the remote host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Remote {
    Run(String),
    Stream { path: String, content: Vec<u8> },
    Send { path: String, content: String },
}

/// Shared script and log behind every shell a [`ScriptedShells`] opens.
#[derive(Default)]
struct Script {
    log: Vec<Remote>,
    /// Readiness probes that fail before the first one succeeds.
    probe_failures: u32,
    /// Commands containing this text exit nonzero.
    failing_command: Option<String>,
}

/// Factory whose shells share one script and log.
#[derive(Default)]
pub struct ScriptedShells {
    script: Arc<Mutex<Script>>,
    opened: Mutex<Vec<SessionDescriptor>>,
}

impl ScriptedShells {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn probe_failures(self, failures: u32) -> Self {
        self.script.lock().expect("lock").probe_failures = failures;
        self
    }

    pub fn failing_command(self, needle: &str) -> Self {
        self.script.lock().expect("lock").failing_command = Some(needle.to_string());
        self
    }

    pub fn log(&self) -> Vec<Remote> {
        self.script.lock().expect("lock").log.clone()
    }

    /// Commands run, readiness probes excluded.
    pub fn commands(&self) -> Vec<String> {
        self.log()
            .into_iter()
            .filter_map(|entry| match entry {
                Remote::Run(cmd) if cmd != READINESS_PROBE => Some(cmd),
                _ => None,
            })
            .collect()
    }

    pub fn probes(&self) -> usize {
        self.log()
            .iter()
            .filter(|entry| matches!(entry, Remote::Run(cmd) if cmd == READINESS_PROBE))
            .count()
    }

    pub fn opened(&self) -> Vec<SessionDescriptor> {
        self.opened.lock().expect("lock").clone()
    }
}

impl RemoteShellFactory for ScriptedShells {
    type Shell = ScriptedShell;

    fn open(&self, descriptor: SessionDescriptor) -> ScriptedShell {
        self.opened.lock().expect("lock").push(descriptor);
        ScriptedShell {
            script: Arc::clone(&self.script),
        }
    }
}

pub struct ScriptedShell {
    script: Arc<Mutex<Script>>,
}

impl RemoteShell for ScriptedShell {
    async fn run(&self, command: &str) -> Result<String> {
        let mut script = self.script.lock().expect("lock");
        script.log.push(Remote::Run(command.to_string()));
        if command == READINESS_PROBE && script.probe_failures > 0 {
            script.probe_failures -= 1;
            anyhow::bail!("connection refused");
        }
        if script
            .failing_command
            .as_deref()
            .is_some_and(|needle| command.contains(needle))
        {
            return Err(RemoteError::CommandFailed {
                command: command.to_string(),
                exit_code: 1,
                output: "boom".to_string(),
            }
            .into());
        }
        Ok(String::new())
    }

    async fn stream_file(&self, remote_path: &str, mut reader: Box<dyn Read + Send>) -> Result<()> {
        let mut content = Vec::new();
        reader.read_to_end(&mut content)?;
        self.script.lock().expect("lock").log.push(Remote::Stream {
            path: remote_path.to_string(),
            content,
        });
        Ok(())
    }

    async fn send_file(&self, remote_path: &str, content: &[u8]) -> Result<()> {
        self.script.lock().expect("lock").log.push(Remote::Send {
            path: remote_path.to_string(),
            content: String::from_utf8_lossy(content).into_owned(),
        });
        Ok(())
    }
}

// ── Mock: packager ────────────────────────────────────────────────────────────

/// Packager returning a fixed stream and remembering what it was asked for.
#[derive(Default)]
pub struct FakePackager {
    pub requests: Mutex<Vec<(PathBuf, Vec<String>)>>,
}

impl SourcePackager for FakePackager {
    async fn package(&self, source: &Path, exclude: &[String]) -> Result<Box<dyn Read + Send>> {
        self.requests
            .lock()
            .expect("lock")
            .push((source.to_path_buf(), exclude.to_vec()));
        Ok(Box::new(Cursor::new(ARCHIVE.to_vec())))
    }
}

// ── Mock: company chooser ─────────────────────────────────────────────────────

/// Always picks the given company and counts how often it was asked.
pub struct FixedChooser {
    pub company: u64,
    pub asked: Mutex<u32>,
}

impl FixedChooser {
    pub fn new(company: u64) -> Self {
        Self {
            company,
            asked: Mutex::new(0),
        }
    }

    pub fn times_asked(&self) -> u32 {
        *self.asked.lock().expect("lock")
    }
}

impl CompanyChooser for FixedChooser {
    fn choose_company(&self, _companies: &[Company]) -> Result<u64> {
        *self.asked.lock().expect("lock") += 1;
        Ok(self.company)
    }
}

// ── Mock: reporters ───────────────────────────────────────────────────────────

pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn step(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warn(&self, _: &str) {}
}

/// Reporter keeping every message, prefixed by its kind.
#[derive(Default)]
pub struct RecordingReporter {
    pub events: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().expect("lock").clone()
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.events.lock().expect("lock").push(format!("step: {message}"));
    }
    fn success(&self, message: &str) {
        self.events
            .lock()
            .expect("lock")
            .push(format!("success: {message}"));
    }
    fn warn(&self, message: &str) {
        self.events.lock().expect("lock").push(format!("warn: {message}"));
    }
}
