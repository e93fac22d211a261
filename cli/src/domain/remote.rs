//! Remote container layout and shell command builders.
//!
//! Every path and command the deployment pipeline sends to a container is
//! built here so the exact text is testable without a transport.

use rosti_common::SshAccess;

// ── Remote layout ────────────────────────────────────────────────────────────

pub const APP_DIR: &str = "/srv/app";
pub const ARCHIVE_STAGING_PATH: &str = "/srv/_archive.tar";
pub const CRONTAB_PATH: &str = "/srv/conf/crontab";
pub const SUPERVISOR_CONFIG_PATH: &str = "/srv/conf/supervisor.d/rostictl.conf";
pub const TECH_SETUP_BIN: &str = "/usr/local/bin/rosti";

/// Trivial command used to probe whether the container accepts sessions.
pub const READINESS_PROBE: &str = "echo 1";

pub const SUPERVISOR_REREAD: &str = "supervisorctl reread";
pub const SUPERVISOR_UPDATE: &str = "supervisorctl update";

// ── Quoting ──────────────────────────────────────────────────────────────────

/// Quote `value` as a single POSIX shell word.
#[must_use]
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Wrap a user command so it runs under `/bin/sh -c`.
#[must_use]
pub fn wrap_in_shell(command: &str) -> String {
    format!("/bin/sh -c {}", shell_quote(command))
}

// ── Command builders ─────────────────────────────────────────────────────────

/// Tear down the default payload a fresh container starts with.
#[must_use]
pub fn bootstrap_cleanup_command() -> String {
    wrap_in_shell(&format!(
        "rm -rf {APP_DIR}/* && rm -rf /srv/conf/supervisor.d/app.conf && {SUPERVISOR_REREAD} && {SUPERVISOR_UPDATE}"
    ))
}

/// Switch the container's primary technology, optionally pinning a version.
#[must_use]
pub fn tech_setup_command(technology: &str, version: &str) -> String {
    if version.is_empty() {
        format!("{TECH_SETUP_BIN} {technology}")
    } else {
        format!("{TECH_SETUP_BIN} {technology} {version}")
    }
}

/// Move the staged archive into the app directory, extract it, and drop it.
#[must_use]
pub fn unpack_command() -> String {
    let archive = ARCHIVE_STAGING_PATH
        .rsplit('/')
        .next()
        .unwrap_or(ARCHIVE_STAGING_PATH);
    wrap_in_shell(&format!(
        "mkdir -p {APP_DIR} && mv {ARCHIVE_STAGING_PATH} {APP_DIR}/ && cd {APP_DIR} && tar xf {archive} && rm {archive}"
    ))
}

#[must_use]
pub fn crontab_install_command() -> String {
    format!("crontab {CRONTAB_PATH}")
}

/// Write stdin to `path` on the remote side, discarding the echo.
#[must_use]
pub fn stream_to_file_command(path: &str) -> String {
    wrap_in_shell(&format!("tee {} > /dev/null", shell_quote(path)))
}

/// Resolve an extra-file path from the manifest; relative paths land under the app dir.
#[must_use]
pub fn resolve_remote_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("{APP_DIR}/{}", path.trim_start_matches("./"))
    }
}

// ── Connection hints ─────────────────────────────────────────────────────────

/// Shell command a user can paste to open a session.
#[must_use]
pub fn ssh_command(access: &SshAccess) -> String {
    format!("ssh -p {} {}@{}", access.port, access.username, access.hostname)
}

#[must_use]
pub fn ssh_uri(access: &SshAccess) -> String {
    format!(
        "ssh://{}@{}:{}",
        access.username, access.hostname, access.port
    )
}

// ── Unit tests ───────────────────────────────────────────────────────────────
