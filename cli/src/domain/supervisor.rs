//! Rendering of supervisor program stanzas and the crontab file.

use rosti_common::Process;

use crate::domain::remote::APP_DIR;

pub const CONFIG_HEADER: &str = "# This file is gonna be rewritten by rostictl";

/// `PATH` every supervised process starts with.
pub const PROCESS_ENVIRONMENT: &str =
    r#"PATH="/srv/bin/primary_tech:/usr/local/bin:/usr/bin:/bin:/srv/.npm-packages/bin""#;

/// Render one `[program:…]` stanza.
#[must_use]
pub fn render_stanza(process: &Process) -> String {
    let name = &process.name;
    let mut out = format!(
        "[program:{name}]\n\
         command={command}\n\
         environment={PROCESS_ENVIRONMENT}\n\
         autostart=true\n\
         autorestart=true\n\
         directory={APP_DIR}\n\
         process_name={name}\n\
         stdout_logfile=/srv/log/{name}.log\n\
         stdout_logfile_maxbytes=2MB\n\
         stdout_logfile_backups=5\n\
         stdout_capture_maxbytes=2MB\n\
         stdout_events_enabled=false\n\
         redirect_stderr=true\n",
        command = process.command,
    );
    if process.stop_kill_as_group {
        out.push_str("stopasgroup=true\nkillasgroup=true\n");
    }
    out
}

/// Render the whole supervisor config file for the given processes.
#[must_use]
pub fn render_supervisor_config(processes: &[Process]) -> String {
    let stanzas: Vec<String> = processes.iter().map(render_stanza).collect();
    format!("{CONFIG_HEADER}\n\n{}\n", stanzas.join("\n"))
}

/// Render crontab lines as the file `crontab` expects.
#[must_use]
pub fn render_crontab(lines: &[String]) -> String {
    format!("{}\n", lines.join("\n"))
}
