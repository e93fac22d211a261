//! Human-readable terminal renderer.

use owo_colors::OwoColorize as _;
use rosti_common::{AppStatus, Company, Plan, RemoteApplication, Runtime};

use crate::domain::remote::{ssh_command, ssh_uri};
use crate::output::{Mark, OutputContext};

/// Renders API types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the CLI version.
    pub fn render_version(&self, version: &str) {
        if self.ctx.quiet {
            return;
        }
        println!("rostictl {version}");
    }

    /// Render domains, SSH access, health, and messages of an application.
    pub fn render_status(&self, app: &RemoteApplication, status: &AppStatus, show_techs: bool) {
        if self.ctx.quiet {
            return;
        }
        let styles = &self.ctx.styles;
        let scheme = if app.is_https() { "https" } else { "http" };

        self.ctx.header("Domains:");
        for domain in &app.domains {
            self.ctx
                .item(format!("{scheme}://{domain}").style(styles.link));
        }

        if let Some(access) = app.ssh_access.first() {
            self.ctx.header("SSH access:");
            self.ctx.kv("Command:", ssh_command(access));
            self.ctx.kv("URI:", ssh_uri(access));
        }

        self.ctx.header("Current status:");
        if status.running {
            self.ctx.success("Container: running");
        } else {
            self.ctx
                .line(Mark::Fail, "Container: NOT running".style(styles.error));
        }
        self.ctx.kv(
            "Memory:",
            format!("{:.2} / {:.2} MB", status.memory.usage, status.memory.limit),
        );
        self.ctx.kv("Storage:", storage_line(status));
        if status.dns_ok {
            self.ctx.success("DNS: all good");
        } else {
            self.ctx.warn(
                "DNS: records are not set properly or they haven't propagated to the internet yet",
            );
        }
        if status.http_ok {
            self.ctx.success("HTTP: all good");
        } else {
            self.ctx
                .warn("HTTP: application doesn't return a 200-like status code");
        }

        if !status.errors.is_empty() {
            self.ctx.header("Error messages:");
            for message in &status.errors {
                self.ctx.item(message.style(styles.error));
            }
        }
        if !status.info.is_empty() {
            self.ctx.header("Info messages:");
            for message in &status.info {
                self.ctx.item(message);
            }
        }

        if show_techs {
            self.ctx.header("Available technologies:");
            for tech in &status.techs {
                let line = format!("{:<10} {}", tech.name, tech.version);
                if *tech == status.primary_tech {
                    println!("    {} <--", line.style(styles.active));
                } else {
                    println!("    {line}");
                }
            }
        }
        println!();
    }

    /// Explain that the report right after a deploy may not be final.
    pub fn render_stale_note(&self) {
        if self.ctx.quiet {
            return;
        }
        self.ctx.info(
            "This output may be imprecise: the container may still be booting or DNS may not have propagated yet.",
        );
        self.ctx.info("Run `rostictl status` later to check again.");
    }

    pub fn render_plans(&self, plans: &[Plan]) {
        if self.ctx.quiet {
            return;
        }
        self.ctx.header("Plans:");
        for plan in plans {
            println!(
                "    {:<12} {:<12} RAM {} MB, disk {} GB, CPU {}%",
                plan.slug(),
                plan.name.style(self.ctx.styles.dim),
                plan.ram,
                plan.disk,
                plan.cpu_quota
            );
        }
    }

    pub fn render_companies(&self, companies: &[Company]) {
        if self.ctx.quiet {
            return;
        }
        self.ctx.header("Companies:");
        for company in companies {
            println!("    {:>6}  {}", company.id, company.name);
        }
    }

    pub fn render_runtimes(&self, runtimes: &[Runtime]) {
        if self.ctx.quiet {
            return;
        }
        self.ctx.header("Runtimes:");
        for runtime in runtimes {
            let marker = if runtime.default { "*" } else { " " };
            println!("    {marker} {}", runtime.image);
        }
    }
}

/// Storage usage line; a negative usage means the platform has not measured it yet.
#[must_use]
pub fn storage_line(status: &AppStatus) -> String {
    let usage = if status.storage.usage >= 0.0 {
        format!("{:.2}", status.storage.usage)
    } else {
        "-".to_string()
    };
    format!(
        "{usage} / {:.2} GB (over limit: {:.2} GB)",
        status.storage.limit, status.storage.over_limit
    )
}
