//! Terminal output
//!
//! Reports go to stdout through [`OutputContext`]. Diagnostics go to stderr
//! through `tracing`.

pub mod human;
pub mod progress;
pub mod reporter;
pub mod styles;

use std::fmt::Display;

use console::Term;
use owo_colors::{OwoColorize as _, Style};

pub use human::HumanRenderer;
pub use reporter::TerminalReporter;
pub use styles::Styles;

/// Leading glyph of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Ok,
    Warn,
    Fail,
    Info,
    Step,
}

impl Mark {
    #[must_use]
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Ok => "✓",
            Self::Warn => "!",
            Self::Fail => "✗",
            Self::Info => "ℹ",
            Self::Step => "→",
        }
    }

    /// indicatif color name used when a spinner settles on this mark.
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Self::Ok => "green",
            Self::Warn => "yellow",
            Self::Fail => "red",
            Self::Info => "blue",
            Self::Step => "cyan",
        }
    }

    fn style(self, styles: &Styles) -> Style {
        match self {
            Self::Ok => styles.success,
            Self::Warn => styles.warning,
            Self::Fail => styles.error,
            Self::Info => styles.info,
            Self::Step => styles.step,
        }
    }
}

/// Where and how rostictl writes its report.
pub struct OutputContext {
    pub styles: Styles,
    /// Whether stdout is a terminal.
    pub is_tty: bool,
    /// Only errors are printed.
    pub quiet: bool,
}

impl OutputContext {
    /// Colors are used only on a terminal and never with `no_color`.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stdout().is_term();
        let styles = if is_tty && !no_color {
            Styles::colored()
        } else {
            Styles::default()
        };
        Self {
            styles,
            is_tty,
            quiet,
        }
    }

    /// Spinners need a terminal and a non-quiet run.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        self.is_tty && !self.quiet
    }

    /// `  <glyph> <msg>`
    pub fn line(&self, mark: Mark, msg: impl Display) {
        if !self.quiet {
            println!("  {} {msg}", mark.glyph().style(mark.style(&self.styles)));
        }
    }

    pub fn success(&self, msg: &str) {
        self.line(Mark::Ok, msg);
    }

    pub fn warn(&self, msg: &str) {
        self.line(Mark::Warn, msg);
    }

    pub fn info(&self, msg: &str) {
        self.line(Mark::Info, msg);
    }

    /// Section title preceded by an empty line.
    pub fn header(&self, title: &str) {
        if !self.quiet {
            println!();
            println!("{}", title.style(self.styles.header));
        }
    }

    /// Indented key and value with the key dimmed.
    pub fn kv(&self, key: &str, value: impl Display) {
        if !self.quiet {
            println!("  {:<12} {value}", key.style(self.styles.dim));
        }
    }

    /// `    * <text>` list entry.
    pub fn item(&self, text: impl Display) {
        if !self.quiet {
            println!("    * {text}");
        }
    }
}
