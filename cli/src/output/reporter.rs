//! `TerminalReporter` — terminal implementation of `ProgressReporter`.
//!
//! On a terminal each step spins until the next event settles it. Elsewhere
//! every event is one plain line.

use std::cell::RefCell;

use indicatif::ProgressBar;

use crate::application::ports::ProgressReporter;
use crate::output::{Mark, OutputContext, progress};

/// Reports deploy progress through an `OutputContext`. Silent when quiet.
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
    spinner: RefCell<Option<ProgressBar>>,
}

impl<'a> TerminalReporter<'a> {
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self {
            ctx,
            spinner: RefCell::new(None),
        }
    }

    /// Close the running step with `mark`. `msg` replaces the step text when given.
    /// Returns whether a spinner was running.
    fn settle(&self, mark: Mark, msg: Option<&str>) -> bool {
        let Some(pb) = self.spinner.borrow_mut().take() else {
            return false;
        };
        let text = msg.map_or_else(|| pb.message(), str::to_string);
        progress::settle(&pb, mark, &text);
        true
    }

    fn finish(&self, mark: Mark, message: &str) {
        if self.ctx.quiet {
            return;
        }
        if !self.settle(mark, Some(message)) {
            self.ctx.line(mark, message);
        }
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        self.settle(Mark::Step, None);
        if self.ctx.show_progress() {
            *self.spinner.borrow_mut() = Some(progress::spinner(message));
        } else {
            self.ctx.line(Mark::Step, message);
        }
    }

    fn success(&self, message: &str) {
        self.finish(Mark::Ok, message);
    }

    fn warn(&self, message: &str) {
        self.finish(Mark::Warn, message);
    }
}

impl Drop for TerminalReporter<'_> {
    fn drop(&mut self) {
        if let Some(pb) = self.spinner.get_mut().take() {
            pb.abandon();
        }
    }
}
