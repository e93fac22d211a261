//! Spinner shown while a deploy step runs

#![allow(clippy::expect_used)] // Templates are compile-time constants

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::output::Mark;

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

/// Start a spinner showing `msg` and the elapsed time.
///
/// # Panics
///
/// Never: the template is a constant.
#[must_use]
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(TICKS)
            .template("  {spinner:.cyan} {msg} {elapsed:.dim}")
            .expect("valid template"),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Replace the spinner with `mark` and `msg`, keeping the line.
///
/// # Panics
///
/// Never: the template is built from fixed color names.
pub fn settle(pb: &ProgressBar, mark: Mark, msg: &str) {
    pb.set_style(
        ProgressStyle::default_spinner()
            .template(&format!("  {{prefix:.{}}} {{msg}}", mark.color()))
            .expect("valid template"),
    );
    pb.set_prefix(mark.glyph());
    pb.finish_with_message(msg.to_string());
}
