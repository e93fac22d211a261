//! Output styles using owo-colors stylesheet pattern

use owo_colors::Style;

/// Stylesheet for terminal output. The default is plain text.
#[derive(Debug, Default, Clone, Copy)]
pub struct Styles {
    pub success: Style,
    pub warning: Style,
    pub error: Style,
    pub info: Style,
    pub dim: Style,
    /// Section titles in status reports.
    pub header: Style,
    /// Domains and URLs.
    pub link: Style,
    /// Spinner and step arrows.
    pub step: Style,
    /// The technology the container currently runs.
    pub active: Style,
}

impl Styles {
    /// Stylesheet with ANSI colors.
    #[must_use]
    pub fn colored() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().yellow(),
            error: Style::new().red(),
            info: Style::new().blue(),
            dim: Style::new().dimmed(),
            header: Style::new().bold(),
            link: Style::new().underline().cyan(),
            step: Style::new().cyan(),
            active: Style::new().bold().green(),
        }
    }
}
