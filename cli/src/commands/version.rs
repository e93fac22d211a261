//! `rostictl version` — print the client version.

use crate::app::AppContext;

/// Run the version command.
pub fn run(app: &AppContext) {
    app.renderer().render_version(env!("CARGO_PKG_VERSION"));
}
