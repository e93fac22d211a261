//! `rostictl init` — create a starter `Rostifile` in the current directory.

use std::path::Path;

use anyhow::Result;
use rosti_common::{Rostifile, is_valid_identifier};

use crate::app::AppContext;
use crate::domain::scaffold::{Stack, scaffold};
use crate::infra::manifest::{MANIFEST_FILE, save_manifest};
use crate::infra::prompt::DialoguerPrompt;

const STACKS: &[&str] = &[
    "PHP",
    "Python (WSGI)",
    "Node.js",
    "Binary listening on port 8080 (Go, Deno, C, ...)",
];

/// Run `rostictl init`.
///
/// # Errors
///
/// Returns an error if a `Rostifile` already exists, an answer is invalid, or
/// the project does not fit the chosen stack.
pub fn run(app: &AppContext) -> Result<()> {
    let path = Path::new(MANIFEST_FILE);
    if path.exists() {
        anyhow::bail!("{MANIFEST_FILE} already exists in this directory");
    }
    let prompt = DialoguerPrompt;

    let name = prompt.ask_text("Name of the project", None)?;
    if !is_valid_identifier(&name) {
        anyhow::bail!("Invalid project name '{name}': only letters, digits, '-' and '_' are allowed");
    }
    let source_path = prompt.ask_text("Directory with the project's code", Some("."))?;
    let source = Path::new(&source_path);

    let stack = match prompt.choose("Which technology does this project use?", STACKS)? {
        0 => Stack::Php {
            has_index: source.join("index.php").is_file(),
        },
        1 => Stack::Python {
            wsgi_module: prompt.ask_text("WSGI module (e.g. myproject.wsgi)", None)?,
            has_requirements: source.join("requirements.txt").is_file(),
        },
        2 => Stack::Node {
            package_json: std::fs::read_to_string(source.join("package.json")).ok(),
        },
        _ => {
            let file = prompt.ask_text("Path of the binary inside the project directory", None)?;
            let exists = source.join(file.trim_start_matches("./")).is_file();
            Stack::Binary { file, exists }
        }
    };
    let bits = scaffold(&stack)?;
    for warning in &bits.warnings {
        app.output.warn(warning);
    }

    let mut manifest = Rostifile {
        name,
        source_path: if source_path == "." {
            String::new()
        } else {
            source_path
        },
        ..Rostifile::default()
    };
    bits.apply_to(&mut manifest);
    manifest.validate()?;
    save_manifest(path, &manifest)?;

    app.output.success(&format!("{MANIFEST_FILE} created."));
    app.output
        .info("Review it, then run `rostictl up` to deploy.");
    Ok(())
}
