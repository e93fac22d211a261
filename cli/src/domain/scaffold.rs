//! Starter manifest sections for a freshly initialised project.
//!
//! The command layer inspects the project directory and asks the questions;
//! this module turns the answers into processes and hook commands.

use rosti_common::{Process, Rostifile};
use serde::Deserialize;

use crate::domain::error::ScaffoldError;
use crate::domain::remote::APP_DIR;

/// Port the platform proxy forwards HTTP traffic to.
pub const APP_PORT: u16 = 8080;

/// Stack the project runs on, with the details each one needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stack {
    Php {
        has_index: bool,
    },
    Python {
        /// WSGI entry point, e.g. `myproject.wsgi`.
        wsgi_module: String,
        has_requirements: bool,
    },
    Node {
        /// Contents of `package.json`, if the project has one.
        package_json: Option<String>,
    },
    /// A self-contained executable listening on [`APP_PORT`].
    Binary {
        /// Path of the executable relative to the source directory.
        file: String,
        exists: bool,
    },
}

/// Manifest sections suggested for a stack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scaffold {
    pub technology: String,
    pub processes: Vec<Process>,
    pub before_commands: Vec<String>,
    pub after_commands: Vec<String>,
    /// Non-fatal findings worth telling the user about.
    pub warnings: Vec<String>,
}

impl Scaffold {
    /// Copy the suggested sections into `manifest`.
    pub fn apply_to(self, manifest: &mut Rostifile) {
        manifest.technology = self.technology;
        manifest.processes = self.processes;
        manifest.before_commands = self.before_commands;
        manifest.after_commands = self.after_commands;
    }
}

#[derive(Deserialize)]
struct PackageJson {
    #[serde(default)]
    scripts: std::collections::HashMap<String, String>,
}

fn app_process(command: String) -> Vec<Process> {
    vec![Process {
        name: "app".to_string(),
        command,
        stop_kill_as_group: false,
    }]
}

/// Build the suggested manifest sections for `stack`.
///
/// # Errors
///
/// Returns a [`ScaffoldError`] when the project cannot run on the chosen stack
/// as it is.
pub fn scaffold(stack: &Stack) -> Result<Scaffold, ScaffoldError> {
    match stack {
        Stack::Php { has_index } => {
            let mut warnings = Vec::new();
            if !has_index {
                warnings.push(
                    "there is no index.php in the source directory; the HTTP check may fail"
                        .to_string(),
                );
            }
            Ok(Scaffold {
                technology: "php".to_string(),
                processes: app_process(
                    "/srv/bin/primary_tech/php-fpm -F -O -g /srv/run/php-fpm.pid -y /srv/conf/php-fpm/php-fpm.conf"
                        .to_string(),
                ),
                warnings,
                ..Scaffold::default()
            })
        }
        Stack::Python {
            wsgi_module,
            has_requirements,
        } => {
            let module = wsgi_module.trim();
            if module.is_empty() {
                return Err(ScaffoldError::MissingWsgiModule);
            }
            let mut after_commands = Vec::new();
            if *has_requirements {
                after_commands.push(format!(
                    "cd {APP_DIR} && /srv/venv/bin/pip install -r requirements.txt"
                ));
            }
            after_commands.push("supervisorctl restart app".to_string());
            Ok(Scaffold {
                technology: "python".to_string(),
                processes: app_process(format!(
                    "/srv/venv/bin/gunicorn -u app -g app -b 0.0.0.0:{APP_PORT} --access-logfile - --error-logfile - --reload {module}"
                )),
                after_commands,
                ..Scaffold::default()
            })
        }
        Stack::Node { package_json } => {
            let content = package_json.as_deref().ok_or(ScaffoldError::MissingPackageJson)?;
            let parsed: PackageJson = serde_json::from_str(content)
                .map_err(|e| ScaffoldError::InvalidPackageJson(e.to_string()))?;
            if !parsed.scripts.contains_key("start") {
                return Err(ScaffoldError::MissingStartScript);
            }
            Ok(Scaffold {
                technology: "node".to_string(),
                processes: app_process("/srv/bin/primary_tech/npm start".to_string()),
                after_commands: vec![
                    format!("cd {APP_DIR} && npm install"),
                    "supervisorctl restart app".to_string(),
                ],
                ..Scaffold::default()
            })
        }
        Stack::Binary { file, exists } => {
            let file = file.trim().trim_start_matches("./");
            if file.is_empty() || !exists {
                return Err(ScaffoldError::BinaryNotFound(file.to_string()));
            }
            let remote = format!("{APP_DIR}/{file}");
            Ok(Scaffold {
                technology: String::new(),
                processes: app_process(remote.clone()),
                before_commands: vec!["supervisorctl stop app".to_string()],
                after_commands: vec![
                    format!("chmod 755 {remote}"),
                    "supervisorctl start app".to_string(),
                ],
                ..Scaffold::default()
            })
        }
    }
}
