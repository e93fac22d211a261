//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, OutputFlags};
use crate::commands;

/// Deploy applications described by a Rostifile to Rosti.cz containers
#[derive(Parser)]
#[command(
    name = "rostictl",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Company id to work with (overrides the one stored for this directory)
    #[arg(long, global = true)]
    pub company: Option<u64>,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print debug diagnostics to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a starter Rostifile in the current directory
    Init,

    /// Create or update the application and deploy the code
    Up(commands::up::UpArgs),

    /// Stop the application
    Down,

    /// Start the application
    Start,

    /// Restart the application
    Restart,

    /// Remove the application and forget it locally
    Rm,

    /// Show the application status
    Status,

    /// List available plans
    Plans,

    /// List companies accessible with the API token
    Companies,

    /// List available runtime images
    Runtimes,

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            company,
            quiet,
            no_color,
            verbose: _,
            command,
        } = self;
        let app = AppContext::new(&AppFlags {
            output: OutputFlags { no_color, quiet },
            company,
        });

        match command {
            Command::Init => commands::init::run(&app),
            Command::Up(args) => commands::up::run(&args, &app).await,
            Command::Down => commands::lifecycle::stop(&app).await,
            Command::Start => commands::lifecycle::start(&app).await,
            Command::Restart => commands::lifecycle::restart(&app).await,
            Command::Rm => commands::rm::run(&app).await,
            Command::Status => commands::status::run(&app).await,
            Command::Plans => commands::catalog::plans(&app).await,
            Command::Companies => commands::catalog::companies(&app).await,
            Command::Runtimes => commands::catalog::runtimes(&app).await,
            Command::Version => {
                commands::version::run(&app);
                Ok(())
            }
        }
    }
}
