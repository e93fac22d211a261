//! Application context — unified state passed to every command handler.
//!
//! `AppContext` owns the output context, the config store, and the global
//! flags. Commands ask it for an API client instead of resolving the token
//! themselves.

use anyhow::{Context, Result};
use console::Term;

use crate::application::ports::ConfigStore;
use crate::domain::config::{RostiConfig, validate_token};
use crate::domain::error::ConfigError;
use crate::infra::api::RostiApiClient;
use crate::infra::config::YamlConfigStore;
use crate::infra::prompt::DialoguerPrompt;
use crate::output::{HumanRenderer, OutputContext, TerminalReporter};

/// Environment variable overriding the stored API token.
pub const TOKEN_ENV: &str = "ROSTI_TOKEN";

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Output rendering options.
    pub output: OutputFlags,
    /// Company id given with `--company`.
    pub company: Option<u64>,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Company id overriding the one stored in local state.
    pub company: Option<u64>,
    /// Client configuration file.
    pub config_store: YamlConfigStore,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    #[must_use]
    pub fn new(flags: &AppFlags) -> Self {
        Self {
            output: OutputContext::new(flags.output.no_color, flags.output.quiet),
            company: flags.company,
            config_store: YamlConfigStore::new(),
        }
    }

    /// Progress reporter bound to this context's output.
    #[must_use]
    pub fn reporter(&self) -> TerminalReporter<'_> {
        TerminalReporter::new(&self.output)
    }

    /// Renderer bound to this context's output.
    #[must_use]
    pub fn renderer(&self) -> HumanRenderer<'_> {
        HumanRenderer::new(&self.output)
    }

    /// Load the client configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn config(&self) -> Result<RostiConfig> {
        self.config_store.load()
    }

    /// Build an API client for the configured endpoint and token.
    ///
    /// # Errors
    ///
    /// Returns an error if no valid token can be obtained or the HTTP client
    /// cannot be built.
    pub fn api_client(&self, config: &RostiConfig) -> Result<RostiApiClient> {
        let token = self.resolve_token(config)?;
        RostiApiClient::new(&config.api_url, &token)
    }

    /// Token from `ROSTI_TOKEN`, then the config file, then an interactive
    /// prompt whose answer is saved back to the config file.
    fn resolve_token(&self, config: &RostiConfig) -> Result<String> {
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            let token = token.trim().to_string();
            validate_token(&token)?;
            tracing::debug!("using API token from {TOKEN_ENV}");
            return Ok(token);
        }
        if !config.token.is_empty() {
            validate_token(&config.token)?;
            return Ok(config.token.clone());
        }

        let path = self.config_store.path()?;
        if !Term::stderr().is_term() {
            return Err(ConfigError::MissingToken(path.display().to_string()).into());
        }
        let token = DialoguerPrompt.ask_token()?;
        let mut updated = config.clone();
        updated.token.clone_from(&token);
        self.config_store
            .save(&updated)
            .with_context(|| format!("saving API token to {}", path.display()))?;
        self.output
            .info(&format!("API token saved to {}", path.display()));
        Ok(token)
    }
}
