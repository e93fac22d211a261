//! Interactive prompts backed by dialoguer.

use std::path::PathBuf;

use anyhow::{Context, Result};
use dialoguer::{Input, Password, Select};
use rosti_common::Company;

use crate::application::ports::CompanyChooser;
use crate::domain::config::validate_token;

/// Terminal prompts for the choices the deployment needs from the user.
pub struct DialoguerPrompt;

impl CompanyChooser for DialoguerPrompt {
    fn choose_company(&self, companies: &[Company]) -> Result<u64> {
        let items: Vec<String> = companies
            .iter()
            .map(|c| format!("{} ({})", c.name, c.id))
            .collect();
        let idx = Select::new()
            .with_prompt("Select company")
            .items(&items)
            .default(0)
            .interact()
            .context("company selection")?;
        companies
            .get(idx)
            .map(|c| c.id)
            .ok_or_else(|| anyhow::anyhow!("no company selected"))
    }
}

impl DialoguerPrompt {
    /// Let the user pick one of the discovered private keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the selection cannot be read.
    pub fn choose_key(&self, keys: &[PathBuf]) -> Result<PathBuf> {
        let items: Vec<String> = keys.iter().map(|k| k.display().to_string()).collect();
        let idx = Select::new()
            .with_prompt("Select SSH key used for this project")
            .items(&items)
            .default(0)
            .interact()
            .context("SSH key selection")?;
        keys.get(idx)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no SSH key selected"))
    }

    /// Ask for a private key path when none was discovered.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read.
    pub fn ask_key_path(&self) -> Result<String> {
        Input::<String>::new()
            .with_prompt("No SSH key found in ~/.ssh. Path to your private key")
            .interact_text()
            .context("SSH key path")
    }

    /// Ask for the passphrase of a protected key.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read.
    pub fn ask_passphrase(&self, key: &std::path::Path) -> Result<String> {
        Password::new()
            .with_prompt(format!("Passphrase for {}", key.display()))
            .interact()
            .context("SSH key passphrase")
    }

    /// Ask for an API token, re-prompting until it has the right shape.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read.
    pub fn ask_token(&self) -> Result<String> {
        Input::<String>::new()
            .with_prompt("API token")
            .validate_with(|input: &String| validate_token(input.trim()).map_err(|e| e.to_string()))
            .interact_text()
            .map(|t| t.trim().to_string())
            .context("API token")
    }

    /// Ask for a line of text, offering `default` when given.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read.
    pub fn ask_text(&self, prompt: &str, default: Option<&str>) -> Result<String> {
        let mut input = Input::<String>::new().with_prompt(prompt);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        input
            .interact_text()
            .map(|value| value.trim().to_string())
            .with_context(|| prompt.to_string())
    }

    /// Let the user pick one of `items`, returning its index.
    ///
    /// # Errors
    ///
    /// Returns an error if the selection cannot be read.
    pub fn choose(&self, prompt: &str, items: &[&str]) -> Result<usize> {
        Select::new()
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact()
            .with_context(|| prompt.to_string())
    }
}
