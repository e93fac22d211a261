//! Local SSH key discovery and loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::error::RemoteError;

/// Private keys in `ssh_dir`: files named `id_*` without the `.pub` suffix.
///
/// # Errors
///
/// Returns an error if the directory exists but cannot be listed.
pub fn discover_keys(ssh_dir: &Path) -> Result<Vec<PathBuf>> {
    if !ssh_dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut keys = Vec::new();
    for entry in
        std::fs::read_dir(ssh_dir).with_context(|| format!("listing {}", ssh_dir.display()))?
    {
        let entry = entry.with_context(|| format!("listing {}", ssh_dir.display()))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name.starts_with("id_")
            && !name.ends_with(".pub")
            && entry.file_type().is_ok_and(|t| t.is_file())
        {
            keys.push(entry.path());
        }
    }
    keys.sort();
    Ok(keys)
}

/// The user's `~/.ssh` directory.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn default_ssh_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.join(".ssh"))
}

/// Expand a leading `~` to the home directory.
///
/// # Errors
///
/// Returns an error if the path starts with `~` and the home directory
/// cannot be determined.
pub fn expand_tilde(path: &str) -> Result<PathBuf> {
    let rest = match path.strip_prefix('~') {
        None => return Ok(PathBuf::from(path)),
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        // `~user` is not expanded.
        Some(_) => return Ok(PathBuf::from(path)),
    };
    let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(if rest.is_empty() { home } else { home.join(rest) })
}

/// Path of the public half of `private_key`.
#[must_use]
pub fn public_key_path(private_key: &Path) -> PathBuf {
    let mut path = private_key.as_os_str().to_owned();
    path.push(".pub");
    PathBuf::from(path)
}

/// Check that both halves of the key pair exist.
///
/// # Errors
///
/// Returns [`RemoteError::KeyLoad`] naming the missing file.
pub fn ensure_key_pair(private_key: &Path) -> Result<()> {
    for path in [private_key.to_path_buf(), public_key_path(private_key)] {
        if !path.is_file() {
            return Err(RemoteError::KeyLoad {
                path: path.display().to_string(),
                reason: "file not found".to_string(),
            }
            .into());
        }
    }
    Ok(())
}

/// Read the public key that is authorized on the container.
///
/// # Errors
///
/// Returns an error if `<private_key>.pub` cannot be read or is empty.
pub fn read_public_key(private_key: &Path) -> Result<String> {
    let path = public_key_path(private_key);
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("reading public key {}", path.display()))?;
    let key = content.trim();
    if key.is_empty() {
        return Err(RemoteError::KeyLoad {
            path: path.display().to_string(),
            reason: "file is empty".to_string(),
        }
        .into());
    }
    Ok(key.to_string())
}
