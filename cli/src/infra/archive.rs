//! Source packaging — implements `SourcePackager` with an uncompressed tar.
//!
//! The archive is spooled to an anonymous temp file so large trees never sit
//! in memory; the returned reader is positioned at its start.

use std::ffi::OsStr;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tar::{Builder, EntryType, Header};
use tokio::task::spawn_blocking;
use tracing::{debug, warn};

use crate::application::ports::SourcePackager;

/// Tar-based source packager.
pub struct TarPackager;

impl SourcePackager for TarPackager {
    async fn package(&self, source: &Path, exclude: &[String]) -> Result<Box<dyn Read + Send>> {
        let source = source.to_owned();
        let exclude = exclude.to_vec();
        let file = spawn_blocking(move || build_archive(&source, &exclude))
            .await
            .context("archive task panicked")??;
        Ok(Box::new(file))
    }
}

/// Build the archive of `source` into a temp file.
///
/// Entries are rooted under the base name of `source`; a source without a
/// base name (`.`) is archived without a prefix. A missing source, or one
/// whose own name is excluded, yields an empty archive.
///
/// # Errors
///
/// Returns an error if the tree cannot be read or the temp file written.
pub fn build_archive(source: &Path, exclude: &[String]) -> Result<File> {
    let spool = tempfile::tempfile().context("creating archive spool file")?;
    let mut builder = Builder::new(spool);
    builder.follow_symlinks(false);

    let mut entries = 0usize;
    match std::fs::symlink_metadata(source) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(source = %source.display(), "source path does not exist, archive is empty");
        }
        Err(e) => {
            return Err(e).with_context(|| format!("reading {}", source.display()));
        }
        Ok(_) if source.file_name().is_some_and(|name| is_excluded(name, exclude)) => {
            debug!(source = %source.display(), "source itself is excluded, archive is empty");
        }
        Ok(meta) => {
            let prefix = source.file_name().map(PathBuf::from).unwrap_or_default();
            if meta.is_dir() {
                if !prefix.as_os_str().is_empty() {
                    builder
                        .append_dir(&prefix, source)
                        .with_context(|| format!("archiving {}", source.display()))?;
                    entries += 1;
                }
                entries += append_tree(&mut builder, source, &prefix, exclude)?;
            } else {
                append_entry(&mut builder, source, &prefix, &meta)?;
                entries += 1;
            }
        }
    }

    let mut spool = builder
        .into_inner()
        .context("finishing archive")?;
    let size = spool.seek(SeekFrom::End(0)).context("sizing archive")?;
    spool.seek(SeekFrom::Start(0)).context("rewinding archive")?;
    debug!(source = %source.display(), entries, size, "created source archive");
    Ok(spool)
}

fn is_excluded(name: &OsStr, exclude: &[String]) -> bool {
    exclude.iter().any(|x| name.to_str() == Some(x.as_str()))
}

/// Append the children of `dir` depth-first, skipping excluded names.
fn append_tree(
    builder: &mut Builder<File>,
    dir: &Path,
    prefix: &Path,
    exclude: &[String],
) -> Result<usize> {
    let mut children = std::fs::read_dir(dir)
        .with_context(|| format!("listing {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("listing {}", dir.display()))?;
    children.sort_by_key(std::fs::DirEntry::file_name);

    let mut count = 0;
    for child in children {
        let name = child.file_name();
        if is_excluded(&name, exclude) {
            debug!(path = %child.path().display(), "excluded from archive");
            continue;
        }
        let path = child.path();
        let archive_name = prefix.join(&name);
        let meta = std::fs::symlink_metadata(&path)
            .with_context(|| format!("reading {}", path.display()))?;

        append_entry(builder, &path, &archive_name, &meta)?;
        count += 1;
        if meta.is_dir() {
            count += append_tree(builder, &path, &archive_name, exclude)?;
        }
    }
    Ok(count)
}

fn append_entry(
    builder: &mut Builder<File>,
    path: &Path,
    name: &Path,
    meta: &std::fs::Metadata,
) -> Result<()> {
    let file_type = meta.file_type();
    let result = if meta.is_dir() {
        builder.append_dir(name, path)
    } else if file_type.is_file() || file_type.is_symlink() {
        builder.append_path_with_name(path, name)
    } else {
        return append_special(builder, path, name, meta);
    };
    result.with_context(|| format!("archiving {}", path.display()))
}

/// Devices and pipes: header only, no content.
#[cfg(unix)]
fn append_special(
    builder: &mut Builder<File>,
    path: &Path,
    name: &Path,
    meta: &std::fs::Metadata,
) -> Result<()> {
    use std::os::unix::fs::{FileTypeExt, MetadataExt};

    let file_type = meta.file_type();
    let entry_type = if file_type.is_fifo() {
        EntryType::Fifo
    } else if file_type.is_char_device() {
        EntryType::Char
    } else if file_type.is_block_device() {
        EntryType::Block
    } else {
        debug!(path = %path.display(), "skipping socket");
        return Ok(());
    };

    let mut header = Header::new_gnu();
    header.set_entry_type(entry_type);
    header.set_mode(meta.mode());
    header.set_mtime(u64::try_from(meta.mtime()).unwrap_or_default());
    header.set_size(0);
    builder
        .append_data(&mut header, name, std::io::empty())
        .with_context(|| format!("archiving {}", path.display()))
}

#[cfg(not(unix))]
fn append_special(
    _builder: &mut Builder<File>,
    path: &Path,
    _name: &Path,
    _meta: &std::fs::Metadata,
) -> Result<()> {
    debug!(path = %path.display(), "skipping special file");
    Ok(())
}
