//! Disposable copies of live profile stores
//!
//! Chromium keeps its SQLite stores open and locked while running. Every read
//! goes through a private copy in its own directory under the scratch
//! directory. SQLite may add `-wal`/`-shm` files next to the copy; the whole
//! directory is removed when the [`Snapshot`] is dropped, whatever happened
//! while it was in use.

use crate::error::{ForensicsError, Result};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tempfile::{Builder, TempDir};

/// A private, temporary copy of an artifact store
#[derive(Debug)]
pub struct Snapshot {
    source_path: PathBuf,
    acquired_at: SystemTime,
    path: PathBuf,
    _dir: TempDir,
}

impl Snapshot {
    /// Copy `source` byte-for-byte into a uniquely named directory under `scratch_dir`.
    ///
    /// The source is opened read-only and closed before this returns. On
    /// failure no partial copy is left behind.
    pub fn acquire(source: &Path, scratch_dir: &Path) -> Result<Self> {
        let name = sanitized_name(source);
        let dir = Builder::new()
            .prefix(&format!("{}-{}-", name, std::process::id()))
            .suffix(".snapshot")
            .tempdir_in(scratch_dir)
            .map_err(|e| {
                ForensicsError::Snapshot(format!(
                    "Failed to create snapshot in {:?}: {}",
                    scratch_dir, e
                ))
            })?;

        let path = dir.path().join(&name);
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| {
                ForensicsError::Snapshot(format!("Failed to create {:?}: {}", path, e))
            })?;
        copy_into(source, &mut file)?;

        log::debug!("Snapshot of {:?} written to {:?}", source, path);
        Ok(Self {
            source_path: source.to_path_buf(),
            acquired_at: SystemTime::now(),
            path,
            _dir: dir,
        })
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Location of the private copy; valid until the snapshot is dropped.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn acquired_at(&self) -> SystemTime {
        self.acquired_at
    }
}

fn copy_into(source: &Path, target: &mut File) -> Result<()> {
    let mut reader = File::open(source).map_err(|e| map_copy_error(source, e))?;
    io::copy(&mut reader, target).map_err(|e| map_copy_error(source, e))?;
    target.flush()?;
    target.sync_all()?;
    Ok(())
}

fn map_copy_error(source: &Path, err: io::Error) -> ForensicsError {
    match err.kind() {
        io::ErrorKind::NotFound => {
            ForensicsError::FileNotFound(format!("Store vanished before copy: {:?}", source))
        }
        io::ErrorKind::PermissionDenied => {
            ForensicsError::PermissionDenied(format!("Cannot read store {:?}: {}", source, err))
        }
        _ => ForensicsError::Snapshot(format!("Failed to copy {:?}: {}", source, err)),
    }
}

fn sanitized_name(source: &Path) -> String {
    let name = source
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("store");
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
