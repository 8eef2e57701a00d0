//! Utility functions and helpers

use crate::error::{ForensicsError, Result};
use std::path::{Path, PathBuf};

/// File system utilities
pub struct FileUtils;

impl FileUtils {
    /// Expand tilde (~) in file paths
    pub fn expand_path(path: &str) -> Result<PathBuf> {
        if let Some(rest) = path.strip_prefix('~') {
            let home_dir = dirs::home_dir().ok_or_else(|| {
                ForensicsError::Config("Cannot determine home directory".to_string())
            })?;
            Ok(home_dir.join(rest.trim_start_matches(['/', '\\'])))
        } else {
            Ok(PathBuf::from(path))
        }
    }

    /// Check if file exists and is readable
    pub fn check_file_readable(path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(ForensicsError::FileNotFound(format!(
                "File not found: {:?}",
                path
            )));
        }

        if !path.is_file() {
            return Err(ForensicsError::Config(format!(
                "Path is not a file: {:?}",
                path
            )));
        }

        std::fs::File::open(path).map_err(|e| {
            ForensicsError::PermissionDenied(format!("Cannot read file {:?}: {}", path, e))
        })?;

        Ok(())
    }

    /// Check if directory exists and can be listed
    pub fn check_dir_readable(path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(ForensicsError::FileNotFound(format!(
                "Directory not found: {:?}",
                path
            )));
        }

        if !path.is_dir() {
            return Err(ForensicsError::Config(format!(
                "Path is not a directory: {:?}",
                path
            )));
        }

        std::fs::read_dir(path).map_err(|e| {
            ForensicsError::PermissionDenied(format!("Cannot list directory {:?}: {}", path, e))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests;
