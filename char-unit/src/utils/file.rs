//! This file contains helper to manipulate files from the application.

use std::env;
use std::path::{Path, PathBuf};

use crate::errors::Error;

/// Resolves a given file path relative to app root (as opposed to console path) into an absolute path.
///
/// # Parameters
/// * `path`: The path for the file to resolve.
///
/// # Return
/// Returns a `Result<PathBuf, Error>` matching the resolved absolute file path.
pub fn resolve_file<P: AsRef<Path>>(path: P) -> Result<PathBuf, Error> {
    let file_path = path.as_ref();
    let absolute_path: PathBuf = match file_path.is_absolute() {
        true => file_path.to_path_buf(),
        false => env::current_dir()?.join(file_path),
    };
    Ok(absolute_path)
}
