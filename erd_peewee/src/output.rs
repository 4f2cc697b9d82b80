//! Output directory handling for the host
//!
//! The compiler returns a complete module; this module is where it reaches
//! the filesystem. Nothing is written unless compilation succeeded.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::schema::emitter::GeneratedModule;

/// What happened to the package directory before writing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryState {
    Created,
    Overwritten,
    Reused,
}

/// Directory a package is generated into: `<base>/<package lower-cased>`
pub fn package_dir(base: &Path, package: &str) -> PathBuf {
    base.join(package.to_lowercase())
}

/// Make sure the package directory exists
///
/// An existing directory is wiped when `overwrite` is set, otherwise reused.
pub fn prepare_dir(dir: &Path, overwrite: bool) -> Result<DirectoryState> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
        return Ok(DirectoryState::Created);
    }

    if overwrite {
        tracing::info!(path = %dir.display(), "Overwriting previous folder");
        fs::remove_dir_all(dir)?;
        fs::create_dir_all(dir)?;
        Ok(DirectoryState::Overwritten)
    } else {
        tracing::info!(path = %dir.display(), "Using existing folder");
        Ok(DirectoryState::Reused)
    }
}

/// Write the module into `dir`, returning the file path
pub fn write_module(dir: &Path, module: &GeneratedModule) -> Result<PathBuf> {
    let path = dir.join(&module.file_name);
    fs::write(&path, module.content())?;
    tracing::info!(path = %path.display(), "Wrote generated module");
    Ok(path)
}
