//! JSON file storage for configs, package files, and install files.
//!
//! Reading a missing file fails with [`StorageError::NotFound`]. Storage never
//! falls back to a default document; the [`Project`](crate::manager::Project)
//! decides when a missing file means "start fresh".

mod config_file;
mod install_file;
mod package_file;

use anyhow::Context;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

pub use config_file::ConfigFileStorage;
pub use install_file::InstallFileStorage;
pub use package_file::PackageFileStorage;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("file {0:?} does not exist")]
    NotFound(PathBuf),

    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] anyhow::Error),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

#[tracing::instrument(skip(runtime))]
fn read_json<R: Runtime, T: DeserializeOwned>(runtime: &R, path: &Path) -> Result<T, StorageError> {
    if !runtime.exists(path) {
        return Err(StorageError::NotFound(path.to_path_buf()));
    }
    let content = runtime.read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| StorageError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[tracing::instrument(skip(runtime, value))]
fn write_json<R: Runtime, T: Serialize>(
    runtime: &R,
    value: &T,
    path: &Path,
) -> Result<(), StorageError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !runtime.exists(parent)
    {
        runtime.create_dir_all(parent)?;
    }

    let mut content = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {:?}", path))?;
    content.push('\n');
    runtime
        .write(path, content.as_bytes())
        .with_context(|| format!("Failed to save {:?}", path))?;
    Ok(())
}
