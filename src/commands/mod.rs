//! Command implementations behind the `pkgmeta` binary.
//!
//! Each command loads the project, does its work, and prints to stdout. The
//! printing half takes a writer so tests can capture the output.

use anyhow::Result;
use std::path::PathBuf;

use crate::runtime::Runtime;

mod config;
mod install;
mod list;
mod plugin;

pub use config::{config_get, config_list, config_remove, config_set};
pub use install::{install, remove};
pub use list::{ListOptions, list};
pub use plugin::{plugin_add, plugin_list, plugin_remove};

/// Project root from `--root`, else the current directory.
fn project_root<R: Runtime>(runtime: &R, root: Option<PathBuf>) -> Result<PathBuf> {
    match root {
        Some(path) => Ok(path),
        None => runtime.current_dir(),
    }
}
