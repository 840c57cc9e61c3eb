use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::runtime::Runtime;

use super::Package;

/// Whether an installed package can be used.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PackageState {
    /// Detection has not run yet, or the state was reset
    #[default]
    NotLoaded,
    /// The install path does not exist
    NotFound,
    /// The package file could not be loaded
    NotLoadable,
    /// Loaded and present on disk
    Enabled,
}

impl PackageState {
    pub const ALL: [PackageState; 4] = [
        PackageState::NotLoaded,
        PackageState::NotFound,
        PackageState::NotLoadable,
        PackageState::Enabled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PackageState::NotLoaded => "not-loaded",
            PackageState::NotFound => "not-found",
            PackageState::NotLoadable => "not-loadable",
            PackageState::Enabled => "enabled",
        }
    }
}

impl fmt::Display for PackageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageState {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PackageState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown package state: {}", s))
    }
}

/// Work out the state of a package.
///
/// A recorded load error wins over everything else; otherwise the package is
/// enabled exactly when its install path exists. Never returns
/// [`PackageState::NotLoaded`].
#[tracing::instrument(skip(runtime, package), fields(package = package.display_name()))]
pub fn detect<R: Runtime>(runtime: &R, package: &Package) -> PackageState {
    let state = if package.load_error().is_some() {
        PackageState::NotLoadable
    } else if !runtime.exists(package.install_path()) {
        PackageState::NotFound
    } else {
        PackageState::Enabled
    };
    debug!("Detected state {} for {}", state, package.display_name());
    state
}
