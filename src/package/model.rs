use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

use super::state::{self, PackageState};
use super::{InstallInfo, PackageFile};

/// Shown in place of a name for packages that have none.
pub const UNNAMED: &str = "(unnamed)";

/// Whether a package is the project itself or something installed into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackageRole {
    #[default]
    Regular,
    Root,
}

#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    #[error("install path must not be empty")]
    EmptyInstallPath,

    #[error("install path {0:?} is not absolute")]
    RelativeInstallPath(PathBuf),
}

/// An installed package.
///
/// Built once per discovered installation. Apart from [`state`](Self::state),
/// which is re-detected on demand, nothing changes after construction.
#[derive(Debug)]
pub struct Package {
    name: Option<String>,
    install_path: PathBuf,
    file: Option<PackageFile>,
    install_info: Option<InstallInfo>,
    load_error: Option<anyhow::Error>,
    role: PackageRole,
    state: PackageState,
}

impl Package {
    /// Build a regular package and detect its state.
    ///
    /// `file` is the loader's result: a package file, or the error that kept
    /// it from being produced.
    pub fn new<R: Runtime>(
        runtime: &R,
        file: anyhow::Result<PackageFile>,
        install_path: impl Into<PathBuf>,
        install_info: Option<InstallInfo>,
    ) -> Result<Self, PackageError> {
        Self::build(runtime, file, install_path.into(), install_info, PackageRole::Regular)
    }

    /// Build the project's own package and detect its state.
    pub fn root<R: Runtime>(
        runtime: &R,
        file: anyhow::Result<PackageFile>,
        install_path: impl Into<PathBuf>,
    ) -> Result<Self, PackageError> {
        Self::build(runtime, file, install_path.into(), None, PackageRole::Root)
    }

    fn build<R: Runtime>(
        runtime: &R,
        file: anyhow::Result<PackageFile>,
        install_path: PathBuf,
        install_info: Option<InstallInfo>,
        role: PackageRole,
    ) -> Result<Self, PackageError> {
        if install_path.as_os_str().is_empty() {
            return Err(PackageError::EmptyInstallPath);
        }
        if !install_path.is_absolute() {
            return Err(PackageError::RelativeInstallPath(install_path));
        }

        let (file, load_error) = match file {
            Ok(file) => (Some(file), None),
            Err(e) => (None, Some(e)),
        };
        let name = resolve_name(install_info.as_ref(), file.as_ref());

        let mut package = Self {
            name,
            install_path,
            file,
            install_info,
            load_error,
            role,
            state: PackageState::NotLoaded,
        };
        package.refresh_state(runtime);
        Ok(package)
    }

    /// The resolved name: install-time name, else the declared name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn display_name(&self) -> &str {
        self.name().unwrap_or(UNNAMED)
    }

    /// Absolute install path.
    pub fn install_path(&self) -> &Path {
        &self.install_path
    }

    pub fn file(&self) -> Option<&PackageFile> {
        self.file.as_ref()
    }

    pub fn install_info(&self) -> Option<&InstallInfo> {
        self.install_info.as_ref()
    }

    pub fn load_error(&self) -> Option<&anyhow::Error> {
        self.load_error.as_ref()
    }

    pub fn role(&self) -> PackageRole {
        self.role
    }

    pub fn is_root(&self) -> bool {
        self.role == PackageRole::Root
    }

    pub fn state(&self) -> PackageState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.state == PackageState::Enabled
    }

    pub fn reset_state(&mut self) {
        self.state = PackageState::NotLoaded;
    }

    /// Re-run state detection, overwriting the current state.
    pub fn refresh_state<R: Runtime>(&mut self, runtime: &R) -> PackageState {
        self.state = state::detect(runtime, self);
        self.state
    }
}

fn resolve_name(install_info: Option<&InstallInfo>, file: Option<&PackageFile>) -> Option<String> {
    install_info
        .and_then(|info| info.package_name.clone())
        .or_else(|| file.and_then(|f| f.name.clone()))
        .filter(|name| !name.is_empty())
}
