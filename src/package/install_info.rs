use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Installer recorded when none is given.
pub const DEFAULT_INSTALLER: &str = "user";

fn default_installer() -> String {
    DEFAULT_INSTALLER.to_string()
}

/// What was recorded when a package was installed.
///
/// Kept apart from the package's own [`PackageFile`](super::PackageFile): the
/// name given here wins over the name the package declares.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct InstallInfo {
    /// Install path as given at install time; may be relative to the project root
    pub install_path: PathBuf,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,

    #[serde(default = "default_installer")]
    pub installer: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    enabled_bindings: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    disabled_bindings: Vec<String>,
}

impl InstallInfo {
    pub fn new(install_path: impl Into<PathBuf>) -> Self {
        Self {
            install_path: install_path.into(),
            package_name: None,
            installer: default_installer(),
            enabled_bindings: Vec::new(),
            disabled_bindings: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.package_name = Some(name.into());
        self
    }

    pub fn enabled_bindings(&self) -> &[String] {
        &self.enabled_bindings
    }

    pub fn disabled_bindings(&self) -> &[String] {
        &self.disabled_bindings
    }

    /// Mark a binding as enabled, clearing any earlier disable.
    pub fn enable_binding(&mut self, id: impl Into<String>) {
        let id = id.into();
        self.disabled_bindings.retain(|b| *b != id);
        if !self.enabled_bindings.contains(&id) {
            self.enabled_bindings.push(id);
        }
    }

    /// Mark a binding as disabled, clearing any earlier enable.
    pub fn disable_binding(&mut self, id: impl Into<String>) {
        let id = id.into();
        self.enabled_bindings.retain(|b| *b != id);
        if !self.disabled_bindings.contains(&id) {
            self.disabled_bindings.push(id);
        }
    }

    /// Forget any decision recorded for a binding.
    pub fn clear_binding(&mut self, id: &str) {
        self.enabled_bindings.retain(|b| b != id);
        self.disabled_bindings.retain(|b| b != id);
    }

    pub fn is_binding_enabled(&self, id: &str) -> bool {
        self.enabled_bindings.iter().any(|b| b == id)
    }

    pub fn is_binding_disabled(&self, id: &str) -> bool {
        self.disabled_bindings.iter().any(|b| b == id)
    }
}

/// The ordered list of installed packages, keyed by install path.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallFile {
    #[serde(skip)]
    pub path: Option<PathBuf>,

    #[serde(default)]
    packages: Vec<InstallInfo>,
}

impl InstallFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            packages: Vec::new(),
        }
    }

    /// Record an installation. An entry with the same install path is replaced in place.
    pub fn add(&mut self, info: InstallInfo) {
        match self
            .packages
            .iter_mut()
            .find(|p| p.install_path == info.install_path)
        {
            Some(existing) => *existing = info,
            None => self.packages.push(info),
        }
    }

    pub fn remove(&mut self, install_path: &Path) -> Option<InstallInfo> {
        let index = self
            .packages
            .iter()
            .position(|p| p.install_path == install_path)?;
        Some(self.packages.remove(index))
    }

    pub fn get(&self, install_path: &Path) -> Option<&InstallInfo> {
        self.packages.iter().find(|p| p.install_path == install_path)
    }

    pub fn contains(&self, install_path: &Path) -> bool {
        self.get(install_path).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InstallInfo> {
        self.packages.iter()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}
