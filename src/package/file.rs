use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::{Config, SharedConfig};

/// Default location of the install file, relative to the project root.
pub const DEFAULT_INSTALL_FILE: &str = ".pkgmeta/install.json";

/// Metadata a package declares about itself in its `pkgmeta.json`.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct PackageFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Where the file was read from, if it was read at all
    #[serde(skip)]
    pub path: Option<PathBuf>,

    /// Repository path to filesystem path mappings
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub resources: BTreeMap<String, String>,

    /// Names of packages whose resources this package overrides
    #[serde(rename = "override", default, skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<String>,

    /// Package-level config override; empty when the package declares none
    #[serde(default, skip_serializing_if = "Config::is_empty")]
    pub config: Config,
}

impl PackageFile {
    pub fn new(name: Option<String>) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn add_resource(&mut self, repository_path: impl Into<String>, path: impl Into<String>) {
        self.resources.insert(repository_path.into(), path.into());
    }

    /// Record that this package overrides `name`. Duplicates are ignored.
    pub fn add_override(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.overrides.contains(&name) {
            self.overrides.push(name);
        }
    }

    pub fn remove_override(&mut self, name: &str) {
        self.overrides.retain(|n| n != name);
    }

    pub fn is_overriding(&self, name: &str) -> bool {
        self.overrides.iter().any(|n| n == name)
    }
}

fn default_install_file() -> PathBuf {
    PathBuf::from(DEFAULT_INSTALL_FILE)
}

/// The package file of the project itself.
///
/// Its config is the most specific link of the project's fallback chain.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RootPackageFile {
    #[serde(flatten)]
    pub package: PackageFile,

    /// Install file listing the installed packages, relative to the project root
    #[serde(rename = "install-file", default = "default_install_file")]
    pub install_file: PathBuf,
}

impl RootPackageFile {
    /// A fresh root file whose config falls back to `base`.
    pub fn new(name: Option<String>, base: Option<&SharedConfig>) -> Self {
        let mut package = PackageFile::new(name);
        if let Some(base) = base {
            package.config = Config::with_parent(base);
        }
        Self {
            package,
            install_file: default_install_file(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.package.name.as_deref()
    }

    pub fn path(&self) -> Option<&Path> {
        self.package.path.as_deref()
    }

    pub fn config(&self) -> &Config {
        &self.package.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.package.config
    }
}

impl Default for RootPackageFile {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigKey;

    #[test]
    fn test_package_file_minimal_json() {
        let file: PackageFile = serde_json::from_str("{}").unwrap();
        assert!(file.name.is_none());
        assert!(file.resources.is_empty());
        assert!(file.config.is_empty());

        assert_eq!(serde_json::to_string(&file).unwrap(), "{}");
    }

    #[test]
    fn test_package_file_full_json() {
        let file: PackageFile = serde_json::from_str(
            r#"{
                "name": "acme/util",
                "resources": { "/acme/util": "res" },
                "override": ["acme/base"],
                "config": { "cache": "tmp/cache" }
            }"#,
        )
        .unwrap();

        assert_eq!(file.name.as_deref(), Some("acme/util"));
        assert_eq!(file.resources["/acme/util"], "res");
        assert!(file.is_overriding("acme/base"));
        assert_eq!(
            file.config.get_string(ConfigKey::Cache).unwrap(),
            Some("tmp/cache".into())
        );
    }

    #[test]
    fn test_package_file_rejects_invalid_config() {
        let result = serde_json::from_str::<PackageFile>(r#"{ "config": { "dir": "" } }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_are_deduplicated() {
        let mut file = PackageFile::new(Some("acme/app".into()));
        file.add_override("acme/base");
        file.add_override("acme/base");
        assert_eq!(file.overrides, vec!["acme/base"]);

        file.remove_override("acme/base");
        assert!(!file.is_overriding("acme/base"));
    }

    #[test]
    fn test_root_file_defaults_install_file() {
        let root: RootPackageFile = serde_json::from_str(r#"{ "name": "acme/app" }"#).unwrap();
        assert_eq!(root.name(), Some("acme/app"));
        assert_eq!(root.install_file, PathBuf::from(DEFAULT_INSTALL_FILE));
        assert!(root.config().is_empty());
    }

    #[test]
    fn test_root_file_config_falls_back_to_base() {
        let base = Config::defaults().into_shared();
        let mut root = RootPackageFile::new(Some("acme/app".into()), Some(&base));

        assert_eq!(
            root.config().get_string(ConfigKey::RepoConfig).unwrap(),
            Some(".pkgmeta/packages.json".into())
        );

        root.config_mut().set(ConfigKey::Dir, "var").unwrap();
        assert_eq!(
            root.config().get_string(ConfigKey::RepoConfig).unwrap(),
            Some("var/packages.json".into())
        );
    }

    #[test]
    fn test_root_file_serializes_flat() {
        let mut root = RootPackageFile::new(Some("acme/app".into()), None);
        root.config_mut().set(ConfigKey::Cache, ".x/cache").unwrap();

        let json = serde_json::to_value(&root).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "acme/app",
                "config": { "cache": ".x/cache" },
                "install-file": DEFAULT_INSTALL_FILE
            })
        );
    }
}
