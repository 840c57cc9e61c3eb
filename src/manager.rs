//! The project: its root package file, the installed packages, and the config chain.
//!
//! A [`Project`] owns every config in the fallback chain
//! (root package config, then the global config file, then built-in
//! defaults), so the weak parent links stay valid for as long as the
//! project is alive.

use anyhow::{Context, Result, bail};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

use crate::{
    config::{Config, ConfigKey, SharedConfig},
    package::{
        CollectionError, DEFAULT_INSTALL_FILE, InstallFile, InstallInfo, Package,
        PackageCollection, PackageFile, PackageState, RootPackageFile,
    },
    runtime::{Runtime, normalize_path, resolve_relative_path},
    storage::{ConfigFileStorage, InstallFileStorage, PackageFileStorage, StorageError},
};

/// File name of a package file inside a package directory.
pub const PACKAGE_FILE_NAME: &str = "pkgmeta.json";

/// Overrides where the global config file lives.
pub const HOME_ENV: &str = "PKGMETA_HOME";

pub const GLOBAL_CONFIG_FILE: &str = "config.json";

/// Name given to a root package whose file does not declare one.
pub const DEFAULT_ROOT_NAME: &str = "__root__";

/// Location of the global config file.
///
/// `$PKGMETA_HOME/config.json` if the variable is set, otherwise
/// `<config dir>/pkgmeta/config.json`.
pub fn global_config_path<R: Runtime>(runtime: &R) -> Option<PathBuf> {
    if let Ok(home) = runtime.env_var(HOME_ENV)
        && !home.is_empty()
    {
        return Some(PathBuf::from(home).join(GLOBAL_CONFIG_FILE));
    }
    runtime
        .config_dir()
        .map(|dir| dir.join("pkgmeta").join(GLOBAL_CONFIG_FILE))
}

pub struct Project<'a, R: Runtime> {
    runtime: &'a R,
    root_dir: PathBuf,
    /// End of the fallback chain; only referenced weakly by `global`
    _defaults: SharedConfig,
    global: SharedConfig,
    global_path: Option<PathBuf>,
    root_file: RootPackageFile,
    install_file: InstallFile,
    packages: PackageCollection,
}

impl<'a, R: Runtime> Project<'a, R> {
    /// Load the project rooted at `root_dir`, using the standard global config location.
    pub fn load(runtime: &'a R, root_dir: &Path) -> Result<Self> {
        let global_path = global_config_path(runtime);
        Self::open(runtime, root_dir, global_path)
    }

    /// Load the project rooted at `root_dir` with an explicit global config location.
    ///
    /// Missing files are replaced by fresh documents; nothing is written until
    /// one of the `save_*` methods is called.
    #[tracing::instrument(skip(runtime))]
    pub fn open(runtime: &'a R, root_dir: &Path, global_path: Option<PathBuf>) -> Result<Self> {
        let root_dir = if root_dir.is_absolute() {
            normalize_path(root_dir)
        } else {
            let cwd = runtime.current_dir()?;
            resolve_relative_path(&cwd, root_dir)
        };
        debug!("Loading project at {:?}", root_dir);

        let defaults = Config::defaults().into_shared();

        let mut global = match &global_path {
            Some(path) => or_create(
                ConfigFileStorage::new(runtime).read(path),
                "global config",
                Config::new,
            )?,
            None => {
                debug!("No global config location available");
                Config::new()
            }
        };
        global.set_parent(&defaults)?;
        let global = global.into_shared();

        let root_path = root_dir.join(PACKAGE_FILE_NAME);
        let mut root_file = or_create(
            PackageFileStorage::new(runtime).read_root(&root_path),
            "root package file",
            || {
                let mut file = RootPackageFile::default();
                file.package.path = Some(root_path.clone());
                file
            },
        )?;
        root_file.config_mut().set_parent(&global)?;

        let install_path = install_file_path(&root_dir, &root_file);
        let install_file = or_create(
            InstallFileStorage::new(runtime).read(&install_path),
            "install file",
            || InstallFile::new(&install_path),
        )?;

        let mut project = Self {
            runtime,
            root_dir,
            _defaults: defaults,
            global,
            global_path,
            root_file,
            install_file,
            packages: PackageCollection::new(),
        };
        project.build_collection()?;
        Ok(project)
    }

    fn build_collection(&mut self) -> Result<()> {
        let root = self.root_package()?;
        self.packages.add(root)?;

        for info in self.install_file.iter() {
            let package = load_installed(self.runtime, &self.root_dir, info.clone())?;
            let Some(name) = package.name() else {
                warn!(
                    "Skipping package at {:?}: it has no name",
                    package.install_path()
                );
                continue;
            };
            if self.packages.contains(name) {
                warn!(
                    "Skipping package at {:?}: the name {} is already taken",
                    package.install_path(),
                    name
                );
                continue;
            }
            self.packages.add(package)?;
        }

        debug!("Project has {} package(s)", self.packages.len());
        Ok(())
    }

    fn root_package(&self) -> Result<Package> {
        let mut file = self.root_file.package.clone();
        if file.name.as_deref().is_none_or(str::is_empty) {
            file.name = Some(DEFAULT_ROOT_NAME.to_string());
        }
        Package::root(self.runtime, Ok(file), self.root_dir.clone())
            .context("Failed to build the root package")
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn packages(&self) -> &PackageCollection {
        &self.packages
    }

    pub fn install_file(&self) -> &InstallFile {
        &self.install_file
    }

    /// The effective project config: root settings backed by global and default values.
    pub fn config(&self) -> &Config {
        self.root_file.config()
    }

    pub fn config_mut(&mut self) -> &mut Config {
        self.root_file.config_mut()
    }

    pub fn global_config(&self) -> &SharedConfig {
        &self.global
    }

    pub fn global_config_path(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    pub fn enabled_packages(&self) -> Vec<&Package> {
        self.packages.with_state(PackageState::Enabled).collect()
    }

    /// Resolved value of a path key, made absolute against the project root.
    pub fn resolve_path(&self, key: ConfigKey) -> Result<Option<PathBuf>> {
        let value = self
            .config()
            .get_string(key)
            .with_context(|| format!("Failed to read '{}'", key))?;
        Ok(value.map(|v| resolve_relative_path(&self.root_dir, Path::new(&v))))
    }

    /// Record an installation and add the package to the collection.
    ///
    /// The install path is recorded relative to the project root when it lies
    /// inside it, so different spellings of one directory share an entry.
    #[tracing::instrument(skip(self))]
    pub fn install(&mut self, mut info: InstallInfo) -> Result<&Package> {
        info.install_path = recorded_install_path(&self.root_dir, &info.install_path);
        let package = load_installed(self.runtime, &self.root_dir, info.clone())?;
        let name = match package.name() {
            Some(name) => name.to_string(),
            None => bail!(
                "Package at {:?} declares no name; pass one explicitly",
                package.install_path()
            ),
        };

        if let Ok(existing) = self.packages.get(&name)
            && (existing.is_root() || existing.install_path() != package.install_path())
        {
            bail!(
                "A package named {} already exists at {:?}",
                name,
                existing.install_path()
            );
        }

        // Reinstalling a path drops the old entry, whatever it was named or recorded as.
        let previous = self
            .packages
            .iter()
            .find(|p| !p.is_root() && p.install_path() == package.install_path())
            .map(|p| {
                (
                    p.name().map(str::to_owned),
                    p.install_info().map(|i| i.install_path.clone()),
                )
            });
        if let Some((previous_name, previous_path)) = previous {
            if let Some(previous_name) = previous_name
                && previous_name != name
            {
                debug!("Replacing {} installed at the same path", previous_name);
                self.packages.remove(&previous_name);
            }
            if let Some(previous_path) = previous_path
                && previous_path != info.install_path
            {
                self.install_file.remove(&previous_path);
            }
        }

        self.packages.add(package)?;
        self.install_file.add(info);
        self.save_install_file()?;
        info!("Installed {}", name);

        Ok(self.packages.get(&name)?)
    }

    /// Forget an installed package. The root package cannot be removed.
    #[tracing::instrument(skip(self))]
    pub fn uninstall(&mut self, name: &str) -> Result<Package> {
        if self.packages.get(name)?.is_root() {
            bail!("{} is the root package and cannot be removed", name);
        }
        let package = self
            .packages
            .remove(name)
            .ok_or_else(|| CollectionError::NotFound(name.to_string()))?;

        if let Some(info) = package.install_info() {
            self.install_file.remove(&info.install_path);
        }
        self.save_install_file()?;
        info!("Removed {}", name);

        Ok(package)
    }

    /// Write the root package file and refresh the root entry of the collection.
    pub fn save_root(&mut self) -> Result<()> {
        let path = self
            .root_file
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root_dir.join(PACKAGE_FILE_NAME));
        PackageFileStorage::new(self.runtime)
            .write_root(&self.root_file, &path)
            .context("Failed to save the root package file")?;
        self.root_file.package.path = Some(path);

        let root = self.root_package()?;
        self.packages.add(root)?;
        Ok(())
    }

    pub fn save_global(&self) -> Result<()> {
        let path = self
            .global_path
            .as_ref()
            .with_context(|| format!("No location for the global config; set {}", HOME_ENV))?;
        ConfigFileStorage::new(self.runtime)
            .write(&self.global.borrow(), path)
            .context("Failed to save the global config")?;
        Ok(())
    }

    pub fn save_install_file(&self) -> Result<()> {
        let path = self
            .install_file
            .path
            .clone()
            .unwrap_or_else(|| install_file_path(&self.root_dir, &self.root_file));
        InstallFileStorage::new(self.runtime)
            .write(&self.install_file, &path)
            .context("Failed to save the install file")?;
        Ok(())
    }
}

fn install_file_path(root_dir: &Path, root_file: &RootPackageFile) -> PathBuf {
    let relative = if root_file.install_file.as_os_str().is_empty() {
        Path::new(DEFAULT_INSTALL_FILE)
    } else {
        root_file.install_file.as_path()
    };
    resolve_relative_path(root_dir, relative)
}

/// Path to record in the install file for `path`.
///
/// Paths inside the project are stored relative to it; others are stored
/// absolute. Either way `.` and `..` components are resolved.
fn recorded_install_path(root_dir: &Path, path: &Path) -> PathBuf {
    let resolved = resolve_relative_path(root_dir, path);
    match resolved.strip_prefix(root_dir) {
        Ok(relative) if !relative.as_os_str().is_empty() => relative.to_path_buf(),
        _ => resolved,
    }
}

/// Use a freshly created document when the file does not exist yet.
fn or_create<T>(
    loaded: Result<T, StorageError>,
    what: &str,
    create: impl FnOnce() -> T,
) -> Result<T> {
    match loaded {
        Ok(value) => Ok(value),
        Err(StorageError::NotFound(path)) => {
            info!("No {} at {:?}, starting with a new one", what, path);
            Ok(create())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to load the {}", what)),
    }
}

/// Build the package recorded by `info`.
///
/// A missing package file yields an empty one. A file that cannot be read
/// or parsed becomes the package's load error.
fn load_installed<R: Runtime>(runtime: &R, root_dir: &Path, info: InstallInfo) -> Result<Package> {
    let install_path = resolve_relative_path(root_dir, &info.install_path);
    let file = match PackageFileStorage::new(runtime).read(&install_path.join(PACKAGE_FILE_NAME)) {
        Ok(file) => Ok(file),
        Err(StorageError::NotFound(_)) => Ok(PackageFile::default()),
        Err(e) => {
            warn!("Cannot load package at {:?}: {}", install_path, e);
            Err(e.into())
        }
    };
    let package = Package::new(runtime, file, install_path, Some(info))?;
    Ok(package)
}
