//! Ordered registry of packages.
//!
//! Iteration order is insertion order, and callers rely on it: a package
//! added earlier has lower precedence when resources overlap. The root
//! package keeps its insertion position; it is only left out of the
//! "installed" views.
//!
//! Two collision policies apply on [`PackageCollection::add`]:
//!
//! - A package whose name is already present replaces the existing entry in
//!   place. If the replaced entry was the root and the newcomer is not, the
//!   collection no longer has a root.
//! - A root package is rejected with [`CollectionError::RootConflict`] while a
//!   root with a different name is present. Remove the old root first.

use log::debug;
use std::path::PathBuf;

use crate::runtime::Runtime;

use super::{Package, PackageState};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectionError {
    #[error("package '{0}' is not installed")]
    NotFound(String),

    #[error("package at {0:?} has no name")]
    Unnamed(PathBuf),

    #[error("cannot add root package '{incoming}': '{current}' is already the root package")]
    RootConflict { current: String, incoming: String },
}

#[derive(Debug, Default)]
pub struct PackageCollection {
    packages: Vec<Package>,
    /// Name of the entry holding the root role
    root: Option<String>,
}

impl PackageCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a package, or replace the entry with the same name in place.
    pub fn add(&mut self, package: Package) -> Result<(), CollectionError> {
        let name = package
            .name()
            .ok_or_else(|| CollectionError::Unnamed(package.install_path().to_path_buf()))?
            .to_string();

        if package.is_root()
            && let Some(current) = &self.root
            && *current != name
        {
            return Err(CollectionError::RootConflict {
                current: current.clone(),
                incoming: name,
            });
        }

        match self.position(&name) {
            Some(index) => {
                debug!("Replacing package {} at position {}", name, index);
                if self.root.as_deref() == Some(name.as_str()) && !package.is_root() {
                    debug!("Package {} no longer holds the root role", name);
                    self.root = None;
                }
                if package.is_root() {
                    self.root = Some(name);
                }
                self.packages[index] = package;
            }
            None => {
                debug!("Adding package {}", name);
                if package.is_root() {
                    self.root = Some(name);
                }
                self.packages.push(package);
            }
        }

        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Package, CollectionError> {
        self.position(name)
            .map(|index| &self.packages[index])
            .ok_or_else(|| CollectionError::NotFound(name.to_string()))
    }

    /// Remove a package. Removing an absent name is not an error.
    pub fn remove(&mut self, name: &str) -> Option<Package> {
        let index = self.position(name)?;
        if self.root.as_deref() == Some(name) {
            self.root = None;
        }
        Some(self.packages.remove(index))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn root(&self) -> Option<&Package> {
        self.root.as_deref().and_then(|name| self.get(name).ok())
    }

    /// Every package except the root, in insertion order.
    pub fn installed(&self) -> impl Iterator<Item = &Package> {
        self.packages.iter().filter(|p| !p.is_root())
    }

    pub fn installed_names(&self) -> Vec<&str> {
        self.installed().filter_map(Package::name).collect()
    }

    /// Names of all packages, the root included, in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.packages.iter().filter_map(Package::name).collect()
    }

    /// The full ordered view, keyed by name.
    pub fn to_mapping(&self) -> Vec<(&str, &Package)> {
        self.packages
            .iter()
            .filter_map(|p| p.name().map(|name| (name, p)))
            .collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Package> {
        self.packages.iter()
    }

    /// Packages currently in the given state, in insertion order.
    pub fn with_state(&self, state: PackageState) -> impl Iterator<Item = &Package> {
        self.packages.iter().filter(move |p| p.state() == state)
    }

    pub fn refresh_states<R: Runtime>(&mut self, runtime: &R) {
        for package in &mut self.packages {
            package.refresh_state(runtime);
        }
    }

    pub fn reset_states(&mut self) {
        for package in &mut self.packages {
            package.reset_state();
        }
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.packages.iter().position(|p| p.name() == Some(name))
    }
}

impl<'a> IntoIterator for &'a PackageCollection {
    type Item = &'a Package;
    type IntoIter = std::slice::Iter<'a, Package>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
