use log::debug;
use std::path::Path;

use crate::package::{PackageFile, RootPackageFile};
use crate::runtime::Runtime;

use super::{StorageError, read_json, write_json};

/// Reads and writes `pkgmeta.json` package files.
pub struct PackageFileStorage<'a, R: Runtime> {
    runtime: &'a R,
}

impl<'a, R: Runtime> PackageFileStorage<'a, R> {
    pub fn new(runtime: &'a R) -> Self {
        Self { runtime }
    }

    pub fn read(&self, path: &Path) -> Result<PackageFile, StorageError> {
        debug!("Reading package file {:?}", path);
        let file: PackageFile = read_json(self.runtime, path)?;
        Ok(file.with_path(path))
    }

    pub fn read_root(&self, path: &Path) -> Result<RootPackageFile, StorageError> {
        debug!("Reading root package file {:?}", path);
        let mut file: RootPackageFile = read_json(self.runtime, path)?;
        file.package.path = Some(path.to_path_buf());
        Ok(file)
    }

    pub fn write_root(&self, file: &RootPackageFile, path: &Path) -> Result<(), StorageError> {
        write_json(self.runtime, file, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigKey;
    use crate::runtime::{MockRuntime, RealRuntime};
    use crate::test_utils::test_project;
    use mockall::predicate::eq;
    use tempfile::tempdir;

    #[test]
    fn test_read_records_path() {
        let mut runtime = MockRuntime::new();
        let path = test_project().join("vendor/acme/util/pkgmeta.json");
        runtime.expect_exists().returning(|_| true);
        runtime
            .expect_read_to_string()
            .with(eq(path.clone()))
            .returning(|_| Ok(r#"{ "name": "acme/util" }"#.into()));

        let file = PackageFileStorage::new(&runtime).read(&path).unwrap();
        assert_eq!(file.name.as_deref(), Some("acme/util"));
        assert_eq!(file.path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_read_malformed_is_parse_error() {
        let mut runtime = MockRuntime::new();
        let path = test_project().join("vendor/acme/util/pkgmeta.json");
        runtime.expect_exists().returning(|_| true);
        runtime
            .expect_read_to_string()
            .returning(|_| Ok("{ not json".into()));

        let err = PackageFileStorage::new(&runtime).read(&path).unwrap_err();
        assert!(matches!(err, StorageError::Parse { .. }));
    }

    #[test]
    fn test_read_missing_root_is_not_found() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| false);

        let path = test_project().join("pkgmeta.json");
        let err = PackageFileStorage::new(&runtime).read_root(&path).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_root_round_trip_through_disk() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let path = dir.path().join("pkgmeta.json");
        let storage = PackageFileStorage::new(&runtime);

        let mut root = RootPackageFile::new(Some("acme/app".into()), None);
        root.package.add_resource("/acme/app", "res");
        root.config_mut().set(ConfigKey::Dir, "var").unwrap();
        storage.write_root(&root, &path).unwrap();

        let loaded = storage.read_root(&path).unwrap();
        assert_eq!(loaded.name(), Some("acme/app"));
        assert_eq!(loaded.package.resources["/acme/app"], "res");
        assert_eq!(
            loaded.config().get_string(ConfigKey::Dir).unwrap(),
            Some("var".into())
        );
        assert_eq!(loaded.path(), Some(path.as_path()));
    }
}
