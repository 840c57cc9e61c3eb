use log::debug;
use std::path::Path;

use crate::package::InstallFile;
use crate::runtime::Runtime;

use super::{StorageError, read_json, write_json};

/// Reads and writes the install file listing installed packages.
pub struct InstallFileStorage<'a, R: Runtime> {
    runtime: &'a R,
}

impl<'a, R: Runtime> InstallFileStorage<'a, R> {
    pub fn new(runtime: &'a R) -> Self {
        Self { runtime }
    }

    pub fn read(&self, path: &Path) -> Result<InstallFile, StorageError> {
        debug!("Reading install file {:?}", path);
        let mut file: InstallFile = read_json(self.runtime, path)?;
        file.path = Some(path.to_path_buf());
        Ok(file)
    }

    pub fn write(&self, file: &InstallFile, path: &Path) -> Result<(), StorageError> {
        write_json(self.runtime, file, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::InstallInfo;
    use crate::runtime::RealRuntime;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_round_trip_keeps_order() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let path = dir.path().join(".pkgmeta/install.json");
        let storage = InstallFileStorage::new(&runtime);

        let mut file = InstallFile::new(&path);
        file.add(InstallInfo::new("vendor/b").with_name("acme/b"));
        file.add(InstallInfo::new("vendor/a").with_name("acme/a"));
        storage.write(&file, &path).unwrap();

        let loaded = storage.read(&path).unwrap();
        let paths: Vec<_> = loaded.iter().map(|i| i.install_path.clone()).collect();
        assert_eq!(
            paths,
            vec![PathBuf::from("vendor/b"), PathBuf::from("vendor/a")]
        );
        assert_eq!(loaded, file);
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();

        let err = InstallFileStorage::new(&runtime)
            .read(&dir.path().join("install.json"))
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
