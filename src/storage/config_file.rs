use log::debug;
use std::path::Path;

use crate::config::Config;
use crate::runtime::Runtime;

use super::{StorageError, read_json, write_json};

/// Reads and writes config files.
///
/// Only a config's own values are written; its parent chain is not.
pub struct ConfigFileStorage<'a, R: Runtime> {
    runtime: &'a R,
}

impl<'a, R: Runtime> ConfigFileStorage<'a, R> {
    pub fn new(runtime: &'a R) -> Self {
        Self { runtime }
    }

    /// Every entry goes through [`Config::set`], so invalid values fail to parse.
    pub fn read(&self, path: &Path) -> Result<Config, StorageError> {
        debug!("Reading config from {:?}", path);
        read_json(self.runtime, path)
    }

    pub fn write(&self, config: &Config, path: &Path) -> Result<(), StorageError> {
        debug!("Writing config to {:?}", path);
        write_json(self.runtime, config, path)
    }
}
