//! Package metadata, state detection, and the package registry.
//!
//! - [`PackageFile`] / [`RootPackageFile`]: what a package declares about itself
//! - [`InstallInfo`] / [`InstallFile`]: what was recorded when it was installed
//! - [`Package`]: the two combined with an absolute install path and a state
//! - [`PackageCollection`]: the ordered registry the rest of the crate works on

mod collection;
mod file;
mod install_info;
mod model;
mod state;

pub use collection::{CollectionError, PackageCollection};
pub use file::{DEFAULT_INSTALL_FILE, PackageFile, RootPackageFile};
pub use install_info::{DEFAULT_INSTALLER, InstallFile, InstallInfo};
pub use model::{Package, PackageError, PackageRole, UNNAMED};
pub use state::{PackageState, detect};
