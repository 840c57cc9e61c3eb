use anyhow::Result;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::{manager::Project, package::InstallInfo, runtime::Runtime};

use super::project_root;

/// Record a package installed at `path`
#[tracing::instrument(skip(runtime, root))]
pub fn install<R: Runtime>(
    runtime: R,
    root: Option<PathBuf>,
    path: PathBuf,
    name: Option<String>,
) -> Result<()> {
    let root = project_root(&runtime, root)?;
    let mut project = Project::load(&runtime, &root)?;
    install_package(&mut project, path, name, &mut io::stdout().lock())
}

/// Forget an installed package
#[tracing::instrument(skip(runtime, root))]
pub fn remove<R: Runtime>(runtime: R, root: Option<PathBuf>, name: &str) -> Result<()> {
    let root = project_root(&runtime, root)?;
    let mut project = Project::load(&runtime, &root)?;
    project.uninstall(name)?;
    writeln!(io::stdout().lock(), "Removed {}.", name)?;
    Ok(())
}

pub(crate) fn install_package<R: Runtime>(
    project: &mut Project<'_, R>,
    path: PathBuf,
    name: Option<String>,
    out: &mut impl Write,
) -> Result<()> {
    let mut info = InstallInfo::new(path);
    if let Some(name) = name {
        info = info.with_name(name);
    }
    let package = project.install(info)?;
    writeln!(
        out,
        "Installed {} ({}).",
        package.display_name(),
        package.state()
    )?;
    Ok(())
}
