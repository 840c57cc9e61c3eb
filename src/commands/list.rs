use anyhow::Result;
use log::debug;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::{
    manager::Project,
    package::{Package, PackageState},
    runtime::Runtime,
};

use super::project_root;

#[derive(Debug, Clone, Copy, Default)]
pub struct ListOptions {
    /// Leave out the root package
    pub installed_only: bool,
    /// Only show packages in this state
    pub state: Option<PackageState>,
}

/// List the packages of a project
#[tracing::instrument(skip(runtime, root))]
pub fn list<R: Runtime>(runtime: R, root: Option<PathBuf>, options: ListOptions) -> Result<()> {
    let root = project_root(&runtime, root)?;
    let project = Project::load(&runtime, &root)?;
    print_packages(&project, options, &mut io::stdout().lock())
}

pub(crate) fn print_packages<R: Runtime>(
    project: &Project<'_, R>,
    options: ListOptions,
    out: &mut impl Write,
) -> Result<()> {
    let packages: Vec<&Package> = project
        .packages()
        .iter()
        .filter(|p| !(options.installed_only && p.is_root()))
        .filter(|p| options.state.is_none_or(|state| p.state() == state))
        .collect();

    if packages.is_empty() {
        writeln!(out, "No packages found.")?;
        return Ok(());
    }

    debug!("Listing {} package(s)", packages.len());
    let width = packages
        .iter()
        .map(|p| p.display_name().len())
        .max()
        .unwrap_or(0);

    for package in packages {
        writeln!(
            out,
            "{:<width$}  {:<12}  {}",
            package.display_name(),
            package.state().as_str(),
            display_path(project.root_dir(), package.install_path()),
            width = width
        )?;
        if let Some(e) = package.load_error() {
            debug!("{}: {:#}", package.display_name(), e);
        }
    }

    Ok(())
}

/// Install paths inside the project are shown relative to it.
fn display_path(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(relative) if relative.as_os_str().is_empty() => ".".to_string(),
        Ok(relative) => relative.display().to_string(),
        Err(_) => path.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{TestProject, output};
    use crate::test_utils::{test_home, test_project};

    fn fixture() -> TestProject {
        let project = TestProject::new();
        project.write("pkgmeta.json", r#"{ "name": "acme/app" }"#);
        project.write("vendor/util/pkgmeta.json", r#"{ "name": "acme/util" }"#);
        project.write(
            ".pkgmeta/install.json",
            r#"{ "packages": [
                { "install-path": "vendor/util" },
                { "install-path": "vendor/gone", "package-name": "acme/gone" }
            ] }"#,
        );
        project
    }

    #[test]
    fn test_list_all_packages() {
        let fixture = fixture();
        let project = fixture.open();
        let mut buf = Vec::new();

        print_packages(&project, ListOptions::default(), &mut buf).unwrap();

        let lines: Vec<String> = output(buf).lines().map(str::to_owned).collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("acme/app "));
        assert!(lines[0].contains("enabled"));
        assert!(lines[0].ends_with(" ."));
        assert!(lines[1].starts_with("acme/util "));
        assert!(lines[2].contains("not-found"));
    }

    #[test]
    fn test_list_installed_only() {
        let fixture = fixture();
        let project = fixture.open();
        let mut buf = Vec::new();

        let options = ListOptions {
            installed_only: true,
            ..Default::default()
        };
        print_packages(&project, options, &mut buf).unwrap();

        let out = output(buf);
        assert!(!out.contains("acme/app"));
        assert!(out.contains("acme/util"));
    }

    #[test]
    fn test_list_filtered_by_state() {
        let fixture = fixture();
        let project = fixture.open();
        let mut buf = Vec::new();

        let options = ListOptions {
            state: Some(PackageState::NotLoadable),
            ..Default::default()
        };
        print_packages(&project, options, &mut buf).unwrap();

        assert_eq!(output(buf), "No packages found.\n");
    }

    #[test]
    fn test_display_path() {
        let root = test_project();
        assert_eq!(display_path(&root, &root), ".");
        assert_eq!(
            display_path(&root, &root.join("vendor").join("x")),
            Path::new("vendor").join("x").display().to_string()
        );
        let outside = test_home().join("elsewhere");
        assert_eq!(display_path(&root, &outside), outside.display().to_string());
    }
}
