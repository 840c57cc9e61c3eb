use anyhow::Result;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::{
    config::{PluginDescriptor, normalize_plugin_id},
    manager::Project,
    runtime::Runtime,
};

use super::config::update;
use super::project_root;

/// List the plugins registered for the project
#[tracing::instrument(skip(runtime, root))]
pub fn plugin_list<R: Runtime>(runtime: R, root: Option<PathBuf>) -> Result<()> {
    let root = project_root(&runtime, root)?;
    let project = Project::load(&runtime, &root)?;
    print_plugins(&project, &mut io::stdout().lock())
}

/// Register a plugin; command-line ids are treated as pre-validated
#[tracing::instrument(skip(runtime, root))]
pub fn plugin_add<R: Runtime>(runtime: R, root: Option<PathBuf>, id: &str) -> Result<()> {
    let root = project_root(&runtime, root)?;
    let mut project = Project::load(&runtime, &root)?;
    add_plugin(&mut project, id, &mut io::stdout().lock())
}

#[tracing::instrument(skip(runtime, root))]
pub fn plugin_remove<R: Runtime>(runtime: R, root: Option<PathBuf>, id: &str) -> Result<()> {
    let root = project_root(&runtime, root)?;
    let mut project = Project::load(&runtime, &root)?;
    remove_plugin(&mut project, id, &mut io::stdout().lock())
}

pub(crate) fn print_plugins<R: Runtime>(project: &Project<'_, R>, out: &mut impl Write) -> Result<()> {
    let plugins = project.config().plugins();
    if plugins.is_empty() {
        writeln!(out, "No plugins registered.")?;
    }
    for id in plugins {
        writeln!(out, "{}", id)?;
    }
    Ok(())
}

/// Register `id` for the project.
///
/// Identifiers given on the command line are treated as pre-validated: the
/// descriptor always reports the plugin capability and a no-argument constructor.
pub(crate) fn add_plugin<R: Runtime>(
    project: &mut Project<'_, R>,
    id: &str,
    out: &mut impl Write,
) -> Result<()> {
    let descriptor = PluginDescriptor::validated(id);
    let id = descriptor.checked_id()?;
    if project.config().has_plugin(&id) {
        writeln!(out, "Plugin {} is already registered.", id)?;
        return Ok(());
    }
    update(project, false, |config| config.add_plugin(&descriptor).map(|_| ()))?;
    writeln!(out, "Registered plugin {}.", id)?;
    Ok(())
}

pub(crate) fn remove_plugin<R: Runtime>(
    project: &mut Project<'_, R>,
    id: &str,
    out: &mut impl Write,
) -> Result<()> {
    let id = normalize_plugin_id(id);
    if !project.config().has_plugin(&id) {
        writeln!(out, "Plugin {} is not registered.", id)?;
        return Ok(());
    }
    update(project, false, |config| config.remove_plugin(&id).map(|_| ()))?;
    writeln!(out, "Removed plugin {}.", id)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{TestProject, output};

    #[test]
    fn test_add_list_remove() {
        let fixture = TestProject::new();
        let mut project = fixture.open();

        let mut buf = Vec::new();
        add_plugin(&mut project, "\\Acme\\Plugin", &mut buf).unwrap();
        add_plugin(&mut project, "Acme\\Plugin", &mut buf).unwrap();
        assert_eq!(
            output(buf),
            "Registered plugin Acme\\Plugin.\nPlugin Acme\\Plugin is already registered.\n"
        );

        let reopened = fixture.open();
        let mut listed = Vec::new();
        print_plugins(&reopened, &mut listed).unwrap();
        assert_eq!(output(listed), "Acme\\Plugin\n");

        let mut buf = Vec::new();
        remove_plugin(&mut project, "/Acme\\Plugin", &mut buf).unwrap();
        remove_plugin(&mut project, "Acme\\Plugin", &mut buf).unwrap();
        assert_eq!(
            output(buf),
            "Removed plugin Acme\\Plugin.\nPlugin Acme\\Plugin is not registered.\n"
        );
        assert!(fixture.open().config().plugins().is_empty());
    }

    #[test]
    fn test_add_rejects_empty_id() {
        let fixture = TestProject::new();
        let mut project = fixture.open();

        assert!(add_plugin(&mut project, "//", &mut Vec::new()).is_err());
    }

    #[test]
    fn test_list_empty() {
        let fixture = TestProject::new();
        let project = fixture.open();
        let mut buf = Vec::new();

        print_plugins(&project, &mut buf).unwrap();
        assert_eq!(output(buf), "No plugins registered.\n");
    }
}
