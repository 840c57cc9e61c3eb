use anyhow::{Result, bail};
use std::io::{self, Write};
use std::path::PathBuf;

use crate::{
    config::{Config, ConfigError, ConfigKey, ConfigValue, ValueKind},
    manager::Project,
    runtime::Runtime,
};

use super::project_root;

/// Print every key with its resolved value
#[tracing::instrument(skip(runtime, root))]
pub fn config_list<R: Runtime>(runtime: R, root: Option<PathBuf>) -> Result<()> {
    let root = project_root(&runtime, root)?;
    let project = Project::load(&runtime, &root)?;
    print_config(&project, &mut io::stdout().lock())
}

#[tracing::instrument(skip(runtime, root))]
pub fn config_get<R: Runtime>(
    runtime: R,
    root: Option<PathBuf>,
    key: ConfigKey,
    raw: bool,
    global: bool,
) -> Result<()> {
    let root = project_root(&runtime, root)?;
    let project = Project::load(&runtime, &root)?;
    print_value(&project, key, raw, global, &mut io::stdout().lock())
}

#[tracing::instrument(skip(runtime, root))]
pub fn config_set<R: Runtime>(
    runtime: R,
    root: Option<PathBuf>,
    key: ConfigKey,
    value: &str,
    global: bool,
) -> Result<()> {
    let root = project_root(&runtime, root)?;
    let mut project = Project::load(&runtime, &root)?;
    let value = parse_value(key, value);
    update(&mut project, global, |config| config.set(key, value))
}

#[tracing::instrument(skip(runtime, root))]
pub fn config_remove<R: Runtime>(
    runtime: R,
    root: Option<PathBuf>,
    key: ConfigKey,
    global: bool,
) -> Result<()> {
    let root = project_root(&runtime, root)?;
    let mut project = Project::load(&runtime, &root)?;
    update(&mut project, global, |config| {
        config.remove(key);
        Ok(())
    })
}

pub(crate) fn print_config<R: Runtime>(project: &Project<'_, R>, out: &mut impl Write) -> Result<()> {
    let values = project.config().to_map(true)?;
    for key in ConfigKey::ALL {
        let value = values.get(&key).cloned().unwrap_or(ConfigValue::Null);
        writeln!(out, "{} = {}", key, value)?;
    }
    Ok(())
}

pub(crate) fn print_value<R: Runtime>(
    project: &Project<'_, R>,
    key: ConfigKey,
    raw: bool,
    global: bool,
    out: &mut impl Write,
) -> Result<()> {
    let value = if global {
        project.global_config().borrow().get(key, !raw)?
    } else {
        project.config().get(key, !raw)?
    };
    writeln!(out, "{}", value.unwrap_or(ConfigValue::Null))?;
    Ok(())
}

/// Apply `change` to the root or global config and save it.
pub(crate) fn update<R: Runtime>(
    project: &mut Project<'_, R>,
    global: bool,
    change: impl FnOnce(&mut Config) -> Result<(), ConfigError>,
) -> Result<()> {
    if global {
        if project.global_config_path().is_none() {
            bail!("No location for the global config is available");
        }
        change(&mut project.global_config().borrow_mut())?;
        project.save_global()
    } else {
        change(project.config_mut())?;
        project.save_root()
    }
}

/// Interpret a command-line value for `key`.
///
/// `null` stores an explicit null. List keys take comma-separated entries.
fn parse_value(key: ConfigKey, raw: &str) -> ConfigValue {
    if raw == "null" {
        return ConfigValue::Null;
    }
    match key.kind() {
        ValueKind::Path => ConfigValue::String(raw.to_string()),
        ValueKind::List => ConfigValue::List(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        ),
    }
}
