//! Typed key/value configuration with placeholder substitution.
//!
//! A [`Config`] stores values for a fixed set of [`ConfigKey`]s and may point
//! at a parent config that answers for keys it does not set itself. The
//! parent link is weak: the parent belongs to whoever created it (usually the
//! [`Project`](crate::manager::Project)), and a child only ever reads from it.
//!
//! Values may reference other keys with `{$key}`. Reading a value in resolved
//! mode expands those references, starting the lookup from the config the
//! read was issued on, so a child that overrides `dir` also moves every
//! inherited value built from `{$dir}`.

pub mod placeholder;
mod plugin;

use serde::{Deserialize, Deserializer, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::str::FromStr;

pub use placeholder::Segment;
pub use plugin::{PluginDescriptor, normalize_plugin_id};

/// A config shared between its owner and the children that fall back to it.
pub type SharedConfig = Rc<RefCell<Config>>;

/// Recognized configuration keys.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ConfigKey {
    /// Base directory for generated files
    Dir,
    /// Package repository configuration file
    RepoConfig,
    /// Output path of the generated repository
    RepoOutput,
    /// Repository cache directory
    Cache,
    /// Registered plugin identifiers
    Plugins,
}

/// Shape of the values a key accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// A non-empty string, possibly a relative path
    Path,
    /// An ordered set of non-empty strings
    List,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 5] = [
        ConfigKey::Dir,
        ConfigKey::RepoConfig,
        ConfigKey::RepoOutput,
        ConfigKey::Cache,
        ConfigKey::Plugins,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::Dir => "dir",
            ConfigKey::RepoConfig => "repo-config",
            ConfigKey::RepoOutput => "repo-output",
            ConfigKey::Cache => "cache",
            ConfigKey::Plugins => "plugins",
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            ConfigKey::Plugins => ValueKind::List,
            _ => ValueKind::Path,
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

/// A stored configuration value.
///
/// `Null` is an explicit "no value": it hides whatever the parent holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Null,
    String(String),
    List(Vec<String>),
}

impl ConfigValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ConfigValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ConfigValue::Null)
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Null => f.write_str("null"),
            ConfigValue::String(s) => f.write_str(s),
            ConfigValue::List(items) => f.write_str(&items.join(", ")),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::String(value)
    }
}

impl From<Vec<String>> for ConfigValue {
    fn from(value: Vec<String>) -> Self {
        ConfigValue::List(value)
    }
}

impl<T: Into<ConfigValue>> From<Option<T>> for ConfigValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(ConfigValue::Null)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for '{key}': {reason}")]
    InvalidValue { key: ConfigKey, reason: String },

    #[error("unknown config key '{0}'")]
    UnknownKey(String),

    #[error("placeholder '{{${placeholder}}}' in '{key}' does not resolve to a value")]
    UnresolvedPlaceholder { key: ConfigKey, placeholder: String },

    #[error("placeholder '{{${placeholder}}}' in '{key}' refers to a list value")]
    PlaceholderNotString { key: ConfigKey, placeholder: ConfigKey },

    #[error("placeholders referring back to '{0}' form a cycle")]
    PlaceholderCycle(ConfigKey),

    #[error("config parent chain would contain a cycle")]
    ParentCycle,

    #[error("invalid plugin '{id}': {reason}")]
    InvalidPlugin { id: String, reason: String },
}

/// Configuration values with an optional fallback parent.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Config {
    values: BTreeMap<ConfigKey, ConfigValue>,
    #[serde(skip)]
    parent: Option<Weak<RefCell<Config>>>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in defaults at the end of every fallback chain.
    pub fn defaults() -> Self {
        let values = BTreeMap::from([
            (ConfigKey::Dir, ".pkgmeta".into()),
            (ConfigKey::RepoConfig, "{$dir}/packages.json".into()),
            (ConfigKey::RepoOutput, "{$dir}/repository".into()),
            (ConfigKey::Cache, "{$dir}/cache".into()),
            (ConfigKey::Plugins, ConfigValue::List(Vec::new())),
        ]);
        Self {
            values,
            parent: None,
        }
    }

    /// Build a config from raw entries, validating each through [`Config::set`].
    pub fn from_entries<I>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, ConfigValue)>,
    {
        let mut config = Self::new();
        for (name, value) in entries {
            config.set(name.parse()?, value)?;
        }
        Ok(config)
    }

    /// An empty config falling back to `parent`.
    pub fn with_parent(parent: &SharedConfig) -> Self {
        Self {
            values: BTreeMap::new(),
            parent: Some(Rc::downgrade(parent)),
        }
    }

    pub fn into_shared(self) -> SharedConfig {
        Rc::new(RefCell::new(self))
    }

    /// The parent, if one is attached and still alive.
    pub fn parent(&self) -> Option<SharedConfig> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// Attach a parent. Fails if `self` is already an ancestor of `parent`.
    pub fn set_parent(&mut self, parent: &SharedConfig) -> Result<(), ConfigError> {
        let mut next = Some(Rc::clone(parent));
        while let Some(config) = next {
            if std::ptr::eq(config.as_ptr(), self) {
                return Err(ConfigError::ParentCycle);
            }
            next = config.borrow().parent();
        }
        self.parent = Some(Rc::downgrade(parent));
        Ok(())
    }

    /// Look up `key`, falling back through the parent chain.
    ///
    /// With `resolve` set, `{$key}` placeholders are expanded; otherwise the
    /// stored text is returned as-is. An explicit null yields `None` without
    /// consulting the parent.
    pub fn get(&self, key: ConfigKey, resolve: bool) -> Result<Option<ConfigValue>, ConfigError> {
        let raw = match self.lookup(key) {
            None | Some(ConfigValue::Null) => return Ok(None),
            Some(value) => value,
        };
        if !resolve {
            return Ok(Some(raw));
        }

        let mut visiting = vec![key];
        let resolved = match raw {
            ConfigValue::String(s) => ConfigValue::String(self.expand(key, &s, &mut visiting)?),
            ConfigValue::List(items) => ConfigValue::List(
                items
                    .iter()
                    .map(|item| self.expand(key, item, &mut visiting))
                    .collect::<Result<_, _>>()?,
            ),
            ConfigValue::Null => ConfigValue::Null,
        };
        Ok(Some(resolved))
    }

    /// Resolved string value of a path key.
    pub fn get_string(&self, key: ConfigKey) -> Result<Option<String>, ConfigError> {
        Ok(self
            .get(key, true)?
            .and_then(|v| v.as_str().map(str::to_string)))
    }

    /// Resolved list value of a list key; unset reads as empty.
    pub fn get_list(&self, key: ConfigKey) -> Result<Vec<String>, ConfigError> {
        Ok(self
            .get(key, true)?
            .and_then(|v| v.as_list().map(<[String]>::to_vec))
            .unwrap_or_default())
    }

    /// Store a value for `key` in this config.
    ///
    /// Path keys take a non-empty string or null. List keys take a list of
    /// non-empty strings or null; plugin identifiers are normalized and
    /// duplicates dropped.
    pub fn set(&mut self, key: ConfigKey, value: impl Into<ConfigValue>) -> Result<(), ConfigError> {
        let value = validate(key, value.into())?;
        self.values.insert(key, value);
        Ok(())
    }

    /// Drop the local value so lookups fall through to the parent.
    pub fn remove(&mut self, key: ConfigKey) -> Option<ConfigValue> {
        self.values.remove(&key)
    }

    /// Whether this config itself holds a value (null included) for `key`.
    pub fn contains(&self, key: ConfigKey) -> bool {
        self.values.contains_key(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Locally stored values, raw.
    pub fn entries(&self) -> impl Iterator<Item = (ConfigKey, &ConfigValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    /// Every key with a value anywhere in the chain.
    pub fn to_map(&self, resolve: bool) -> Result<BTreeMap<ConfigKey, ConfigValue>, ConfigError> {
        let mut map = BTreeMap::new();
        for key in ConfigKey::ALL {
            if let Some(value) = self.get(key, resolve)? {
                map.insert(key, value);
            }
        }
        Ok(map)
    }

    /// Registered plugin identifiers, in registration order.
    pub fn plugins(&self) -> Vec<String> {
        self.lookup(ConfigKey::Plugins)
            .and_then(|v| v.as_list().map(<[String]>::to_vec))
            .unwrap_or_default()
    }

    pub fn has_plugin(&self, id: &str) -> bool {
        let id = normalize_plugin_id(id);
        self.plugins().contains(&id)
    }

    /// Register a plugin. Returns `false` if it was already registered.
    ///
    /// The first change copies the inherited list into this config.
    pub fn add_plugin(&mut self, descriptor: &PluginDescriptor) -> Result<bool, ConfigError> {
        let id = descriptor.checked_id()?;
        let mut plugins = self.plugins();
        if plugins.contains(&id) {
            return Ok(false);
        }
        plugins.push(id);
        self.set(ConfigKey::Plugins, plugins)?;
        Ok(true)
    }

    /// Replace the registered plugins.
    pub fn set_plugins(&mut self, descriptors: &[PluginDescriptor]) -> Result<(), ConfigError> {
        let ids = descriptors
            .iter()
            .map(PluginDescriptor::checked_id)
            .collect::<Result<Vec<_>, _>>()?;
        self.set(ConfigKey::Plugins, ids)
    }

    /// Unregister a plugin. Returns `false` if it was not registered.
    pub fn remove_plugin(&mut self, id: &str) -> Result<bool, ConfigError> {
        let id = normalize_plugin_id(id);
        let mut plugins = self.plugins();
        let before = plugins.len();
        plugins.retain(|p| *p != id);
        if plugins.len() == before {
            return Ok(false);
        }
        self.set(ConfigKey::Plugins, plugins)?;
        Ok(true)
    }

    /// Raw value from this config or the nearest ancestor that has one.
    fn lookup(&self, key: ConfigKey) -> Option<ConfigValue> {
        if let Some(value) = self.values.get(&key) {
            return Some(value.clone());
        }
        self.parent()
            .and_then(|parent| parent.borrow().lookup(key))
    }

    /// Expand every placeholder in `raw`, which belongs to `owner`.
    fn expand(
        &self,
        owner: ConfigKey,
        raw: &str,
        visiting: &mut Vec<ConfigKey>,
    ) -> Result<String, ConfigError> {
        let mut out = String::with_capacity(raw.len());
        for segment in placeholder::parse(raw) {
            let name = match segment {
                Segment::Literal(text) => {
                    out.push_str(text);
                    continue;
                }
                Segment::Placeholder(name) => name,
            };

            let unresolved = || ConfigError::UnresolvedPlaceholder {
                key: owner,
                placeholder: name.to_string(),
            };
            let referenced = name.parse::<ConfigKey>().map_err(|_| unresolved())?;
            if visiting.contains(&referenced) {
                return Err(ConfigError::PlaceholderCycle(referenced));
            }

            let inner = match self.lookup(referenced) {
                Some(ConfigValue::String(s)) => s,
                Some(ConfigValue::List(_)) => {
                    return Err(ConfigError::PlaceholderNotString {
                        key: owner,
                        placeholder: referenced,
                    });
                }
                None | Some(ConfigValue::Null) => return Err(unresolved()),
            };

            visiting.push(referenced);
            let expanded = self.expand(referenced, &inner, visiting)?;
            visiting.pop();
            out.push_str(&expanded);
        }
        Ok(out)
    }
}

impl<'de> Deserialize<'de> for Config {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = BTreeMap::<String, ConfigValue>::deserialize(deserializer)?;
        Config::from_entries(entries).map_err(serde::de::Error::custom)
    }
}

fn validate(key: ConfigKey, value: ConfigValue) -> Result<ConfigValue, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidValue {
        key,
        reason: reason.to_string(),
    };

    match (key.kind(), value) {
        (_, ConfigValue::Null) => Ok(ConfigValue::Null),
        (ValueKind::Path, ConfigValue::String(s)) if s.is_empty() => {
            Err(invalid("must not be empty"))
        }
        (ValueKind::Path, ConfigValue::String(s)) => Ok(ConfigValue::String(s)),
        (ValueKind::Path, ConfigValue::List(_)) => Err(invalid("expected a string or null")),
        (ValueKind::List, ConfigValue::List(items)) => {
            let mut normalized: Vec<String> = Vec::with_capacity(items.len());
            for item in items {
                let item = if key == ConfigKey::Plugins {
                    normalize_plugin_id(&item)
                } else {
                    item
                };
                if item.is_empty() {
                    return Err(invalid("list entries must not be empty"));
                }
                if !normalized.contains(&item) {
                    normalized.push(item);
                }
            }
            Ok(ConfigValue::List(normalized))
        }
        (ValueKind::List, ConfigValue::String(_)) => Err(invalid("expected a list or null")),
    }
}
