//! crates/logging/src/config.rs
//! Structured configuration snapshots for categories and handlers.

use std::collections::BTreeMap;

use crate::levels::LogLevel;
use crate::name::{canonicalize_name, names_equal};

/// Handler options, ordered by key.
pub type LogOptions = BTreeMap<String, String>;

/// Settings for one category.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogCategoryConfig {
    /// The category's own level.
    pub level: LogLevel,
    /// Whether the parent's effective level also applies.
    #[cfg_attr(feature = "serde", serde(default = "inherit_by_default"))]
    pub inherit_parent_level: bool,
    /// Handlers to bind, in order.
    ///
    /// `None` keeps the current bindings when merging and clears them when
    /// replacing; `Some(vec![])` always clears them.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub handlers: Option<Vec<String>>,
}

#[cfg(feature = "serde")]
const fn inherit_by_default() -> bool {
    true
}

impl LogCategoryConfig {
    /// Level settings only; handler bindings are left alone.
    #[must_use]
    pub const fn new(level: LogLevel, inherit_parent_level: bool) -> Self {
        Self {
            level,
            inherit_parent_level,
            handlers: None,
        }
    }

    /// Level settings together with the exact list of handlers to bind.
    #[must_use]
    pub fn with_handlers<I, S>(level: LogLevel, inherit_parent_level: bool, handlers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            level,
            inherit_parent_level,
            handlers: Some(handlers.into_iter().map(Into::into).collect()),
        }
    }
}

/// Settings for one handler.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogHandlerConfig {
    /// Factory type name. `None` updates an existing handler in place,
    /// keeping its type and merging these options over its current ones.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "type", default, skip_serializing_if = "Option::is_none")
    )]
    pub handler_type: Option<String>,
    /// Options passed to the factory.
    #[cfg_attr(feature = "serde", serde(default))]
    pub options: LogOptions,
}

impl LogHandlerConfig {
    /// A handler of `handler_type` with no options.
    #[must_use]
    pub fn new(handler_type: impl Into<String>) -> Self {
        Self {
            handler_type: Some(handler_type.into()),
            options: LogOptions::new(),
        }
    }

    /// A handler of `handler_type` with the given options.
    #[must_use]
    pub fn with_options<I, K, V>(handler_type: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            handler_type: Some(handler_type.into()),
            options: collect_options(options),
        }
    }

    /// An untyped entry that only changes options of an existing handler.
    #[must_use]
    pub fn options_only<I, K, V>(options: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            handler_type: None,
            options: collect_options(options),
        }
    }

    /// Merges `other` into this configuration.
    ///
    /// A type in `other` replaces this one; options in `other` overwrite
    /// options with the same key and leave the rest alone.
    pub fn update(&mut self, other: &Self) {
        if other.handler_type.is_some() {
            self.handler_type.clone_from(&other.handler_type);
        }
        for (key, value) in &other.options {
            self.options.insert(key.clone(), value.clone());
        }
    }
}

fn collect_options<I, K, V>(options: I) -> LogOptions
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    options
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}

/// A snapshot of category and handler settings.
///
/// Category names are canonicalized on insertion and compared
/// case-insensitively.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogConfig {
    #[cfg_attr(feature = "serde", serde(default))]
    categories: BTreeMap<String, LogCategoryConfig>,
    #[cfg_attr(feature = "serde", serde(default))]
    handlers: BTreeMap<String, LogHandlerConfig>,
}

impl LogConfig {
    /// An empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the settings for `name`.
    pub fn add_category(&mut self, name: &str, config: LogCategoryConfig) -> &mut Self {
        let canonical = canonicalize_name(name);
        self.categories.retain(|existing, _| !names_equal(existing, &canonical));
        self.categories.insert(canonical, config);
        self
    }

    /// Adds or replaces the settings for handler `name`.
    pub fn add_handler(&mut self, name: impl Into<String>, config: LogHandlerConfig) -> &mut Self {
        self.handlers.insert(name.into(), config);
        self
    }

    /// Settings for one category, found case-insensitively.
    #[must_use]
    pub fn category(&self, name: &str) -> Option<&LogCategoryConfig> {
        self.categories
            .iter()
            .find(|(existing, _)| names_equal(existing, name))
            .map(|(_, config)| config)
    }

    /// Settings for one handler.
    #[must_use]
    pub fn handler(&self, name: &str) -> Option<&LogHandlerConfig> {
        self.handlers.get(name)
    }

    /// All category settings by name.
    #[must_use]
    pub const fn categories(&self) -> &BTreeMap<String, LogCategoryConfig> {
        &self.categories
    }

    /// All handler settings by name.
    #[must_use]
    pub const fn handlers(&self) -> &BTreeMap<String, LogHandlerConfig> {
        &self.handlers
    }

    /// Returns true when neither categories nor handlers are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.handlers.is_empty()
    }

    /// Merges `other` into this configuration.
    ///
    /// Category entries in `other` replace existing ones. Handler entries
    /// replace existing ones, except untyped entries, whose options are
    /// merged into the existing entry of the same name.
    pub fn update(&mut self, other: &Self) {
        for (name, config) in &other.handlers {
            match self.handlers.get_mut(name) {
                Some(existing) if config.handler_type.is_none() => existing.update(config),
                _ => {
                    self.handlers.insert(name.clone(), config.clone());
                }
            }
        }
        for (name, config) in &other.categories {
            self.add_category(name, config.clone());
        }
    }
}
