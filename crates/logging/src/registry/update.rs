//! crates/logging/src/registry/update.rs
//! Applying configuration snapshots.
//!
//! An update runs in two phases. The first builds every new or changed
//! handler with only a short read lock held to copy out factories and
//! existing handlers, so factory code is free to log or touch the registry.
//! The second validates all category bindings and then commits them under
//! both write locks. Nothing is published unless the whole update is valid.
//!
//! If another update replaced one of the named handlers while factories were
//! running, the commit is abandoned and the first phase runs again against
//! the handlers that are live now.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::category::HandlerList;
use crate::config::{LogCategoryConfig, LogConfig, LogOptions};
use crate::context::panic_message;
use crate::error::{ConfigError, HandlerError};
use crate::handler::{LogHandler, LogHandlerFactory};
use crate::name::canonicalize_name;

use super::locks::WriteBoth;
use super::{LoggerDb, close_retired, distinct_handlers, handler_addr};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum UpdateMode {
    Merge,
    Replace,
}

/// Handlers built during the first phase.
#[derive(Default)]
struct PreparedHandlers {
    by_name: FxHashMap<String, Arc<dyn LogHandler>>,
    /// The handler each name resolved to when the factories ran. Holding it
    /// here keeps its address from being reused until the commit is done.
    observed: Vec<(String, Option<Arc<dyn LogHandler>>)>,
    /// Existing handlers and their replacements.
    replaced: Vec<(Arc<dyn LogHandler>, Arc<dyn LogHandler>)>,
}

impl PreparedHandlers {
    /// Whether every handler seen in the first phase is still the one
    /// registered under its name.
    fn is_current(&self, locked: &WriteBoth<'_>) -> bool {
        self.observed.iter().all(|(name, seen)| {
            let live = locked.handlers.live_handler(name);
            live.as_ref().map(handler_addr) == seen.as_ref().map(handler_addr)
        })
    }
}

/// What to do with one category once the update is known to be valid.
struct CategoryPlan<'a> {
    canonical: String,
    config: &'a LogCategoryConfig,
    handlers: Option<HandlerList>,
}

/// Work a factory has to do for one handler entry.
struct HandlerBuild {
    name: String,
    factory: Arc<dyn LogHandlerFactory>,
    existing: Option<Arc<dyn LogHandler>>,
    /// Whether `existing` is of the factory's type and may be updated.
    reuse: bool,
    options: LogOptions,
}

impl LoggerDb {
    /// Applies `config` on top of the current state.
    ///
    /// Handlers named in `config` are created or rebuilt; categories named in
    /// `config` get its level and, when given, its handler list. Everything
    /// else keeps its settings. On error nothing changes.
    pub fn update_config(&self, config: &LogConfig) -> Result<(), ConfigError> {
        self.apply_config(config, UpdateMode::Merge)
    }

    /// Replaces the current state with `config`.
    ///
    /// Categories not named in `config` lose their handlers and return to
    /// their default level: the default level for the root, `MAX_LEVEL` with
    /// inheritance for the rest. Categories named without a handler list lose
    /// their handlers too. On error nothing changes.
    pub fn reset_config(&self, config: &LogConfig) -> Result<(), ConfigError> {
        self.apply_config(config, UpdateMode::Replace)
    }

    fn apply_config(&self, config: &LogConfig, mode: UpdateMode) -> Result<(), ConfigError> {
        loop {
            let prepared = self.start_config_update(config)?;
            if let Some(retired) = self.finish_config_update(config, prepared, mode)? {
                close_retired(retired);
                return Ok(());
            }
            thread::yield_now();
        }
    }

    fn start_config_update(&self, config: &LogConfig) -> Result<PreparedHandlers, ConfigError> {
        let mut builds = Vec::with_capacity(config.handlers().len());
        {
            let info = self.read_handlers();
            for (name, handler_config) in config.handlers() {
                let existing = info.live_handler(name);
                match &handler_config.handler_type {
                    Some(handler_type) => {
                        let factory = info.factories.get(handler_type).cloned().ok_or_else(|| {
                            ConfigError::UnknownHandlerType {
                                handler: name.clone(),
                                handler_type: handler_type.clone(),
                            }
                        })?;
                        builds.push((name, Some(factory), existing, handler_config));
                    }
                    None if existing.is_none() => {
                        return Err(ConfigError::MissingHandlerType(name.clone()));
                    }
                    // The factory depends on the existing handler's type,
                    // which can only be asked for without the lock held.
                    None => builds.push((name, None, existing, handler_config)),
                }
            }
        }

        let mut resolved = Vec::with_capacity(builds.len());
        for (name, factory, existing, handler_config) in builds {
            let (factory, existing, reuse, options) = match (factory, existing) {
                (Some(factory), existing) => {
                    let reuse = existing.as_ref().is_some_and(|handler| {
                        handler.config().handler_type.as_deref() == Some(factory.handler_type())
                    });
                    (factory, existing, reuse, handler_config.options.clone())
                }
                (None, Some(existing)) => {
                    let mut merged = existing.config();
                    merged.update(handler_config);
                    let Some(handler_type) = merged.handler_type else {
                        return Err(ConfigError::MissingHandlerType(name.clone()));
                    };
                    let factory = self
                        .read_handlers()
                        .factories
                        .get(&handler_type)
                        .cloned()
                        .ok_or_else(|| ConfigError::UnknownHandlerType {
                            handler: name.clone(),
                            handler_type: handler_type.clone(),
                        })?;
                    (factory, Some(existing), true, merged.options)
                }
                (None, None) => return Err(ConfigError::MissingHandlerType(name.clone())),
            };
            resolved.push(HandlerBuild {
                name: name.clone(),
                factory,
                existing,
                reuse,
                options,
            });
        }

        let mut prepared = PreparedHandlers::default();
        for build in resolved {
            let handler = run_factory(&build)?;
            if let Some(existing) = &build.existing {
                prepared.replaced.push((Arc::clone(existing), Arc::clone(&handler)));
            }
            prepared.observed.push((build.name.clone(), build.existing));
            prepared.by_name.insert(build.name, handler);
        }
        Ok(prepared)
    }

    /// Commits a prepared update and returns the handlers it unbound, or
    /// `None` when the prepared handlers are stale and nothing was changed.
    fn finish_config_update(
        &self,
        config: &LogConfig,
        prepared: PreparedHandlers,
        mode: UpdateMode,
    ) -> Result<Option<Vec<Arc<dyn LogHandler>>>, ConfigError> {
        let mut locked = self.write_both();
        if !prepared.is_current(&locked) {
            return Ok(None);
        }

        let mut plans = Vec::with_capacity(config.categories().len());
        for (name, category_config) in config.categories() {
            let handlers = match &category_config.handlers {
                Some(names) => Some(resolve_handlers(&locked, &prepared, name, names)?),
                None => None,
            };
            plans.push(CategoryPlan {
                canonical: canonicalize_name(name),
                config: category_config,
                handlers,
            });
        }

        // Validation is over; from here on nothing fails.
        let previously_bound =
            distinct_handlers(locked.categories.iter().map(|c| c.handler_snapshot()));

        match mode {
            UpdateMode::Merge => replace_bound_handlers(&locked, &prepared),
            UpdateMode::Replace => locked.categories.reset_all(),
        }

        for plan in plans {
            let category = locked.categories.get_or_create(&plan.canonical);
            locked.categories.set_level(
                category.index(),
                plan.config.level,
                plan.config.inherit_parent_level,
            );
            match plan.handlers {
                Some(handlers) => category.set_handlers(handlers),
                None if mode == UpdateMode::Replace => category.clear_handlers(),
                None => {}
            }
        }

        let info = &mut *locked.handlers;
        info.handlers.retain(|_, handler| handler.strong_count() > 0);
        for (name, handler) in &prepared.by_name {
            info.handlers.insert(name.clone(), Arc::downgrade(handler));
        }

        let still_bound: FxHashSet<*const ()> = locked
            .categories
            .iter()
            .flat_map(|c| {
                c.handler_snapshot()
                    .iter()
                    .map(handler_addr)
                    .collect::<Vec<_>>()
            })
            .collect();
        drop(locked);

        Ok(Some(
            previously_bound
                .into_iter()
                .filter(|handler| !still_bound.contains(&handler_addr(handler)))
                .collect(),
        ))
    }
}

fn run_factory(build: &HandlerBuild) -> Result<Arc<dyn LogHandler>, ConfigError> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| match &build.existing {
        Some(existing) if build.reuse => build.factory.update_handler(existing, &build.options),
        _ => build.factory.create_handler(&build.options),
    }));
    let result = outcome.unwrap_or_else(|payload| {
        Err(HandlerError::Other(format!(
            "factory panicked: {}",
            panic_message(payload.as_ref())
        )))
    });
    result.map_err(|source| ConfigError::HandlerCreation {
        handler: build.name.clone(),
        source,
    })
}

/// Looks up every handler a category should be bound to, preferring the
/// handlers built for this update over existing ones.
fn resolve_handlers(
    locked: &WriteBoth<'_>,
    prepared: &PreparedHandlers,
    category: &str,
    names: &[String],
) -> Result<HandlerList, ConfigError> {
    names
        .iter()
        .map(|name| {
            prepared
                .by_name
                .get(name)
                .cloned()
                .or_else(|| locked.handlers.live_handler(name))
                .ok_or_else(|| ConfigError::UnknownHandler {
                    category: category.to_owned(),
                    handler: name.clone(),
                })
        })
        .collect()
}

/// Swaps rebuilt handlers into every category still bound to the old ones.
fn replace_bound_handlers(locked: &WriteBoth<'_>, prepared: &PreparedHandlers) {
    let replacements: FxHashMap<*const (), &Arc<dyn LogHandler>> = prepared
        .replaced
        .iter()
        .filter(|(old, new)| handler_addr(old) != handler_addr(new))
        .map(|(old, new)| (handler_addr(old), new))
        .collect();
    if replacements.is_empty() {
        return;
    }
    for category in locked.categories.iter() {
        let current = category.handler_snapshot();
        if !current
            .iter()
            .any(|handler| replacements.contains_key(&handler_addr(handler)))
        {
            continue;
        }
        let updated = current
            .iter()
            .map(|handler| {
                replacements
                    .get(&handler_addr(handler))
                    .map_or_else(|| Arc::clone(handler), |new| Arc::clone(new))
            })
            .collect();
        category.set_handlers(updated);
    }
}
