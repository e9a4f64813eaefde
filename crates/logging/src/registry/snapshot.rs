//! crates/logging/src/registry/snapshot.rs
//! Reading the current configuration back out of the registry.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::config::{LogCategoryConfig, LogConfig};
use crate::handler::LogHandler;
use crate::levels::LogLevel;

use super::{LoggerDb, handler_addr};

impl LoggerDb {
    /// The current configuration, omitting categories at default settings.
    ///
    /// A category is at default settings when it inherits, has level
    /// `MAX_LEVEL` and has no handlers. The root is always included.
    #[must_use]
    pub fn get_config(&self) -> LogConfig {
        self.config_snapshot(false)
    }

    /// The current configuration including every known category.
    #[must_use]
    pub fn get_full_config(&self) -> LogConfig {
        self.config_snapshot(true)
    }

    fn config_snapshot(&self, include_all: bool) -> LogConfig {
        let mut config = LogConfig::new();
        let mut named: Vec<(String, Arc<dyn LogHandler>)> = Vec::new();
        {
            let locked = self.read_both();
            let names: FxHashMap<*const (), &str> = locked
                .handlers
                .handlers
                .iter()
                .filter(|(_, weak)| weak.strong_count() > 0)
                .map(|(name, weak)| (weak.as_ptr().cast::<()>(), name.as_str()))
                .collect();

            for category in locked.categories.iter() {
                let handlers = category.handler_snapshot();
                let at_defaults = !category.is_root()
                    && handlers.is_empty()
                    && category.inherits_parent_level()
                    && category.level() == LogLevel::MAX_LEVEL;
                if at_defaults && !include_all {
                    continue;
                }

                let mut handler_names = Vec::with_capacity(handlers.len());
                for handler in handlers.iter() {
                    let Some(&name) = names.get(&handler_addr(handler)) else {
                        continue;
                    };
                    handler_names.push(name.to_owned());
                    if !named.iter().any(|(existing, _)| existing == name) {
                        named.push((name.to_owned(), Arc::clone(handler)));
                    }
                }
                config.add_category(
                    category.name(),
                    LogCategoryConfig::with_handlers(
                        category.level(),
                        category.inherits_parent_level(),
                        handler_names,
                    ),
                );
            }
        }

        // Handler code runs without registry locks held.
        for (name, handler) in named {
            config.add_handler(name, handler.config());
        }
        config
    }
}
