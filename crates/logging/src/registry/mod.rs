//! crates/logging/src/registry/mod.rs
//! The logger database: categories, handler factories and named handlers.

mod fork;
mod locks;
mod snapshot;
mod update;

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::AtomicU32;
use std::sync::{Arc, Once, OnceLock, RwLock};

use rustc_hash::FxHashSet;

use crate::category::LogCategory;
use crate::context::{ContextCallbackList, panic_message};
use crate::error::ConfigError;
use crate::handler::{LogHandler, LogHandlerFactory};
use crate::internal_warning;
use crate::levels::LogLevel;
use crate::name::canonicalize_name;
use crate::tree::CategoryTree;

use locks::HandlerInfo;

static GLOBAL: OnceLock<LoggerDb> = OnceLock::new();
static GLOBAL_FORK_HOOKS: Once = Once::new();

/// Owns the category tree and every handler factory and handler.
///
/// Most programs use the process-wide instance from [`LoggerDb::get`], which
/// the `xlog!` macros log through. Tests should build their own with
/// [`LoggerDb::new`] so they do not see or disturb each other's settings.
pub struct LoggerDb {
    handler_info: RwLock<HandlerInfo>,
    categories: RwLock<CategoryTree>,
    context: Arc<ContextCallbackList>,
}

impl Default for LoggerDb {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LoggerDb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerDb")
            .field("categories", &self.read_categories().len())
            .field("context_callbacks", &self.context.len())
            .finish_non_exhaustive()
    }
}

/// Address of a handler, for identity comparisons across trait objects.
pub(crate) fn handler_addr(handler: &Arc<dyn LogHandler>) -> *const () {
    Arc::as_ptr(handler).cast::<()>()
}

impl LoggerDb {
    /// Creates an isolated registry holding only the root category.
    #[must_use]
    pub fn new() -> Self {
        let context = Arc::new(ContextCallbackList::new());
        Self {
            handler_info: RwLock::new(HandlerInfo::default()),
            categories: RwLock::new(CategoryTree::new(Arc::clone(&context))),
            context,
        }
    }

    /// Returns the process-wide registry.
    ///
    /// The first call also registers the registry's locks with
    /// [`atfork::AtFork`], so instrumented forks never leave them held in
    /// the child.
    pub fn get() -> &'static Self {
        let db = GLOBAL.get_or_init(Self::new);
        GLOBAL_FORK_HOOKS.call_once(|| {
            if let Err(err) = fork::register(db) {
                internal_warning!("failed to register fork handlers: {err}");
            }
        });
        db
    }

    /// The root category.
    #[must_use]
    pub fn root(&self) -> Arc<LogCategory> {
        Arc::clone(self.read_categories().root())
    }

    /// Returns the category called `name`, creating it and its ancestors if
    /// needed.
    pub fn get_category(&self, name: &str) -> Arc<LogCategory> {
        let canonical = canonicalize_name(name);
        if let Some(category) = self.read_categories().get(&canonical) {
            return Arc::clone(category);
        }
        self.write_categories().get_or_create(&canonical)
    }

    /// Returns the category called `name` if it already exists.
    #[must_use]
    pub fn get_category_or_none(&self, name: &str) -> Option<Arc<LogCategory>> {
        let canonical = canonicalize_name(name);
        self.read_categories().get(&canonical).map(Arc::clone)
    }

    /// Sets a category's level and recomputes effective levels below it.
    ///
    /// The root ignores `inherit`. Every descendant reflects the change by
    /// the time this returns.
    pub fn set_level(&self, name: &str, level: LogLevel, inherit: bool) {
        let canonical = canonicalize_name(name);
        let mut tree = self.write_categories();
        let category = tree.get_or_create(&canonical);
        tree.set_level(category.index(), level, inherit);
    }

    /// One-time setup for a call-site cache.
    ///
    /// Fills `slot` with the category for `name` unless another thread got
    /// there first, registers `site_level` so every later change to the
    /// category's effective level is copied into it, and returns the current
    /// effective level.
    pub fn xlog_init(
        &self,
        name: &str,
        slot: &OnceLock<Arc<LogCategory>>,
        site_level: &'static AtomicU32,
    ) -> LogLevel {
        slot.get_or_init(|| {
            let canonical = canonicalize_name(name);
            let mut tree = self.write_categories();
            let category = tree.get_or_create(&canonical);
            category.register_xlog_level(site_level);
            category
        })
        .effective_level()
    }

    /// Registers a factory under its [`handler_type`](LogHandlerFactory::handler_type).
    ///
    /// Fails with [`ConfigError::DuplicateFactory`] when the type is taken and
    /// `replace_existing` is false, keeping the original factory.
    pub fn register_handler_factory(
        &self,
        factory: Arc<dyn LogHandlerFactory>,
        replace_existing: bool,
    ) -> Result<(), ConfigError> {
        let handler_type = factory.handler_type().to_owned();
        let mut info = self.write_handlers();
        if !replace_existing && info.factories.contains_key(&handler_type) {
            return Err(ConfigError::DuplicateFactory(handler_type));
        }
        info.factories.insert(handler_type, factory);
        Ok(())
    }

    /// Removes the factory for `handler_type`. Existing handlers stay.
    pub fn unregister_handler_factory(&self, handler_type: &str) -> Result<(), ConfigError> {
        self.write_handlers()
            .factories
            .remove(handler_type)
            .map(drop)
            .ok_or_else(|| ConfigError::UnknownFactory(handler_type.to_owned()))
    }

    /// Flushes every handler bound to any category.
    ///
    /// Returns the number of distinct handlers. Flush failures go to the
    /// internal warning channel.
    pub fn flush_all_handlers(&self) -> usize {
        let handlers = self.bound_handlers();
        for handler in &handlers {
            match panic::catch_unwind(AssertUnwindSafe(|| handler.flush())) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => internal_warning!("error flushing log handler: {err}"),
                Err(payload) => internal_warning!(
                    "log handler panicked while flushing: {}",
                    panic_message(payload.as_ref())
                ),
            }
        }
        handlers.len()
    }

    /// Unbinds every handler from every category and closes them.
    ///
    /// Factories stay registered. Used at shutdown.
    pub fn cleanup_handlers(&self) {
        let unbound = {
            let mut locked = self.write_both();
            let unbound = distinct_handlers(locked.categories.iter().map(|c| c.handler_snapshot()));
            for category in locked.categories.iter() {
                category.clear_handlers();
            }
            locked.handlers.handlers.clear();
            unbound
        };
        close_retired(unbound);
    }

    /// Appends a callback whose output is added to every message's context.
    pub fn add_context_callback<F>(&self, callback: F)
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.context.add_callback(callback);
    }

    /// Runs the context callbacks; see [`ContextCallbackList::context_string`].
    #[must_use]
    pub fn context_string(&self) -> String {
        self.context.context_string()
    }

    /// The context callbacks shared by every category of this registry.
    #[must_use]
    pub fn context(&self) -> &ContextCallbackList {
        &self.context
    }

    fn bound_handlers(&self) -> Vec<Arc<dyn LogHandler>> {
        let tree = self.read_categories();
        distinct_handlers(tree.iter().map(|c| c.handler_snapshot()))
    }
}

/// Flattens handler lists, keeping the first occurrence of each handler.
fn distinct_handlers<I, L>(lists: I) -> Vec<Arc<dyn LogHandler>>
where
    I: IntoIterator<Item = L>,
    L: AsRef<Vec<Arc<dyn LogHandler>>>,
{
    let mut seen = FxHashSet::default();
    let mut out = Vec::new();
    for list in lists {
        for handler in list.as_ref() {
            if seen.insert(handler_addr(handler)) {
                out.push(Arc::clone(handler));
            }
        }
    }
    out
}

/// Closes handlers that were just unbound. Must be called with no registry
/// lock held. A logger still holding an old handler snapshot gets
/// [`HandlerError::Closed`](crate::HandlerError::Closed) from it.
fn close_retired(handlers: Vec<Arc<dyn LogHandler>>) {
    for handler in handlers {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| handler.close())) {
            internal_warning!(
                "log handler panicked while closing: {}",
                panic_message(payload.as_ref())
            );
        }
    }
}
