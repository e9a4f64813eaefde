//! crates/logging/src/category.rs
//! A single node of the category tree.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use arc_swap::ArcSwap;

use crate::context::{ContextCallbackList, panic_message};
use crate::handler::LogHandler;
use crate::internal_warning;
use crate::levels::LogLevel;
use crate::message::LogMessage;

/// Set in the packed level word when the category inherits its parent's level.
const INHERIT_FLAG: u32 = 0x8000_0000;

pub(crate) type HandlerList = Vec<Arc<dyn LogHandler>>;

/// A named node in the category hierarchy.
///
/// Categories are owned by a [`LoggerDb`](crate::LoggerDb) and live as long
/// as it does. The effective level is a single atomic so call sites can
/// check it without taking any lock; every other mutation goes through the
/// registry.
pub struct LogCategory {
    name: String,
    index: usize,
    level: AtomicU32,
    effective_level: AtomicU32,
    parent: Option<Weak<LogCategory>>,
    handlers: ArcSwap<HandlerList>,
    context: Arc<ContextCallbackList>,
    /// Call-site level caches that mirror `effective_level`. Only touched
    /// with the registry's category lock held for writing.
    xlog_levels: Mutex<Vec<&'static AtomicU32>>,
}

impl LogCategory {
    pub(crate) fn new_root(context: Arc<ContextCallbackList>, level: LogLevel) -> Self {
        Self {
            name: String::new(),
            index: 0,
            level: AtomicU32::new(level.as_raw()),
            effective_level: AtomicU32::new(level.as_raw()),
            parent: None,
            handlers: ArcSwap::from_pointee(Vec::new()),
            context,
            xlog_levels: Mutex::new(Vec::new()),
        }
    }

    /// New children inherit with the least restrictive own level, so they
    /// start out at exactly the parent's effective level.
    pub(crate) fn new_child(parent: &Arc<Self>, name: String, index: usize) -> Self {
        let effective = parent.effective_level.load(Ordering::Relaxed);
        Self {
            name,
            index,
            level: AtomicU32::new(LogLevel::MAX_LEVEL.as_raw() | INHERIT_FLAG),
            effective_level: AtomicU32::new(effective),
            parent: Some(Arc::downgrade(parent)),
            handlers: ArcSwap::from_pointee(Vec::new()),
            context: Arc::clone(&parent.context),
            xlog_levels: Mutex::new(Vec::new()),
        }
    }

    /// Canonical name; empty for the root.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true for the root category.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub(crate) const fn index(&self) -> usize {
        self.index
    }

    /// The parent category, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Arc<Self>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// The level configured on this category itself.
    #[must_use]
    pub fn level(&self) -> LogLevel {
        LogLevel::from_raw(self.level.load(Ordering::Relaxed) & !INHERIT_FLAG)
    }

    /// Whether this category takes the parent's effective level into account.
    #[must_use]
    pub fn inherits_parent_level(&self) -> bool {
        self.level.load(Ordering::Relaxed) & INHERIT_FLAG != 0
    }

    /// The threshold actually applied to messages logged here.
    #[must_use]
    pub fn effective_level(&self) -> LogLevel {
        LogLevel::from_raw(self.effective_level.load(Ordering::Relaxed))
    }

    /// The atomic holding the effective level, for call-site caches.
    #[must_use]
    pub fn effective_level_atomic(&self) -> &AtomicU32 {
        &self.effective_level
    }

    /// Returns true when a message at `level` would be admitted.
    #[must_use]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level.as_raw() >= self.effective_level.load(Ordering::Relaxed)
    }

    /// The handlers currently bound to this category, in binding order.
    #[must_use]
    pub fn handlers(&self) -> Vec<Arc<dyn LogHandler>> {
        Vec::clone(&self.handlers.load())
    }

    pub(crate) fn handler_snapshot(&self) -> Arc<HandlerList> {
        self.handlers.load_full()
    }

    pub(crate) fn set_handlers(&self, handlers: HandlerList) {
        self.handlers.store(Arc::new(handlers));
    }

    pub(crate) fn clear_handlers(&self) {
        if !self.handlers.load().is_empty() {
            self.handlers.store(Arc::new(Vec::new()));
        }
    }

    pub(crate) fn store_level(&self, level: LogLevel, inherit: bool) {
        let flag = if inherit { INHERIT_FLAG } else { 0 };
        self.level.store(level.as_raw() | flag, Ordering::Relaxed);
    }

    pub(crate) fn store_effective_level(&self, level: LogLevel) {
        self.effective_level.store(level.as_raw(), Ordering::Relaxed);
        for site in self.xlog_sites().iter() {
            site.store(level.as_raw(), Ordering::Relaxed);
        }
    }

    /// Makes `site` follow this category's effective level from now on.
    pub(crate) fn register_xlog_level(&self, site: &'static AtomicU32) {
        let mut sites = self.xlog_sites();
        site.store(self.effective_level.load(Ordering::Relaxed), Ordering::Relaxed);
        if !sites.iter().any(|known| std::ptr::eq(*known, site)) {
            sites.push(site);
        }
    }

    fn xlog_sites(&self) -> MutexGuard<'_, Vec<&'static AtomicU32>> {
        self.xlog_levels.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn context(&self) -> &ContextCallbackList {
        &self.context
    }

    /// Delivers `message` to this category's handlers, then to every
    /// ancestor's handlers up to the root.
    ///
    /// The level check is the caller's job; this never filters. Handler
    /// failures and panics are reported through the internal warning channel.
    /// Returns how many handlers were given the message.
    pub fn admit_message(&self, message: &LogMessage) -> usize {
        let mut delivered = self.process_message(message);
        let mut next = self.parent();
        while let Some(category) = next {
            delivered += category.process_message(message);
            next = category.parent();
        }
        delivered
    }

    fn process_message(&self, message: &LogMessage) -> usize {
        let handlers = self.handlers.load();
        for handler in handlers.iter() {
            let outcome =
                panic::catch_unwind(AssertUnwindSafe(|| handler.handle_message(message, self)));
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    internal_warning!(
                        "error processing message in category \"{}\": {err}",
                        self.name
                    );
                }
                Err(payload) => {
                    internal_warning!(
                        "handler panicked in category \"{}\": {}",
                        self.name,
                        panic_message(payload.as_ref())
                    );
                }
            }
        }
        handlers.len()
    }
}

impl fmt::Debug for LogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogCategory")
            .field("name", &self.name)
            .field("level", &self.level())
            .field("inherit", &self.inherits_parent_level())
            .field("effective_level", &self.effective_level())
            .field("handlers", &self.handlers.load().len())
            .finish()
    }
}
