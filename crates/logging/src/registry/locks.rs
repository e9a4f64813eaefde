//! crates/logging/src/registry/locks.rs
//! Lock acquisition for the registry.
//!
//! Whenever both registry locks are needed the handler lock is taken first.
//! The only code that takes both lives in this file; everything else asks
//! for a [`WriteBoth`] or [`ReadBoth`] and cannot get the order wrong.

use std::sync::{
    Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, TryLockError, Weak,
};

use rustc_hash::FxHashMap;

use crate::handler::{LogHandler, LogHandlerFactory};
use crate::tree::CategoryTree;

use super::LoggerDb;

/// Factories and named handlers.
///
/// Handlers are held weakly; the categories they are bound to own them.
#[derive(Default)]
pub(crate) struct HandlerInfo {
    pub(crate) factories: FxHashMap<String, Arc<dyn LogHandlerFactory>>,
    pub(crate) handlers: FxHashMap<String, Weak<dyn LogHandler>>,
}

impl HandlerInfo {
    /// Returns the live handler registered under `name`.
    pub(crate) fn live_handler(&self, name: &str) -> Option<Arc<dyn LogHandler>> {
        self.handlers.get(name).and_then(Weak::upgrade)
    }
}

/// Both registry locks held for writing.
pub(crate) struct WriteBoth<'a> {
    pub(crate) handlers: RwLockWriteGuard<'a, HandlerInfo>,
    pub(crate) categories: RwLockWriteGuard<'a, CategoryTree>,
}

/// Both registry locks held for reading.
pub(crate) struct ReadBoth<'a> {
    pub(crate) handlers: RwLockReadGuard<'a, HandlerInfo>,
    pub(crate) categories: RwLockReadGuard<'a, CategoryTree>,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn try_write<T>(lock: &RwLock<T>) -> Option<RwLockWriteGuard<'_, T>> {
    match lock.try_write() {
        Ok(guard) => Some(guard),
        Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
        Err(TryLockError::WouldBlock) => None,
    }
}

impl LoggerDb {
    pub(crate) fn read_handlers(&self) -> RwLockReadGuard<'_, HandlerInfo> {
        read(&self.handler_info)
    }

    pub(crate) fn write_handlers(&self) -> RwLockWriteGuard<'_, HandlerInfo> {
        write(&self.handler_info)
    }

    pub(crate) fn read_categories(&self) -> RwLockReadGuard<'_, CategoryTree> {
        read(&self.categories)
    }

    pub(crate) fn write_categories(&self) -> RwLockWriteGuard<'_, CategoryTree> {
        write(&self.categories)
    }

    pub(crate) fn write_both(&self) -> WriteBoth<'_> {
        let handlers = write(&self.handler_info);
        let categories = write(&self.categories);
        WriteBoth {
            handlers,
            categories,
        }
    }

    pub(crate) fn read_both(&self) -> ReadBoth<'_> {
        let handlers = read(&self.handler_info);
        let categories = read(&self.categories);
        ReadBoth {
            handlers,
            categories,
        }
    }

    /// Takes both write locks without blocking; `None` if either is busy.
    pub(crate) fn try_write_both(&self) -> Option<WriteBoth<'_>> {
        let handlers = try_write(&self.handler_info)?;
        let categories = try_write(&self.categories)?;
        Some(WriteBoth {
            handlers,
            categories,
        })
    }
}
