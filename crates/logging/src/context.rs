//! crates/logging/src/context.rs
//! Callbacks that contribute ambient context to every log message.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};

use arc_swap::ArcSwap;

/// A callback producing one context segment.
pub type ContextCallback = Arc<dyn Fn() -> String + Send + Sync>;

/// The ordered set of context callbacks attached to a registry.
///
/// Reads are lock-free: [`context_string`](Self::context_string) loads an
/// immutable snapshot and never blocks writers. Writers copy the snapshot,
/// append, and publish the new one; the old snapshot is freed once the last
/// reader drops it.
pub struct ContextCallbackList {
    callbacks: ArcSwap<Vec<ContextCallback>>,
    write: Mutex<()>,
}

impl Default for ContextCallbackList {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ContextCallbackList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextCallbackList")
            .field("len", &self.len())
            .finish()
    }
}

impl ContextCallbackList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            callbacks: ArcSwap::from_pointee(Vec::new()),
            write: Mutex::new(()),
        }
    }

    /// Appends `callback`; it runs after every callback added before it.
    pub fn add_callback<F>(&self, callback: F)
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        let _guard = self.lock_writes();
        let current = self.callbacks.load();
        let mut next = Vec::with_capacity(current.len() + 1);
        next.extend(current.iter().cloned());
        next.push(Arc::new(callback) as ContextCallback);
        self.callbacks.store(Arc::new(next));
    }

    /// Number of registered callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.load().len()
    }

    /// Returns true when no callbacks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs every callback in registration order.
    ///
    /// Each segment is preceded by a single space. A callback that panics
    /// contributes `[error: <panic message>]` and the remaining callbacks
    /// still run.
    #[must_use]
    pub fn context_string(&self) -> String {
        let snapshot = self.callbacks.load();
        let mut out = String::new();
        for callback in snapshot.iter() {
            out.push(' ');
            match panic::catch_unwind(AssertUnwindSafe(|| callback())) {
                Ok(segment) => out.push_str(&segment),
                Err(payload) => {
                    let reason = panic_message(payload.as_ref());
                    out.push_str("[error: ");
                    out.push_str(reason);
                    out.push(']');
                }
            }
        }
        out
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes the write mutex without blocking, for fork preparation.
    pub(crate) fn try_lock_writes(&self) -> Option<MutexGuard<'_, ()>> {
        match self.write.try_lock() {
            Ok(guard) => Some(guard),
            Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }
}

/// Extracts the text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(text) = payload.downcast_ref::<&'static str>() {
        text
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text
    } else {
        "unknown panic"
    }
}
