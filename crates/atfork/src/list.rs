//! crates/atfork/src/list.rs
//! Insertion-ordered list of at-fork entries.

use std::fmt;

use crate::error::AtForkError;
use crate::fork_debug;

/// Callback run before the fork. Returns false when its resources could not
/// be acquired yet.
pub type PrepareFn = Box<dyn FnMut() -> bool + Send>;

/// Callback run after the fork, in the parent or in the child.
pub type ReleaseFn = Box<dyn FnMut() + Send>;

/// Opaque owner token identifying an at-fork entry.
///
/// Components usually derive it from their own address with [`ForkKey::of`]
/// so they can remove their entry later.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct ForkKey(usize);

impl ForkKey {
    /// Builds a key from the address of `owner`.
    #[must_use]
    pub fn of<T: ?Sized>(owner: &T) -> Self {
        Self(std::ptr::from_ref(owner).cast::<()>() as usize)
    }

    /// Builds a key from an arbitrary pointer-sized token.
    #[must_use]
    pub const fn from_raw(token: usize) -> Self {
        Self(token)
    }

    /// Returns the raw token.
    #[must_use]
    pub const fn as_raw(self) -> usize {
        self.0
    }
}

impl fmt::Debug for ForkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ForkKey({:#x})", self.0)
    }
}

struct Entry {
    key: Option<ForkKey>,
    prepare: Option<PrepareFn>,
    parent: Option<ReleaseFn>,
    child: Option<ReleaseFn>,
    prepared: bool,
}

/// Ordered registry of `prepare`/`parent`/`child` callbacks.
///
/// Entries keep their registration order. [`prepare`](Self::prepare) walks
/// them newest first; [`parent`](Self::parent) and [`child`](Self::child)
/// walk them oldest first and only visit entries that were prepared by the
/// most recent `prepare` pass.
///
/// The list itself is not synchronized; [`AtFork`](crate::AtFork) wraps the
/// process-wide instance in a mutex.
#[derive(Default)]
pub struct AtForkList {
    entries: Vec<Entry>,
}

impl AtForkList {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Returns the number of registered entries, keyed or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no entries are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registers a new entry after all existing ones.
    ///
    /// An entry without a key cannot be removed and is never reported by
    /// [`contains`](Self::contains). A keyless entry with no callbacks is
    /// accepted and ignored.
    pub fn append(
        &mut self,
        key: Option<ForkKey>,
        prepare: Option<PrepareFn>,
        parent: Option<ReleaseFn>,
        child: Option<ReleaseFn>,
    ) -> Result<(), AtForkError> {
        if key.is_none() && prepare.is_none() && parent.is_none() && child.is_none() {
            return Ok(());
        }
        if let Some(key) = key
            && self.position(key).is_some()
        {
            return Err(AtForkError::DuplicateKey(key));
        }
        fork_debug!(?key, "registering at-fork entry");
        self.entries.push(Entry {
            key,
            prepare,
            parent,
            child,
            prepared: false,
        });
        Ok(())
    }

    /// Removes the entry registered under `key`.
    ///
    /// Removing `None` is a no-op.
    pub fn remove(&mut self, key: Option<ForkKey>) -> Result<(), AtForkError> {
        let Some(key) = key else {
            return Ok(());
        };
        let index = self.position(key).ok_or(AtForkError::MissingKey(key))?;
        fork_debug!(?key, "removing at-fork entry");
        self.entries.remove(index);
        Ok(())
    }

    /// Returns true when an entry is registered under `key`.
    #[must_use]
    pub fn contains(&self, key: Option<ForkKey>) -> bool {
        key.is_some_and(|key| self.position(key).is_some())
    }

    /// Runs every `prepare` callback, newest entry first, until a full pass
    /// succeeds.
    ///
    /// A pass that meets a failing `prepare` backs out the entries it already
    /// prepared and starts over after yielding the thread, so this only
    /// returns once every entry has acquired its resources.
    pub fn prepare(&mut self) {
        while !self.try_prepare() {
            fork_debug!("at-fork prepare pass failed, retrying");
            std::thread::yield_now();
        }
    }

    /// Runs a single `prepare` pass, newest entry first.
    ///
    /// Entries without a `prepare` callback always participate. When an
    /// entry's `prepare` returns false, the `parent` callbacks of the entries
    /// prepared earlier in this pass are invoked newest first, no entry is
    /// left marked as prepared, and false is returned.
    pub fn try_prepare(&mut self) -> bool {
        for entry in &mut self.entries {
            entry.prepared = false;
        }

        for index in (0..self.entries.len()).rev() {
            let entry = &mut self.entries[index];
            let acquired = entry.prepare.as_mut().is_none_or(|prepare| prepare());
            if !acquired {
                self.back_out(index + 1);
                return false;
            }
            entry.prepared = true;
        }
        true
    }

    /// Runs the `parent` callbacks of prepared entries, oldest first.
    pub fn parent(&mut self) {
        for entry in &mut self.entries {
            if std::mem::take(&mut entry.prepared)
                && let Some(parent) = entry.parent.as_mut()
            {
                parent();
            }
        }
    }

    /// Runs the `child` callbacks of prepared entries, oldest first.
    pub fn child(&mut self) {
        for entry in &mut self.entries {
            if std::mem::take(&mut entry.prepared)
                && let Some(child) = entry.child.as_mut()
            {
                child();
            }
        }
    }

    fn back_out(&mut self, first_prepared: usize) {
        for entry in self.entries[first_prepared..].iter_mut().rev() {
            if std::mem::take(&mut entry.prepared)
                && let Some(parent) = entry.parent.as_mut()
            {
                parent();
            }
        }
    }

    fn position(&self, key: ForkKey) -> Option<usize> {
        self.entries.iter().position(|entry| entry.key == Some(key))
    }
}

impl fmt::Debug for AtForkList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtForkList")
            .field(
                "keys",
                &self.entries.iter().map(|e| e.key).collect::<Vec<_>>(),
            )
            .finish()
    }
}
