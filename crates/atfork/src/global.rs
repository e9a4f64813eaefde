//! crates/atfork/src/global.rs
//! Process-wide at-fork registry and the instrumented fork wrapper.

use std::sync::{Mutex, MutexGuard, PoisonError};

use platform::Pid;

use crate::error::AtForkError;
use crate::list::{AtForkList, ForkKey};

static HANDLERS: Mutex<AtForkList> = Mutex::new(AtForkList::new());

fn handlers() -> MutexGuard<'static, AtForkList> {
    HANDLERS.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The process-wide at-fork registry.
///
/// Callbacks registered here run around every fork performed through
/// [`AtFork::fork_instrumented`] or [`AtFork::fork`]. The registry lock is
/// held from `prepare` until `parent`/`child` finish, so callbacks must not
/// register or unregister handlers themselves.
#[derive(Debug)]
pub struct AtFork;

impl AtFork {
    /// Registers callbacks for `key`, after every existing registration.
    pub fn register_handler<P, A, C>(
        key: ForkKey,
        prepare: P,
        parent: A,
        child: C,
    ) -> Result<(), AtForkError>
    where
        P: FnMut() -> bool + Send + 'static,
        A: FnMut() + Send + 'static,
        C: FnMut() + Send + 'static,
    {
        handlers().append(
            Some(key),
            Some(Box::new(prepare)),
            Some(Box::new(parent)),
            Some(Box::new(child)),
        )
    }

    /// Removes the callbacks registered for `key`.
    pub fn unregister_handler(key: ForkKey) -> Result<(), AtForkError> {
        handlers().remove(Some(key))
    }

    /// Returns true when callbacks are registered for `key`.
    #[must_use]
    pub fn is_registered(key: ForkKey) -> bool {
        handlers().contains(Some(key))
    }

    /// Runs `fork_fn` between the registered `prepare` and `parent`/`child`
    /// callbacks and returns its result unchanged.
    ///
    /// A return value of `0` selects the `child` callbacks; anything else,
    /// including `-1` for a failed fork, selects `parent`.
    pub fn fork_instrumented<F>(fork_fn: F) -> Pid
    where
        F: FnOnce() -> Pid,
    {
        let mut list = handlers();
        list.prepare();
        let pid = fork_fn();
        if pid == 0 {
            list.child();
        } else {
            list.parent();
        }
        pid
    }

    /// Forks the process with all registered callbacks applied.
    #[cfg(unix)]
    pub fn fork() -> Pid {
        Self::fork_instrumented(platform::process::fork)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn fork_instrumented_runs_parent_for_nonzero_pid() {
        let owner = 0_u64;
        let key = ForkKey::of(&owner);
        let counts = Arc::new([AtomicUsize::new(0), AtomicUsize::new(0), AtomicUsize::new(0)]);
        let (p, a, c) = (Arc::clone(&counts), Arc::clone(&counts), Arc::clone(&counts));
        AtFork::register_handler(
            key,
            move || {
                p[0].fetch_add(1, Ordering::SeqCst);
                true
            },
            move || {
                a[1].fetch_add(1, Ordering::SeqCst);
            },
            move || {
                c[2].fetch_add(1, Ordering::SeqCst);
            },
        )
        .unwrap();

        assert_eq!(AtFork::fork_instrumented(|| 4242), 4242);
        assert_eq!(AtFork::fork_instrumented(|| -1), -1);
        assert_eq!(AtFork::fork_instrumented(|| 0), 0);

        AtFork::unregister_handler(key).unwrap();
        assert_eq!(counts[0].load(Ordering::SeqCst), 3);
        assert_eq!(counts[1].load(Ordering::SeqCst), 2);
        assert_eq!(counts[2].load(Ordering::SeqCst), 1);
    }

    #[test]
    fn global_registration_rejects_duplicates() {
        let owner = 0_u64;
        let key = ForkKey::of(&owner);
        AtFork::register_handler(key, || true, || {}, || {}).unwrap();
        assert!(AtFork::is_registered(key));
        assert_eq!(
            AtFork::register_handler(key, || true, || {}, || {}),
            Err(AtForkError::DuplicateKey(key))
        );
        AtFork::unregister_handler(key).unwrap();
        assert_eq!(
            AtFork::unregister_handler(key),
            Err(AtForkError::MissingKey(key))
        );
    }
}
