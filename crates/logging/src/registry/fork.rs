//! crates/logging/src/registry/fork.rs
//! Keeps the global registry's locks consistent across instrumented forks.
//!
//! `prepare` takes both registry write locks and the context callback write
//! mutex without blocking. The guards are parked in a thread-local until the
//! matching `parent` or `child` callback drops them, which happens on the
//! forking thread in both processes.

use std::cell::RefCell;
use std::sync::MutexGuard;

use atfork::{AtFork, AtForkError, ForkKey};

use super::LoggerDb;
use super::locks::WriteBoth;

struct ForkGuards {
    _locks: WriteBoth<'static>,
    _context: MutexGuard<'static, ()>,
}

thread_local! {
    static HELD: RefCell<Option<ForkGuards>> = const { RefCell::new(None) };
}

pub(super) fn register(db: &'static LoggerDb) -> Result<(), AtForkError> {
    AtFork::register_handler(ForkKey::of(db), move || prepare(db), release, release)
}

fn prepare(db: &'static LoggerDb) -> bool {
    let Some(locks) = db.try_write_both() else {
        return false;
    };
    let Some(context) = db.context.try_lock_writes() else {
        return false;
    };
    HELD.with(|held| {
        *held.borrow_mut() = Some(ForkGuards {
            _locks: locks,
            _context: context,
        });
    });
    true
}

fn release() {
    HELD.with(|held| drop(held.borrow_mut().take()));
}
