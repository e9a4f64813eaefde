#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! crates/atfork/src/lib.rs
//!
//! # Overview
//!
//! Subsystems that own locks register `prepare`, `parent` and `child`
//! callbacks here so a `fork(2)` never leaves a child holding a mutex
//! locked by a thread that does not exist in the child.
//!
//! # Ordering
//!
//! `prepare` callbacks run newest-registration first; `parent` and `child`
//! callbacks run oldest first. The last subsystem to acquire its locks is
//! the first to release them, so independently registered subsystems never
//! invert each other's lock order.
//!
//! A `prepare` callback returns `false` to report that it could not acquire
//! its resources yet. The entries already prepared in that pass are backed
//! out through their `parent` callbacks (newest first) and the pass is
//! restarted until every entry succeeds.
//!
//! # Examples
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use atfork::AtForkList;
//!
//! let ops = Arc::new(Mutex::new(Vec::new()));
//! let mut list = AtForkList::new();
//! for i in 0..2 {
//!     let (p, a) = (Arc::clone(&ops), Arc::clone(&ops));
//!     list.append(
//!         None,
//!         Some(Box::new(move || { p.lock().unwrap().push(70 + i); true })),
//!         Some(Box::new(move || a.lock().unwrap().push(80 + i))),
//!         None,
//!     )
//!     .unwrap();
//! }
//! list.prepare();
//! list.parent();
//! assert_eq!(*ops.lock().unwrap(), vec![71, 70, 80, 81]);
//! ```

mod error;
mod global;
mod list;

pub use error::AtForkError;
pub use global::AtFork;
pub use list::{AtForkList, ForkKey, PrepareFn, ReleaseFn};
pub use platform::Pid;

macro_rules! fork_debug {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        {
            ::tracing::debug!(target: "atfork", $($arg)*);
        }
    };
}
pub(crate) use fork_debug;
