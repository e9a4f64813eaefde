#![deny(missing_docs)]

//! crates/platform/src/lib.rs
//!
//! Thin, audited wrappers over the OS primitives the logging runtime needs:
//! process forking and reaping for the fork-safety coordinator, and the OS
//! thread id stamped onto every log record. All `unsafe` code in the
//! workspace lives in this crate.

pub mod process;
pub mod thread;

pub use process::{ChildExit, Pid};
pub use thread::os_thread_id;
