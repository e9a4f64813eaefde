//! crates/atfork/src/error.rs
//! Usage errors reported by the at-fork registry.

use crate::list::ForkKey;

/// Errors returned when registering or removing at-fork entries.
///
/// The registry is left unchanged whenever one of these is returned.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum AtForkError {
    /// An entry is already registered under this key.
    #[error("at-fork: append: duplicate key {0:?}")]
    DuplicateKey(ForkKey),
    /// No entry is registered under this key.
    #[error("at-fork: remove: missing key {0:?}")]
    MissingKey(ForkKey),
}
