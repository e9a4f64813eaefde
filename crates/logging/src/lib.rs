#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` implements hierarchical log categories with runtime
//! reconfiguration. Categories form a tree keyed by dotted names
//! (`svc.net.http`); each has its own level and an *effective level* that
//! also accounts for its ancestors. Handlers are named sinks created by
//! registered factories and bound to categories through [`LogConfig`]
//! snapshots.
//!
//! # Design
//!
//! - [`LoggerDb`] owns everything. Its two locks, one for handlers and
//!   factories and one for the category tree, are always taken in that
//!   order when both are needed.
//! - The effective level of each [`LogCategory`] is a single atomic. Call
//!   sites cache their category once through [`XlogCategory`] and from then
//!   on check a level with one load and one compare.
//! - Configuration updates build handlers before taking any write lock, then
//!   validate and commit atomically. A rejected update changes nothing.
//! - Messages are delivered to the handlers of the logging category and of
//!   every ancestor. Handler failures never reach the caller; they are
//!   reported through the [internal warning channel](warning).
//! - The global registry registers itself with [`atfork::AtFork`] so forks
//!   made through `AtFork::fork` never inherit a held registry lock.
//!
//! # Invariants
//!
//! - `effective = inherit ? min(level, parent.effective) : level`, and the
//!   root never inherits. Level changes republish the whole subtree before
//!   returning.
//! - Category names are canonical: separators (`.`, `/`, `\`, `::`) become a
//!   single `.`, with no leading or trailing separators. Lookups ignore case.
//! - Categories are never removed from a registry.
//!
//! # Examples
//!
//! ```
//! use logging::{LogCategoryConfig, LogConfig, LogLevel, LoggerDb};
//!
//! let db = LoggerDb::new();
//! let net = db.get_category("svc/net");
//! assert_eq!(net.name(), "svc.net");
//! assert_eq!(net.effective_level(), LogLevel::INFO);
//!
//! let mut config = LogConfig::new();
//! config.add_category("svc", LogCategoryConfig::new(LogLevel::DBG, false));
//! db.update_config(&config).unwrap();
//! assert!(net.is_enabled(LogLevel::DBG));
//! ```

mod category;
mod config;
mod context;
mod error;
mod handler;
mod levels;
mod message;
mod name;
mod registry;
#[cfg(feature = "tracing")]
mod tracing_bridge;
mod tree;
pub mod warning;
pub mod xlog;

pub use category::LogCategory;
pub use config::{LogCategoryConfig, LogConfig, LogHandlerConfig, LogOptions};
pub use context::{ContextCallback, ContextCallbackList};
pub use error::{ConfigError, HandlerError, ParseLevelError};
pub use handler::{LogHandler, LogHandlerFactory};
pub use levels::{DEFAULT_LOG_LEVEL, LogLevel};
pub use message::LogMessage;
pub use name::{canonicalize_name, hash_name, names_equal, parent_name};
pub use registry::LoggerDb;
#[cfg(feature = "tracing")]
pub use tracing_bridge::{CategoryLayer, init_tracing, init_tracing_with_filter};
pub use warning::{InternalWarningHandler, set_internal_warning_handler};
pub use xlog::XlogCategory;
