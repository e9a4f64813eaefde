#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! crates/logging-sink/src/lib.rs
//!
//! # Overview
//!
//! `logging-sink` provides the handlers bundled with the `logging` category
//! tree: writer-backed `stream` and `file` handlers rendering glog-style
//! lines, and on Unix a `syslog` handler. Each handler type has a
//! [`LogHandlerFactory`](logging::LogHandlerFactory);
//! [`register_builtin_factories`] installs all of them in a registry.
//!
//! # Design
//!
//! [`WriterHandler`] owns a [`MessageSink`], a writer paired with a
//! [`LogFormatter`] and a reusable render buffer. A mutex serializes writes
//! so each rendered message reaches the writer in one piece.
//!
//! # Invariants
//!
//! - Every bundled handler type accepts a `level` option (the handler's own
//!   minimum level) and rejects options it does not know.
//! - Closed handlers fail further messages with
//!   [`HandlerError::Closed`](logging::HandlerError::Closed).
//!
//! # Examples
//!
//! ```
//! use logging::{LogCategoryConfig, LogConfig, LogHandlerConfig, LogLevel, LoggerDb};
//!
//! let dir = std::env::temp_dir().join(format!("logging-sink-doc-{}", std::process::id()));
//! std::fs::create_dir_all(&dir).unwrap();
//! let path = dir.join("app.log");
//!
//! let db = LoggerDb::new();
//! logging_sink::register_builtin_factories(&db).unwrap();
//!
//! let mut config = LogConfig::new();
//! config
//!     .add_handler(
//!         "file",
//!         LogHandlerConfig::with_options("file", [("path", path.to_str().unwrap())]),
//!     )
//!     .add_category("", LogCategoryConfig::with_handlers(LogLevel::INFO, false, ["file"]));
//! db.update_config(&config).unwrap();
//! # std::fs::remove_dir_all(&dir).unwrap();
//! ```

mod format;
mod options;
mod sink;
mod stream;
#[cfg(unix)]
#[allow(unsafe_code)]
pub mod syslog;
mod writer;

use std::sync::Arc;

use logging::{ConfigError, LoggerDb};

pub use format::{GlogFormatter, LogFormatter};
pub use options::LEVEL_OPTION;
pub use sink::MessageSink;
pub use stream::{
    FILE_HANDLER_TYPE, FileHandlerFactory, STREAM_HANDLER_TYPE, StreamHandlerFactory,
};
pub use writer::WriterHandler;

/// Registers the `stream`, `file` and (on Unix) `syslog` factories with `db`,
/// replacing any factories already registered under those types.
pub fn register_builtin_factories(db: &LoggerDb) -> Result<(), ConfigError> {
    db.register_handler_factory(Arc::new(StreamHandlerFactory), true)?;
    db.register_handler_factory(Arc::new(FileHandlerFactory), true)?;
    #[cfg(unix)]
    db.register_handler_factory(Arc::new(syslog::SyslogHandlerFactory), true)?;
    Ok(())
}
