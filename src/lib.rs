#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! src/lib.rs
//!
//! # Overview
//!
//! `tinylog` bundles the workspace crates behind one dependency:
//!
//! - [`logging`]: the category tree, the [`LoggerDb`] registry,
//!   configuration snapshots and the `xlog!` macros.
//! - [`logging_sink`]: the bundled stream, file and syslog handlers.
//! - [`atfork`]: ordered prepare/parent/child callbacks around `fork(2)`.
//! - [`platform`]: the OS primitives the others build on.
//!
//! # Examples
//!
//! ```
//! use tinylog::{LogCategoryConfig, LogConfig, LogHandlerConfig, LogLevel, LoggerDb};
//!
//! let db = LoggerDb::new();
//! tinylog::register_builtin_factories(&db).unwrap();
//!
//! let mut config = LogConfig::new();
//! config
//!     .add_handler("err", LogHandlerConfig::with_options("stream", [("stream", "stderr")]))
//!     .add_category("svc", LogCategoryConfig::with_handlers(LogLevel::WARN, false, ["err"]));
//! db.update_config(&config).unwrap();
//!
//! assert!(!db.get_category("svc.net").is_enabled(LogLevel::INFO));
//! assert_eq!(db.get_config().categories().len(), 2);
//! ```

pub use atfork;
pub use logging;
pub use logging_sink;
pub use platform;

pub use atfork::AtFork;
pub use logging::{
    LogCategory, LogCategoryConfig, LogConfig, LogHandler, LogHandlerConfig, LogHandlerFactory,
    LogLevel, LogMessage, LoggerDb, xlog, xlog_dbg, xlog_err, xlog_fatal, xlog_info, xlog_is_on,
    xlog_warn,
};
pub use logging_sink::register_builtin_factories;
