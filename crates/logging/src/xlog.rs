//! crates/logging/src/xlog.rs
//! Per-call-site category caches and the `xlog!` family of macros.

use std::fmt;
use std::io::{self, Write as _};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};

use crate::category::LogCategory;
use crate::levels::LogLevel;
use crate::message::LogMessage;
use crate::registry::LoggerDb;

/// Cached category lookup for one logging call site.
///
/// The first check resolves the category through [`LoggerDb::xlog_init`],
/// which also registers the site's level cache with the category. From then
/// on the category keeps that cache current, and a disabled check is a
/// single relaxed load and compare.
#[derive(Debug)]
pub struct XlogCategory {
    name: &'static str,
    /// Mirror of the category's effective level, `UNINITIALIZED` until the
    /// first check.
    level: AtomicU32,
    category: OnceLock<Arc<LogCategory>>,
}

impl XlogCategory {
    /// A site logging to the category called `name`.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            level: AtomicU32::new(LogLevel::UNINITIALIZED.as_raw()),
            category: OnceLock::new(),
        }
    }

    /// The category name this site was declared with.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the category when a message at `level` is enabled, resolving
    /// it through the global registry on first use.
    #[inline]
    pub fn check(&'static self, level: LogLevel) -> Option<&'static Arc<LogCategory>> {
        let current = self.level.load(Ordering::Relaxed);
        if current == LogLevel::UNINITIALIZED.as_raw() {
            return self.check_in(LoggerDb::get(), level);
        }
        if level.as_raw() < current {
            return None;
        }
        self.category.get()
    }

    /// Like [`check`](Self::check), but resolves through `db`.
    ///
    /// Only the first resolution consults `db`; a site stays bound to the
    /// registry that initialized it.
    pub fn check_in(
        &'static self,
        db: &LoggerDb,
        level: LogLevel,
    ) -> Option<&'static Arc<LogCategory>> {
        let current = match self.category.get() {
            Some(category) => category.effective_level(),
            None => db.xlog_init(self.name, &self.category, &self.level),
        };
        if level < current {
            return None;
        }
        self.category.get()
    }
}

/// Builds a message and hands it to `category` and its ancestors.
///
/// Fatal levels flush every handler in `db` and abort the process once the
/// message is delivered. A fatal message that reached no handler is written
/// to stderr first.
#[doc(hidden)]
pub fn dispatch(
    db: &LoggerDb,
    category: &Arc<LogCategory>,
    level: LogLevel,
    filename: &'static str,
    line: u32,
    function: &'static str,
    args: fmt::Arguments<'_>,
) {
    let message = LogMessage::new(
        Arc::clone(category),
        level,
        filename,
        line,
        function,
        fmt::format(args),
    );
    let delivered = category.admit_message(&message);
    if level.is_fatal() {
        if delivered == 0 {
            let _ = writeln!(
                io::stderr().lock(),
                "FATAL:{}:{}: {}",
                message.file_basename(),
                message.line(),
                message.message()
            );
        }
        db.flush_all_handlers();
        std::process::abort();
    }
}

/// Logs a formatted message if its level is enabled.
///
/// Without a `category:` argument the message goes to the category named
/// after the calling module, so `my_crate::net` logs to `my_crate.net`.
///
/// ```
/// use logging::{LogLevel, xlog};
///
/// xlog!(LogLevel::INFO, "listening on port {}", 8080);
/// xlog!(category: "svc.net", LogLevel::DBG, "connection closed");
/// ```
#[macro_export]
macro_rules! xlog {
    (category: $category:expr, $level:expr, $($arg:tt)+) => {{
        static SITE: $crate::XlogCategory = $crate::XlogCategory::new($category);
        let level: $crate::LogLevel = $level;
        if let ::std::option::Option::Some(category) = SITE.check(level) {
            $crate::xlog::dispatch(
                $crate::LoggerDb::get(),
                category,
                level,
                file!(),
                line!(),
                module_path!(),
                format_args!($($arg)+),
            );
        }
    }};
    ($level:expr, $($arg:tt)+) => {
        $crate::xlog!(category: module_path!(), $level, $($arg)+)
    };
}

/// Evaluates to true when `xlog!` at this level would log.
#[macro_export]
macro_rules! xlog_is_on {
    (category: $category:expr, $level:expr) => {{
        static SITE: $crate::XlogCategory = $crate::XlogCategory::new($category);
        SITE.check($level).is_some()
    }};
    ($level:expr) => {
        $crate::xlog_is_on!(category: module_path!(), $level)
    };
}

/// Logs at [`LogLevel::DBG`](crate::LogLevel::DBG).
#[macro_export]
macro_rules! xlog_dbg {
    (category: $category:expr, $($arg:tt)+) => {
        $crate::xlog!(category: $category, $crate::LogLevel::DBG, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::xlog!($crate::LogLevel::DBG, $($arg)+)
    };
}

/// Logs at [`LogLevel::INFO`](crate::LogLevel::INFO).
#[macro_export]
macro_rules! xlog_info {
    (category: $category:expr, $($arg:tt)+) => {
        $crate::xlog!(category: $category, $crate::LogLevel::INFO, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::xlog!($crate::LogLevel::INFO, $($arg)+)
    };
}

/// Logs at [`LogLevel::WARN`](crate::LogLevel::WARN).
#[macro_export]
macro_rules! xlog_warn {
    (category: $category:expr, $($arg:tt)+) => {
        $crate::xlog!(category: $category, $crate::LogLevel::WARN, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::xlog!($crate::LogLevel::WARN, $($arg)+)
    };
}

/// Logs at [`LogLevel::ERR`](crate::LogLevel::ERR).
#[macro_export]
macro_rules! xlog_err {
    (category: $category:expr, $($arg:tt)+) => {
        $crate::xlog!(category: $category, $crate::LogLevel::ERR, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::xlog!($crate::LogLevel::ERR, $($arg)+)
    };
}

/// Logs at [`LogLevel::FATAL`](crate::LogLevel::FATAL), then aborts.
#[macro_export]
macro_rules! xlog_fatal {
    (category: $category:expr, $($arg:tt)+) => {
        $crate::xlog!(category: $category, $crate::LogLevel::FATAL, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::xlog!($crate::LogLevel::FATAL, $($arg)+)
    };
}
