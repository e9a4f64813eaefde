//! crates/logging-sink/src/syslog.rs
//! Handler routing messages to syslog(3).
//!
//! Uses libc `openlog`/`syslog` directly rather than pulling in a dedicated
//! syslog crate. The syslog ident is process-wide: the first syslog handler
//! created opens the connection with its tag, and later handlers reuse it.
//! Each handler passes its own facility with every message.

use std::ffi::CString;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use logging::{
    HandlerError, LogCategory, LogHandler, LogHandlerConfig, LogHandlerFactory, LogLevel,
    LogMessage, LogOptions,
};

use crate::options::{min_level, reject_unknown};

/// Type name of [`SyslogHandlerFactory`].
pub const SYSLOG_HANDLER_TYPE: &str = "syslog";

/// Syslog facility codes matching the POSIX syslog(3) constants.
///
/// Each variant corresponds to a `LOG_*` facility from `<syslog.h>`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(i32)]
pub enum SyslogFacility {
    /// Kernel messages (LOG_KERN).
    Kern = libc::LOG_KERN,
    /// User-level messages (LOG_USER), the default.
    User = libc::LOG_USER,
    /// Mail system (LOG_MAIL).
    Mail = libc::LOG_MAIL,
    /// System daemons (LOG_DAEMON).
    Daemon = libc::LOG_DAEMON,
    /// Security/authorization messages (LOG_AUTH).
    Auth = libc::LOG_AUTH,
    /// Messages generated internally by syslogd (LOG_SYSLOG).
    Syslog = libc::LOG_SYSLOG,
    /// Line printer subsystem (LOG_LPR).
    Lpr = libc::LOG_LPR,
    /// Network news subsystem (LOG_NEWS).
    News = libc::LOG_NEWS,
    /// UUCP subsystem (LOG_UUCP).
    Uucp = libc::LOG_UUCP,
    /// Clock daemon (LOG_CRON).
    Cron = libc::LOG_CRON,
    /// Reserved for local use (LOG_LOCAL0).
    Local0 = libc::LOG_LOCAL0,
    /// Reserved for local use (LOG_LOCAL1).
    Local1 = libc::LOG_LOCAL1,
    /// Reserved for local use (LOG_LOCAL2).
    Local2 = libc::LOG_LOCAL2,
    /// Reserved for local use (LOG_LOCAL3).
    Local3 = libc::LOG_LOCAL3,
    /// Reserved for local use (LOG_LOCAL4).
    Local4 = libc::LOG_LOCAL4,
    /// Reserved for local use (LOG_LOCAL5).
    Local5 = libc::LOG_LOCAL5,
    /// Reserved for local use (LOG_LOCAL6).
    Local6 = libc::LOG_LOCAL6,
    /// Reserved for local use (LOG_LOCAL7).
    Local7 = libc::LOG_LOCAL7,
}

impl SyslogFacility {
    const ALL: [Self; 18] = [
        Self::Kern,
        Self::User,
        Self::Mail,
        Self::Daemon,
        Self::Auth,
        Self::Syslog,
        Self::Lpr,
        Self::News,
        Self::Uucp,
        Self::Cron,
        Self::Local0,
        Self::Local1,
        Self::Local2,
        Self::Local3,
        Self::Local4,
        Self::Local5,
        Self::Local6,
        Self::Local7,
    ];

    /// Parses a facility name (`daemon`, `local3`, ...) case-insensitively.
    ///
    /// # Examples
    ///
    /// ```
    /// use logging_sink::syslog::SyslogFacility;
    ///
    /// assert_eq!(SyslogFacility::from_name("LOCAL3"), Some(SyslogFacility::Local3));
    /// assert_eq!(SyslogFacility::from_name("unknown"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|facility| facility.as_str().eq_ignore_ascii_case(name))
    }

    /// The facility's configuration name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kern => "kern",
            Self::User => "user",
            Self::Mail => "mail",
            Self::Daemon => "daemon",
            Self::Auth => "auth",
            Self::Syslog => "syslog",
            Self::Lpr => "lpr",
            Self::News => "news",
            Self::Uucp => "uucp",
            Self::Cron => "cron",
            Self::Local0 => "local0",
            Self::Local1 => "local1",
            Self::Local2 => "local2",
            Self::Local3 => "local3",
            Self::Local4 => "local4",
            Self::Local5 => "local5",
            Self::Local6 => "local6",
            Self::Local7 => "local7",
        }
    }
}

impl Default for SyslogFacility {
    fn default() -> Self {
        Self::User
    }
}

impl fmt::Display for SyslogFacility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Syslog priority levels matching POSIX syslog(3) severity constants.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(i32)]
pub enum SyslogPriority {
    /// System is unusable (LOG_EMERG).
    Emergency = libc::LOG_EMERG,
    /// Action must be taken immediately (LOG_ALERT).
    Alert = libc::LOG_ALERT,
    /// Critical conditions (LOG_CRIT).
    Critical = libc::LOG_CRIT,
    /// Error conditions (LOG_ERR).
    Error = libc::LOG_ERR,
    /// Warning conditions (LOG_WARNING).
    Warning = libc::LOG_WARNING,
    /// Normal but significant condition (LOG_NOTICE).
    Notice = libc::LOG_NOTICE,
    /// Informational messages (LOG_INFO).
    Info = libc::LOG_INFO,
    /// Debug-level messages (LOG_DEBUG).
    Debug = libc::LOG_DEBUG,
}

impl SyslogPriority {
    /// The priority a message at `level` is sent with.
    pub fn from_level(level: LogLevel) -> Self {
        if level < LogLevel::INFO {
            Self::Debug
        } else if level < LogLevel::WARN {
            Self::Info
        } else if level < LogLevel::ERR {
            Self::Warning
        } else if level < LogLevel::CRITICAL {
            Self::Error
        } else if level < LogLevel::DFATAL {
            Self::Critical
        } else {
            Self::Alert
        }
    }
}

/// Opens the process-wide syslog connection on first use.
///
/// syslog(3) keeps the ident pointer, so the string lives in a static for
/// the rest of the process. A missing tag leaves the ident to the C library,
/// which uses the program name.
fn ensure_open(tag: Option<&CString>) {
    static IDENT: OnceLock<Option<CString>> = OnceLock::new();
    IDENT.get_or_init(|| {
        let ident = tag.cloned();
        let ptr = ident.as_ref().map_or(std::ptr::null(), |tag| tag.as_ptr());
        // SAFETY: `ptr` is null or points into the CString moved into the
        // static below, which is never dropped. openlog runs exactly once.
        unsafe {
            libc::openlog(ptr, libc::LOG_PID | libc::LOG_NDELAY, libc::LOG_USER);
        }
        ident
    });
}

/// Sends one entry to syslog(3).
///
/// Text containing a NUL byte is truncated at the NUL.
pub fn syslog_message(facility: SyslogFacility, priority: SyslogPriority, message: &str) {
    let text = message.split('\0').next().unwrap_or_default();
    let Ok(c_message) = CString::new(text) else {
        return;
    };
    // `%s` keeps `%` in the message from being read as a conversion.
    let format = c"%s";
    // SAFETY: both pointers are valid NUL-terminated strings for the call
    // and syslog is thread-safe.
    unsafe {
        libc::syslog(
            facility as libc::c_int | priority as libc::c_int,
            format.as_ptr(),
            c_message.as_ptr(),
        );
    }
}

/// Writes messages to syslog with the call site and context prefixed.
pub struct SyslogHandler {
    facility: SyslogFacility,
    level: LogLevel,
    options: LogOptions,
    closed: AtomicBool,
}

impl SyslogHandler {
    /// The facility every entry is sent with.
    #[must_use]
    pub const fn facility(&self) -> SyslogFacility {
        self.facility
    }

    /// Renders the entry text for one line of a message.
    fn entry(message: &LogMessage, line: &str) -> String {
        format!(
            "{}:{}{}] {line}",
            message.file_basename(),
            message.line(),
            message.context()
        )
    }
}

impl LogHandler for SyslogHandler {
    fn handle_message(
        &self,
        message: &LogMessage,
        _handler_category: &LogCategory,
    ) -> Result<(), HandlerError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(HandlerError::Closed);
        }
        if message.level() < self.level {
            return Ok(());
        }
        let priority = SyslogPriority::from_level(message.level());
        for line in message.message().split('\n') {
            syslog_message(self.facility, priority, &Self::entry(message, line));
        }
        Ok(())
    }

    fn flush(&self) -> Result<(), HandlerError> {
        Ok(())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    fn config(&self) -> LogHandlerConfig {
        LogHandlerConfig {
            handler_type: Some(SYSLOG_HANDLER_TYPE.to_owned()),
            options: self.options.clone(),
        }
    }
}

impl fmt::Debug for SyslogHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyslogHandler")
            .field("facility", &self.facility)
            .field("level", &self.level)
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// Creates [`SyslogHandler`]s.
///
/// Options: `facility` (default `user`), `tag` (ident for the process-wide
/// connection; the program name when unset) and `level`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SyslogHandlerFactory;

impl LogHandlerFactory for SyslogHandlerFactory {
    fn handler_type(&self) -> &str {
        SYSLOG_HANDLER_TYPE
    }

    fn create_handler(&self, options: &LogOptions) -> Result<Arc<dyn LogHandler>, HandlerError> {
        reject_unknown(options, &["facility", "tag"])?;
        let level = min_level(options)?;
        let facility = match options.get("facility") {
            Some(name) => SyslogFacility::from_name(name).ok_or_else(|| {
                HandlerError::invalid_option("facility", name, "unknown syslog facility")
            })?,
            None => SyslogFacility::default(),
        };
        let tag = options
            .get("tag")
            .map(|tag| {
                CString::new(tag.as_str()).map_err(|_| {
                    HandlerError::invalid_option("tag", tag, "contains a NUL byte")
                })
            })
            .transpose()?;

        ensure_open(tag.as_ref());
        Ok(Arc::new(SyslogHandler {
            facility,
            level,
            options: options.clone(),
            closed: AtomicBool::new(false),
        }))
    }
}
