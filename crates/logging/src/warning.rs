//! crates/logging/src/warning.rs
//! Channel for reporting failures inside the logging system itself.
//!
//! Handlers that fail to write, context callbacks that panic and similar
//! problems cannot be logged through the normal path without risking
//! recursion, so they are reported here instead. The default handler writes
//! to stderr and drops messages beyond a small per-interval budget.

use std::io::{self, Write as _};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

/// Signature of a process-wide internal warning handler.
///
/// Arguments are the source file, the line and the rendered message.
pub type InternalWarningHandler = fn(&str, u32, &str);

static HANDLER: RwLock<Option<InternalWarningHandler>> = RwLock::new(None);

const RATE_LIMIT_MESSAGES: u32 = 10;
const RATE_LIMIT_INTERVAL: Duration = Duration::from_secs(5);

struct RateLimiter {
    window_start: Option<Instant>,
    emitted: u32,
}

impl RateLimiter {
    fn admit(&mut self, now: Instant) -> bool {
        match self.window_start {
            Some(start) if now.duration_since(start) < RATE_LIMIT_INTERVAL => {}
            _ => {
                self.window_start = Some(now);
                self.emitted = 0;
            }
        }
        if self.emitted >= RATE_LIMIT_MESSAGES {
            return false;
        }
        self.emitted += 1;
        true
    }
}

static LIMITER: Mutex<RateLimiter> = Mutex::new(RateLimiter {
    window_start: None,
    emitted: 0,
});

/// Replaces the internal warning handler; `None` restores the default.
pub fn set_internal_warning_handler(handler: Option<InternalWarningHandler>) {
    *HANDLER.write().unwrap_or_else(PoisonError::into_inner) = handler;
}

/// Reports a failure of the logging system.
///
/// Never panics. A panicking custom handler is contained and the message
/// falls back to the default handler.
pub fn internal_warning(file: &str, line: u32, message: &str) {
    let handler = *HANDLER.read().unwrap_or_else(PoisonError::into_inner);
    if let Some(handler) = handler
        && panic::catch_unwind(AssertUnwindSafe(|| handler(file, line, message))).is_ok()
    {
        return;
    }
    default_internal_warning(file, line, message);
}

/// Default handler: rate-limited output to stderr.
pub fn default_internal_warning(file: &str, line: u32, message: &str) {
    // A contended limiter means another thread is already reporting; drop.
    let admitted = match LIMITER.try_lock() {
        Ok(mut limiter) => limiter.admit(Instant::now()),
        Err(std::sync::TryLockError::Poisoned(poisoned)) => {
            poisoned.into_inner().admit(Instant::now())
        }
        Err(std::sync::TryLockError::WouldBlock) => false,
    };
    if admitted {
        let _ = writeln!(io::stderr().lock(), "logging warning:{file}:{line}: {message}");
    }
}

/// Formats and reports an internal warning tagged with the caller's location.
#[macro_export]
macro_rules! internal_warning {
    ($($arg:tt)*) => {
        $crate::warning::internal_warning(file!(), line!(), &::std::format!($($arg)*))
    };
}
