//! crates/logging-sink/src/format.rs
//! Rendering log messages into text lines.

use std::fmt::Write as _;

use logging::{LogCategory, LogLevel, LogMessage};
use time::OffsetDateTime;

/// Turns a message into the bytes a writer-backed handler emits.
pub trait LogFormatter: Send + Sync {
    /// Appends the rendered form of `message`, including the trailing
    /// newline, to `out`.
    fn format_into(&self, message: &LogMessage, handler_category: &LogCategory, out: &mut String);

    /// Renders `message` into a new string.
    fn format(&self, message: &LogMessage, handler_category: &LogCategory) -> String {
        let mut out = String::new();
        self.format_into(message, handler_category, &mut out);
        out
    }
}

/// glog-style lines:
///
/// ```text
/// W0414 12:34:56.789012 12345 conn.rs:88 req=7] connection reset
/// ```
///
/// The level letter, the UTC date and time with microseconds, the OS thread
/// id, the call site and the context string make up the header. A message
/// spanning several lines repeats the header on each of them.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlogFormatter;

impl GlogFormatter {
    /// Creates the formatter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// Single-letter severity used in the line header.
pub(crate) fn level_letter(level: LogLevel) -> char {
    if level < LogLevel::INFO {
        'V'
    } else if level < LogLevel::WARN {
        'I'
    } else if level < LogLevel::ERR {
        'W'
    } else if level < LogLevel::CRITICAL {
        'E'
    } else if level < LogLevel::DFATAL {
        'C'
    } else {
        'F'
    }
}

fn write_header(message: &LogMessage, out: &mut String) {
    let time = OffsetDateTime::from(message.timestamp());
    let _ = write!(
        out,
        "{}{:02}{:02} {:02}:{:02}:{:02}.{:06} {:5} {}:{}{}] ",
        level_letter(message.level()),
        u8::from(time.month()),
        time.day(),
        time.hour(),
        time.minute(),
        time.second(),
        time.microsecond(),
        message.thread_id(),
        message.file_basename(),
        message.line(),
        message.context(),
    );
}

impl LogFormatter for GlogFormatter {
    fn format_into(&self, message: &LogMessage, _handler_category: &LogCategory, out: &mut String) {
        if !message.contains_newlines() {
            write_header(message, out);
            out.push_str(message.message());
            out.push('\n');
            return;
        }
        for line in message.message().split('\n') {
            write_header(message, out);
            out.push_str(line);
            out.push('\n');
        }
    }
}
