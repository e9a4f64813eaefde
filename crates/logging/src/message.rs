//! crates/logging/src/message.rs
//! Immutable log records.

use std::sync::Arc;
use std::time::SystemTime;

use crate::category::LogCategory;
use crate::levels::LogLevel;

/// A single log record, built once and shared by every handler it reaches.
#[derive(Debug)]
pub struct LogMessage {
    category: Arc<LogCategory>,
    level: LogLevel,
    timestamp: SystemTime,
    thread_id: u64,
    filename: &'static str,
    line: u32,
    function: &'static str,
    context: String,
    raw: String,
    sanitized: Option<String>,
    newlines: usize,
}

impl LogMessage {
    /// Builds a record stamped with the current time.
    pub fn new(
        category: Arc<LogCategory>,
        level: LogLevel,
        filename: &'static str,
        line: u32,
        function: &'static str,
        message: String,
    ) -> Self {
        Self::with_timestamp(
            category,
            level,
            SystemTime::now(),
            filename,
            line,
            function,
            message,
        )
    }

    /// Builds a record with an explicit timestamp.
    ///
    /// The context string is collected from the category's registry here,
    /// on the logging thread.
    pub fn with_timestamp(
        category: Arc<LogCategory>,
        level: LogLevel,
        timestamp: SystemTime,
        filename: &'static str,
        line: u32,
        function: &'static str,
        message: String,
    ) -> Self {
        let context = category.context().context_string();
        let (sanitized, newlines) = sanitize(&message);
        Self {
            category,
            level,
            timestamp,
            thread_id: platform::os_thread_id(),
            filename,
            line,
            function,
            context,
            raw: message,
            sanitized,
            newlines,
        }
    }

    /// The category the message was logged to.
    #[must_use]
    pub fn category(&self) -> &Arc<LogCategory> {
        &self.category
    }

    /// Severity of the message.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }

    /// When the message was created.
    #[must_use]
    pub const fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// OS-level id of the logging thread.
    #[must_use]
    pub const fn thread_id(&self) -> u64 {
        self.thread_id
    }

    /// Source file of the call site, as given.
    #[must_use]
    pub const fn filename(&self) -> &'static str {
        self.filename
    }

    /// Final path component of [`filename`](Self::filename).
    #[must_use]
    pub fn file_basename(&self) -> &'static str {
        let filename = self.filename;
        filename
            .rfind(['/', '\\'])
            .map_or(filename, |idx| &filename[idx + 1..])
    }

    /// Source line of the call site.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.line
    }

    /// Function or module path of the call site.
    #[must_use]
    pub const fn function(&self) -> &'static str {
        self.function
    }

    /// Context segments gathered when the message was built.
    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }

    /// The message text exactly as logged.
    #[must_use]
    pub fn raw_message(&self) -> &str {
        &self.raw
    }

    /// The message text with control characters escaped.
    ///
    /// Newlines and tabs are kept; every other byte below `0x20`, and `0x7f`,
    /// becomes `\xNN`.
    #[must_use]
    pub fn message(&self) -> &str {
        self.sanitized.as_deref().unwrap_or(&self.raw)
    }

    /// Number of newline characters in the message.
    #[must_use]
    pub const fn newline_count(&self) -> usize {
        self.newlines
    }

    /// Returns true when the message spans more than one line.
    #[must_use]
    pub const fn contains_newlines(&self) -> bool {
        self.newlines > 0
    }
}

/// Returns the escaped text when escaping changed anything, plus the newline count.
fn sanitize(raw: &str) -> (Option<String>, usize) {
    let newlines = raw.bytes().filter(|&b| b == b'\n').count();
    if !raw.bytes().any(needs_escape) {
        return (None, newlines);
    }

    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(raw.len() + 8);
    for ch in raw.chars() {
        match u8::try_from(ch) {
            Ok(byte) if needs_escape(byte) => {
                out.push_str("\\x");
                out.push(char::from(HEX[usize::from(byte >> 4)]));
                out.push(char::from(HEX[usize::from(byte & 0xf)]));
            }
            _ => out.push(ch),
        }
    }
    (Some(out), newlines)
}

const fn needs_escape(byte: u8) -> bool {
    (byte < 0x20 && byte != b'\n' && byte != b'\t') || byte == 0x7f
}
