//! crates/logging-sink/src/sink.rs
//! Formatter-driven writer with a reusable render buffer.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use logging::{LogCategory, LogMessage};

use crate::format::{GlogFormatter, LogFormatter};

/// Renders [`LogMessage`] values into an [`std::io::Write`] target.
///
/// The sink owns the writer, the formatter and a scratch buffer that is
/// reused for every message, so steady-state logging does not allocate once
/// the buffer has grown to the longest line seen.
///
/// # Examples
///
/// ```
/// use logging::{LogLevel, LogMessage, LoggerDb};
/// use logging_sink::MessageSink;
///
/// let db = LoggerDb::new();
/// let category = db.get_category("svc");
/// let message = LogMessage::new(
///     category.clone(),
///     LogLevel::INFO,
///     file!(),
///     line!(),
///     module_path!(),
///     "ready".to_owned(),
/// );
///
/// let mut sink = MessageSink::new(Vec::new());
/// sink.write(&message, &category)?;
/// let output = String::from_utf8(sink.into_inner()).unwrap();
/// assert!(output.starts_with('I'));
/// assert!(output.ends_with("] ready\n"));
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct MessageSink<W> {
    writer: W,
    formatter: Arc<dyn LogFormatter>,
    scratch: String,
}

impl<W> MessageSink<W> {
    /// Creates a sink using [`GlogFormatter`].
    pub fn new(writer: W) -> Self {
        Self::with_formatter(writer, Arc::new(GlogFormatter))
    }

    /// Creates a sink with a custom formatter.
    pub fn with_formatter(writer: W, formatter: Arc<dyn LogFormatter>) -> Self {
        Self {
            writer,
            formatter,
            scratch: String::new(),
        }
    }

    /// Borrows the underlying writer.
    pub const fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> MessageSink<W> {
    /// Renders and writes one message.
    pub fn write(&mut self, message: &LogMessage, handler_category: &LogCategory) -> io::Result<()> {
        self.scratch.clear();
        self.formatter
            .format_into(message, handler_category, &mut self.scratch);
        self.writer.write_all(self.scratch.as_bytes())
    }

    /// Flushes the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl<W> fmt::Debug for MessageSink<W>
where
    W: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageSink")
            .field("writer", &self.writer)
            .field("scratch_capacity", &self.scratch.capacity())
            .finish_non_exhaustive()
    }
}
