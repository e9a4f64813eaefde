//! crates/logging-sink/src/writer.rs
//! Handler that writes formatted messages to any `Write` destination.

use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use logging::{
    HandlerError, LogCategory, LogHandler, LogHandlerConfig, LogLevel, LogMessage, LogOptions,
};

use crate::format::LogFormatter;
use crate::sink::MessageSink;

type BoxedSink = MessageSink<Box<dyn Write + Send>>;

/// A [`LogHandler`] backed by a [`MessageSink`].
///
/// Writes are serialized by a mutex, so lines from different threads never
/// interleave. After [`close`](LogHandler::close) the writer is dropped and
/// further messages fail with [`HandlerError::Closed`].
pub struct WriterHandler {
    handler_type: String,
    options: LogOptions,
    level: LogLevel,
    sink: Mutex<Option<BoxedSink>>,
}

impl WriterHandler {
    /// Wraps `writer`. `handler_type` and `options` are what
    /// [`config`](LogHandler::config) reports back.
    pub fn new<W>(
        handler_type: impl Into<String>,
        options: LogOptions,
        level: LogLevel,
        writer: W,
        formatter: Arc<dyn LogFormatter>,
    ) -> Self
    where
        W: Write + Send + 'static,
    {
        let writer: Box<dyn Write + Send> = Box::new(writer);
        Self {
            handler_type: handler_type.into(),
            options,
            level,
            sink: Mutex::new(Some(MessageSink::with_formatter(writer, formatter))),
        }
    }

    /// Minimum level this handler writes.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }

    /// Whether [`close`](LogHandler::close) has run.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock().is_none()
    }

    fn lock(&self) -> MutexGuard<'_, Option<BoxedSink>> {
        self.sink.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LogHandler for WriterHandler {
    fn handle_message(
        &self,
        message: &LogMessage,
        handler_category: &LogCategory,
    ) -> Result<(), HandlerError> {
        if message.level() < self.level {
            return Ok(());
        }
        let mut guard = self.lock();
        let sink = guard.as_mut().ok_or(HandlerError::Closed)?;
        sink.write(message, handler_category)?;
        Ok(())
    }

    fn flush(&self) -> Result<(), HandlerError> {
        match self.lock().as_mut() {
            Some(sink) => sink.flush().map_err(HandlerError::from),
            None => Ok(()),
        }
    }

    fn close(&self) {
        let sink = self.lock().take();
        if let Some(mut sink) = sink {
            let _ = sink.flush();
        }
    }

    fn config(&self) -> LogHandlerConfig {
        LogHandlerConfig {
            handler_type: Some(self.handler_type.clone()),
            options: self.options.clone(),
        }
    }
}

impl fmt::Debug for WriterHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriterHandler")
            .field("handler_type", &self.handler_type)
            .field("options", &self.options)
            .field("level", &self.level)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::GlogFormatter;
    use logging::LoggerDb;
    use std::io;

    /// Shared in-memory destination.
    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Buffer {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for Buffer {
        fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(bytes);
            Ok(bytes.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn handler(level: LogLevel, buffer: &Buffer) -> WriterHandler {
        WriterHandler::new(
            "memory",
            LogOptions::new(),
            level,
            buffer.clone(),
            Arc::new(GlogFormatter),
        )
    }

    fn send(
        db: &LoggerDb,
        handler: &WriterHandler,
        level: LogLevel,
        text: &str,
    ) -> Result<(), HandlerError> {
        let category = db.get_category("svc");
        let message = LogMessage::new(
            category.clone(),
            level,
            file!(),
            line!(),
            module_path!(),
            text.to_owned(),
        );
        handler.handle_message(&message, &category)
    }

    #[test]
    fn filters_below_own_level() {
        let db = LoggerDb::new();
        let buffer = Buffer::default();
        let handler = handler(LogLevel::WARN, &buffer);
        send(&db, &handler, LogLevel::INFO, "dropped").unwrap();
        send(&db, &handler, LogLevel::ERR, "kept").unwrap();
        let text = buffer.text();
        assert_eq!(text.lines().count(), 1);
        assert!(text.ends_with("] kept\n"));
    }

    #[test]
    fn closed_handler_rejects_messages() {
        let db = LoggerDb::new();
        let buffer = Buffer::default();
        let handler = handler(LogLevel::UNINITIALIZED, &buffer);
        handler.close();
        assert!(handler.is_closed());
        assert!(matches!(
            send(&db, &handler, LogLevel::ERR, "late"),
            Err(HandlerError::Closed)
        ));
        handler.flush().unwrap();
        assert!(buffer.text().is_empty());
    }

    #[test]
    fn reports_its_configuration() {
        let handler = WriterHandler::new(
            "stream",
            [("stream".to_owned(), "stderr".to_owned())].into_iter().collect(),
            LogLevel::INFO,
            io::sink(),
            Arc::new(GlogFormatter),
        );
        let config = handler.config();
        assert_eq!(config.handler_type.as_deref(), Some("stream"));
        assert_eq!(config.options["stream"], "stderr");
    }
}
