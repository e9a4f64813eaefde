//! Shared handler doubles for the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use logging::{
    HandlerError, LogCategory, LogHandler, LogHandlerConfig, LogHandlerFactory, LogLevel,
    LogMessage, LogOptions,
};

/// One delivered message as seen by a [`TestHandler`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Seen {
    pub category: String,
    pub handler_category: String,
    pub level: LogLevel,
    pub message: String,
    pub context: String,
}

/// Records everything it receives.
#[derive(Debug, Default)]
pub struct TestHandler {
    pub options: LogOptions,
    pub messages: Mutex<Vec<Seen>>,
    pub flushes: AtomicUsize,
    pub closed: AtomicBool,
}

impl TestHandler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_options(options: LogOptions) -> Arc<Self> {
        Arc::new(Self {
            options,
            ..Self::default()
        })
    }

    pub fn messages(&self) -> Vec<Seen> {
        self.messages.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.messages().into_iter().map(|seen| seen.message).collect()
    }

    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl LogHandler for TestHandler {
    fn handle_message(
        &self,
        message: &LogMessage,
        handler_category: &LogCategory,
    ) -> Result<(), HandlerError> {
        if self.options.get("fail").map(String::as_str) == Some("write") {
            return Err(HandlerError::Other("write failed".into()));
        }
        self.messages.lock().unwrap().push(Seen {
            category: message.category().name().to_owned(),
            handler_category: handler_category.name().to_owned(),
            level: message.level(),
            message: message.message().to_owned(),
            context: message.context().to_owned(),
        });
        Ok(())
    }

    fn flush(&self) -> Result<(), HandlerError> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn config(&self) -> LogHandlerConfig {
        LogHandlerConfig {
            handler_type: Some("test".into()),
            options: self.options.clone(),
        }
    }
}

/// Builds [`TestHandler`]s and remembers each one.
///
/// `fail=create` makes creation fail; `fail=panic` makes the factory panic.
#[derive(Default)]
pub struct TestHandlerFactory {
    pub handler_type: String,
    pub created: Mutex<Vec<Arc<TestHandler>>>,
    pub updates: AtomicUsize,
}

impl TestHandlerFactory {
    pub fn new() -> Arc<Self> {
        Self::with_type("test")
    }

    pub fn with_type(handler_type: &str) -> Arc<Self> {
        Arc::new(Self {
            handler_type: handler_type.to_owned(),
            ..Self::default()
        })
    }

    pub fn created(&self) -> Vec<Arc<TestHandler>> {
        self.created.lock().unwrap().clone()
    }

    pub fn last(&self) -> Arc<TestHandler> {
        self.created().last().cloned().expect("no handler created")
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

impl LogHandlerFactory for TestHandlerFactory {
    fn handler_type(&self) -> &str {
        &self.handler_type
    }

    fn create_handler(&self, options: &LogOptions) -> Result<Arc<dyn LogHandler>, HandlerError> {
        match options.get("fail").map(String::as_str) {
            Some("create") => return Err(HandlerError::Other("refusing to create".into())),
            Some("panic") => panic!("factory exploded"),
            _ => {}
        }
        let handler = TestHandler::with_options(options.clone());
        self.created.lock().unwrap().push(Arc::clone(&handler));
        Ok(handler)
    }

    fn update_handler(
        &self,
        existing: &Arc<dyn LogHandler>,
        options: &LogOptions,
    ) -> Result<Arc<dyn LogHandler>, HandlerError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if existing.config().options == *options {
            return Ok(Arc::clone(existing));
        }
        self.create_handler(options)
    }
}

/// Builds an options map from pairs.
pub fn options<const N: usize>(pairs: [(&str, &str); N]) -> LogOptions {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .collect()
}

/// Logs `text` directly to `category`, bypassing call-site caches.
pub fn log(category: &Arc<LogCategory>, level: LogLevel, text: &str) -> usize {
    if !category.is_enabled(level) {
        return 0;
    }
    let message = LogMessage::new(
        Arc::clone(category),
        level,
        file!(),
        line!(),
        module_path!(),
        text.to_owned(),
    );
    category.admit_message(&message)
}
