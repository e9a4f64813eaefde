//! crates/logging/src/handler.rs
//! Contracts implemented by log handlers and their factories.

use std::sync::Arc;

use crate::category::LogCategory;
use crate::config::{LogHandlerConfig, LogOptions};
use crate::error::HandlerError;
use crate::message::LogMessage;

/// A destination for log messages.
///
/// One handler may be bound to many categories and receive messages from
/// many threads at once. Errors returned from
/// [`handle_message`](Self::handle_message) never reach the code that logged;
/// the category reports them through the internal warning channel.
pub trait LogHandler: Send + Sync {
    /// Processes one message.
    ///
    /// `handler_category` is the category this handler is bound to, which is
    /// the message's own category or one of its ancestors.
    fn handle_message(
        &self,
        message: &LogMessage,
        handler_category: &LogCategory,
    ) -> Result<(), HandlerError>;

    /// Blocks until every message accepted so far has been written.
    fn flush(&self) -> Result<(), HandlerError>;

    /// Releases the handler's resources. Called once the registry has
    /// dropped every binding to this handler.
    fn close(&self) {}

    /// The configuration that would recreate this handler.
    fn config(&self) -> LogHandlerConfig;
}

/// Creates handlers of one type from option maps.
pub trait LogHandlerFactory: Send + Sync {
    /// The type name configurations use to select this factory.
    fn handler_type(&self) -> &str;

    /// Builds a new handler.
    fn create_handler(&self, options: &LogOptions) -> Result<Arc<dyn LogHandler>, HandlerError>;

    /// Builds the replacement for `existing` when its options change.
    ///
    /// The default creates a fresh handler. Factories whose handlers own
    /// state worth keeping (an open file, a background writer) can return a
    /// handler that shares it, or `existing` itself when nothing changed.
    fn update_handler(
        &self,
        existing: &Arc<dyn LogHandler>,
        options: &LogOptions,
    ) -> Result<Arc<dyn LogHandler>, HandlerError> {
        let _ = existing;
        self.create_handler(options)
    }
}
