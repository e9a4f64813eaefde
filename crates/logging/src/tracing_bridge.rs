//! crates/logging/src/tracing_bridge.rs
//! Bridge between the tracing crate and the category tree.
//!
//! [`CategoryLayer`] is a tracing-subscriber layer that turns every tracing
//! event into a [`LogMessage`] on the category named after the event's
//! target, so `tracing::info!(target: "svc::net", ...)` is filtered and
//! routed exactly like `xlog!(category: "svc.net", LogLevel::INFO, ...)`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use logging::{LoggerDb, init_tracing};
//!
//! init_tracing(LoggerDb::get());
//! tracing::warn!(target: "svc::net", peer = %addr, "connection reset");
//! ```

use std::fmt::{self, Write as _};
use std::sync::Arc;

use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use crate::levels::LogLevel;
use crate::message::LogMessage;
use crate::registry::LoggerDb;

/// A tracing layer delivering events to a [`LoggerDb`].
#[derive(Debug)]
pub struct CategoryLayer {
    db: &'static LoggerDb,
}

impl CategoryLayer {
    /// Creates a layer that logs into `db`.
    #[must_use]
    pub const fn new(db: &'static LoggerDb) -> Self {
        Self { db }
    }

    /// Map a tracing level to a log level.
    const fn map_level(level: &Level) -> LogLevel {
        match *level {
            Level::ERROR => LogLevel::ERR,
            Level::WARN => LogLevel::WARN,
            Level::INFO => LogLevel::INFO,
            Level::DEBUG | Level::TRACE => LogLevel::DBG,
        }
    }
}

impl<S> Layer<S> for CategoryLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let level = Self::map_level(metadata.level());
        let category = self.db.get_category(metadata.target());
        if !category.is_enabled(level) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let message = LogMessage::new(
            Arc::clone(&category),
            level,
            metadata.file().unwrap_or("<unknown>"),
            metadata.line().unwrap_or(0),
            metadata.module_path().unwrap_or_else(|| metadata.target()),
            visitor.finish(),
        );
        category.admit_message(&message);
    }
}

/// Visitor to extract the message and the remaining fields of an event.
#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        match self.message {
            Some(mut message) => {
                message.push_str(&self.fields);
                message
            }
            None => self.fields.trim_start().to_owned(),
        }
    }
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        } else {
            let _ = write!(self.fields, " {}={value:?}", field.name());
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_owned());
        } else {
            let _ = write!(self.fields, " {}={value}", field.name());
        }
    }
}

/// Initialize tracing so that every event is delivered to `db`.
///
/// Installs a global default subscriber; panics if one is already set, as
/// `tracing_subscriber`'s `init` does.
pub fn init_tracing(db: &'static LoggerDb) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(CategoryLayer::new(db))
        .init();
}

/// Initialize tracing with a custom filter in front of the category layer.
pub fn init_tracing_with_filter<F>(db: &'static LoggerDb, filter: F)
where
    F: Layer<tracing_subscriber::Registry> + Send + Sync + 'static,
{
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(filter)
        .with(CategoryLayer::new(db))
        .init();
}
