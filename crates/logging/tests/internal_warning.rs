//! Failures inside handlers are reported through the internal warning
//! channel instead of reaching the logging caller.
//!
//! The warning handler is process-wide, so this file runs its tests under
//! one lock and lives in its own test binary.

mod common;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use common::{TestHandlerFactory, log};
use logging::{
    HandlerError, LogCategory, LogCategoryConfig, LogConfig, LogHandler, LogHandlerConfig,
    LogHandlerFactory, LogLevel, LogMessage, LogOptions, LoggerDb, set_internal_warning_handler,
};

static SERIAL: Mutex<()> = Mutex::new(());
static WARNINGS: Mutex<Vec<String>> = Mutex::new(Vec::new());

fn record(file: &str, line: u32, message: &str) {
    assert!(file.ends_with(".rs"));
    assert!(line > 0);
    WARNINGS.lock().unwrap().push(message.to_owned());
}

fn explode(_file: &str, _line: u32, _message: &str) {
    panic!("warning handler exploded");
}

/// Installs the recording handler for the duration of a test.
struct Recording {
    _serial: MutexGuard<'static, ()>,
}

impl Recording {
    fn start() -> Self {
        let serial = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
        WARNINGS.lock().unwrap().clear();
        set_internal_warning_handler(Some(record));
        Self { _serial: serial }
    }

    fn warnings(&self) -> Vec<String> {
        WARNINGS.lock().unwrap().clone()
    }
}

impl Drop for Recording {
    fn drop(&mut self) {
        set_internal_warning_handler(None);
    }
}

/// Panics on every call.
struct PanickyHandler;

impl LogHandler for PanickyHandler {
    fn handle_message(&self, _: &LogMessage, _: &LogCategory) -> Result<(), HandlerError> {
        panic!("handler exploded");
    }

    fn flush(&self) -> Result<(), HandlerError> {
        Err(HandlerError::Other("disk gone".into()))
    }

    fn config(&self) -> LogHandlerConfig {
        LogHandlerConfig::new("panicky")
    }
}

struct PanickyFactory;

impl LogHandlerFactory for PanickyFactory {
    fn handler_type(&self) -> &str {
        "panicky"
    }

    fn create_handler(&self, _: &LogOptions) -> Result<Arc<dyn LogHandler>, HandlerError> {
        Ok(Arc::new(PanickyHandler))
    }
}

fn db_with(handler_type: &str, options: &[(&str, &str)]) -> LoggerDb {
    let db = LoggerDb::new();
    db.register_handler_factory(TestHandlerFactory::new(), false).unwrap();
    db.register_handler_factory(Arc::new(PanickyFactory), false).unwrap();
    let mut config = LogConfig::new();
    config
        .add_handler(
            "h",
            LogHandlerConfig::with_options(handler_type, options.iter().copied()),
        )
        .add_category("", LogCategoryConfig::with_handlers(LogLevel::INFO, false, ["h"]));
    db.update_config(&config).unwrap();
    db
}

// ============================================================================
// Handler Failure Tests
// ============================================================================

/// Verifies a handler write error becomes a warning naming the category.
#[test]
fn handler_error_is_reported() {
    let recording = Recording::start();
    let db = db_with("test", &[("fail", "write")]);

    log(&db.get_category("svc"), LogLevel::WARN, "lost");
    assert_eq!(
        recording.warnings(),
        ["error processing message in category \"\": write failed"]
    );
}

/// Verifies a panicking handler is contained and reported.
#[test]
fn handler_panic_is_contained() {
    let recording = Recording::start();
    let db = db_with("panicky", &[]);

    let delivered = log(&db.root(), LogLevel::ERR, "boom");
    assert_eq!(delivered, 1);
    let warnings = recording.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("handler exploded"), "{warnings:?}");
}

/// Verifies flush failures are reported while the flush count still
/// includes the failing handler.
#[test]
fn flush_failure_is_reported() {
    let recording = Recording::start();
    let db = db_with("panicky", &[]);

    assert_eq!(db.flush_all_handlers(), 1);
    assert_eq!(recording.warnings(), ["error flushing log handler: disk gone"]);
}

/// Verifies a panicking warning handler does not propagate.
#[test]
fn panicking_warning_handler_falls_back() {
    let _recording = Recording::start();
    set_internal_warning_handler(Some(explode));
    let db = db_with("test", &[("fail", "write")]);

    log(&db.root(), LogLevel::ERR, "message");
    logging::internal_warning!("direct report {}", 1);
}
