//! crates/logging-sink/src/stream.rs
//! Factories for handlers writing to the standard streams and to files.

use std::fs::OpenOptions;
use std::io;
use std::sync::Arc;

use logging::{HandlerError, LogHandler, LogHandlerFactory, LogOptions};

use crate::format::GlogFormatter;
use crate::options::{flag, min_level, reject_unknown, required};
use crate::writer::WriterHandler;

/// Type name of [`StreamHandlerFactory`].
pub const STREAM_HANDLER_TYPE: &str = "stream";

/// Type name of [`FileHandlerFactory`].
pub const FILE_HANDLER_TYPE: &str = "file";

/// Creates handlers writing to stderr or stdout.
///
/// Options: `stream` (required, `stderr` or `stdout`) and `level`.
#[derive(Clone, Copy, Debug, Default)]
pub struct StreamHandlerFactory;

impl LogHandlerFactory for StreamHandlerFactory {
    fn handler_type(&self) -> &str {
        STREAM_HANDLER_TYPE
    }

    fn create_handler(&self, options: &LogOptions) -> Result<Arc<dyn LogHandler>, HandlerError> {
        reject_unknown(options, &["stream"])?;
        let level = min_level(options)?;
        let formatter = Arc::new(GlogFormatter);
        let handler = match required(options, "stream")? {
            "stderr" => WriterHandler::new(
                STREAM_HANDLER_TYPE,
                options.clone(),
                level,
                io::stderr(),
                formatter,
            ),
            "stdout" => WriterHandler::new(
                STREAM_HANDLER_TYPE,
                options.clone(),
                level,
                io::stdout(),
                formatter,
            ),
            other => {
                return Err(HandlerError::invalid_option(
                    "stream",
                    other,
                    "expected \"stderr\" or \"stdout\"",
                ));
            }
        };
        Ok(Arc::new(handler))
    }
}

/// Creates handlers appending to a file.
///
/// Options: `path` (required), `append` (default true; false truncates the
/// file when the handler is created) and `level`. The file is created if
/// missing.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileHandlerFactory;

impl LogHandlerFactory for FileHandlerFactory {
    fn handler_type(&self) -> &str {
        FILE_HANDLER_TYPE
    }

    fn create_handler(&self, options: &LogOptions) -> Result<Arc<dyn LogHandler>, HandlerError> {
        reject_unknown(options, &["path", "append"])?;
        let level = min_level(options)?;
        let path = required(options, "path")?;
        let append = flag(options, "append", true)?;

        let mut open = OpenOptions::new();
        open.create(true);
        if append {
            open.append(true);
        } else {
            open.write(true).truncate(true);
        }
        let file = open.open(path).map_err(|err| {
            HandlerError::invalid_option("path", path, format!("cannot open: {err}"))
        })?;

        Ok(Arc::new(WriterHandler::new(
            FILE_HANDLER_TYPE,
            options.clone(),
            level,
            file,
            Arc::new(GlogFormatter),
        )))
    }
}
