//! crates/logging/src/error.rs
//! Error types for configuration, handlers and level parsing.

use std::io;

/// Returned when a string does not name a [`LogLevel`](crate::LogLevel).
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("invalid log level \"{input}\"")]
pub struct ParseLevelError {
    input: String,
}

impl ParseLevelError {
    pub(crate) fn new(input: &str) -> Self {
        Self {
            input: input.to_owned(),
        }
    }

    /// Returns the rejected input.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// Errors raised by handlers and handler factories.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// A required option was not supplied.
    #[error("missing required option \"{0}\"")]
    MissingOption(String),

    /// The handler type does not understand an option.
    #[error("unknown option \"{0}\"")]
    UnknownOption(String),

    /// An option value could not be interpreted.
    #[error("invalid value \"{value}\" for option \"{option}\": {reason}")]
    InvalidOption {
        /// Option name.
        option: String,
        /// Rejected value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The handler was closed and no longer accepts messages.
    #[error("handler is closed")]
    Closed,

    /// Writing to the underlying destination failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Any other handler-specific failure.
    #[error("{0}")]
    Other(String),
}

impl HandlerError {
    /// Builds an [`InvalidOption`](Self::InvalidOption) error.
    pub fn invalid_option(
        option: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidOption {
            option: option.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while applying configuration to a [`LoggerDb`](crate::LoggerDb).
///
/// A configuration update that fails leaves the registry exactly as it was.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A factory with this type name is already registered.
    #[error("a handler factory for \"{0}\" is already registered")]
    DuplicateFactory(String),

    /// No factory with this type name is registered.
    #[error("no handler factory registered for \"{0}\"")]
    UnknownFactory(String),

    /// A handler names a type that has no registered factory.
    #[error("unknown handler type \"{handler_type}\" for handler \"{handler}\"")]
    UnknownHandlerType {
        /// Handler name.
        handler: String,
        /// Requested type.
        handler_type: String,
    },

    /// A handler entry omits its type and no handler of that name exists yet.
    #[error("no handler type specified for new handler \"{0}\"")]
    MissingHandlerType(String),

    /// A category references a handler that is neither configured nor existing.
    #[error("unknown handler \"{handler}\" referenced by category \"{category}\"")]
    UnknownHandler {
        /// Category name as written in the configuration.
        category: String,
        /// Missing handler name.
        handler: String,
    },

    /// A factory failed to create or update a handler.
    #[error("error creating handler \"{handler}\": {source}")]
    HandlerCreation {
        /// Handler name.
        handler: String,
        /// Underlying factory failure.
        #[source]
        source: HandlerError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn creation_error_exposes_source() {
        let err = ConfigError::HandlerCreation {
            handler: "out".into(),
            source: HandlerError::MissingOption("path".into()),
        };
        assert_eq!(
            err.to_string(),
            "error creating handler \"out\": missing required option \"path\""
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn io_errors_convert() {
        let err: HandlerError = io::Error::other("disk full").into();
        assert!(matches!(err, HandlerError::Io(_)));
    }

    #[test]
    fn parse_level_error_keeps_input() {
        let err = ParseLevelError::new("loud");
        assert_eq!(err.input(), "loud");
        assert_eq!(err.to_string(), "invalid log level \"loud\"");
    }
}
