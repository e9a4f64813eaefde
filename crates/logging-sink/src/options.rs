//! crates/logging-sink/src/options.rs
//! Validation helpers shared by the bundled handler factories.

use logging::{HandlerError, LogLevel, LogOptions};

/// Option accepted by every bundled handler type: the minimum level the
/// handler writes.
pub const LEVEL_OPTION: &str = "level";

/// Rejects any option not in `known`. `level` is always accepted.
pub(crate) fn reject_unknown(options: &LogOptions, known: &[&str]) -> Result<(), HandlerError> {
    match options
        .keys()
        .find(|key| key.as_str() != LEVEL_OPTION && !known.contains(&key.as_str()))
    {
        Some(unknown) => Err(HandlerError::UnknownOption(unknown.clone())),
        None => Ok(()),
    }
}

/// The handler's own minimum level; everything passes when unset.
pub(crate) fn min_level(options: &LogOptions) -> Result<LogLevel, HandlerError> {
    options.get(LEVEL_OPTION).map_or(Ok(LogLevel::UNINITIALIZED), |value| {
        value
            .parse()
            .map_err(|err| HandlerError::invalid_option(LEVEL_OPTION, value, format!("{err}")))
    })
}

pub(crate) fn required<'a>(options: &'a LogOptions, name: &str) -> Result<&'a str, HandlerError> {
    options
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| HandlerError::MissingOption(name.to_owned()))
}

pub(crate) fn flag(options: &LogOptions, name: &str, default: bool) -> Result<bool, HandlerError> {
    let Some(value) = options.get(name) else {
        return Ok(default);
    };
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(HandlerError::invalid_option(name, value, "expected a boolean")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(pairs: &[(&str, &str)]) -> LogOptions {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn unknown_options_are_named() {
        let options = opts(&[("path", "/x"), ("level", "warn"), ("colour", "auto")]);
        let err = reject_unknown(&options, &["path"]).unwrap_err();
        assert!(matches!(err, HandlerError::UnknownOption(ref name) if name == "colour"));
        assert!(reject_unknown(&opts(&[("level", "1")]), &[]).is_ok());
    }

    #[test]
    fn level_defaults_to_everything() {
        assert_eq!(min_level(&opts(&[])).unwrap(), LogLevel::UNINITIALIZED);
        assert_eq!(min_level(&opts(&[("level", "WARN")])).unwrap(), LogLevel::WARN);
        let err = min_level(&opts(&[("level", "loud")])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value \"loud\" for option \"level\": invalid log level \"loud\""
        );
    }

    #[test]
    fn flags_parse_common_spellings() {
        assert!(flag(&opts(&[("append", "YES")]), "append", false).unwrap());
        assert!(!flag(&opts(&[("append", "0")]), "append", true).unwrap());
        assert!(flag(&opts(&[]), "append", true).unwrap());
        assert!(flag(&opts(&[("append", "maybe")]), "append", true).is_err());
    }

    #[test]
    fn required_reports_missing_name() {
        let err = required(&opts(&[]), "path").unwrap_err();
        assert_eq!(err.to_string(), "missing required option \"path\"");
    }
}
