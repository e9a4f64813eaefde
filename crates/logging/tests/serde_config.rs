//! Serialization of configuration snapshots.

#![cfg(feature = "serde")]

use logging::{LogCategoryConfig, LogConfig, LogHandlerConfig, LogLevel};
use serde_json::json;

// ============================================================================
// LogLevel Tests
// ============================================================================

/// Verifies levels serialize by name and accept every parseable spelling.
#[test]
fn levels_use_names() {
    assert_eq!(serde_json::to_value(LogLevel::WARN).unwrap(), json!("WARN"));
    assert_eq!(
        serde_json::to_value(LogLevel::from_raw(1234)).unwrap(),
        json!("LogLevel(1234)")
    );
    for text in ["dbg", "LogLevel::debug", "DEBUG", "1000"] {
        let level: LogLevel = serde_json::from_value(json!(text)).unwrap();
        assert_eq!(level, LogLevel::DBG, "{text}");
    }
    let err = serde_json::from_value::<LogLevel>(json!("loud")).unwrap_err();
    assert!(err.to_string().contains("invalid log level \"loud\""));
}

// ============================================================================
// LogConfig Tests
// ============================================================================

/// Verifies the handler type is written as `type` and absent fields default.
#[test]
fn config_json_shape() {
    let mut config = LogConfig::new();
    config
        .add_handler("out", LogHandlerConfig::with_options("stream", [("stream", "stderr")]))
        .add_category("svc", LogCategoryConfig::with_handlers(LogLevel::ERR, false, ["out"]))
        .add_category("svc.net", LogCategoryConfig::new(LogLevel::DBG, true));

    let value = serde_json::to_value(&config).unwrap();
    assert_eq!(
        value,
        json!({
            "categories": {
                "svc": { "level": "ERROR", "inherit_parent_level": false, "handlers": ["out"] },
                "svc.net": { "level": "DEBUG", "inherit_parent_level": true },
            },
            "handlers": {
                "out": { "type": "stream", "options": { "stream": "stderr" } },
            },
        })
    );
}

/// Verifies a minimal document fills in defaults.
#[test]
fn config_defaults_when_fields_missing() {
    let config: LogConfig = serde_json::from_value(json!({
        "categories": { "a": { "level": "warn" } },
        "handlers": { "h": { "options": { "path": "/tmp/x" } } },
    }))
    .unwrap();

    assert_eq!(
        config.category("a"),
        Some(&LogCategoryConfig::new(LogLevel::WARN, true))
    );
    let handler = config.handler("h").unwrap();
    assert_eq!(handler.handler_type, None);
    assert_eq!(handler.options["path"], "/tmp/x");

    let empty: LogConfig = serde_json::from_value(json!({})).unwrap();
    assert!(empty.is_empty());
}

/// Verifies a configuration survives a trip through JSON text.
#[test]
fn config_round_trips_through_text() {
    let mut config = LogConfig::new();
    config
        .add_handler("f", LogHandlerConfig::with_options("file", [("path", "/var/log/a"), ("append", "true")]))
        .add_category("", LogCategoryConfig::with_handlers(LogLevel::INFO, false, ["f"]))
        .add_category("x.y", LogCategoryConfig::new(LogLevel::from_raw(2500), true));

    let text = serde_json::to_string_pretty(&config).unwrap();
    let back: LogConfig = serde_json::from_str(&text).unwrap();
    assert_eq!(back, config);
}
