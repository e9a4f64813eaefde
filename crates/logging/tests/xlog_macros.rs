//! The `xlog!` macro family logging through the global registry.
//!
//! Every test uses its own category subtree and handler name because the
//! global registry is shared by the whole test binary.

mod common;

use std::sync::{Arc, OnceLock};

use common::{TestHandler, TestHandlerFactory};
use logging::{
    LogCategoryConfig, LogConfig, LogHandlerConfig, LogLevel, LoggerDb, xlog, xlog_dbg, xlog_err,
    xlog_info, xlog_is_on, xlog_warn,
};

fn factory() -> &'static Arc<TestHandlerFactory> {
    static FACTORY: OnceLock<Arc<TestHandlerFactory>> = OnceLock::new();
    FACTORY.get_or_init(|| {
        let factory = TestHandlerFactory::new();
        LoggerDb::get()
            .register_handler_factory(factory.clone(), true)
            .unwrap();
        factory
    })
}

/// Binds a fresh handler called `id` to `category` at `level`.
fn capture(id: &str, category: &str, level: LogLevel) -> Arc<TestHandler> {
    let factory = factory();
    let mut config = LogConfig::new();
    config
        .add_handler(id, LogHandlerConfig::with_options("test", [("id", id)]))
        .add_category(category, LogCategoryConfig::with_handlers(level, false, [id]));
    LoggerDb::get().update_config(&config).unwrap();
    factory
        .created()
        .into_iter()
        .rev()
        .find(|handler| handler.options["id"] == id)
        .unwrap()
}

// ============================================================================
// Level Filtering Tests
// ============================================================================

/// Verifies messages below the category's level are discarded before
/// formatting.
#[test]
fn disabled_levels_skip_formatting() {
    let handler = capture("filter", "macros.filter", LogLevel::WARN);
    let mut formatted = 0;
    let mut count = |n: i32| {
        formatted += 1;
        n
    };

    xlog!(category: "macros.filter", LogLevel::INFO, "quiet {}", count(1));
    xlog!(category: "macros.filter", LogLevel::ERR, "loud {}", count(2));
    assert_eq!(formatted, 1);
    assert_eq!(handler.texts(), ["loud 2"]);
}

/// Verifies a call site follows level changes made after its first use.
#[test]
fn site_follows_level_changes() {
    let handler = capture("follow", "macros.follow", LogLevel::ERR);
    let db = LoggerDb::get();
    for round in 0..3 {
        xlog_info!(category: "macros.follow", "round {round}");
        if round == 0 {
            db.set_level("macros.follow", LogLevel::DBG, false);
        } else {
            db.set_level("macros.follow", LogLevel::CRITICAL, false);
        }
    }
    assert_eq!(handler.texts(), ["round 1"]);
}

/// Verifies xlog_is_on! reports the same decision the logging macros make.
#[test]
fn is_on_matches_category_level() {
    LoggerDb::get().set_level("macros.probe", LogLevel::WARN, false);
    assert!(!xlog_is_on!(category: "macros.probe", LogLevel::INFO));
    assert!(xlog_is_on!(category: "macros.probe", LogLevel::WARN));
    assert!(xlog_is_on!(category: "macros.probe", LogLevel::CRITICAL));
}

// ============================================================================
// Message Content Tests
// ============================================================================

/// Verifies the shorthand macros log at their levels and record the call site.
#[test]
fn shorthands_use_their_levels() {
    let handler = capture("short", "macros.short", LogLevel::DBG);
    xlog_dbg!(category: "macros.short", "d");
    xlog_info!(category: "macros.short", "i");
    xlog_warn!(category: "macros.short", "w");
    xlog_err!(category: "macros.short", "e {}", 4);

    let seen = handler.messages();
    let levels: Vec<_> = seen.iter().map(|s| s.level).collect();
    assert_eq!(
        levels,
        [LogLevel::DBG, LogLevel::INFO, LogLevel::WARN, LogLevel::ERR]
    );
    assert_eq!(seen[3].message, "e 4");
    assert!(seen.iter().all(|s| s.category == "macros.short"));
}

/// Verifies a child category's messages reach a handler on its ancestor.
#[test]
fn child_category_reaches_ancestor_handler() {
    let handler = capture("tree", "macros.tree", LogLevel::INFO);
    xlog_warn!(category: "macros.tree.leaf", "from below");
    let seen = handler.messages();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].category, "macros.tree.leaf");
    assert_eq!(seen[0].handler_category, "macros.tree");
}

/// Verifies the default category is derived from the module path.
#[test]
fn default_category_is_module_path() {
    let handler = capture("module", module_path!(), LogLevel::INFO);
    xlog_err!("from the module");
    xlog!(LogLevel::DBG, "filtered");
    let seen = handler.messages();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].category, "xlog_macros");
}

/// Verifies a site binds to the category under any spelling of its name.
#[test]
fn sites_canonicalize_names() {
    let handler = capture("spell", "macros.spell", LogLevel::INFO);
    xlog_info!(category: "macros::spell", "colons");
    xlog_info!(category: "MACROS/Spell", "slash");
    assert_eq!(handler.texts(), ["colons", "slash"]);
}
