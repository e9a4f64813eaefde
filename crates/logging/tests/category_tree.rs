//! Integration tests for the category tree and effective-level inheritance.
//!
//! Every test builds its own `LoggerDb` so level changes never leak
//! between tests running in parallel.

use std::sync::{Arc, Barrier};
use std::thread;

use logging::{DEFAULT_LOG_LEVEL, LogLevel, LoggerDb};

// ============================================================================
// Category Creation Tests
// ============================================================================

/// Verifies requesting a deep name creates every missing ancestor.
#[test]
fn get_category_creates_ancestor_chain() {
    let db = LoggerDb::new();
    assert!(db.get_category_or_none("a").is_none());

    let leaf = db.get_category("a.b.c");
    let b = db.get_category_or_none("a.b").expect("a.b created");
    let a = db.get_category_or_none("a").expect("a created");

    assert!(Arc::ptr_eq(&leaf.parent().unwrap(), &b));
    assert!(Arc::ptr_eq(&b.parent().unwrap(), &a));
    assert!(Arc::ptr_eq(&a.parent().unwrap(), &db.root()));
    assert!(db.root().parent().is_none());
}

/// Verifies every spelling of a name resolves to the same node.
#[test]
fn equivalent_names_share_one_category() {
    let db = LoggerDb::new();
    let dotted = db.get_category("svc.net");
    for spelling in ["svc/net", "svc::net", "SVC.NET", "svc\\net", ".svc..net/", "Svc/Net"] {
        assert!(
            Arc::ptr_eq(&db.get_category(spelling), &dotted),
            "{spelling} resolved to a different category"
        );
    }
    assert_eq!(db.get_full_config().categories().len(), 3);
}

/// Verifies the empty name and separator-only names are the root.
#[test]
fn empty_name_is_root() {
    let db = LoggerDb::new();
    let root = db.root();
    assert!(root.is_root());
    assert_eq!(root.name(), "");
    assert!(Arc::ptr_eq(&db.get_category(""), &root));
    assert!(Arc::ptr_eq(&db.get_category("..."), &root));
}

/// Verifies concurrent creation of overlapping names never duplicates nodes.
#[test]
fn concurrent_creation_yields_single_nodes() {
    let db = Arc::new(LoggerDb::new());
    let barrier = Arc::new(Barrier::new(8));
    let workers: Vec<_> = (0..8)
        .map(|i| {
            let db = Arc::clone(&db);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let name = if i % 2 == 0 { "x.y.z" } else { "x/y" };
                let first = db.get_category(name);
                let again = db.get_category(name);
                assert!(Arc::ptr_eq(&first, &again));
                db.get_category("x.y.z")
            })
        })
        .collect();

    let leaves: Vec<_> = workers.into_iter().map(|w| w.join().unwrap()).collect();
    assert!(leaves.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    assert_eq!(db.get_full_config().categories().len(), 4);
}

// ============================================================================
// Effective Level Tests
// ============================================================================

/// Verifies new categories start inheriting at MAX_LEVEL from the root.
#[test]
fn new_category_defaults() {
    let db = LoggerDb::new();
    let net = db.get_category("svc.net");
    assert_eq!(net.level(), LogLevel::MAX_LEVEL);
    assert!(net.inherits_parent_level());
    assert_eq!(net.effective_level(), DEFAULT_LOG_LEVEL);
    assert!(net.is_enabled(LogLevel::INFO));
    assert!(!net.is_enabled(LogLevel::DBG));
}

/// Verifies an inheriting child takes the less restrictive of its own and
/// its parent's level.
#[test]
fn inheriting_child_uses_minimum_of_own_and_parent() {
    let db = LoggerDb::new();
    db.set_level("", LogLevel::INFO, false);
    let net = db.get_category("svc.net");
    assert_eq!(net.effective_level(), LogLevel::INFO);

    db.set_level("svc.net", LogLevel::WARN, true);
    assert_eq!(net.effective_level().as_raw(), 2000);

    db.set_level("svc.net", LogLevel::DBG, true);
    assert_eq!(net.effective_level(), LogLevel::DBG);
}

/// Verifies a non-inheriting child uses exactly its own level.
#[test]
fn non_inheriting_child_uses_own_level() {
    let db = LoggerDb::new();
    db.set_level("", LogLevel::INFO, false);
    let net = db.get_category("svc.net");
    db.set_level("svc.net", LogLevel::WARN, false);
    assert_eq!(net.effective_level().as_raw(), 3000);
    assert!(!net.is_enabled(LogLevel::INFO));
    assert!(net.is_enabled(LogLevel::WARN));

    db.set_level("", LogLevel::DBG, false);
    assert_eq!(net.effective_level(), LogLevel::WARN);
}

/// Verifies a level change reaches every descendant before returning.
#[test]
fn level_change_propagates_to_all_descendants() {
    let db = LoggerDb::new();
    let names = ["a", "a.b", "a.b.c", "a.b.d", "a.e", "a.e.f.g"];
    let categories: Vec<_> = names.iter().map(|name| db.get_category(name)).collect();

    db.set_level("a", LogLevel::DBG, false);
    assert!(categories.iter().all(|c| c.effective_level() == LogLevel::DBG));

    db.set_level("a.e", LogLevel::ERR, false);
    db.set_level("a", LogLevel::CRITICAL, false);
    let effective: Vec<_> = categories.iter().map(|c| c.effective_level()).collect();
    assert_eq!(
        effective,
        [
            LogLevel::CRITICAL,
            LogLevel::CRITICAL,
            LogLevel::CRITICAL,
            LogLevel::CRITICAL,
            LogLevel::ERR,
            LogLevel::ERR,
        ]
    );
}

/// Verifies the root never inherits even when asked to.
#[test]
fn root_ignores_inherit_flag() {
    let db = LoggerDb::new();
    db.set_level("", LogLevel::WARN, true);
    assert!(!db.root().inherits_parent_level());
    assert_eq!(db.root().effective_level(), LogLevel::WARN);
}

/// Verifies lock-free readers only ever observe published levels while
/// another thread keeps changing an ancestor.
#[test]
fn concurrent_level_changes_publish_whole_values() {
    let db = Arc::new(LoggerDb::new());
    let leaf = db.get_category("hot.path.leaf");
    db.set_level("hot.path.leaf", LogLevel::ERR, false);
    db.set_level("hot", LogLevel::DBG, false);

    let writer = {
        let db = Arc::clone(&db);
        thread::spawn(move || {
            for round in 0..500 {
                let level = if round % 2 == 0 { LogLevel::DBG } else { LogLevel::CRITICAL };
                db.set_level("hot", level, false);
            }
        })
    };
    for _ in 0..5000 {
        assert_eq!(leaf.effective_level(), LogLevel::ERR);
        let path = db.get_category("hot.path");
        let level = path.effective_level();
        assert!(level == LogLevel::DBG || level == LogLevel::CRITICAL);
    }
    writer.join().unwrap();
}
