//! crates/logging/src/name.rs
//! Category name canonicalization and comparison.

use std::hash::{Hash, Hasher};

/// Converts a category name to its canonical dotted form.
///
/// `.`, `/`, `\` and `::` all separate components, so `a::b`, `a/b` and
/// `a\b` name the same category as `a.b`. Runs of separators collapse to a
/// single dot and leading or trailing separators are dropped, which makes
/// every all-separator name (and the empty name) refer to the root.
/// Case is preserved; see [`names_equal`] for comparison.
#[must_use]
pub fn canonicalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dot = false;
    for component in name.replace("::", ".").split(['.', '/', '\\']) {
        if component.is_empty() {
            continue;
        }
        if pending_dot {
            out.push('.');
        }
        out.push_str(component);
        pending_dot = true;
    }
    out
}

/// Returns the canonical name of the parent category, or `None` for the root.
#[must_use]
pub fn parent_name(canonical: &str) -> Option<&str> {
    if canonical.is_empty() {
        return None;
    }
    Some(canonical.rfind('.').map_or("", |idx| &canonical[..idx]))
}

/// Compares two names ignoring ASCII case and separator differences.
#[must_use]
pub fn names_equal(a: &str, b: &str) -> bool {
    canonicalize_name(a).eq_ignore_ascii_case(&canonicalize_name(b))
}

/// Hashes a name consistently with [`names_equal`].
pub fn hash_name<H: Hasher>(name: &str, state: &mut H) {
    for byte in canonicalize_name(name).bytes() {
        byte.to_ascii_lowercase().hash(state);
    }
    0xff_u8.hash(state);
}

/// Returns the key categories are indexed under.
pub(crate) fn lookup_key(canonical: &str) -> String {
    canonical.to_ascii_lowercase()
}
