//! crates/logging/src/tree.rs
//! Arena of categories with parent links and effective-level propagation.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::category::LogCategory;
use crate::context::ContextCallbackList;
use crate::levels::{DEFAULT_LOG_LEVEL, LogLevel};
use crate::name::{lookup_key, parent_name};

/// Index of the root category in the arena.
pub(crate) const ROOT: usize = 0;

/// Every category known to a registry.
///
/// Nodes are never removed. Parent links live on the nodes themselves as
/// weak references; child links are index lists kept here so a level change
/// can walk a subtree without touching any node's handlers.
pub(crate) struct CategoryTree {
    by_name: FxHashMap<String, usize>,
    nodes: Vec<Arc<LogCategory>>,
    children: Vec<Vec<usize>>,
}

impl CategoryTree {
    pub(crate) fn new(context: Arc<ContextCallbackList>) -> Self {
        let root = Arc::new(LogCategory::new_root(context, DEFAULT_LOG_LEVEL));
        let mut by_name = FxHashMap::default();
        by_name.insert(String::new(), ROOT);
        Self {
            by_name,
            nodes: vec![root],
            children: vec![Vec::new()],
        }
    }

    pub(crate) fn root(&self) -> &Arc<LogCategory> {
        &self.nodes[ROOT]
    }

    /// Looks up a category by canonical name.
    pub(crate) fn get(&self, canonical: &str) -> Option<&Arc<LogCategory>> {
        self.by_name
            .get(&lookup_key(canonical))
            .map(|&index| &self.nodes[index])
    }

    /// Returns the category for `canonical`, creating it and any missing
    /// ancestors first.
    pub(crate) fn get_or_create(&mut self, canonical: &str) -> Arc<LogCategory> {
        if let Some(existing) = self.get(canonical) {
            return Arc::clone(existing);
        }
        // Only the root has no parent name, and the root always exists.
        let parent = match parent_name(canonical) {
            Some(parent) => self.get_or_create(parent),
            None => return Arc::clone(self.root()),
        };
        let index = self.nodes.len();
        let node = Arc::new(LogCategory::new_child(&parent, canonical.to_owned(), index));
        self.nodes.push(Arc::clone(&node));
        self.children.push(Vec::new());
        self.children[parent.index()].push(index);
        self.by_name.insert(lookup_key(canonical), index);
        node
    }

    /// Sets a category's own level and republishes effective levels for it
    /// and all of its descendants, parents before children.
    pub(crate) fn set_level(&mut self, index: usize, level: LogLevel, inherit: bool) {
        let inherit = inherit && index != ROOT;
        self.nodes[index].store_level(level, inherit);
        self.recompute_from(index);
    }

    /// Puts every category back to its initial state: the root at the default
    /// level, everything else inheriting at `MAX_LEVEL`, nothing bound.
    pub(crate) fn reset_all(&mut self) {
        for node in &self.nodes {
            node.clear_handlers();
            if node.is_root() {
                node.store_level(DEFAULT_LOG_LEVEL, false);
            } else {
                node.store_level(LogLevel::MAX_LEVEL, true);
            }
        }
        self.recompute_from(ROOT);
    }

    fn recompute_from(&self, start: usize) {
        self.recompute(start);
        let mut pending: Vec<usize> = self.children[start].iter().rev().copied().collect();
        while let Some(index) = pending.pop() {
            // A non-inheriting node keeps its own level, but its
            // descendants may still inherit from it.
            if self.nodes[index].inherits_parent_level() {
                self.recompute(index);
            }
            pending.extend(self.children[index].iter().rev().copied());
        }
    }

    fn recompute(&self, index: usize) {
        let node = &self.nodes[index];
        let level = node.level();
        let effective = match node.parent() {
            Some(parent) if node.inherits_parent_level() => level.min(parent.effective_level()),
            _ => level,
        };
        node.store_effective_level(effective);
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Arc<LogCategory>> {
        self.nodes.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    #[cfg(test)]
    pub(crate) fn children_of(&self, index: usize) -> impl Iterator<Item = &Arc<LogCategory>> {
        self.children[index].iter().map(|&child| &self.nodes[child])
    }
}
