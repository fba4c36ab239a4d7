//! Live route table.
//!
//! Holds the current `RouteTree` behind an atomic pointer. Readers take a
//! snapshot per resolution; a reload swaps in a whole new tree and never
//! mutates the old one.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::routing::{RouteMatch, RouteTree};

#[derive(Debug)]
pub struct RouteTable {
    tree: ArcSwap<RouteTree>,
}

impl RouteTable {
    pub fn new(tree: RouteTree) -> Self {
        Self {
            tree: ArcSwap::from_pointee(tree),
        }
    }

    /// Snapshot of the current tree.
    pub fn load(&self) -> Arc<RouteTree> {
        self.tree.load_full()
    }

    /// Replace the tree atomically. Returns the previous one.
    pub fn swap(&self, tree: RouteTree) -> Arc<RouteTree> {
        let previous = self.tree.swap(Arc::new(tree));
        tracing::info!(
            previous_roots = previous.roots().len(),
            roots = self.tree.load().roots().len(),
            "Route table swapped"
        );
        previous
    }

    /// Resolve against the current snapshot.
    pub fn resolve(&self, pathname: &str) -> Vec<RouteMatch> {
        self.tree.load().resolve(pathname)
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new(RouteTree::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouteConfig;

    #[test]
    fn test_swap_replaces_whole_tree() {
        let table = RouteTable::new(
            RouteTree::from_config(&[RouteConfig::new("/old", "Old")]).unwrap(),
        );
        let snapshot = table.load();
        assert_eq!(table.resolve("/old").len(), 1);

        table.swap(RouteTree::from_config(&[RouteConfig::new("/new", "New")]).unwrap());

        assert!(table.resolve("/old").is_empty());
        assert_eq!(table.resolve("/new").len(), 1);
        // Earlier snapshots are untouched.
        assert_eq!(snapshot.resolve("/old").len(), 1);
    }

    #[test]
    fn test_default_is_empty() {
        let table = RouteTable::default();
        assert!(table.load().is_empty());
        assert!(table.resolve("/").is_empty());
    }
}
