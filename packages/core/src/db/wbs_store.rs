//! In-memory WBS Tree Store
//!
//! `WbsStore` owns the flat collection of nodes and implements every
//! hierarchy operation over it: listing, the nested tree projection,
//! create / patch, cascading delete and move with sibling re-indexing.
//!
//! # Traversal Strategy
//!
//! Hierarchy reads never scan the collection once per node. Each call builds a
//! `parent_id → children` index in one pass (children sorted by `position`,
//! ties broken by insertion order) and walks it, so `tree()` and subtree
//! collection cost O(n log n) per call.
//!
//! Walks start from a known node and only follow child links, with a visited
//! set where a cycle could be entered. A `parent_id` cycle, which the store
//! does not prevent on its own, therefore cannot hang a read: its members are
//! unreachable from any root and are left out of `tree()`.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::db::seed;
use crate::models::{NewWbsNode, WbsNode, WbsNodeUpdate, WbsNodeWithChildren};

#[derive(Debug, Clone)]
struct StoredNode {
    /// Insertion sequence, stable across updates and moves
    seq: u64,
    node: WbsNode,
}

/// Children grouped by parent key, each group sorted by `(position, seq)`
type ChildIndex<'a> = HashMap<Option<&'a str>, Vec<&'a StoredNode>>;

/// The node collection of one breakdown.
///
/// Operations take `&self` / `&mut self` and run to completion, so each one is
/// atomic from the caller's point of view. Sharing across tasks goes through
/// `WbsService`, which serializes access.
#[derive(Debug, Clone, Default)]
pub struct WbsStore {
    nodes: HashMap<String, StoredNode>,
    next_seq: u64,
}

impl WbsStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given nodes, in iteration order
    pub fn with_nodes(nodes: impl IntoIterator<Item = WbsNode>) -> Self {
        let mut store = Self::new();
        for node in nodes {
            store.insert(node);
        }
        store
    }

    /// Create a store seeded with the sample software project
    pub fn sample() -> Self {
        Self::with_nodes(seed::sample_nodes())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    fn insert(&mut self, node: WbsNode) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.nodes.insert(node.id.clone(), StoredNode { seq, node });
    }

    fn entries_in_order(&self) -> Vec<&StoredNode> {
        let mut entries: Vec<&StoredNode> = self.nodes.values().collect();
        entries.sort_by_key(|entry| entry.seq);
        entries
    }

    fn children_index(&self) -> ChildIndex<'_> {
        let mut index: ChildIndex<'_> = HashMap::new();
        for entry in self.nodes.values() {
            index.entry(entry.node.parent_key()).or_default().push(entry);
        }
        for siblings in index.values_mut() {
            siblings.sort_by_key(|entry| (entry.node.position, entry.seq));
        }
        index
    }

    /// Every node, in insertion order
    pub fn list(&self) -> Vec<WbsNode> {
        self.entries_in_order()
            .into_iter()
            .map(|entry| entry.node.clone())
            .collect()
    }

    /// Look up a single node; children are not included
    pub fn get(&self, id: &str) -> Option<&WbsNode> {
        self.nodes.get(id).map(|entry| &entry.node)
    }

    /// Direct children of `parent_id` (roots for `None`), sorted by position
    pub fn children(&self, parent_id: Option<&str>) -> Vec<WbsNode> {
        let parent_id = parent_id.filter(|id| !id.is_empty());
        self.children_index()
            .get(&parent_id)
            .map(|siblings| siblings.iter().map(|entry| entry.node.clone()).collect())
            .unwrap_or_default()
    }

    /// Create a node with a freshly generated id.
    ///
    /// `parent_id` is not checked and `level` is taken as supplied.
    pub fn create(&mut self, attributes: NewWbsNode) -> WbsNode {
        let node = attributes.into_node(Uuid::new_v4().to_string());
        self.insert(node.clone());
        node
    }

    /// Apply a partial update, returning the updated node or `None` if `id` is unknown.
    ///
    /// `level` and sibling positions are not re-derived from a changed parent.
    pub fn update(&mut self, id: &str, update: WbsNodeUpdate) -> Option<WbsNode> {
        let entry = self.nodes.get_mut(id)?;
        update.apply_to(&mut entry.node);
        Some(entry.node.clone())
    }

    /// Ids of `id` and all of its descendants, parents before children.
    ///
    /// Empty if `id` is unknown.
    pub fn subtree_ids(&self, id: &str) -> Vec<String> {
        let Some((root_id, _)) = self.nodes.get_key_value(id) else {
            return Vec::new();
        };
        let index = self.children_index();

        let mut collected: Vec<&str> = vec![root_id.as_str()];
        let mut seen: HashSet<&str> = HashSet::from([root_id.as_str()]);
        let mut cursor = 0;
        while let Some(&current) = collected.get(cursor) {
            cursor += 1;
            for child in index.get(&Some(current)).into_iter().flatten() {
                let child_id = child.node.id.as_str();
                if seen.insert(child_id) {
                    collected.push(child_id);
                }
            }
        }

        collected.into_iter().map(str::to_owned).collect()
    }

    /// Remove `id` and its whole subtree, returning the removed nodes
    pub fn remove_subtree(&mut self, id: &str) -> Vec<WbsNode> {
        self.subtree_ids(id)
            .iter()
            .filter_map(|removed| self.nodes.remove(removed))
            .map(|entry| entry.node)
            .collect()
    }

    /// Delete a node and all of its descendants.
    ///
    /// Returns `false` if `id` did not exist.
    pub fn delete(&mut self, id: &str) -> bool {
        !self.remove_subtree(id).is_empty()
    }

    /// Nested projection: roots by ascending position, each with its ordered children
    pub fn tree(&self) -> Vec<WbsNodeWithChildren> {
        let index = self.children_index();
        index
            .get(&None::<&str>)
            .map(|roots| {
                roots
                    .iter()
                    .map(|root| assemble(&root.node, &index))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Reparent and/or reposition a node.
    ///
    /// The node takes `new_position` under `new_parent_id` (`None` makes it a
    /// root). Every other sibling at or after that slot shifts down by one;
    /// earlier siblings are untouched and positions are never compacted. The
    /// node's `level` is re-derived from the new parent (0 if it is missing or
    /// unknown) and its descendants follow. Returns `false` if `id` is unknown.
    pub fn move_node(&mut self, id: &str, new_parent_id: Option<&str>, new_position: u32) -> bool {
        if !self.contains(id) {
            return false;
        }
        let new_parent_id = new_parent_id.filter(|parent| !parent.is_empty());

        for entry in self.nodes.values_mut() {
            let node = &mut entry.node;
            if node.id == id {
                node.parent_id = new_parent_id.map(str::to_owned);
                node.position = new_position;
            } else if node.parent_key() == new_parent_id && node.position >= new_position {
                node.position = node.position.saturating_add(1);
            }
        }

        self.relevel_subtree(id);
        true
    }

    /// Level a child of `parent_id` must have
    pub fn derived_level(&self, parent_id: Option<&str>) -> u32 {
        parent_id
            .and_then(|parent| self.get(parent))
            .map_or(0, |parent| parent.level.saturating_add(1))
    }

    /// Recompute `level` for `id` from its parent, then for every descendant
    pub fn relevel_subtree(&mut self, id: &str) {
        for member in self.subtree_ids(id) {
            let level = {
                let parent = self.get(&member).and_then(WbsNode::parent_key);
                self.derived_level(parent)
            };
            if let Some(entry) = self.nodes.get_mut(&member) {
                entry.node.level = level;
            }
        }
    }

    /// Whether `ancestor_id` appears on the parent chain of `node_id`
    pub fn is_ancestor(&self, ancestor_id: &str, node_id: &str) -> bool {
        let mut visited = HashSet::new();
        let mut current = self.get(node_id).and_then(WbsNode::parent_key);
        while let Some(parent) = current {
            if parent == ancestor_id {
                return true;
            }
            if !visited.insert(parent) {
                return false;
            }
            current = self.get(parent).and_then(WbsNode::parent_key);
        }
        false
    }
}

fn assemble(node: &WbsNode, index: &ChildIndex<'_>) -> WbsNodeWithChildren {
    let children = index
        .get(&Some(node.id.as_str()))
        .map(|children| {
            children
                .iter()
                .map(|child| assemble(&child.node, index))
                .collect()
        })
        .unwrap_or_default();

    WbsNodeWithChildren {
        node: node.clone(),
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(id: &str, parent: Option<&str>, position: u32, level: u32) -> WbsNode {
        let mut attrs = NewWbsNode::new(format!("Task {id}")).with_level(level);
        attrs.parent_id = parent.map(str::to_owned);
        attrs.position = Some(position);
        attrs.into_node(id.to_string())
    }

    fn child_ids(store: &WbsStore, parent: Option<&str>) -> Vec<String> {
        store
            .children(parent)
            .into_iter()
            .map(|n| n.id)
            .collect()
    }

    /// root → a, b; a → a1; b → b1
    fn five_node_store() -> WbsStore {
        WbsStore::with_nodes(vec![
            node("root", None, 0, 0),
            node("a", Some("root"), 0, 1),
            node("b", Some("root"), 1, 1),
            node("a1", Some("a"), 0, 2),
            node("b1", Some("b"), 0, 2),
        ])
    }

    #[test]
    fn test_create_then_get_returns_attributes_with_defaults() {
        let mut store = WbsStore::new();
        let attrs = NewWbsNode::new("Integration")
            .with_parent("development", 2)
            .with_level(2)
            .with_responsible("Integration Team")
            .with_metadata("color", json!("green"));

        let created = store.create(attrs.clone());
        let fetched = store.get(&created.id).cloned().unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched, attrs.into_node(created.id.clone()));
        assert!(fetched.expanded);
        assert!(fetched.description.is_none());
        assert!(!fetched.id.is_empty());
    }

    #[test]
    fn test_create_generates_unique_ids() {
        let mut store = WbsStore::new();
        let first = store.create(NewWbsNode::new("One"));
        let second = store.create(NewWbsNode::new("Two"));

        assert_ne!(first.id, second.id);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_create_does_not_derive_level_or_check_parent() {
        let mut store = WbsStore::new();
        let created = store.create(NewWbsNode::new("Orphan").with_parent("missing", 0));

        assert_eq!(created.level, 0);
        assert_eq!(created.parent_id.as_deref(), Some("missing"));
    }

    #[test]
    fn test_get_unknown_is_none() {
        let store = WbsStore::sample();
        assert!(store.get("does-not-exist").is_none());
    }

    #[test]
    fn test_list_returns_every_node_in_insertion_order() {
        let store = five_node_store();
        let ids: Vec<String> = store.list().into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec!["root", "a", "b", "a1", "b1"]);
    }

    #[test]
    fn test_update_applies_partial_fields() {
        let mut store = five_node_store();
        let update = WbsNodeUpdate::new().with_name("Renamed").with_expanded(false);

        let updated = store.update("a", update).unwrap();

        assert_eq!(updated.name, "Renamed");
        assert!(!updated.expanded);
        assert_eq!(updated.parent_id.as_deref(), Some("root"));
        assert_eq!(store.get("a"), Some(&updated));
    }

    #[test]
    fn test_update_unknown_is_none() {
        let mut store = five_node_store();
        assert!(store.update("ghost", WbsNodeUpdate::new().with_name("x")).is_none());
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_empty_update_leaves_node_unchanged() {
        let mut store = WbsStore::sample();
        let before = store.get("design").cloned().unwrap();

        let after = store.update("design", WbsNodeUpdate::new()).unwrap();

        assert_eq!(after, before);
        assert_eq!(
            serde_json::to_vec(&after).unwrap(),
            serde_json::to_vec(&before).unwrap()
        );
    }

    #[test]
    fn test_update_parent_does_not_relevel() {
        let mut store = five_node_store();
        let updated = store
            .update("a1", WbsNodeUpdate::new().with_parent_id(None))
            .unwrap();

        assert!(updated.is_root());
        assert_eq!(updated.level, 2);
    }

    #[test]
    fn test_delete_removes_whole_subtree() {
        let mut store = five_node_store();

        assert!(store.delete("root"));
        assert!(store.list().is_empty());
        for id in ["root", "a", "b", "a1", "b1"] {
            assert!(store.get(id).is_none());
        }
    }

    #[test]
    fn test_delete_counts_descendants_plus_one() {
        let mut store = WbsStore::sample();
        let before = store.len();
        let descendants = store.subtree_ids("development").len() - 1;

        let removed = store.remove_subtree("development");

        assert_eq!(descendants, 3);
        assert_eq!(removed.len(), descendants + 1);
        assert_eq!(store.len(), before - removed.len());
        assert!(store.list().iter().all(|n| n.parent_key() != Some("development")));
    }

    #[test]
    fn test_delete_unknown_returns_false() {
        let mut store = five_node_store();
        assert!(!store.delete("ghost"));
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_delete_leaf_keeps_siblings() {
        let mut store = five_node_store();
        assert!(store.delete("a1"));
        assert_eq!(store.len(), 4);
        assert!(store.get("a").is_some());
    }

    #[test]
    fn test_tree_orders_roots_and_children_by_position() {
        let store = WbsStore::with_nodes(vec![
            node("second-root", None, 1, 0),
            node("first-root", None, 0, 0),
            node("c2", Some("first-root"), 2, 1),
            node("c0", Some("first-root"), 0, 1),
            node("c1", Some("first-root"), 1, 1),
        ]);

        let tree = store.tree();

        let roots: Vec<&str> = tree.iter().map(|t| t.node.id.as_str()).collect();
        assert_eq!(roots, vec!["first-root", "second-root"]);
        let children: Vec<&str> = tree[0]
            .children
            .iter()
            .map(|t| t.node.id.as_str())
            .collect();
        assert_eq!(children, vec!["c0", "c1", "c2"]);
        assert!(tree[1].children.is_empty());
    }

    #[test]
    fn test_tree_flattened_matches_reachable_nodes() {
        let mut store = WbsStore::sample();
        store.create(NewWbsNode::new("Dangling").with_parent("nowhere", 0));

        let tree_ids: Vec<String> = store
            .tree()
            .iter()
            .flat_map(|root| root.flatten())
            .map(|n| n.id.clone())
            .collect();
        let unique: HashSet<&String> = tree_ids.iter().collect();

        assert_eq!(unique.len(), tree_ids.len());
        assert_eq!(tree_ids.len(), store.len() - 1);
        let reachable: HashSet<String> = store
            .list()
            .into_iter()
            .filter(|n| n.parent_key() != Some("nowhere"))
            .map(|n| n.id)
            .collect();
        assert_eq!(tree_ids.into_iter().collect::<HashSet<_>>(), reachable);
    }

    #[test]
    fn test_tree_shows_duplicate_positions_in_insertion_order() {
        let mut store = WbsStore::with_nodes(vec![
            node("R", None, 0, 0),
            node("A", Some("R"), 0, 1),
        ]);
        let b = store.create(NewWbsNode::new("B").with_parent("R", 0).with_level(1));

        let tree = store.tree();

        assert_eq!(tree.len(), 1);
        let children = &tree[0].children;
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].node.id, "A");
        assert_eq!(children[1].node.id, b.id);
        assert_eq!(children[0].node.position, 0);
        assert_eq!(children[1].node.position, 0);
    }

    #[test]
    fn test_tree_does_not_mutate_store() {
        let store = WbsStore::sample();
        let before = store.list();
        let _ = store.tree();
        assert_eq!(store.list(), before);
    }

    #[test]
    fn test_move_inserts_and_shifts_following_siblings() {
        let mut store = WbsStore::with_nodes(vec![
            node("P", None, 0, 0),
            node("c0", Some("P"), 0, 1),
            node("c1", Some("P"), 1, 1),
            node("c2", Some("P"), 2, 1),
            node("x", None, 1, 0),
        ]);

        assert!(store.move_node("x", Some("P"), 1));

        assert_eq!(child_ids(&store, Some("P")), vec!["c0", "x", "c1", "c2"]);
        assert_eq!(store.get("c0").unwrap().position, 0);
        assert_eq!(store.get("c1").unwrap().position, 2);
        assert_eq!(store.get("c2").unwrap().position, 3);
        let moved = store.get("x").unwrap();
        assert_eq!(moved.position, 1);
        assert_eq!(moved.level, 1);
        assert_eq!(moved.parent_id.as_deref(), Some("P"));
    }

    #[test]
    fn test_move_past_end_lands_last() {
        let mut store = five_node_store();

        assert!(store.move_node("b1", Some("root"), 5));

        let children = child_ids(&store, Some("root"));
        assert_eq!(children, vec!["a", "b", "b1"]);
        assert_eq!(store.get("a").unwrap().position, 0);
        assert_eq!(store.get("b").unwrap().position, 1);
    }

    #[test]
    fn test_move_to_root_resets_level() {
        let mut store = five_node_store();

        assert!(store.move_node("a", None, 0));

        let moved = store.get("a").unwrap();
        assert!(moved.is_root());
        assert_eq!(moved.level, 0);
        assert_eq!(store.get("a1").unwrap().level, 1);
        // the old root shifted to make room
        assert_eq!(store.get("root").unwrap().position, 1);
        assert_eq!(child_ids(&store, None), vec!["a", "root"]);
    }

    #[test]
    fn test_move_relevels_descendants() {
        let mut store = five_node_store();

        assert!(store.move_node("a", Some("b1"), 0));

        assert_eq!(store.get("a").unwrap().level, 3);
        assert_eq!(store.get("a1").unwrap().level, 4);
    }

    #[test]
    fn test_move_under_unknown_parent_sets_level_zero() {
        let mut store = five_node_store();

        assert!(store.move_node("a1", Some("ghost"), 0));

        let moved = store.get("a1").unwrap();
        assert_eq!(moved.parent_id.as_deref(), Some("ghost"));
        assert_eq!(moved.level, 0);
    }

    #[test]
    fn test_move_unknown_returns_false() {
        let mut store = five_node_store();
        let before = store.list();

        assert!(!store.move_node("ghost", Some("root"), 0));
        assert_eq!(store.list(), before);
    }

    #[test]
    fn test_move_within_same_parent() {
        let mut store = WbsStore::sample();

        assert!(store.move_node("deployment", Some("root"), 0));

        let order = child_ids(&store, Some("root"));
        assert_eq!(order, vec!["deployment", "planning", "development", "testing"]);
        assert_eq!(store.get("testing").unwrap().position, 3);
    }

    #[test]
    fn test_move_into_own_subtree_detaches_without_hanging() {
        let mut store = five_node_store();

        assert!(store.move_node("a", Some("a1"), 0));

        assert!(store.is_ancestor("a", "a1"));
        assert!(store.is_ancestor("a1", "a"));
        let tree_ids: Vec<String> = store
            .tree()
            .iter()
            .flat_map(|t| t.flatten())
            .map(|n| n.id.clone())
            .collect();
        assert_eq!(tree_ids, vec!["root", "b", "b1"]);

        assert!(store.delete("a"));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_is_ancestor() {
        let store = five_node_store();
        assert!(store.is_ancestor("root", "a1"));
        assert!(store.is_ancestor("a", "a1"));
        assert!(!store.is_ancestor("b", "a1"));
        assert!(!store.is_ancestor("a1", "a1"));
    }

    #[test]
    fn test_children_of_empty_parent_are_roots() {
        let store = five_node_store();
        assert_eq!(child_ids(&store, Some("")), vec!["root"]);
        assert!(child_ids(&store, Some("a1")).is_empty());
    }
}
