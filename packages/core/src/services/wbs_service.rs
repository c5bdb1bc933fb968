//! WBS Service
//!
//! `WbsService` is the shared handle the request layer talks to. It owns one
//! `WbsStore` behind an async `RwLock`, so every operation sees the collection
//! exactly as the previous one left it, and applies the configured
//! `HierarchyMode` before forwarding writes to the store.
//!
//! The store is passed in rather than created here, so tests build isolated
//! services and a server builds exactly one at its composition root.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::config::ServiceConfig;
use crate::db::WbsStore;
use crate::models::{NewWbsNode, WbsNode, WbsNodeUpdate, WbsNodeWithChildren};
use crate::services::error::WbsServiceError;

/// Shared access to one work breakdown structure
#[derive(Debug, Clone)]
pub struct WbsService {
    store: Arc<RwLock<WbsStore>>,
    config: ServiceConfig,
}

impl WbsService {
    /// Create a new WbsService owning `store`
    ///
    /// # Examples
    ///
    /// ```rust
    /// use wbs_core::{ServiceConfig, WbsService, WbsStore};
    ///
    /// let service = WbsService::new(WbsStore::sample(), ServiceConfig::default());
    /// # let _ = service;
    /// ```
    pub fn new(store: WbsStore, config: ServiceConfig) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// All nodes, flat
    pub async fn list_nodes(&self) -> Vec<WbsNode> {
        let nodes = self.store.read().await.list();
        debug!("Listed {} nodes", nodes.len());
        nodes
    }

    pub async fn node_count(&self) -> usize {
        self.store.read().await.len()
    }

    /// A single node, without its children
    pub async fn get_node(&self, id: &str) -> Option<WbsNode> {
        self.store.read().await.get(id).cloned()
    }

    /// Direct children of a node, or the roots for `None`, sorted by position
    pub async fn get_children(&self, parent_id: Option<&str>) -> Vec<WbsNode> {
        self.store.read().await.children(parent_id)
    }

    /// Nested projection of the whole breakdown
    pub async fn get_tree(&self) -> Vec<WbsNodeWithChildren> {
        let tree = self.store.read().await.tree();
        debug!("Built tree with {} roots", tree.len());
        tree
    }

    /// Create a node
    ///
    /// # Errors
    ///
    /// In strict mode, returns `InvalidParent` if `parent_id` names an unknown
    /// node. Strict mode also replaces the supplied `level` with the derived one.
    #[instrument(skip(self, attributes), fields(name = %attributes.name))]
    pub async fn create_node(&self, mut attributes: NewWbsNode) -> Result<WbsNode, WbsServiceError> {
        let mut store = self.store.write().await;

        if self.config.hierarchy_mode.is_strict() {
            let parent_id = attributes.parent_id.as_deref().filter(|id| !id.is_empty());
            if let Some(parent_id) = parent_id {
                if !store.contains(parent_id) {
                    warn!("Rejected create under unknown parent {}", parent_id);
                    return Err(WbsServiceError::invalid_parent(parent_id));
                }
            }
            let level = store.derived_level(parent_id);
            attributes.level = Some(level);
        }

        let node = store.create(attributes);
        info!("Created node {} ({})", node.id, node.name);
        Ok(node)
    }

    /// Apply a partial update
    ///
    /// Returns `Ok(None)` if the node does not exist.
    ///
    /// # Errors
    ///
    /// In strict mode, returns `InvalidParent` for an unknown new parent and
    /// `CircularReference` if the new parent is the node or one of its
    /// descendants. A strict-mode update that touches `parent_id` or `level`
    /// re-derives the level of the node and its subtree.
    #[instrument(skip(self, update))]
    pub async fn update_node(
        &self,
        id: &str,
        update: WbsNodeUpdate,
    ) -> Result<Option<WbsNode>, WbsServiceError> {
        let mut store = self.store.write().await;
        if !store.contains(id) {
            debug!("Update for unknown node {}", id);
            return Ok(None);
        }

        let strict = self.config.hierarchy_mode.is_strict();
        if strict {
            if let Some(Some(parent_id)) = update.parent_id.as_ref() {
                check_new_parent(&store, id, parent_id)?;
            }
        }

        let touches_hierarchy = update.touches_hierarchy();
        let mut updated = store.update(id, update);
        if strict && touches_hierarchy {
            store.relevel_subtree(id);
            updated = store.get(id).cloned();
        }

        info!("Updated node {}", id);
        Ok(updated)
    }

    /// Delete a node and its descendants
    ///
    /// Returns `false` if the node did not exist.
    #[instrument(skip(self))]
    pub async fn delete_node(&self, id: &str) -> bool {
        let removed = self.store.write().await.remove_subtree(id);
        if removed.is_empty() {
            debug!("Delete for unknown node {}", id);
            return false;
        }
        info!("Deleted node {} with {} descendants", id, removed.len() - 1);
        true
    }

    /// Reparent and/or reposition a node, shifting the siblings at or after
    /// `new_position` down by one
    ///
    /// Returns `Ok(false)` if the node does not exist.
    ///
    /// # Errors
    ///
    /// In strict mode, returns `InvalidParent` for an unknown new parent and
    /// `CircularReference` when moving a node under itself or a descendant.
    #[instrument(skip(self))]
    pub async fn move_node(
        &self,
        id: &str,
        new_parent_id: Option<&str>,
        new_position: u32,
    ) -> Result<bool, WbsServiceError> {
        let mut store = self.store.write().await;
        if !store.contains(id) {
            debug!("Move for unknown node {}", id);
            return Ok(false);
        }

        if self.config.hierarchy_mode.is_strict() {
            if let Some(parent_id) = new_parent_id {
                check_new_parent(&store, id, parent_id)?;
            }
        }

        let moved = store.move_node(id, new_parent_id, new_position);
        info!(
            "Moved node {} under {} at position {}",
            id,
            new_parent_id.unwrap_or("<root>"),
            new_position
        );
        Ok(moved)
    }
}

/// Strict-mode guard for a node getting `parent_id` as its new parent
fn check_new_parent(store: &WbsStore, id: &str, parent_id: &str) -> Result<(), WbsServiceError> {
    if parent_id.is_empty() {
        return Ok(());
    }
    if !store.contains(parent_id) {
        warn!("Rejected unknown parent {} for node {}", parent_id, id);
        return Err(WbsServiceError::invalid_parent(parent_id));
    }
    if parent_id == id {
        warn!("Rejected node {} as its own parent", id);
        return Err(WbsServiceError::circular_reference(format!(
            "Node {} cannot be its own parent",
            id
        )));
    }
    if store.is_ancestor(id, parent_id) {
        warn!("Rejected cycle: {} under {}", id, parent_id);
        return Err(WbsServiceError::circular_reference(format!(
            "Node {} cannot become a child of its descendant {}",
            id, parent_id
        )));
    }
    Ok(())
}
