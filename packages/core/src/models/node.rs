//! WBS Node Data Structures
//!
//! This module defines the `WbsNode` struct (one task in a work breakdown
//! structure) and the request shapes used to create and patch it.
//!
//! # Architecture
//!
//! - **Flat storage**: nodes reference their parent by id (`parent_id`)
//! - **Sibling ordering**: `position` orders nodes sharing the same parent
//! - **Cached depth**: `level` is `parent.level + 1`, or 0 for a root
//! - **Presentation state**: `expanded` travels with the node but carries no
//!   structural meaning
//!
//! # Examples
//!
//! ```rust
//! use wbs_core::models::{NewWbsNode, WbsNodeUpdate};
//!
//! // A root task with defaults for everything but the name
//! let root = NewWbsNode::new("Software Development Project");
//!
//! // A child task placed second among its siblings
//! let child = NewWbsNode::new("Backend Dev")
//!     .with_parent("development", 1)
//!     .with_level(2);
//!
//! // Rename a task and clear its owner
//! let update = WbsNodeUpdate {
//!     name: Some("Backend".to_string()),
//!     responsible: Some(None),
//!     ..Default::default()
//! };
//! # let _ = (root, child, update);
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Free-form key/value bag attached to every node
pub type Metadata = HashMap<String, serde_json::Value>;

/// Validation errors for node payloads
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// One task in a work breakdown structure.
///
/// # Fields
///
/// - `id`: Unique identifier, immutable after creation
/// - `name`: Display label
/// - `description`, `duration`, `effort`, `responsible`: Optional free text
/// - `parent_id`: Parent task, `None` for a root
/// - `position`: Order among siblings (ascending)
/// - `level`: Cached depth, root = 0
/// - `expanded`: UI collapse state
/// - `metadata`: Arbitrary JSON attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WbsNode {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub duration: Option<String>,
    pub effort: Option<String>,
    pub responsible: Option<String>,
    pub parent_id: Option<String>,
    pub position: u32,
    pub expanded: bool,
    pub level: u32,
    #[serde(default)]
    pub metadata: Metadata,
}

impl WbsNode {
    /// Parent id used for hierarchy lookups.
    ///
    /// An empty string is treated like a missing parent, so such a node is a root.
    pub fn parent_key(&self) -> Option<&str> {
        self.parent_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Whether this node has no parent
    pub fn is_root(&self) -> bool {
        self.parent_key().is_none()
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Attributes accepted when creating a node.
///
/// Only `name` is required. Omitted fields get their defaults when the node is
/// materialized: no parent, position 0, level 0, expanded, empty metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWbsNode {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub effort: Option<String>,
    #[serde(default)]
    pub responsible: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_non_null")]
    pub position: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_non_null")]
    pub expanded: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_non_null")]
    pub level: Option<u32>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

impl NewWbsNode {
    /// Create attributes for a root-level task with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Place the task under `parent_id` at `position`
    pub fn with_parent(mut self, parent_id: impl Into<String>, position: u32) -> Self {
        self.parent_id = Some(parent_id.into());
        self.position = Some(position);
        self
    }

    /// Set the cached depth
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_responsible(mut self, responsible: impl Into<String>) -> Self {
        self.responsible = Some(responsible.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata
            .get_or_insert_with(Metadata::new)
            .insert(key.into(), value);
        self
    }

    /// Check the payload before it reaches the store
    pub fn validate(&self) -> Result<(), ValidationError> {
        if is_blank(&self.name) {
            return Err(ValidationError::MissingField("name".to_string()));
        }
        Ok(())
    }

    /// Materialize a node with the given id, applying defaults for omitted fields
    pub fn into_node(self, id: String) -> WbsNode {
        WbsNode {
            id,
            name: self.name,
            description: self.description,
            duration: self.duration,
            effort: self.effort,
            responsible: self.responsible,
            parent_id: self.parent_id,
            position: self.position.unwrap_or(0),
            expanded: self.expanded.unwrap_or(true),
            level: self.level.unwrap_or(0),
            metadata: self.metadata.unwrap_or_default(),
        }
    }
}

/// Custom deserializer for nullable fields in a PATCH body
///
/// Maps the three JSON shapes onto the double-Option pattern:
/// - Missing field → None (don't update)
/// - null → Some(None) (clear)
/// - "value" → Some(Some("value")) (set)
fn deserialize_optional_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::<T>::deserialize(deserializer)?))
}

/// Custom deserializer for optional fields that cannot be cleared
///
/// - Missing field → None (via `#[serde(default)]`)
/// - null → error
/// - value → Some(value)
fn deserialize_non_null<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Partial node update for PATCH operations
///
/// Every mutable attribute is optional; only the provided ones are applied.
/// The `id` cannot be changed.
///
/// # Double-Option Pattern for Nullable Fields
///
/// `description`, `duration`, `effort`, `responsible`, `parent_id` and
/// `metadata` distinguish three states:
///
/// - `None`: Leave the field alone
/// - `Some(None)`: Clear it (metadata becomes empty)
/// - `Some(Some(value))`: Set it
///
/// `name`, `position`, `expanded` and `level` can only be omitted or set; a
/// `null` for any of them fails deserialization.
///
/// Changing `parent_id` here does not touch `level` or sibling positions;
/// `WbsStore::move_node` is the operation that keeps those consistent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WbsNodeUpdate {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_non_null"
    )]
    pub name: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub description: Option<Option<String>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub duration: Option<Option<String>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub effort: Option<Option<String>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub responsible: Option<Option<String>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub parent_id: Option<Option<String>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_non_null"
    )]
    pub position: Option<u32>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_non_null"
    )]
    pub expanded: Option<bool>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_non_null"
    )]
    pub level: Option<u32>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub metadata: Option<Option<Metadata>>,
}

impl WbsNodeUpdate {
    /// Create a new empty update
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_expanded(mut self, expanded: bool) -> Self {
        self.expanded = Some(expanded);
        self
    }

    /// Set (`Some`) or clear (`None`) the parent reference
    pub fn with_parent_id(mut self, parent_id: Option<String>) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Check if update contains any changes
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.duration.is_none()
            && self.effort.is_none()
            && self.responsible.is_none()
            && self.parent_id.is_none()
            && self.position.is_none()
            && self.expanded.is_none()
            && self.level.is_none()
            && self.metadata.is_none()
    }

    /// Whether applying this update would touch the node's place in the hierarchy
    pub fn touches_hierarchy(&self) -> bool {
        self.parent_id.is_some() || self.level.is_some()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.as_deref().is_some_and(is_blank) {
            return Err(ValidationError::MissingField("name".to_string()));
        }
        Ok(())
    }

    /// Apply the provided fields to `node`, leaving the others unchanged
    pub fn apply_to(self, node: &mut WbsNode) {
        if let Some(name) = self.name {
            node.name = name;
        }
        if let Some(description) = self.description {
            node.description = description;
        }
        if let Some(duration) = self.duration {
            node.duration = duration;
        }
        if let Some(effort) = self.effort {
            node.effort = effort;
        }
        if let Some(responsible) = self.responsible {
            node.responsible = responsible;
        }
        if let Some(parent_id) = self.parent_id {
            node.parent_id = parent_id;
        }
        if let Some(position) = self.position {
            node.position = position;
        }
        if let Some(expanded) = self.expanded {
            node.expanded = expanded;
        }
        if let Some(level) = self.level {
            node.level = level;
        }
        if let Some(metadata) = self.metadata {
            node.metadata = metadata.unwrap_or_default();
        }
    }
}

/// A node together with its ordered children, as returned by `WbsStore::tree`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WbsNodeWithChildren {
    #[serde(flatten)]
    pub node: WbsNode,
    pub children: Vec<WbsNodeWithChildren>,
}

impl WbsNodeWithChildren {
    /// Depth-first, pre-order walk over this node and every descendant
    pub fn flatten(&self) -> Vec<&WbsNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(current) = stack.pop() {
            out.push(&current.node);
            stack.extend(current.children.iter().rev());
        }
        out
    }
}
