//! Service Layer Error Types
//!
//! Errors raised by `WbsService` when a hierarchy check fails. A missing
//! node is not an error: reads return `None` and delete/move return `false`.

use thiserror::Error;

/// Service operation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WbsServiceError {
    /// Referenced parent does not exist
    #[error("Invalid parent node: {parent_id}")]
    InvalidParent { parent_id: String },

    /// Write would make a node its own ancestor
    #[error("Circular reference detected: {context}")]
    CircularReference { context: String },
}

impl WbsServiceError {
    /// Create an invalid parent error
    pub fn invalid_parent(parent_id: impl Into<String>) -> Self {
        Self::InvalidParent {
            parent_id: parent_id.into(),
        }
    }

    /// Create a circular reference error
    pub fn circular_reference(context: impl Into<String>) -> Self {
        Self::CircularReference {
            context: context.into(),
        }
    }
}
