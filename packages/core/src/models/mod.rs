//! Data Models
//!
//! This module contains the data structures shared by the store, the service
//! layer and the HTTP surface:
//!
//! - `WbsNode` - One task in the breakdown
//! - `NewWbsNode` / `WbsNodeUpdate` - Create and PATCH payloads
//! - `WbsNodeWithChildren` - Nested projection returned by tree reads

mod node;

pub use node::{Metadata, NewWbsNode, ValidationError, WbsNode, WbsNodeUpdate, WbsNodeWithChildren};
