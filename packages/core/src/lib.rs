//! WBS Builder Core
//!
//! This crate provides the work breakdown structure (WBS) tree store and the
//! service layer that the HTTP API forwards to.
//!
//! # Architecture
//!
//! - **Flat store, derived tree**: nodes are kept in one map keyed by id and
//!   linked by `parent_id`; the nested view is rebuilt on every read
//! - **Sibling ordering**: `position` orders children, moves shift later siblings
//! - **Cascading delete**: removing a node removes its whole subtree
//! - **In-memory only**: state lives for the lifetime of the process
//!
//! # Modules
//!
//! - [`models`] - Data structures (WbsNode, create/patch payloads, tree view)
//! - [`db`] - `WbsStore` and the sample project
//! - [`services`] - `WbsService`, the shared handle used by request handlers
//! - [`config`] - Service configuration (hierarchy checking mode)

pub mod config;
pub mod db;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use config::{HierarchyMode, ServiceConfig};
pub use db::WbsStore;
pub use models::*;
pub use services::*;
