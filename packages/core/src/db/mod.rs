//! Storage Layer
//!
//! This module holds the in-memory node collection and its hierarchy
//! algorithms:
//!
//! - `WbsStore` - flat node map with tree projection, cascading delete and move
//! - `seed` - the sample project loaded on startup
//!
//! # Architecture
//!
//! Nothing is persisted. A process starts from either an empty store or the
//! sample project and keeps all state in memory until it exits.

pub mod seed;
mod wbs_store;

pub use wbs_store::WbsStore;
