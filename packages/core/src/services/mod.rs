//! Business Services
//!
//! - `WbsService` - shared, serialized access to one `WbsStore`, with optional
//!   strict hierarchy checks
//!
//! The request layer talks to the service only; the service is the single
//! owner of node state.

pub mod error;
mod wbs_service;

pub use error::WbsServiceError;
pub use wbs_service::WbsService;
