//! In-memory user CRUD API with a uniform JSON envelope.
//!
//! Every request, successful or not, is answered with one of two shapes:
//!
//! ```text
//! success: {"status": "success", "message": "...", "data": ...}
//! error:   {"code": 404, "message": "resource not found", "details": "...",
//!           "timestamp": "...", "path": "...", "method": "..."}
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Failure taxonomy and bootstrap errors
//! - [`store`]: In-memory user store
//! - [`api`]: Route table, handlers, envelopes and the capture boundary
//! - [`metrics`]: Request metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod store;
pub mod utils;

pub use config::Config;
pub use error::{ApiError, AppError, Result};
