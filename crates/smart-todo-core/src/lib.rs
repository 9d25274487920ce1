//! # smart-todo-core
//!
//! Core types, traits, and abstractions for the smart-todo backend.
//!
//! This crate provides the domain models, repository and generation
//! backend traits, the shared error type, default constants and the
//! structured logging field names that the other crates depend on.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
