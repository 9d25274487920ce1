//! # smart-todo-api
//!
//! HTTP surface for smart-todo: token auth, task and context CRUD, AI
//! endpoints, and the middleware stack the binary serves them behind.

pub mod auth;
pub mod config;
pub mod error;
pub mod export;
pub mod handlers;
pub mod openapi;
pub mod response;
pub mod router;
pub mod services;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use router::app;
pub use state::AppState;
