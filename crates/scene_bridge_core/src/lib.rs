//! Scene Bridge Core
//!
//! A reusable async library for talking to a scene server over its JSON/HTTP API.
//! Provides structured config, error handling, and one module per operation for
//! creating entities, attaching components and removing them again.

pub mod config;
pub mod error;
pub mod client;
pub mod ops;
pub mod types;

// Re-export commonly used types
pub use config::SceneConfig;
pub use error::SceneError;
pub use client::SceneClient;

/// Result type alias using SceneError
pub type Result<T> = std::result::Result<T, SceneError>;
