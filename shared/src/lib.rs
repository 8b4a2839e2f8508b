//! Shared utilities and common types for the PassVault server
//!
//! This crate provides functionality used across the server crates:
//! - Token lifecycle configuration types
//! - Error response structures with stable machine-readable codes

pub mod config;
pub mod types;

// Re-export commonly used items at crate root
pub use config::TokenConfig;
pub use types::ErrorResponse;
