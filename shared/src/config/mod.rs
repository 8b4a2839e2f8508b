//! Configuration module
//!
//! Configuration is passed explicitly into the services that consume it;
//! there is no process-wide settings singleton.

pub mod auth;

pub use auth::TokenConfig;
