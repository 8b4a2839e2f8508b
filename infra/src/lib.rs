//! # PassVault Infrastructure
//!
//! Concrete storage implementations for the token lifecycle core.

pub mod database;

pub use database::mysql::MySqlTokenStore;
