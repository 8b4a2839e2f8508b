//! Repository interfaces and reference implementations

pub mod token;

pub use token::{InMemoryTokenStore, TokenStore};
