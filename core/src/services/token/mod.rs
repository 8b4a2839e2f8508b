//! Token service module
//!
//! This module handles all token-related operations:
//! - Access token signing and verification (ES256)
//! - Refresh token issuance, rotation and revocation
//! - Background cleanup of expired and revoked refresh tokens

mod cleanup;
mod service;
mod signer;

#[cfg(test)]
mod tests;

pub use cleanup::{CleanupOutcome, TokenCleanupConfig, TokenCleanupService};
pub use service::TokenLifecycle;
pub use signer::Signer;
