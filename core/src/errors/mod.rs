//! Error types for the token lifecycle core
//!
//! Lower layers (signer, store) surface their own narrow error enums;
//! [`AuthError`] is the only type that crosses the lifecycle boundary to
//! the transport layer.

mod types;

pub use types::{AuthError, SignerError, StoreError, VerifyError};
