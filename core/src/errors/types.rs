//! Error type definitions for signing, storage and the lifecycle boundary

use pv_shared::ErrorResponse;
use thiserror::Error;

/// Access token verification failures
///
/// Verification fails closed: any parse error that is not explicitly
/// recognized is reported as an invalid signature.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,

    #[error("Token is missing required claim: {claim}")]
    MissingClaim { claim: String },
}

/// Signer construction and minting failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignerError {
    #[error("Failed to load signing key: {message}")]
    KeyLoad { message: String },

    #[error("Failed to sign token: {message}")]
    Signing { message: String },
}

/// Token store failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Refresh token id already exists")]
    DuplicateTokenId,

    #[error("Token store backend error: {message}")]
    Backend { message: String },
}

/// Lifecycle boundary errors observed by the transport layer
///
/// `RevokedOrExpired` deliberately folds the two terminal states together:
/// the client is never told whether a refresh token was expired or revoked.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid refresh token.")]
    InvalidRefreshToken,

    #[error("Too early for token refresh.")]
    TooEarly,

    #[error("Refresh token is revoked or expired.")]
    RevokedOrExpired,

    #[error("Unauthorized.")]
    Unauthorized,

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AuthError {
    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            // All refresh failures share one code so responses do not
            // reveal which precondition rejected the token.
            AuthError::InvalidRefreshToken
            | AuthError::TooEarly
            | AuthError::RevokedOrExpired => "REQUEST_FORBIDDEN",
            AuthError::Unauthorized => "UNAUTHORIZED",
            AuthError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<AuthError> for ErrorResponse {
    fn from(err: AuthError) -> Self {
        ErrorResponse::new(err.code(), err.to_string())
    }
}

impl From<SignerError> for AuthError {
    fn from(err: SignerError) -> Self {
        AuthError::Internal {
            message: err.to_string(),
        }
    }
}
