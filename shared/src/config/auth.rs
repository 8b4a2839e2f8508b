//! Token lifecycle configuration

use serde::{Deserialize, Serialize};

/// Default access token lifetime: 15 minutes.
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: i64 = 60 * 15;

/// Default refresh token lifetime: 15 days.
pub const DEFAULT_REFRESH_TOKEN_TTL_SECS: i64 = 60 * 60 * 24 * 15;

/// Configuration for token issuance and rotation
///
/// The not-before offset delays refresh token usability so that a freshly
/// issued refresh token cannot be redeemed until its sibling access token
/// is close to expiry. By default the window opens 30 seconds before the
/// access token expires.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenConfig {
    /// Access token lifetime in seconds
    pub access_token_ttl_secs: i64,

    /// Refresh token lifetime in seconds
    pub refresh_token_ttl_secs: i64,

    /// Seconds after issuance before a refresh token becomes usable
    pub refresh_nbf_offset_secs: i64,

    /// Path to the PEM-encoded ECDSA P-256 private key (signing)
    pub private_key_path: String,

    /// Path to the PEM-encoded ECDSA P-256 public key (verification)
    pub public_key_path: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_token_ttl_secs: DEFAULT_ACCESS_TOKEN_TTL_SECS,
            refresh_token_ttl_secs: DEFAULT_REFRESH_TOKEN_TTL_SECS,
            refresh_nbf_offset_secs: DEFAULT_ACCESS_TOKEN_TTL_SECS - 30,
            private_key_path: "keys/jwt_private_key.pem".to_string(),
            public_key_path: "keys/jwt_public_key.pem".to_string(),
        }
    }
}

impl TokenConfig {
    /// Creates a configuration from environment variables
    ///
    /// Reads `ACCESS_TOKEN_TTL`, `REFRESH_TOKEN_TTL`, `REFRESH_NBF_OFFSET`
    /// (all in seconds), `JWT_PRIVATE_KEY_PATH` and `JWT_PUBLIC_KEY_PATH`.
    /// Unset or unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let access_token_ttl_secs = read_secs("ACCESS_TOKEN_TTL")
            .unwrap_or(defaults.access_token_ttl_secs);

        Self {
            access_token_ttl_secs,
            refresh_token_ttl_secs: read_secs("REFRESH_TOKEN_TTL")
                .unwrap_or(defaults.refresh_token_ttl_secs),
            // The nbf offset tracks the configured access TTL unless
            // explicitly overridden.
            refresh_nbf_offset_secs: read_secs("REFRESH_NBF_OFFSET")
                .unwrap_or(access_token_ttl_secs - 30),
            private_key_path: std::env::var("JWT_PRIVATE_KEY_PATH")
                .unwrap_or(defaults.private_key_path),
            public_key_path: std::env::var("JWT_PUBLIC_KEY_PATH")
                .unwrap_or(defaults.public_key_path),
        }
    }

    /// Sets the access token lifetime in seconds
    pub fn with_access_ttl_secs(mut self, secs: i64) -> Self {
        self.access_token_ttl_secs = secs;
        self
    }

    /// Sets the refresh token lifetime in seconds
    pub fn with_refresh_ttl_secs(mut self, secs: i64) -> Self {
        self.refresh_token_ttl_secs = secs;
        self
    }

    /// Sets the not-before offset in seconds
    pub fn with_nbf_offset_secs(mut self, secs: i64) -> Self {
        self.refresh_nbf_offset_secs = secs;
        self
    }
}

fn read_secs(var: &str) -> Option<i64> {
    std::env::var(var).ok()?.parse().ok()
}
