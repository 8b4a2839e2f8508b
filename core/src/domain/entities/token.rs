//! Token entities for the authentication lifecycle.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Token type reported to clients alongside an access token
pub const BEARER_TOKEN_TYPE: &str = "Bearer";

/// Claims structure signed inside an access token
///
/// Access tokens are stateless: they are never stored server-side and are
/// verified purely by signature and claim checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Issued at timestamp (unix seconds)
    pub iat: i64,

    /// Expiration timestamp (unix seconds)
    pub exp: i64,

    /// Unique identifier for this token
    pub jti: String,
}

impl Claims {
    /// Creates claims for an access token issued at `now` with the given
    /// lifetime
    pub fn new_access_token(user_id: Uuid, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Parses the subject claim back into a user ID
    pub fn user_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }
}

/// Observable state of a refresh token record at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    /// Exists and is not revoked, but its not-before window has not opened
    ActiveLocked,
    /// Usable for rotation: `not_before <= now < expires_at`, not revoked
    ActiveUsable,
    /// Past `expires_at` without having been revoked
    Expired,
    /// Terminal; a revoked token never becomes active again
    Revoked,
}

/// Refresh token record persisted by the token store
///
/// The `token_id` is both the bearer secret handed to the client and the
/// primary lookup key. At most one non-revoked record may exist per
/// `session_key`; the store enforces this together with the lifecycle's
/// rotation protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    /// Opaque unique identifier, uppercase hex of a random 256-bit value
    pub token_id: String,

    /// Owning HTTP session
    pub session_key: String,

    /// Owning principal
    pub user_id: Uuid,

    /// Timestamp when the token was issued
    pub issued_at: DateTime<Utc>,

    /// Timestamp when the token expires
    pub expires_at: DateTime<Utc>,

    /// Earliest instant the token may be used for rotation
    pub not_before: DateTime<Utc>,

    /// Whether the token has been revoked (terminal once set)
    pub revoked: bool,

    /// Instant at which `revoked` flipped true
    pub revoked_at: Option<DateTime<Utc>>,

    /// Token id of the record that superseded this one at rotation
    pub replaced_by: Option<String>,

    /// Coarse device/browser descriptor captured after issuance
    pub client_info: Option<String>,

    /// Client IP captured after issuance
    pub client_ip: Option<String>,
}

impl RefreshTokenRecord {
    /// Creates a new active record issued at `now`
    ///
    /// `ttl` and `nbf_offset` are both measured from `now`; the usable
    /// window is `[now + nbf_offset, now + ttl)`.
    pub fn new(
        token_id: String,
        session_key: String,
        user_id: Uuid,
        now: DateTime<Utc>,
        ttl: Duration,
        nbf_offset: Duration,
    ) -> Self {
        Self {
            token_id,
            session_key,
            user_id,
            issued_at: now,
            expires_at: now + ttl,
            not_before: now + nbf_offset,
            revoked: false,
            revoked_at: None,
            replaced_by: None,
            client_info: None,
            client_ip: None,
        }
    }

    /// Checks whether the token has passed its expiry
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Checks whether the not-before window is still closed
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        now < self.not_before
    }

    /// Returns the state of this record as observed at `now`
    pub fn state(&self, now: DateTime<Utc>) -> TokenState {
        if self.revoked {
            TokenState::Revoked
        } else if self.is_expired(now) {
            TokenState::Expired
        } else if self.is_locked(now) {
            TokenState::ActiveLocked
        } else {
            TokenState::ActiveUsable
        }
    }

    /// Marks the record revoked at `now`, noting the replacement if any
    ///
    /// A no-op on already-revoked records: revocation is terminal and the
    /// original `revoked_at`/`replaced_by` are preserved.
    pub fn revoke(&mut self, now: DateTime<Utc>, replaced_by: Option<String>) {
        if self.revoked {
            return;
        }
        self.revoked = true;
        self.revoked_at = Some(now);
        self.replaced_by = replaced_by;
    }
}

/// Credentials returned to the client after login or refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedTokens {
    /// Signed access token
    pub access_token: String,

    /// Refresh token identifier (set as an http-only cookie by the view layer)
    pub refresh_token_id: String,

    /// Expiry of the refresh token, for the cookie lifetime
    pub refresh_expires_at: DateTime<Utc>,

    /// Access token lifetime in seconds
    pub expires_in: i64,

    /// Always `"Bearer"`
    pub token_type: String,
}
