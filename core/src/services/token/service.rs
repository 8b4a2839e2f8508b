//! Token lifecycle state machine
//!
//! Orchestrates access token minting, refresh token issuance and rotation,
//! session revocation and access checks. This is the only boundary the
//! transport layer talks to; store and signer errors never cross it
//! untranslated.

use std::sync::Arc;

use chrono::Duration;
use rand::RngCore;
use tracing::warn;
use uuid::Uuid;

use pv_shared::TokenConfig;

use crate::clock::Clock;
use crate::domain::entities::token::{
    IssuedTokens, RefreshTokenRecord, TokenState, BEARER_TOKEN_TYPE,
};
use crate::errors::{AuthError, StoreError};
use crate::repositories::TokenStore;

use super::signer::Signer;

/// Token lifecycle service
///
/// Holds no mutable state of its own; correctness under concurrent
/// requests rests on the store's per-operation atomicity and the
/// conditional-revoke row count used during rotation.
pub struct TokenLifecycle<S: TokenStore> {
    store: Arc<S>,
    signer: Signer,
    config: TokenConfig,
    clock: Arc<dyn Clock>,
}

impl<S: TokenStore> TokenLifecycle<S> {
    /// Creates a new lifecycle service
    pub fn new(store: Arc<S>, signer: Signer, config: TokenConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            signer,
            config,
            clock,
        }
    }

    /// Issues credentials for a freshly authenticated session
    ///
    /// Called after password verification succeeds. Any refresh token still
    /// active on the session (a previous login that skipped logout) is
    /// revoked before the new one is created, so the session never carries
    /// two active tokens.
    pub async fn login(
        &self,
        user_id: Uuid,
        session_key: &str,
    ) -> Result<IssuedTokens, AuthError> {
        let now = self.clock.now();

        self.store
            .revoke_by_session(session_key, None, None, now)
            .await
            .map_err(store_internal)?;

        let record = self.create_refresh_record(user_id, session_key).await?;
        self.issued_tokens(record)
    }

    /// Exchanges a usable refresh token for fresh credentials
    ///
    /// The old record is revoked with `replaced_by` pointing at its
    /// replacement. Of two rotations racing on the same record, exactly one
    /// wins; the loser observes [`AuthError::RevokedOrExpired`].
    pub async fn refresh(&self, old_refresh_token_id: &str) -> Result<IssuedTokens, AuthError> {
        let old = self
            .store
            .get_by_token_id(old_refresh_token_id)
            .await
            .map_err(store_internal)?
            .ok_or_else(|| {
                warn!("Refresh token could not be found.");
                AuthError::InvalidRefreshToken
            })?;

        match old.state(self.clock.now()) {
            TokenState::ActiveLocked => return Err(AuthError::TooEarly),
            TokenState::Revoked | TokenState::Expired => {
                // Reuse of a terminal token is a strong replay signal.
                warn!(
                    session_key = %old.session_key,
                    "Revoked or expired refresh token presented for rotation."
                );
                return Err(AuthError::RevokedOrExpired);
            }
            TokenState::ActiveUsable => {}
        }

        let new = self
            .create_refresh_record(old.user_id, &old.session_key)
            .await?;

        // Claim the old record. The conditional revoke only touches
        // still-active rows, so a zero count means a concurrent rotation
        // already consumed it and this one lost the race.
        let claimed = self
            .store
            .revoke_by_session(
                &old.session_key,
                Some(&old.token_id),
                Some(&new.token_id),
                self.clock.now(),
            )
            .await
            .map_err(store_internal)?;

        if claimed == 0 {
            self.store
                .revoke_by_session(&old.session_key, Some(&new.token_id), None, self.clock.now())
                .await
                .map_err(store_internal)?;
            warn!(
                session_key = %old.session_key,
                "Lost rotation race; replacement token discarded."
            );
            return Err(AuthError::RevokedOrExpired);
        }

        self.issued_tokens(new)
    }

    /// Revokes every active refresh token of a session
    ///
    /// Idempotent: a session with nothing left to revoke is not an error.
    pub async fn logout(&self, session_key: &str) -> Result<(), AuthError> {
        self.store
            .revoke_by_session(session_key, None, None, self.clock.now())
            .await
            .map_err(store_internal)?;
        Ok(())
    }

    /// Checks an access token and returns the authenticated user
    ///
    /// Purely signature/claim based; the store is never consulted. Revoking
    /// a session therefore does not invalidate access tokens that are
    /// already out, only the ability to mint new ones.
    pub fn authorize(&self, access_token: &str) -> Result<Uuid, AuthError> {
        let claims = self.signer.verify(access_token).map_err(|e| {
            warn!(error = %e, "Access token rejected.");
            AuthError::Unauthorized
        })?;

        claims.user_id().map_err(|_| AuthError::Unauthorized)
    }

    /// Builds and persists a new active refresh record
    ///
    /// An id collision on insert is retried once with a fresh id before
    /// surfacing as fatal.
    async fn create_refresh_record(
        &self,
        user_id: Uuid,
        session_key: &str,
    ) -> Result<RefreshTokenRecord, AuthError> {
        let mut record = self.build_record(user_id, session_key);

        match self.store.create(record.clone()).await {
            Ok(created) => Ok(created),
            Err(StoreError::DuplicateTokenId) => {
                warn!("Refresh token id collision; redrawing.");
                record.token_id = new_token_id();
                self.store.create(record).await.map_err(store_internal)
            }
            Err(e) => Err(store_internal(e)),
        }
    }

    fn build_record(&self, user_id: Uuid, session_key: &str) -> RefreshTokenRecord {
        RefreshTokenRecord::new(
            new_token_id(),
            session_key.to_string(),
            user_id,
            self.clock.now(),
            Duration::seconds(self.config.refresh_token_ttl_secs),
            Duration::seconds(self.config.refresh_nbf_offset_secs),
        )
    }

    fn issued_tokens(&self, record: RefreshTokenRecord) -> Result<IssuedTokens, AuthError> {
        let access_token = self
            .signer
            .mint(
                record.user_id,
                Duration::seconds(self.config.access_token_ttl_secs),
            )
            .map_err(AuthError::from)?;

        Ok(IssuedTokens {
            access_token,
            refresh_token_id: record.token_id,
            refresh_expires_at: record.expires_at,
            expires_in: self.config.access_token_ttl_secs,
            token_type: BEARER_TOKEN_TYPE.to_string(),
        })
    }
}

/// Generates a refresh token id from a random 256-bit value
fn new_token_id() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode_upper(bytes)
}

fn store_internal(err: StoreError) -> AuthError {
    AuthError::Internal {
        message: err.to_string(),
    }
}
