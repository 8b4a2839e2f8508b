//! Token store trait defining the interface for refresh token persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::token::RefreshTokenRecord;
use crate::errors::StoreError;

/// Storage interface for [`RefreshTokenRecord`] persistence
///
/// The lifecycle is storage-agnostic: a relational table, a document store
/// or an in-memory map all work as long as `token_id` lookups are unique
/// and the mutations below are individually atomic.
///
/// # Concurrency contract
///
/// [`revoke_by_session`](TokenStore::revoke_by_session) must only flip
/// records whose `revoked` flag is still false, atomically, and report how
/// many records it flipped. The lifecycle uses that count as a
/// compare-and-swap when rotating: of two racing rotations for the same
/// record, exactly one observes a non-zero count.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Insert a new record
    ///
    /// # Returns
    /// * `Ok(RefreshTokenRecord)` - The persisted record
    /// * `Err(StoreError::DuplicateTokenId)` - A record with this
    ///   `token_id` already exists
    async fn create(&self, record: RefreshTokenRecord) -> Result<RefreshTokenRecord, StoreError>;

    /// Look up a record by its token id
    async fn get_by_token_id(
        &self,
        token_id: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError>;

    /// Return the single non-revoked record for a session, if any
    ///
    /// Should a rotation be mid-flight and two non-revoked records briefly
    /// coexist, the most recently issued one is returned.
    async fn get_active_by_session(
        &self,
        session_key: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError>;

    /// Revoke the non-revoked records of a session
    ///
    /// When `token_id` is given the update narrows to that one record
    /// (rotation); otherwise every non-revoked record of the session is
    /// revoked (logout). `replaced_by` is stamped on the flipped records,
    /// and `revoked_at` is set to the supplied instant. Already-revoked
    /// records are never touched.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of records flipped from active to revoked
    async fn revoke_by_session(
        &self,
        session_key: &str,
        token_id: Option<&str>,
        replaced_by: Option<&str>,
        revoked_at: DateTime<Utc>,
    ) -> Result<usize, StoreError>;

    /// One-time attach of client metadata to a record
    ///
    /// Touches only `client_info` and `client_ip`.
    ///
    /// # Returns
    /// * `Ok(true)` - Metadata stored
    /// * `Ok(false)` - No record with this token id
    async fn update_client_info(
        &self,
        token_id: &str,
        client_info: &str,
        client_ip: &str,
    ) -> Result<bool, StoreError>;

    /// Revoke records that expired without ever being revoked
    ///
    /// Housekeeping; keeps the revoked flag authoritative for the sweep
    /// that deletes old records.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of records revoked
    async fn revoke_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError>;

    /// Delete every revoked record
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of records deleted
    async fn delete_revoked(&self) -> Result<usize, StoreError>;
}
