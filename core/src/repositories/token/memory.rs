//! In-memory implementation of the token store
//!
//! Reference implementation keyed by `token_id`. Every mutation runs under
//! one write lock, which gives it the per-operation atomicity the trait
//! requires. Used by the core test suite and suitable for single-process
//! deployments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::token::RefreshTokenRecord;
use crate::errors::StoreError;

use super::r#trait::TokenStore;

/// In-memory token store
#[derive(Default)]
pub struct InMemoryTokenStore {
    records: Arc<RwLock<HashMap<String, RefreshTokenRecord>>>,
}

impl InMemoryTokenStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held, revoked ones included
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Count of non-revoked records for a session
    ///
    /// Test helper for asserting the single-active-token invariant.
    pub async fn active_count_for_session(&self, session_key: &str) -> usize {
        self.records
            .read()
            .await
            .values()
            .filter(|r| r.session_key == session_key && !r.revoked)
            .count()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn create(&self, record: RefreshTokenRecord) -> Result<RefreshTokenRecord, StoreError> {
        let mut records = self.records.write().await;

        if records.contains_key(&record.token_id) {
            return Err(StoreError::DuplicateTokenId);
        }

        records.insert(record.token_id.clone(), record.clone());
        Ok(record)
    }

    async fn get_by_token_id(
        &self,
        token_id: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records.get(token_id).cloned())
    }

    async fn get_active_by_session(
        &self,
        session_key: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|r| r.session_key == session_key && !r.revoked)
            .max_by_key(|r| r.issued_at)
            .cloned())
    }

    async fn revoke_by_session(
        &self,
        session_key: &str,
        token_id: Option<&str>,
        replaced_by: Option<&str>,
        revoked_at: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        let mut records = self.records.write().await;
        let mut count = 0;

        for record in records.values_mut() {
            if record.session_key != session_key || record.revoked {
                continue;
            }
            if let Some(token_id) = token_id {
                if record.token_id != token_id {
                    continue;
                }
            }
            record.revoke(revoked_at, replaced_by.map(str::to_string));
            count += 1;
        }

        Ok(count)
    }

    async fn update_client_info(
        &self,
        token_id: &str,
        client_info: &str,
        client_ip: &str,
    ) -> Result<bool, StoreError> {
        let mut records = self.records.write().await;

        match records.get_mut(token_id) {
            Some(record) => {
                record.client_info = Some(client_info.to_string());
                record.client_ip = Some(client_ip.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn revoke_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut records = self.records.write().await;
        let mut count = 0;

        for record in records.values_mut() {
            if !record.revoked && record.is_expired(now) {
                record.revoke(now, None);
                count += 1;
            }
        }

        Ok(count)
    }

    async fn delete_revoked(&self) -> Result<usize, StoreError> {
        let mut records = self.records.write().await;
        let before = records.len();

        records.retain(|_, record| !record.revoked);

        Ok(before - records.len())
    }
}
