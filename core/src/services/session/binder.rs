//! Best-effort binding of client metadata to the active refresh token
//!
//! Captures a coarse device/browser descriptor and the client IP for audit
//! and forensics. Binding never fails the enclosing login or refresh
//! request: a missing active token (a race with a concurrent revoke) or a
//! store error is logged and swallowed.

use std::sync::Arc;

use tracing::warn;

use crate::repositories::TokenStore;

const UNKNOWN: &str = "unknown";

/// Attaches client metadata to the session's active refresh token
pub struct SessionBinder<S: TokenStore> {
    store: Arc<S>,
}

impl<S: TokenStore> SessionBinder<S> {
    /// Creates a new binder over the given store
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Binds the user agent and client IP to the session's active token
    ///
    /// `client_ip` is the address already resolved by the transport layer;
    /// `None` is recorded as `"unknown"`.
    pub async fn bind(&self, session_key: &str, user_agent: &str, client_ip: Option<&str>) {
        let client_info = describe_user_agent(user_agent);
        let client_ip = match client_ip {
            Some(ip) => ip,
            None => {
                warn!(
                    session_key = %session_key,
                    "Unable to resolve the client's IP address for the session"
                );
                UNKNOWN
            }
        };

        let active = match self.store.get_active_by_session(session_key).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                warn!(
                    session_key = %session_key,
                    "No active refresh token to bind client metadata to"
                );
                return;
            }
            Err(e) => {
                warn!(error = %e, "Client metadata lookup failed");
                return;
            }
        };

        if let Err(e) = self
            .store
            .update_client_info(&active.token_id, &client_info, client_ip)
            .await
        {
            warn!(error = %e, "Client metadata update failed");
        }
    }
}

/// Summarizes a raw user-agent string into `"<device> <browser>"`
///
/// Deliberately coarse: enough to recognize a session in an audit list,
/// nothing more.
pub fn describe_user_agent(user_agent: &str) -> String {
    let ua = user_agent.trim();
    if ua.is_empty() {
        return format!("{} {}", UNKNOWN, UNKNOWN);
    }

    let device = if ua.contains("iPhone") {
        "iPhone"
    } else if ua.contains("iPad") {
        "iPad"
    } else if ua.contains("Android") {
        "Android"
    } else if ua.contains("Windows") {
        "Windows"
    } else if ua.contains("Macintosh") || ua.contains("Mac OS X") {
        "Mac"
    } else if ua.contains("Linux") {
        "Linux"
    } else {
        UNKNOWN
    };

    // Order matters: Chrome ships "Safari" in its UA, Edge ships both.
    let browser = if ua.contains("Edg/") || ua.contains("Edge/") {
        "Edge"
    } else if ua.contains("OPR/") || ua.contains("Opera") {
        "Opera"
    } else if ua.contains("Firefox/") {
        "Firefox"
    } else if ua.contains("Chrome/") || ua.contains("CriOS/") {
        "Chrome"
    } else if ua.contains("Safari/") {
        "Safari"
    } else {
        UNKNOWN
    };

    format!("{} {}", device, browser)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use crate::domain::entities::token::RefreshTokenRecord;
    use crate::repositories::token::InMemoryTokenStore;
    use crate::repositories::TokenStore;

    const FIREFOX_MAC: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:124.0) \
                               Gecko/20100101 Firefox/124.0";
    const CHROME_WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                                  AppleWebKit/537.36 (KHTML, like Gecko) \
                                  Chrome/122.0.0.0 Safari/537.36";
    const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) \
                                 AppleWebKit/605.1.15 (KHTML, like Gecko) \
                                 Version/17.0 Mobile/15E148 Safari/604.1";

    #[test]
    fn test_describe_user_agent() {
        assert_eq!(describe_user_agent(FIREFOX_MAC), "Mac Firefox");
        assert_eq!(describe_user_agent(CHROME_WINDOWS), "Windows Chrome");
        assert_eq!(describe_user_agent(SAFARI_IPHONE), "iPhone Safari");
        assert_eq!(describe_user_agent(""), "unknown unknown");
        assert_eq!(describe_user_agent("curl/8.4.0"), "unknown unknown");
    }

    fn active_record(session_key: &str) -> RefreshTokenRecord {
        RefreshTokenRecord::new(
            "T1".to_string(),
            session_key.to_string(),
            Uuid::new_v4(),
            Utc::now(),
            Duration::seconds(1_296_000),
            Duration::seconds(870),
        )
    }

    #[tokio::test]
    async fn test_bind_attaches_metadata_to_active_token() {
        let store = Arc::new(InMemoryTokenStore::new());
        store.create(active_record("s1")).await.unwrap();

        let binder = SessionBinder::new(Arc::clone(&store));
        binder.bind("s1", FIREFOX_MAC, Some("203.0.113.7")).await;

        let record = store.get_by_token_id("T1").await.unwrap().unwrap();
        assert_eq!(record.client_info, Some("Mac Firefox".to_string()));
        assert_eq!(record.client_ip, Some("203.0.113.7".to_string()));
    }

    #[tokio::test]
    async fn test_bind_records_unknown_ip() {
        let store = Arc::new(InMemoryTokenStore::new());
        store.create(active_record("s1")).await.unwrap();

        let binder = SessionBinder::new(Arc::clone(&store));
        binder.bind("s1", CHROME_WINDOWS, None).await;

        let record = store.get_by_token_id("T1").await.unwrap().unwrap();
        assert_eq!(record.client_ip, Some("unknown".to_string()));
    }

    #[tokio::test]
    async fn test_bind_without_active_token_is_swallowed() {
        let store = Arc::new(InMemoryTokenStore::new());
        let binder = SessionBinder::new(Arc::clone(&store));

        // Must not panic or error; the enclosing request goes on.
        binder.bind("s1", FIREFOX_MAC, Some("203.0.113.7")).await;
        assert!(store.is_empty().await);
    }
}
