//! API error response types
//!
//! The HTTP layer maps domain errors into this structure. Error codes are
//! stable machine-readable strings; the message is advisory only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unified error response structure for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable error code for programmatic handling
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Timestamp when the error occurred
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl ToString, message: impl ToString) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_serialization() {
        let response = ErrorResponse::new("REQUEST_FORBIDDEN", "Refresh token is revoked or expired.");
        let json = serde_json::to_string(&response).unwrap();

        assert!(json.contains("\"error\":\"REQUEST_FORBIDDEN\""));
        assert!(json.contains("Refresh token is revoked or expired."));
    }
}
