//! Client-side contract of the Mokart service.
//!
//! The dashboard only talks to the service through these traits, so it can
//! be driven by the HTTP client in production and by fakes in tests.

use model::{AuthResponse, Credentials, Registration, Session, SessionStats, TrajectoryPoint};
use serde_json::Value;

/// Account the service accepts without a real sign-up.
pub const DEMO_EMAIL: &str = "demo@mokart.com";
pub const DEMO_PASSWORD: &str = "demo123456";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The service answered with an error; the text comes from its payload.
    #[error("{0}")]
    Rejected(String),
    #[error("could not reach server: {0}")]
    Unreachable(String),
    #[error("malformed response: {0}")]
    Decode(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, ApiError::Unreachable(_))
    }
}

/// Read-only session endpoints.
#[async_trait::async_trait]
pub trait SessionApi: Send + Sync {
    async fn sessions(&self) -> Result<Vec<Session>, ApiError>;
    async fn trajectory(&self, session_id: &str) -> Result<Vec<TrajectoryPoint>, ApiError>;
    async fn stats(&self, session_id: &str) -> Result<SessionStats, ApiError>;
}

#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError>;
    async fn register(&self, registration: &Registration) -> Result<AuthResponse, ApiError>;
}

pub const GENERIC_ERROR: &str = "an error occurred";

/// Error text of a failed response body: `detail`, then `message`, then a
/// generic fallback.
pub fn server_message(body: &Value) -> String {
    ["detail", "message"]
        .iter()
        .filter_map(|k| body.get(*k))
        .find_map(|v| match v {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Null => None,
            Value::String(_) => None,
            other => Some(other.to_string()),
        })
        .unwrap_or_else(|| GENERIC_ERROR.to_string())
}
