use std::time::Duration;

use mokart_api_core::*;
use model::{AuthResponse, Credentials, Registration, Session, SessionStats, TrajectoryPoint};
use anyhow::anyhow;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Clone, Debug)]
pub struct HttpConfig {
    pub base_url: String,        // e.g. "http://localhost:8081"
    pub timeout: Duration,
}

pub struct HttpApi {
    cfg: HttpConfig,
    base: Url,
    client: Client,
}

impl HttpApi {
    pub fn new(cfg: HttpConfig) -> Result<Self, ApiError> {
        let base = Url::parse(&cfg.base_url)
            .map_err(|e| ApiError::Other(anyhow!("invalid base url {:?}: {}", cfg.base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::Other(anyhow!("{:?} cannot be used as a base url", cfg.base_url)));
        }
        let client = Client::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(|e| ApiError::Other(e.into()))?;
        Ok(Self { cfg, base, client })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.cfg.base_url.trim_end_matches('/'), path)
    }

    /// `{base}/sessions/{id}/{leaf}` with the id escaped as a single path
    /// segment.
    pub fn session_url(&self, session_id: &str, leaf: &str) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Other(anyhow!("{:?} cannot be used as a base url", self.cfg.base_url)))?
            .pop_if_empty()
            .extend(["sessions", session_id, leaf]);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, url: String) -> Result<T, ApiError> {
        debug!(%url, "GET");
        send(self.client.get(&url), &url).await
    }

    async fn post<B: serde::Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(%url, "POST");
        send(self.client.post(&url).json(body), &url).await
    }
}

async fn send<T: DeserializeOwned>(req: RequestBuilder, url: &str) -> Result<T, ApiError> {
    let resp = req.send().await.map_err(|e| {
        warn!(%url, error = %e, "request failed");
        ApiError::Unreachable(e.to_string())
    })?;
    let status = resp.status();
    let bytes = resp
        .bytes()
        .await
        .map_err(|e| ApiError::Unreachable(e.to_string()))?;
    if !status.is_success() {
        let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        let msg = server_message(&body);
        warn!(%url, %status, %msg, "service rejected request");
        return Err(ApiError::Rejected(msg));
    }
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait::async_trait]
impl SessionApi for HttpApi {
    async fn sessions(&self) -> Result<Vec<Session>, ApiError> {
        self.get(self.url("/sessions")).await
    }

    async fn trajectory(&self, session_id: &str) -> Result<Vec<TrajectoryPoint>, ApiError> {
        self.get(self.session_url(session_id, "trajectory")?.to_string()).await
    }

    async fn stats(&self, session_id: &str) -> Result<SessionStats, ApiError> {
        self.get(self.session_url(session_id, "stats")?.to_string()).await
    }
}

#[async_trait::async_trait]
impl AuthApi for HttpApi {
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        self.post("/auth/login", credentials).await
    }

    async fn register(&self, registration: &Registration) -> Result<AuthResponse, ApiError> {
        self.post("/auth/register", registration).await
    }
}
