//! HTTP client shared by every domain service.
//!
//! `ApiClient` owns the request/response plumbing once: bearer-token
//! injection, the refresh-on-401 protocol via
//! [`SessionManager::handle_response`], and the single transparent retry via
//! [`with_auth_retry`]. Services supply only endpoint paths and typed models.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::auth::{with_auth_retry, SessionManager, DEFAULT_MAX_RETRIES};
use crate::config::Config;

use super::ApiError;

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// API client for the escolar backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    session: Arc<SessionManager>,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &Config, session: Arc<SessionManager>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            session,
            base_url: config.api_base_url.clone(),
        })
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let value = self.request_json(Method::GET, path, None).await?;
        Self::from_value(value)
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = Self::to_value(body)?;
        let value = self.request_json(Method::POST, path, Some(body)).await?;
        Self::from_value(value)
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = Self::to_value(body)?;
        let value = self.request_json(Method::PUT, path, Some(body)).await?;
        Self::from_value(value)
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.request_json(Method::DELETE, path, None).await?;
        Ok(())
    }

    /// Issue one request through the retry wrapper. The thunk re-reads the
    /// session's access token on every invocation, so a retry after a 401
    /// picks up the freshly rotated credentials.
    async fn request_json(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let client = self.clone();
        let url = format!("{}{}", self.base_url, path);
        with_auth_retry(
            move || {
                let client = client.clone();
                let method = method.clone();
                let url = url.clone();
                let body = body.clone();
                async move { client.execute(method, &url, body).await }
            },
            DEFAULT_MAX_RETRIES,
        )
        .await
    }

    async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let token = self.session.access_token();
        let mut request = self.http.request(method, url);
        if let Some(ref token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(ref body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        self.session.handle_response(token.as_deref(), response).await
    }

    fn to_value<B: Serialize>(body: &B) -> Result<Value, ApiError> {
        serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidResponse(format!("failed to encode request body: {}", e)))
    }

    fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
        serde_json::from_value(value).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::session::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, TOKEN_EXPIRES_KEY};
    use crate::auth::{MemoryStore, SessionStore};

    use chrono::Utc;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, store: Arc<MemoryStore>) -> ApiClient {
        let config = Config {
            api_base_url: server.uri(),
            auth_base_url: server.uri(),
            last_username: None,
        };
        let session = Arc::new(SessionManager::new(store, &config).expect("build manager"));
        ApiClient::new(&config, session).expect("build client")
    }

    fn seed_tokens(store: &MemoryStore, access: &str, refresh: &str, expires_at: i64) {
        store.set(ACCESS_TOKEN_KEY, access);
        store.set(REFRESH_TOKEN_KEY, refresh);
        store.set(TOKEN_EXPIRES_KEY, &expires_at.to_string());
    }

    fn refresh_ok() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "access-new",
            "refresh_token": "refresh-new",
            "expires_in": 300
        }))
    }

    #[tokio::test]
    async fn test_plain_success_single_invocation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/institutions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": [1, 2, 3]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryStore::new());
        seed_tokens(&store, "access-ok", "refresh-ok", Utc::now().timestamp_millis() + 60_000);
        let client = client_for(&server, store.clone());

        let body: Value = client.get("/institutions").await.expect("get");
        assert_eq!(body, serde_json::json!({"data": [1, 2, 3]}));

        // Session untouched
        assert_eq!(store.get(ACCESS_TOKEN_KEY).as_deref(), Some("access-ok"));
    }

    #[tokio::test]
    async fn test_stale_token_refreshed_and_retried_transparently() {
        let server = MockServer::start().await;
        // First attempt carries the stale token and gets 401
        Mock::given(method("GET"))
            .and(path("/institutions"))
            .and(header("Authorization", "Bearer access-old"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        // Retry carries the rotated token and succeeds
        Mock::given(method("GET"))
            .and(path("/institutions"))
            .and(header("Authorization", "Bearer access-new"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/refresh"))
            .respond_with(refresh_ok())
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryStore::new());
        seed_tokens(&store, "access-old", "refresh-old", 0);
        let client = client_for(&server, store.clone());

        let body: Value = client.get("/institutions").await.expect("transparent retry");
        assert_eq!(body, serde_json::json!({"data": []}));

        // Session now holds the new triple
        assert_eq!(store.get(ACCESS_TOKEN_KEY).as_deref(), Some("access-new"));
        assert_eq!(store.get(REFRESH_TOKEN_KEY).as_deref(), Some("refresh-new"));
    }

    #[tokio::test]
    async fn test_rejected_refresh_fails_without_retrying_operation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/institutions"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/refresh"))
            .respond_with(ResponseTemplate::new(400))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryStore::new());
        seed_tokens(&store, "access-old", "refresh-old", 0);
        let client = client_for(&server, store.clone());

        let err = client
            .get::<Value>("/institutions")
            .await
            .expect_err("session expired");
        assert!(matches!(err, ApiError::SessionExpired(_)));

        assert_eq!(store.get(ACCESS_TOKEN_KEY), None);
        assert_eq!(store.get(REFRESH_TOKEN_KEY), None);
        assert_eq!(store.get(TOKEN_EXPIRES_KEY), None);
    }

    #[tokio::test]
    async fn test_server_error_message_propagated_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/attendance"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(serde_json::json!({"message": "db down"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryStore::new());
        seed_tokens(&store, "access-ok", "refresh-ok", Utc::now().timestamp_millis() + 60_000);
        let client = client_for(&server, store.clone());

        let err = client.get::<Value>("/attendance").await.expect_err("http error");
        assert_eq!(err.to_string(), "db down");

        // Session untouched, no refresh attempted
        assert_eq!(store.get(ACCESS_TOKEN_KEY).as_deref(), Some("access-ok"));
    }

    #[tokio::test]
    async fn test_delete_accepts_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/institutions/9"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryStore::new());
        seed_tokens(&store, "access-ok", "refresh-ok", Utc::now().timestamp_millis() + 60_000);
        let client = client_for(&server, store);

        client.delete("/institutions/9").await.expect("delete");
    }
}
