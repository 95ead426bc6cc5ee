//! Session manager: refresh-on-401 protocol and the shared retry wrapper.
//!
//! Every service module used to carry its own copy of the response-handling
//! and retry logic; it lives here once instead. The flow is:
//!
//! 1. A request comes back 401. [`SessionManager::handle_response`] exchanges
//!    the stored refresh token for a new pair and fails with
//!    [`ApiError::RetryRequired`].
//! 2. [`with_auth_retry`] catches that one error variant and re-invokes the
//!    request thunk, which now picks up the rotated credentials.
//! 3. Any other error, or a second `RetryRequired` past the budget,
//!    propagates to the caller unchanged.
//!
//! Refresh failure is terminal: the whole session is cleared and the
//! registered login-redirect callback is scheduled.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::ApiError;
use crate::config::Config;

use super::identity::{decode_identity, Identity};
use super::session::{Session, TokenSet};
use super::store::SessionStore;

/// Default retry budget: one transparent retry after a successful refresh
pub const DEFAULT_MAX_RETRIES: u32 = 1;

/// HTTP request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Delay before the login redirect fires, leaving time for the calling UI
/// to surface its error toast
const LOGIN_REDIRECT_DELAY_MS: u64 = 1000;

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    #[serde(default)]
    access_token: String,
    #[serde(default)]
    refresh_token: String,
    /// Lifetime of the new access token in seconds
    #[serde(default)]
    expires_in: i64,
}

/// Single authority for reading, validating, refreshing, and clearing
/// authentication state.
pub struct SessionManager {
    session: Session,
    http: reqwest::Client,
    auth_base_url: String,
    /// One-entry decode cache: (token, decoded identity)
    identity_cache: Mutex<Option<(String, Identity)>>,
    /// Serializes concurrent refresh attempts; the loser of a 401 race awaits
    /// the winner's refresh instead of issuing a duplicate one
    refresh_gate: tokio::sync::Mutex<()>,
    on_login_redirect: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, config: &Config) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            session: Session::new(store),
            http,
            auth_base_url: config.auth_base_url.clone(),
            identity_cache: Mutex::new(None),
            refresh_gate: tokio::sync::Mutex::new(()),
            on_login_redirect: None,
        })
    }

    /// Register the callback invoked (after a short delay) when the session
    /// is torn down and the user must log in again.
    pub fn on_login_redirect(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_login_redirect = Some(Arc::new(callback));
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn access_token(&self) -> Option<String> {
        self.session.access_token()
    }

    /// True iff an access token and expiry exist and the current time is
    /// strictly before the expiry. Pure; no side effects.
    pub fn is_token_valid(&self) -> bool {
        self.session.is_valid()
    }

    /// Identity decoded from the current access token, or `None` when no
    /// token is stored or its payload does not decode.
    ///
    /// The decode runs at most once per token value; the result is held in a
    /// one-entry cache keyed by the exact token string.
    pub fn identity(&self) -> Option<Identity> {
        let token = self.session.access_token()?;
        let mut cache = self.identity_cache.lock().expect("identity cache poisoned");
        if let Some((cached_token, identity)) = cache.as_ref() {
            if *cached_token == token {
                return Some(identity.clone());
            }
        }
        let identity = decode_identity(&token)?;
        *cache = Some((token, identity.clone()));
        Some(identity)
    }

    fn invalidate_identity_cache(&self) {
        *self.identity_cache.lock().expect("identity cache poisoned") = None;
    }

    /// Store a new token pair after a successful login or refresh.
    pub fn store_tokens(&self, tokens: &TokenSet) {
        self.session.replace(tokens);
        self.invalidate_identity_cache();
    }

    /// Tear down the session: tokens, cached institution, decoded identity.
    pub fn clear_session(&self) {
        self.session.clear();
        self.invalidate_identity_cache();
    }

    fn schedule_login_redirect(&self) {
        if let Some(callback) = self.on_login_redirect.clone() {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(LOGIN_REDIRECT_DELAY_MS)).await;
                callback();
            });
        }
    }

    /// Exchange `refresh_token` for a new token pair.
    ///
    /// On success the session holds the new pair and the identity cache is
    /// invalidated. On any failure (network, non-success status, missing
    /// access token in the body) the session is fully cleared and the login
    /// redirect is scheduled.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenSet, ApiError> {
        match self.request_refresh(refresh_token).await {
            Ok(tokens) => {
                debug!("Token refresh succeeded");
                self.store_tokens(&tokens);
                Ok(tokens)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed, clearing session");
                self.clear_session();
                self.schedule_login_redirect();
                Err(ApiError::SessionExpired(e.to_string()))
            }
        }
    }

    async fn request_refresh(&self, refresh_token: &str) -> Result<TokenSet, ApiError> {
        let url = format!("{}/refresh", self.auth_base_url);
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "refreshToken": refresh_token }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::http_status(status.as_u16()));
        }

        let body: RefreshResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        if body.access_token.is_empty() {
            return Err(ApiError::InvalidResponse(
                "refresh response missing access token".to_string(),
            ));
        }

        Ok(TokenSet {
            access_token: body.access_token,
            refresh_token: body.refresh_token,
            expires_at: Utc::now().timestamp_millis() + body.expires_in * 1000,
        })
    }

    /// Run the refresh protocol after a request failed with 401.
    ///
    /// `issued_with` is the access token the failed request carried. If a
    /// concurrent task already rotated the credentials past that token while
    /// we waited on the gate, the duplicate refresh is skipped and the caller
    /// can retry immediately.
    async fn refresh_after_unauthorized(&self, issued_with: Option<&str>) -> Result<(), ApiError> {
        let _gate = self.refresh_gate.lock().await;

        if self.session.is_valid() {
            if let Some(current) = self.session.access_token() {
                if issued_with != Some(current.as_str()) {
                    debug!("Credentials already rotated by a concurrent refresh");
                    return Ok(());
                }
            }
        }

        let Some(refresh_token) = self.session.refresh_token() else {
            self.clear_session();
            self.schedule_login_redirect();
            return Err(ApiError::SessionExpired(
                "no refresh token available".to_string(),
            ));
        };

        self.refresh(&refresh_token).await.map(|_| ())
    }

    /// Handle a raw response from an authenticated endpoint.
    ///
    /// `issued_with` is the access token the request was sent with.
    ///
    /// - 401: run the refresh protocol; on success fail with
    ///   [`ApiError::RetryRequired`] so the enclosing [`with_auth_retry`]
    ///   redoes the call, otherwise fail session-expired.
    /// - Non-JSON success: empty JSON object (no body expected).
    /// - Non-JSON failure: HTTP-status-coded error.
    /// - JSON failure: error carrying the body's `message` field when present.
    /// - JSON success: the parsed body.
    pub async fn handle_response(
        &self,
        issued_with: Option<&str>,
        response: reqwest::Response,
    ) -> Result<Value, ApiError> {
        let status = response.status();

        if status.as_u16() == 401 {
            self.refresh_after_unauthorized(issued_with).await?;
            return Err(ApiError::RetryRequired);
        }

        let is_json = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("application/json"))
            .unwrap_or(false);

        if !is_json {
            if status.is_success() {
                return Ok(Value::Object(serde_json::Map::new()));
            }
            return Err(ApiError::http_status(status.as_u16()));
        }

        // Parse failures stay a distinct variant; they must never be
        // mistaken for the retry signal
        let body: Value = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;

        if !status.is_success() {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP status {}", status.as_u16()));
            return Err(ApiError::Http {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }
}

/// Invoke `operation`, retrying it after each [`ApiError::RetryRequired`]
/// until the budget runs out. At most `max_retries + 1` invocations; every
/// other error propagates immediately.
///
/// This wrapper is pure control flow over the supplied thunk - the refresh
/// itself happens inside [`SessionManager::handle_response`].
pub async fn with_auth_retry<T, F, Fut>(mut operation: F, max_retries: u32) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut budget = max_retries;
    loop {
        match operation().await {
            Err(ApiError::RetryRequired) if budget > 0 => {
                budget -= 1;
                debug!("Credentials rotated, retrying request");
            }
            other => return other,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
