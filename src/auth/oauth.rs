//
//  athenahealth
//  auth/oauth.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # OAuth 2.0 Client-Credentials Grant
//!
//! This module implements token acquisition and caching for the
//! athenahealth APIs.
//!
//! ## Grant Flow
//!
//! The exchange is a single POST to the token endpoint:
//!
//! 1. HTTP Basic authentication with the client ID and secret
//! 2. Form body carrying `grant_type=client_credentials` and the fixed
//!    athenahealth service scope
//! 3. Response body `{"access_token": "...", "expires_in": 3600}`
//!
//! The resulting bearer token is cached and reused until it comes within a
//! safety margin of expiry. There is no refresh token in this flow; renewal
//! is simply another exchange.
//!
//! ## Example
//!
//! ```rust,no_run
//! use athenahealth::auth::TokenManager;
//! use athenahealth::config::Credentials;
//!
//! # async fn example() -> Result<(), athenahealth::ApiError> {
//! let credentials = Credentials::new("195900", "client-id", "client-secret")?;
//! let manager = TokenManager::new(
//!     reqwest::Client::new(),
//!     "https://api.preview.platform.athenahealth.com",
//!     credentials,
//! );
//!
//! let token = manager.ensure_token().await?;
//! println!("Bearer {}", token);
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::api::common::ApiError;
use crate::config::Credentials;

/// Token endpoint path, relative to the environment base URL.
const TOKEN_PATH: &str = "/oauth2/v1/token";

/// OAuth scope granting access to the athenanet MDP service family.
const TOKEN_SCOPE: &str = "athena/service/Athenanet.MDP.*";

/// Seconds before the reported expiry at which a token is considered stale.
///
/// The margin absorbs clock skew and the round-trip time of the request the
/// token is about to be attached to.
const EXPIRY_MARGIN_SECONDS: i64 = 60;

/// Wire shape of the token endpoint response.
#[derive(Deserialize)]
struct TokenGrant {
    access_token: String,
    expires_in: i64,
    #[serde(default)]
    #[allow(dead_code)]
    token_type: Option<String>,
}

/// A bearer token together with its computed expiry instant.
#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// A token is usable while `now` is before the expiry margin.
    fn is_valid(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at - Duration::seconds(EXPIRY_MARGIN_SECONDS)
    }
}

/// Produces a valid bearer token for every outbound call.
///
/// The manager owns the single cached token for a client instance. Reads
/// and refreshes both go through an async mutex: callers that arrive while
/// a refresh is in flight block on the lock and receive the freshly
/// published token instead of triggering their own exchange.
///
/// # Failure Behavior
///
/// A failed exchange (network error, non-2xx status, malformed body)
/// surfaces as [`ApiError::Auth`] and fails the caller's request for that
/// attempt. Nothing is cached on failure, so the next call retries the
/// grant from scratch. The manager itself never retries.
///
/// # Example
///
/// ```rust,no_run
/// use athenahealth::auth::TokenManager;
/// use athenahealth::config::Credentials;
///
/// # async fn example() -> Result<(), athenahealth::ApiError> {
/// let credentials = Credentials::new("195900", "id", "secret")?;
/// let manager = TokenManager::new(
///     reqwest::Client::new(),
///     "https://api.platform.athenahealth.com",
///     credentials,
/// );
///
/// // First call performs the grant exchange; later calls reuse the cache.
/// let token = manager.ensure_token().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TokenManager {
    /// Transport shared with the owning client.
    http: reqwest::Client,
    /// Fully resolved token endpoint URL.
    token_url: String,
    /// Grant credentials; never exposed.
    credentials: Credentials,
    /// The single cached token, guarded against concurrent refresh.
    cached: Mutex<Option<CachedToken>>,
}

impl TokenManager {
    /// Creates a token manager for the given environment base URL.
    ///
    /// # Parameters
    ///
    /// * `http` - The HTTP client used for the exchange (shared with the
    ///   API client so connection pools and timeouts match)
    /// * `base_url` - Environment base URL, without a trailing slash
    /// * `credentials` - The client ID/secret pair for the grant
    pub fn new(http: reqwest::Client, base_url: &str, credentials: Credentials) -> Self {
        Self {
            http,
            token_url: format!("{}{}", base_url.trim_end_matches('/'), TOKEN_PATH),
            credentials,
            cached: Mutex::new(None),
        }
    }

    /// Returns a valid bearer token, performing the grant exchange if the
    /// cached token is absent or stale.
    ///
    /// The exchange happens while holding the cache lock, which is what
    /// collapses concurrent misses into a single upstream call.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Auth`] if the exchange fails for any reason.
    pub async fn ensure_token(&self) -> Result<String, ApiError> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.is_valid(Utc::now()) {
                return Ok(token.value.clone());
            }
        }

        let token = self.request_token().await?;
        let value = token.value.clone();
        *cached = Some(token);

        Ok(value)
    }

    /// Drops the cached token so the next call performs a fresh grant.
    ///
    /// Called by the client when a downstream request comes back 401: the
    /// token was rejected despite looking valid locally (revoked, or the
    /// practice's access changed).
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }

    /// Performs the client-credentials exchange against the token endpoint.
    async fn request_token(&self) -> Result<CachedToken, ApiError> {
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(
                self.credentials.client_id(),
                Some(self.credentials.client_secret()),
            )
            .form(&[("grant_type", "client_credentials"), ("scope", TOKEN_SCOPE)])
            .send()
            .await
            .map_err(|e| ApiError::Auth(format!("token request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Auth(format!("failed to read token response: {}", e)))?;

        if !status.is_success() {
            return Err(ApiError::Auth(format!(
                "token endpoint returned {}: {}",
                status,
                body.trim()
            )));
        }

        let grant: TokenGrant = serde_json::from_str(&body)
            .map_err(|e| ApiError::Auth(format!("malformed token response: {}", e)))?;

        tracing::debug!(expires_in = grant.expires_in, "obtained new access token");

        Ok(CachedToken {
            value: grant.access_token,
            expires_at: Utc::now() + Duration::seconds(grant.expires_in),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn test_credentials() -> Credentials {
        Credentials::new("195900", "test-id", "test-secret").unwrap()
    }

    fn test_manager(server: &mockito::ServerGuard) -> TokenManager {
        TokenManager::new(reqwest::Client::new(), &server.url(), test_credentials())
    }

    async fn mock_token(
        server: &mut mockito::ServerGuard,
        expires_in: i64,
        hits: usize,
    ) -> mockito::Mock {
        server
            .mock("POST", TOKEN_PATH)
            .match_header("authorization", mockito::Matcher::Regex("^Basic ".to_string()))
            .match_body(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("grant_type".into(), "client_credentials".into()),
                mockito::Matcher::UrlEncoded("scope".into(), TOKEN_SCOPE.into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(
                r#"{{"access_token": "token123", "token_type": "Bearer", "expires_in": {}}}"#,
                expires_in
            ))
            .expect(hits)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_valid_token_is_reused() {
        let mut server = mockito::Server::new_async().await;
        let mock = mock_token(&mut server, 3600, 1).await;

        let manager = test_manager(&server);

        let first = manager.ensure_token().await.unwrap();
        let second = manager.ensure_token().await.unwrap();

        assert_eq!(first, "token123");
        assert_eq!(first, second);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_token_inside_expiry_margin_is_refreshed() {
        let mut server = mockito::Server::new_async().await;
        // expires_in below the safety margin, so the token is stale as soon
        // as it is cached
        let mock = mock_token(&mut server, 30, 2).await;

        let manager = test_manager(&server);

        manager.ensure_token().await.unwrap();
        manager.ensure_token().await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_concurrent_misses_collapse_into_one_grant() {
        let mut server = mockito::Server::new_async().await;
        let mock = mock_token(&mut server, 3600, 1).await;

        let manager = Arc::new(test_manager(&server));

        let mut handles = Vec::new();
        for _ in 0..10 {
            let manager = Arc::clone(&manager);
            handles.push(tokio::spawn(async move {
                manager.ensure_token().await.unwrap()
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), "token123");
        }

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_invalidate_forces_new_grant() {
        let mut server = mockito::Server::new_async().await;
        let mock = mock_token(&mut server, 3600, 2).await;

        let manager = test_manager(&server);

        manager.ensure_token().await.unwrap();
        manager.invalidate().await;
        manager.ensure_token().await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_grant_is_auth_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", TOKEN_PATH)
            .with_status(401)
            .with_body(r#"{"error": "invalid_client"}"#)
            .create_async()
            .await;

        let manager = test_manager(&server);

        let err = manager.ensure_token().await.unwrap_err();
        assert!(err.is_auth());
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn test_malformed_grant_body_is_auth_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", TOKEN_PATH)
            .with_status(200)
            .with_body("not json at all")
            .create_async()
            .await;

        let manager = test_manager(&server);

        let err = manager.ensure_token().await.unwrap_err();
        assert!(err.is_auth());
    }
}
