//
//  athenahealth
//  api/client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # HTTP Client Core for the athenahealth API
//!
//! This module provides the core HTTP client every resource operation is
//! built on. It handles token injection, practice-scoped URL composition,
//! request encoding, and response classification.
//!
//! ## Features
//!
//! - Transparent bearer-token acquisition and renewal
//! - Query-string encoding for reads, form encoding for writes
//! - JSON deserialization into caller-supplied types
//! - Classification of the API's inconsistent failure envelopes
//!
//! ## Request Anatomy
//!
//! Every call resolves its URL as `{base}/v1/{practice_id}{path}` and
//! attaches `Authorization: Bearer <token>`. Parameters are passed as
//! ordered key/value slices, so repeated keys survive encoding intact.
//!
//! ## Failure Classification
//!
//! The remote API signals failure three different ways, sometimes inside an
//! HTTP 200:
//!
//! ```json
//! {"message": "...", "success": false}
//! {"errormessage": "...", "success": false}
//! {"errors": [{...}], "success": 0}
//! ```
//!
//! The decoder probes these shapes in a fixed order (`errormessage`, then
//! `message`, then `errors`) before handing the body to the caller's type,
//! so a logical failure is never silently decoded as an empty success
//! value.

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::api::common::ApiError;
use crate::auth::TokenManager;
use crate::config::Credentials;

/// Base URL of the production environment.
const PRODUCTION_BASE_URL: &str = "https://api.platform.athenahealth.com";

/// Base URL of the preview (sandbox) environment.
const PREVIEW_BASE_URL: &str = "https://api.preview.platform.athenahealth.com";

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The main HTTP client for the athenahealth APIs.
///
/// The client owns the credentials, the transport, and the cached access
/// token. It is cheap to clone (clones share the same connection pool and
/// token cache) and safe to use from concurrent tasks.
///
/// # Creating a Client
///
/// ```rust,no_run
/// use athenahealth::api::AthenaClient;
/// use athenahealth::config::Credentials;
///
/// let credentials = Credentials::from_env()?;
///
/// // Production environment
/// let client = AthenaClient::production(credentials.clone())?;
///
/// // Preview (sandbox) environment
/// let sandbox = AthenaClient::preview(credentials)?;
/// # Ok::<(), athenahealth::ApiError>(())
/// ```
///
/// # Cancellation and Timeouts
///
/// Calls are plain futures: dropping one aborts the in-flight request.
/// Wall-clock bounds come from the client-level timeout (default 30s,
/// adjustable via [`with_timeout`](Self::with_timeout)); an elapsed
/// deadline surfaces as [`ApiError::Timeout`], distinct from other
/// transport failures.
#[derive(Clone, Debug)]
pub struct AthenaClient {
    /// The underlying HTTP transport.
    http: reqwest::Client,
    /// Environment base URL, no trailing slash.
    base_url: String,
    /// Tenant identifier baked into every request path.
    practice_id: String,
    /// Grant credentials, kept for timeout reconfiguration.
    credentials: Credentials,
    /// Token cache shared across clones.
    token_manager: Arc<TokenManager>,
}

impl AthenaClient {
    /// Creates a client for the production environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP transport cannot be constructed.
    pub fn production(credentials: Credentials) -> Result<Self, ApiError> {
        Self::build(PRODUCTION_BASE_URL.to_string(), credentials, DEFAULT_TIMEOUT)
    }

    /// Creates a client for the preview (sandbox) environment.
    ///
    /// Preview practices mirror production behavior without touching live
    /// patient data; use this environment for development and testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP transport cannot be constructed.
    pub fn preview(credentials: Credentials) -> Result<Self, ApiError> {
        Self::build(PREVIEW_BASE_URL.to_string(), credentials, DEFAULT_TIMEOUT)
    }

    /// Creates a client against an explicit base URL.
    ///
    /// Intended for mock servers in tests and for deployments that front
    /// the API with a gateway.
    ///
    /// # Parameters
    ///
    /// * `credentials` - The practice-scoped OAuth credentials
    /// * `base_url` - Scheme and host, e.g. `https://gateway.example.com`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidArgument`] if `base_url` is not a valid
    /// absolute URL.
    pub fn with_base_url(credentials: Credentials, base_url: &str) -> Result<Self, ApiError> {
        Url::parse(base_url)
            .map_err(|e| ApiError::InvalidArgument(format!("invalid base URL: {}", e)))?;

        Self::build(
            base_url.trim_end_matches('/').to_string(),
            credentials,
            DEFAULT_TIMEOUT,
        )
    }

    /// Returns a client identical to this one with a different timeout.
    ///
    /// The timeout bounds each request end to end, including the token
    /// exchange when one is needed. Note that the token cache starts cold
    /// on the returned client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP transport cannot be reconstructed.
    pub fn with_timeout(self, timeout: Duration) -> Result<Self, ApiError> {
        Self::build(self.base_url, self.credentials, timeout)
    }

    fn build(
        base_url: String,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(format!("athenahealth-rs/{}", crate::VERSION))
            .timeout(timeout)
            .build()
            .map_err(ApiError::from)?;

        let practice_id = credentials.practice_id().to_string();
        let token_manager = Arc::new(TokenManager::new(
            http.clone(),
            &base_url,
            credentials.clone(),
        ));

        Ok(Self {
            http,
            base_url,
            practice_id,
            credentials,
            token_manager,
        })
    }

    /// Returns the practice-scoped URL for a relative resource path.
    ///
    /// Resolves to `{base}/v1/{practice_id}{path}`.
    fn request_url(&self, path: &str) -> String {
        format!(
            "{}/v1/{}/{}",
            self.base_url,
            self.practice_id,
            path.trim_start_matches('/')
        )
    }

    /// Makes an HTTP GET request to the specified resource path.
    ///
    /// Query parameters are appended to the URL; repeated keys are
    /// preserved in order.
    ///
    /// # Type Parameters
    ///
    /// * `T` - The type to deserialize the response JSON into
    ///
    /// # Parameters
    ///
    /// * `path` - The resource path (e.g., `/chart/123/riskcontract`)
    /// * `query` - Ordered key/value query parameters
    ///
    /// # Errors
    ///
    /// Returns an error if authentication fails, the request cannot be
    /// executed, the API reports a failure, or the body cannot be decoded
    /// into `T`.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use athenahealth::api::AthenaClient;
    /// use athenahealth::api::risk_contracts::RiskContract;
    ///
    /// # async fn example(client: &AthenaClient) -> Result<(), athenahealth::ApiError> {
    /// let contracts: Vec<RiskContract> = client
    ///     .get("/chart/123/riskcontract", &[("departmentid", "456".to_string())])
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let mut request = self.http.get(self.request_url(path));
        if !query.is_empty() {
            request = request.query(query);
        }

        tracing::debug!(%path, "GET");
        self.execute(request).await
    }

    /// Makes an HTTP POST request with a form-encoded body.
    ///
    /// Parameters are encoded as `application/x-www-form-urlencoded`;
    /// repeated keys are preserved in order.
    ///
    /// # Type Parameters
    ///
    /// * `T` - The type to deserialize the response JSON into
    ///
    /// # Parameters
    ///
    /// * `path` - The resource path
    /// * `form` - Ordered key/value form fields
    ///
    /// # Errors
    ///
    /// Returns an error if authentication fails, the request cannot be
    /// executed, the API reports a failure, or the body cannot be decoded
    /// into `T`.
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let request = self.http.post(self.request_url(path)).form(form);

        tracing::debug!(%path, "POST");
        self.execute(request).await
    }

    /// Makes an HTTP PUT request with a form-encoded body.
    ///
    /// Identical to [`post_form`](Self::post_form) apart from the verb;
    /// the athenahealth API uses PUT for creates and updates on several
    /// resource families.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication fails, the request cannot be
    /// executed, the API reports a failure, or the body cannot be decoded
    /// into `T`.
    pub async fn put_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let request = self.http.put(self.request_url(path)).form(form);

        tracing::debug!(%path, "PUT");
        self.execute(request).await
    }

    /// Makes an HTTP DELETE request to the specified resource path.
    ///
    /// Query parameters are appended to the URL; callers never pre-encode
    /// query strings into `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication fails, the request cannot be
    /// executed, the API reports a failure, or the body cannot be decoded
    /// into `T`.
    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let mut request = self.http.delete(self.request_url(path));
        if !query.is_empty() {
            request = request.query(query);
        }

        tracing::debug!(%path, "DELETE");
        self.execute(request).await
    }

    /// Attaches a bearer token, executes the request, and classifies the
    /// response.
    ///
    /// A 401 invalidates the cached token before classification so the
    /// next call re-authenticates.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let token = self.token_manager.ensure_token().await?;

        let response = request
            .bearer_auth(&token)
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("access token rejected; invalidating cache");
            self.token_manager.invalidate().await;
        }

        let body = response.text().await.map_err(ApiError::from)?;
        decode_body(status, &body)
    }
}

/// Turns a raw response into a decoded value or a classified error.
///
/// Non-2xx statuses become [`ApiError::Api`] with whatever message the
/// body yields. For 2xx responses the body is parsed once; an embedded
/// failure envelope takes priority over decoding into `T`, and a
/// structural mismatch surfaces as [`ApiError::Decode`].
fn decode_body<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, ApiError> {
    if !status.is_success() {
        return Err(ApiError::Api {
            status,
            message: failure_message(status, body),
        });
    }

    let value: Value = serde_json::from_str(body)?;

    if let Some(message) = envelope_failure(&value) {
        return Err(ApiError::Api { status, message });
    }

    Ok(serde_json::from_value(value)?)
}

/// Checks a parsed 2xx body for an embedded failure signal.
///
/// Returns the extracted message when the envelope carries
/// `"success": false` or `"success": 0`; returns `None` for genuine
/// success payloads (including bodies with no `success` field at all).
fn envelope_failure(value: &Value) -> Option<String> {
    let failed = match value.get("success") {
        Some(Value::Bool(success)) => !*success,
        Some(Value::Number(success)) => success.as_i64() == Some(0),
        _ => false,
    };

    if failed {
        Some(extract_message(value).unwrap_or_else(|| "request failed".to_string()))
    } else {
        None
    }
}

/// Extracts the most specific failure message a body offers.
///
/// Probes the known envelope fields in priority order: `errormessage`,
/// then `message`, then the structured `errors` array (serialized
/// verbatim, since its records have no fixed shape).
fn extract_message(value: &Value) -> Option<String> {
    if let Some(message) = value.get("errormessage").and_then(Value::as_str) {
        return Some(message.to_string());
    }

    if let Some(message) = value.get("message").and_then(Value::as_str) {
        return Some(message.to_string());
    }

    if let Some(errors) = value.get("errors").and_then(Value::as_array) {
        if !errors.is_empty() {
            return serde_json::to_string(errors).ok();
        }
    }

    None
}

/// Builds the message for a non-2xx response.
///
/// Falls back to the raw body (or the status reason for empty bodies) when
/// no known envelope shape matches.
fn failure_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(message) = extract_message(&value) {
            return message;
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Appointment {
        appointmentid: i64,
        status: String,
    }

    fn test_credentials() -> Credentials {
        Credentials::new("195900", "test-id", "test-secret").unwrap()
    }

    fn test_client(server: &mockito::ServerGuard) -> AthenaClient {
        AthenaClient::with_base_url(test_credentials(), &server.url()).unwrap()
    }

    async fn mock_token(server: &mut mockito::ServerGuard, hits: usize) -> mockito::Mock {
        server
            .mock("POST", "/oauth2/v1/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "token123", "token_type": "Bearer", "expires_in": 3600}"#)
            .expect(hits)
            .create_async()
            .await
    }

    #[test]
    fn test_decode_success_payload() {
        let appointment: Appointment = decode_body(
            StatusCode::OK,
            r#"{"appointmentid": 42, "status": "booked"}"#,
        )
        .unwrap();

        assert_eq!(appointment.appointmentid, 42);
        assert_eq!(appointment.status, "booked");
    }

    #[test]
    fn test_embedded_errormessage_failure_beats_decoding() {
        let err = decode_body::<Appointment>(
            StatusCode::OK,
            r#"{"success": false, "errormessage": "invalid date"}"#,
        )
        .unwrap_err();

        match err {
            ApiError::Api { status, message } => {
                assert_eq!(status, StatusCode::OK);
                assert!(message.contains("invalid date"));
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_integer_success_zero_is_api_error() {
        let err = decode_body::<Appointment>(
            StatusCode::OK,
            r#"{"success": 0, "errors": [{"field": "x"}]}"#,
        )
        .unwrap_err();

        match err {
            ApiError::Api { status, message } => {
                assert_eq!(status, StatusCode::OK);
                assert!(message.contains("field"));
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_integer_success_one_decodes_normally() {
        #[derive(Deserialize)]
        struct Ack {
            success: i64,
        }

        let ack: Ack = decode_body(StatusCode::OK, r#"{"success": 1, "errors": []}"#).unwrap();
        assert_eq!(ack.success, 1);
    }

    #[test]
    fn test_non_2xx_with_message_envelope() {
        let err = decode_body::<Appointment>(
            StatusCode::BAD_REQUEST,
            r#"{"message": "The data provided is invalid", "success": false}"#,
        )
        .unwrap_err();

        match err {
            ApiError::Api { status, message } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(message, "The data provided is invalid");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_2xx_with_unparseable_body() {
        let err = decode_body::<Appointment>(
            StatusCode::BAD_GATEWAY,
            "<html>upstream exploded</html>",
        )
        .unwrap_err();

        match err {
            ApiError::Api { status, message } => {
                assert_eq!(status, StatusCode::BAD_GATEWAY);
                assert!(message.contains("upstream exploded"));
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_structural_mismatch_is_decode_error() {
        // Expecting an array, receiving an object.
        let err = decode_body::<Vec<Appointment>>(StatusCode::OK, r#"{"appointmentid": 42}"#)
            .unwrap_err();

        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_bearer_token_attached_to_requests() {
        let mut server = mockito::Server::new_async().await;
        mock_token(&mut server, 1).await;

        let mock = server
            .mock("GET", "/v1/195900/departments")
            .match_header("authorization", "Bearer token123")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"appointmentid": 1, "status": "open"}"#)
            .create_async()
            .await;

        let client = test_client(&server);
        let _: Appointment = client.get("/departments", &[]).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_form_encodes_body() {
        let mut server = mockito::Server::new_async().await;
        mock_token(&mut server, 1).await;

        let mock = server
            .mock("POST", "/v1/195900/appointments/42/notes")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(mockito::Matcher::Exact(
                "notetext=Follow+up+in+two+weeks".to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"appointmentid": 42, "status": "noted"}"#)
            .create_async()
            .await;

        let client = test_client(&server);
        let _: Appointment = client
            .post_form(
                "/appointments/42/notes",
                &[("notetext", "Follow up in two weeks".to_string())],
            )
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_repeated_query_keys_are_preserved() {
        let mut server = mockito::Server::new_async().await;
        mock_token(&mut server, 1).await;

        let mock = server
            .mock("GET", "/v1/195900/appointments")
            .match_query(mockito::Matcher::Exact(
                "status=open&status=cancelled".to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"appointmentid": 1, "status": "open"}"#)
            .create_async()
            .await;

        let client = test_client(&server);
        let _: Appointment = client
            .get(
                "/appointments",
                &[
                    ("status", "open".to_string()),
                    ("status", "cancelled".to_string()),
                ],
            )
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_401_invalidates_cached_token() {
        let mut server = mockito::Server::new_async().await;
        // One grant for the rejected call, a second after invalidation.
        let token_mock = mock_token(&mut server, 2).await;

        server
            .mock("GET", "/v1/195900/rejected")
            .with_status(401)
            .with_body(r#"{"error": "token revoked"}"#)
            .create_async()
            .await;

        server
            .mock("GET", "/v1/195900/accepted")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"appointmentid": 7, "status": "open"}"#)
            .create_async()
            .await;

        let client = test_client(&server);

        let err = client
            .get::<Appointment>("/rejected", &[])
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));

        let appointment: Appointment = client.get("/accepted", &[]).await.unwrap();
        assert_eq!(appointment.appointmentid, 7);

        token_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_concurrent_calls_share_one_grant() {
        let mut server = mockito::Server::new_async().await;
        let token_mock = mock_token(&mut server, 1).await;

        let mock = server
            .mock("GET", "/v1/195900/ping")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"appointmentid": 1, "status": "open"}"#)
            .expect(10)
            .create_async()
            .await;

        let client = test_client(&server);

        let mut handles = Vec::new();
        for _ in 0..10 {
            let client = client.clone();
            handles.push(tokio::spawn(async move {
                client.get::<Appointment>("/ping", &[]).await.unwrap()
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        token_mock.assert_async().await;
        mock.assert_async().await;
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let err = AthenaClient::with_base_url(test_credentials(), "not a url").unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }
}
