//
//  athenahealth
//  api/common/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Common API Types
//!
//! This module provides the types shared across the athenahealth API layer:
//! the unified error taxonomy and the response envelope shapes the remote
//! API uses to signal logical failure.
//!
//! # Overview
//!
//! - [`ApiError`] - Unified error type for all API operations
//! - [`MessageResponse`] - `{"message": ..., "success": bool}` envelope
//! - [`ErrorMessageResponse`] - `{"errormessage": ..., "success": bool}` envelope
//! - [`IntegerSuccessResponse`] - `{"errors": [...], "success": int}` envelope
//!
//! The athenahealth API does not use one consistent failure shape. Some
//! endpoints return a non-2xx status with a JSON body; others return HTTP
//! 200 with `"success": false` (or `"success": 0` on the endpoints that
//! report success as an integer). The envelope types here are the closed
//! set of shapes observed in practice, and the client probes them in a
//! fixed order when classifying a response.
//!
//! # Example
//!
//! ```rust
//! use athenahealth::api::common::ApiError;
//!
//! fn handle_result<T>(result: Result<T, ApiError>) {
//!     match result {
//!         Ok(_) => println!("Success!"),
//!         Err(ApiError::Auth(reason)) => println!("Re-authentication needed: {}", reason),
//!         Err(ApiError::Api { status, message }) => {
//!             println!("The API said no ({}): {}", status, message)
//!         }
//!         Err(e) => println!("Error: {}", e),
//!     }
//! }
//! ```

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for all athenahealth API operations.
///
/// `ApiError` separates the failure classes a caller needs to branch on.
/// "The server said no" ([`ApiError::Api`]) is distinct from "we don't
/// understand the server" ([`ApiError::Decode`]), and both are distinct
/// from transport-level failures.
///
/// # Variants
///
/// | Variant | Description | Retryable |
/// |---------|-------------|-----------|
/// | `Auth` | Credential grant failed or was rejected | After fixing credentials |
/// | `Timeout` | The request exceeded its deadline | Caller's decision |
/// | `Network` | Connection, DNS, or protocol failure | Caller's decision |
/// | `Api` | Remote responded with an explicit failure | Depends on status |
/// | `Decode` | Response body did not match the expected shape | No |
/// | `InvalidArgument` | Caller misuse of the public contract | No |
///
/// The client never retries internally: a retried POST or PUT could
/// duplicate a non-idempotent side effect, so remediation belongs to the
/// caller.
///
/// # Example
///
/// ```rust
/// use athenahealth::api::common::ApiError;
/// use reqwest::StatusCode;
///
/// let err = ApiError::Api {
///     status: StatusCode::BAD_REQUEST,
///     message: "The data provided is invalid".to_string(),
/// };
///
/// assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
/// ```
#[derive(Error, Debug)]
pub enum ApiError {
    /// The OAuth client-credentials grant failed or was rejected.
    ///
    /// The current call is lost, but the client recovers by forcing a
    /// fresh grant exchange on the next call.
    ///
    /// # Parameters
    ///
    /// - `0` - Detailed reason for the authentication failure
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The request exceeded the configured deadline.
    ///
    /// Kept separate from [`ApiError::Network`] so callers can tell a slow
    /// upstream apart from an unreachable one.
    #[error("request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    /// A network-level error occurred during the request.
    ///
    /// Covers connection failures, DNS resolution errors, TLS problems,
    /// and other transport-layer issues. Surfaced verbatim; the client
    /// performs no internal retry.
    ///
    /// # Parameters
    ///
    /// - `0` - The underlying `reqwest::Error` with transport details
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The remote API responded with an explicit failure indication.
    ///
    /// This covers both non-2xx statuses and the HTTP 200 responses that
    /// embed `"success": false` (or `"success": 0`) in their body. The
    /// message is extracted from whichever failure envelope the endpoint
    /// used; when no envelope matches, the raw body is carried instead.
    #[error("API error ({status}): {message}")]
    Api {
        /// The HTTP status of the response.
        status: StatusCode,
        /// The failure message extracted from the response envelope, or
        /// the raw body when no known envelope matched.
        message: String,
    },

    /// The response body did not match the expected shape.
    ///
    /// Distinct from [`ApiError::Api`]: the transport and the API both
    /// reported success, but the payload could not be deserialized into
    /// the type the operation expects.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The caller violated the public contract.
    ///
    /// Examples: empty credentials at construction, or a required option
    /// field left unset. Fatal for the call, never for the process.
    ///
    /// # Parameters
    ///
    /// - `0` - Description of the invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ApiError {
    /// Returns the HTTP status carried by this error, if any.
    ///
    /// Only [`ApiError::Api`] carries a status; every other variant
    /// returns `None`.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if this error came from the credential grant.
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Auth(_))
    }
}

impl From<reqwest::Error> for ApiError {
    /// Classifies a transport error, routing timeouts to their own variant.
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout(err)
        } else {
            ApiError::Network(err)
        }
    }
}

/// Envelope for endpoints that report failure under a `message` key.
///
/// ```json
/// {"message": "The data provided is invalid", "success": false}
/// ```
///
/// Both fields are optional on the wire; missing fields decode to their
/// defaults so a bare `{"success": true}` acknowledgement still parses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable outcome description.
    #[serde(default)]
    pub message: String,

    /// Logical success flag, independent of the HTTP status.
    #[serde(default)]
    pub success: bool,
}

/// Envelope for endpoints that report failure under an `errormessage` key.
///
/// ```json
/// {"errormessage": "invalid date", "success": false}
/// ```
///
/// Identical to [`MessageResponse`] apart from the field name, an
/// inconsistency the remote API documents but does not fix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessageResponse {
    /// Human-readable failure description.
    #[serde(default, rename = "errormessage")]
    pub message: String,

    /// Logical success flag, independent of the HTTP status.
    #[serde(default)]
    pub success: bool,
}

/// Envelope for endpoints that report success as an integer.
///
/// ```json
/// {"errors": [{"field": "effectivedate"}], "success": 0}
/// ```
///
/// A further inconsistency in the remote API: `success` is `0`/`1` rather
/// than a boolean, and failures carry a structured `errors` array instead
/// of a message string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegerSuccessResponse {
    /// Structured error records; empty on success.
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,

    /// Logical success flag: `1` for success, `0` for failure.
    #[serde(default)]
    pub success: i64,
}
