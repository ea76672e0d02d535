//
//  athenahealth
//  config/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Credential Configuration
//!
//! This module provides the [`Credentials`] value consumed when an
//! [`AthenaClient`](crate::AthenaClient) is constructed: the practice ID
//! that scopes every request path, and the OAuth client ID/secret pair used
//! for the client-credentials grant.
//!
//! ## Overview
//!
//! The library does not read configuration files. Credentials are either
//! supplied directly by the caller or loaded from environment variables:
//!
//! | Variable | Fallback | Purpose |
//! |----------|----------|---------|
//! | `ATHENA_PRACTICE_ID` | (none) | Tenant identifier |
//! | `ATHENA_CLIENT_ID` | `ATHENA_API_KEY` | OAuth client ID |
//! | `ATHENA_CLIENT_SECRET` | `ATHENA_API_SECRET` | OAuth client secret |
//!
//! The fallback names exist because both conventions appear in deployed
//! environments.
//!
//! ## Example
//!
//! ```rust,no_run
//! use athenahealth::config::Credentials;
//!
//! // From the environment
//! let credentials = Credentials::from_env().expect("ATHENA_* variables not set");
//!
//! // Or supplied directly
//! let credentials = Credentials::new("195900", "client-id", "client-secret")
//!     .expect("invalid credentials");
//! ```
//!
//! ## Notes
//!
//! - All three fields are required; empty values are rejected at
//!   construction with a typed error rather than failing later mid-request.
//! - The `Debug` implementation redacts the client secret.

use std::env;
use std::fmt;

use crate::api::common::ApiError;

/// OAuth credentials and tenant scope for an athenahealth client.
///
/// Immutable once constructed. The client owns its credentials exclusively
/// and never exposes them back to callers; the secret does not appear in
/// `Debug` output.
///
/// # Fields
///
/// * `practice_id` - Tenant identifier scoping all API paths
/// * `client_id` - OAuth 2.0 client identifier
/// * `client_secret` - OAuth 2.0 client secret (redacted in `Debug`)
///
/// # Example
///
/// ```rust
/// use athenahealth::config::Credentials;
///
/// let credentials = Credentials::new("195900", "my-client-id", "my-secret").unwrap();
/// assert_eq!(credentials.practice_id(), "195900");
///
/// // The secret never leaks through Debug
/// let debug = format!("{:?}", credentials);
/// assert!(!debug.contains("my-secret"));
/// ```
#[derive(Clone)]
pub struct Credentials {
    practice_id: String,
    client_id: String,
    client_secret: String,
}

impl Credentials {
    /// Creates credentials from explicit values.
    ///
    /// # Parameters
    ///
    /// * `practice_id` - The practice (tenant) identifier
    /// * `client_id` - The OAuth client ID
    /// * `client_secret` - The OAuth client secret
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidArgument`] if any field is empty.
    pub fn new(
        practice_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self, ApiError> {
        let credentials = Self {
            practice_id: practice_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        };
        credentials.validate()?;
        Ok(credentials)
    }

    /// Loads credentials from the `ATHENA_*` environment variables.
    ///
    /// Reads `ATHENA_PRACTICE_ID`, `ATHENA_CLIENT_ID` (falling back to
    /// `ATHENA_API_KEY`), and `ATHENA_CLIENT_SECRET` (falling back to
    /// `ATHENA_API_SECRET`).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidArgument`] naming the missing variable
    /// when any required value is absent or empty.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use athenahealth::config::Credentials;
    ///
    /// let credentials = Credentials::from_env()?;
    /// # Ok::<(), athenahealth::ApiError>(())
    /// ```
    pub fn from_env() -> Result<Self, ApiError> {
        let practice_id = env_var("ATHENA_PRACTICE_ID", None)?;
        let client_id = env_var("ATHENA_CLIENT_ID", Some("ATHENA_API_KEY"))?;
        let client_secret = env_var("ATHENA_CLIENT_SECRET", Some("ATHENA_API_SECRET"))?;

        Self::new(practice_id, client_id, client_secret)
    }

    /// Returns the practice (tenant) identifier.
    pub fn practice_id(&self) -> &str {
        &self.practice_id
    }

    /// Returns the OAuth client ID.
    pub(crate) fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the OAuth client secret.
    pub(crate) fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Rejects empty fields with a typed error.
    fn validate(&self) -> Result<(), ApiError> {
        if self.practice_id.is_empty() {
            return Err(ApiError::InvalidArgument(
                "practice_id must not be empty".to_string(),
            ));
        }
        if self.client_id.is_empty() {
            return Err(ApiError::InvalidArgument(
                "client_id must not be empty".to_string(),
            ));
        }
        if self.client_secret.is_empty() {
            return Err(ApiError::InvalidArgument(
                "client_secret must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("practice_id", &self.practice_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Reads an environment variable, trying `fallback` before giving up.
fn env_var(name: &str, fallback: Option<&str>) -> Result<String, ApiError> {
    if let Ok(value) = env::var(name) {
        if !value.is_empty() {
            return Ok(value);
        }
    }

    if let Some(fallback_name) = fallback {
        if let Ok(value) = env::var(fallback_name) {
            if !value.is_empty() {
                return Ok(value);
            }
        }
    }

    Err(ApiError::InvalidArgument(format!(
        "environment variable {} is not set",
        name
    )))
}
