//
//  athenahealth
//  api/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # API Client Layer
//!
//! This module provides the HTTP client for the athenahealth REST APIs.
//!
//! ## Architecture
//!
//! The API layer is organized as follows:
//!
//! - [`client`]: Core HTTP client with authentication, request dispatch, and
//!   response classification
//! - [`common`]: Shared types (error taxonomy, response envelopes)
//! - [`risk_contracts`]: Risk contract resource operations
//!
//! ## Usage
//!
//! ### Creating a Client
//!
//! ```rust,no_run
//! use athenahealth::api::AthenaClient;
//! use athenahealth::config::Credentials;
//!
//! let credentials = Credentials::new("195900", "client-id", "client-secret")
//!     .expect("invalid credentials");
//!
//! // Production environment
//! let client = AthenaClient::production(credentials.clone())
//!     .expect("failed to create client");
//!
//! // Preview (sandbox) environment
//! let sandbox = AthenaClient::preview(credentials)
//!     .expect("failed to create client");
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`ApiError`] variants, which separate the four
//! failure classes callers care about:
//!
//! - `Auth`: the credential grant failed or was rejected
//! - `Network` / `Timeout`: transport-level failures
//! - `Api`: the remote answered with an explicit failure indication
//! - `Decode`: the response body did not match the expected shape

/// Core HTTP client for the athenahealth APIs.
///
/// Provides the [`AthenaClient`] struct which handles:
/// - Practice-scoped URL composition
/// - Bearer token injection (with transparent renewal)
/// - Query-string and form-encoded request building
/// - Response decoding and error classification
pub mod client;

/// Common types shared across the API layer.
///
/// Includes:
/// - [`ApiError`]: Standardized error taxonomy
/// - [`MessageResponse`] / [`ErrorMessageResponse`] /
///   [`IntegerSuccessResponse`]: the failure envelope shapes the remote
///   API is known to produce
pub mod common;

/// Risk contract resource operations.
///
/// Patient chart risk contracts (list, create, delete) and the
/// population-management risk contract reference endpoints (get, update).
pub mod risk_contracts;

/// Re-export of the main athenahealth API client.
pub use client::AthenaClient;

/// Re-export of common API types.
pub use common::{ApiError, ErrorMessageResponse, IntegerSuccessResponse, MessageResponse};
