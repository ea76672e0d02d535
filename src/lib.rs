//
//  athenahealth
//  lib.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # athenahealth Client Library
//!
//! A typed Rust client for the athenahealth practice-management REST APIs.
//!
//! ## Overview
//!
//! This library handles the plumbing every athenahealth integration needs:
//! OAuth 2.0 client-credentials authentication with transparent token
//! renewal, request construction for query-string and form-encoded calls,
//! JSON response decoding into typed structures, and a uniform error
//! contract that distinguishes transport failures, API-level failures, and
//! decode failures.
//!
//! ## Features
//!
//! - **Client-Credentials Auth**: One token per client, refreshed lazily and
//!   shared safely across concurrent tasks (a cold cache triggers exactly
//!   one grant exchange no matter how many callers race).
//! - **Typed Resource Operations**: Risk contract endpoints with options
//!   structs mirroring the documented API parameters.
//! - **Uniform Errors**: The remote signals failure inconsistently: HTTP
//!   status codes, `{"success": false}` bodies, even `{"success": 0}` with
//!   an `errors` array. All of it surfaces as one [`ApiError`] taxonomy.
//! - **Tenant Scoping**: Every request path is scoped to the configured
//!   practice ID.
//!
//! ## Module Structure
//!
//! - [`api`]: HTTP client core and resource operations
//! - [`auth`]: OAuth 2.0 client-credentials grant and token caching
//! - [`config`]: Credential loading and validation
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use athenahealth::{AthenaClient, Credentials};
//!
//! # async fn example() -> Result<(), athenahealth::ApiError> {
//! let credentials = Credentials::from_env()?;
//! let client = AthenaClient::preview(credentials)?;
//!
//! let contracts = client.list_risk_contracts("4772", None).await?;
//! for contract in contracts {
//!     println!("{}: {}", contract.risk_contract_id, contract.contract_name);
//! }
//! # Ok(())
//! # }
//! ```

/// API client core and resource operations.
///
/// This module provides the HTTP client for the athenahealth APIs:
/// - [`api::AthenaClient`]: verb primitives, URL composition, response decoding
/// - [`api::risk_contracts`]: patient chart and reference risk contract endpoints
///
/// The client handles authentication, request building, and error
/// classification for every call.
pub mod api;

/// Authentication and token lifecycle management.
///
/// Implements the OAuth 2.0 client-credentials grant against the
/// athenahealth token endpoint and caches the resulting bearer token until
/// shortly before expiry. Concurrent refreshes are collapsed into a single
/// upstream exchange.
pub mod auth;

/// Credential configuration.
///
/// Provides the [`Credentials`] value consumed at client construction:
/// practice ID, client ID, and client secret. Credentials can be supplied
/// directly or loaded from the `ATHENA_*` environment variables.
pub mod config;

/// Re-export of the main API client.
///
/// This is the primary entry point for making athenahealth API requests.
pub use api::AthenaClient;

/// Re-export of the unified error type.
///
/// Every fallible operation in this crate returns [`ApiError`].
pub use api::ApiError;

/// Re-export of the credential container.
pub use config::Credentials;

/// Library version constant.
///
/// Derived from Cargo.toml at compile time and sent in the `User-Agent`
/// header of every request.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
