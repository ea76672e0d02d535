//
//  athenahealth
//  auth/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Authentication Module
//!
//! This module implements authentication for the athenahealth APIs. The
//! platform uses the OAuth 2.0 client-credentials grant exclusively: a
//! client ID/secret pair is exchanged for a short-lived bearer token, with
//! no end user involved.
//!
//! ## Token Lifecycle
//!
//! 1. **First authenticated call**: no token is cached, so the manager
//!    performs a grant exchange and caches the result.
//! 2. **Subsequent calls**: the cached token is reused until shortly before
//!    its expiry (a safety margin absorbs clock skew and in-flight time).
//! 3. **Expiry**: the next call triggers a fresh exchange.
//! 4. **Rejection**: a 401 from any downstream call invalidates the cache,
//!    forcing a fresh grant on the next call even if the token looked valid
//!    locally.
//!
//! Concurrent callers never race to refresh: the exchange happens under an
//! exclusive lock, so N simultaneous cache misses collapse into exactly one
//! upstream request and the waiters share its result.
//!
//! ## Module Structure
//!
//! - [`oauth`]: Client-credentials grant and the [`TokenManager`]

mod oauth;

pub use oauth::*;
