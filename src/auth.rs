// Readerly - Reading Shelves and Club Progress
// Copyright (C) 2026 Readerly contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Credential access for core operations
//!
//! Session issuance and refresh are owned by the authentication collaborator;
//! the core only needs a bearer token at the moment it talks to the remote.
//! Instead of a shared global accessor, every operation resolves its token
//! through an injected [`CredentialProvider`], which returns a typed absence
//! when nobody is signed in. Absence (or an expired token) surfaces as
//! `AuthRequired` before any request is sent.
//!
//! # Security Considerations
//!
//! - Tokens must never appear in logs; `BearerToken` deliberately has no
//!   `Display` impl and its `Debug` output masks the secret.
//! - Expiry is checked locally when known, so an obviously dead token fails
//!   fast without a round trip.

use crate::error::{Result, ShelfError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use tokio::sync::RwLock;

/// A bearer credential for the remote collection API
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken {
    /// The opaque token value sent in the Authorization header
    token: String,

    /// Expiry instant when the issuer communicated one
    expires_at: Option<DateTime<Utc>>,
}

impl BearerToken {
    /// Create a token without expiry information
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self {
            token: token.into(),
            expires_at: None,
        }
    }

    /// Create a token with a known expiry instant
    pub fn with_expiry<S: Into<String>>(token: S, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_at: Some(expires_at),
        }
    }

    /// The raw secret, for building the Authorization header
    pub fn secret(&self) -> &str {
        &self.token
    }

    /// Expiry instant, if the issuer communicated one
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// True when the expiry instant is known and has passed
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(at) => at <= Utc::now(),
            None => false,
        }
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerToken")
            .field("token", &"***")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Source of the signed-in user's bearer credential.
///
/// Injected into every core component that talks to the remote; `None` means
/// no session is available and the operation must fail `AuthRequired`.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Current bearer token, or `None` when nobody is signed in
    async fn bearer_token(&self) -> Option<BearerToken>;
}

/// Resolve a usable token from a provider, or fail `AuthRequired`
pub async fn require_token(provider: &dyn CredentialProvider) -> Result<BearerToken> {
    match provider.bearer_token().await {
        Some(token) if !token.is_expired() => Ok(token),
        Some(_) => Err(ShelfError::auth_required("bearer token expired")),
        None => Err(ShelfError::auth_required("no active session")),
    }
}

/// Shared mutable session credential, updated by the sign-in/sign-out flows
/// and read by every core operation
#[derive(Default)]
pub struct SessionCredentials {
    token: RwLock<Option<BearerToken>>,
}

impl SessionCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the token obtained from a completed sign-in
    pub async fn set_token(&self, token: BearerToken) {
        *self.token.write().await = Some(token);
    }

    /// Drop the session (sign-out or forced invalidation)
    pub async fn clear(&self) {
        *self.token.write().await = None;
    }
}

#[async_trait]
impl CredentialProvider for SessionCredentials {
    async fn bearer_token(&self) -> Option<BearerToken> {
        self.token.read().await.clone()
    }
}

/// Fixed credential, for tests and the CLI driver
pub struct StaticCredentials(pub BearerToken);

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn bearer_token(&self) -> Option<BearerToken> {
        Some(self.0.clone())
    }
}

// ===== TESTS =====
