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


//! HTTP client for the remote collection API
//!
//! `RemoteClient` wraps `reqwest::Client` and implements
//! [`RemoteCollection`] over the shelf and progress endpoints:
//!
//! - Bearer authentication resolved per request through the injected
//!   [`CredentialProvider`]; no request is sent without a usable token
//! - Bounded request concurrency via a semaphore, so a wide membership scan
//!   cannot open an unbounded number of connections
//! - Per-request timeout; a request that does not resolve in time fails
//!   rather than hanging the calling operation
//! - HTTP status mapping into the core error taxonomy: 401/403 become
//!   `AuthRequired`, 409/422 become `InvariantViolation`, 5xx/429 and
//!   transport failures become transient `RemoteUnavailable`
//! - Idempotent GETs are retried once with backoff on transient failures;
//!   mutations are sent exactly once and never retried automatically

use crate::api::remote::RemoteCollection;
use crate::api::wire::{
    AddEditionRequest, ProgressListResponse, ProgressRecord, ProgressUpdateRecord,
    ShelfEditionsResponse, ShelfListResponse, ShelfRecord,
};
use crate::auth::{require_token, CredentialProvider};
use crate::error::{Result, ShelfError};
use crate::model::{ClubId, EditionId, ShelfId};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;

/// Maximum number of concurrent requests to the remote collection
pub const MAX_CONCURRENCY: usize = 10;

/// Read attempts for idempotent GETs (1 initial + 1 retry)
const MAX_READ_ATTEMPTS: u32 = 2;

/// Initial retry delay in seconds (doubles per attempt)
const INITIAL_RETRY_DELAY_SECS: u64 = 1;

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for RemoteClient
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the collection API, e.g. `https://api.readerly.example`
    pub base_url: String,
    pub timeout: Duration,
    pub max_read_attempts: u32,
    pub user_agent: String,
    pub max_concurrency: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.readerly.example".to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_read_attempts: MAX_READ_ATTEMPTS,
            user_agent: "Readerly/0.1 (core)".to_string(),
            max_concurrency: MAX_CONCURRENCY,
        }
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }
}

/// Builder for ClientConfig
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    pub fn base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn max_read_attempts(mut self, attempts: u32) -> Self {
        self.config.max_read_attempts = attempts.max(1);
        self
    }

    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.config.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// HTTP implementation of [`RemoteCollection`]
pub struct RemoteClient {
    client: Client,
    credentials: Arc<dyn CredentialProvider>,
    base_url: Url,
    config: ClientConfig,
    semaphore: Arc<Semaphore>,
}

impl std::fmt::Debug for RemoteClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteClient")
            .field("base_url", &self.base_url)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RemoteClient {
    /// Create a client with default configuration
    pub fn new(credentials: Arc<dyn CredentialProvider>) -> Result<Self> {
        Self::with_config(credentials, ClientConfig::default())
    }

    /// Create a client with custom configuration
    ///
    /// # Errors
    /// Returns `ValidationError` for an unparseable base URL, or an error if
    /// the HTTP client cannot be built.
    pub fn with_config(
        credentials: Arc<dyn CredentialProvider>,
        config: ClientConfig,
    ) -> Result<Self> {
        // Trailing slash so Url::join treats the last path segment as a
        // directory instead of replacing it
        let normalized = if config.base_url.ends_with('/') {
            config.base_url.clone()
        } else {
            format!("{}/", config.base_url)
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| ShelfError::validation(format!("invalid base URL: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| ShelfError::validation(format!("invalid user agent: {e}")))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .pool_max_idle_per_host(config.max_concurrency)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        let semaphore = Arc::new(Semaphore::new(config.max_concurrency));

        Ok(Self {
            client,
            credentials,
            base_url,
            config,
            semaphore,
        })
    }

    /// The configured API base URL
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    // ===== Endpoint paths =====

    fn shelves_path() -> String {
        "shelves".to_string()
    }

    fn shelf_editions_path(shelf: &ShelfId) -> String {
        format!("shelves/{}/editions", urlencoding::encode(shelf.as_str()))
    }

    fn add_edition_path(shelf: &ShelfId) -> String {
        format!("shelves/{}/add_edition", urlencoding::encode(shelf.as_str()))
    }

    fn remove_edition_path(shelf: &ShelfId, edition: &EditionId) -> String {
        format!(
            "shelves/{}/remove_edition?edition_id={}",
            urlencoding::encode(shelf.as_str()),
            urlencoding::encode(edition.as_str())
        )
    }

    fn progress_path(club: &ClubId) -> String {
        format!("clubs/{}/progress", urlencoding::encode(club.as_str()))
    }

    fn progress_update_path(club: &ClubId) -> String {
        format!(
            "clubs/{}/progress/update",
            urlencoding::encode(club.as_str())
        )
    }

    fn endpoint_url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ShelfError::internal(format!("bad endpoint path '{path}': {e}")))
    }

    // ===== Request plumbing =====

    async fn auth_headers(&self) -> Result<HeaderMap> {
        let token = require_token(self.credentials.as_ref()).await?;
        let mut headers = HeaderMap::new();
        let value = format!("Bearer {}", token.secret());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&value)
                .map_err(|e| ShelfError::auth_required(format!("malformed token: {e}")))?,
        );
        Ok(headers)
    }

    /// Send one request. Bounded by the semaphore and the configured timeout;
    /// the auth header is resolved fresh so a sign-out mid-flight fails the
    /// next call, not this one.
    async fn send_once(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        invariant_subject: Option<&EditionId>,
    ) -> Result<Response> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| ShelfError::internal(format!("semaphore closed: {e}")))?;

        let headers = self.auth_headers().await?;
        let url = self.endpoint_url(path)?;

        let mut request = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| self.map_transport(e, path))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        Err(self
            .map_status(status, response, path, invariant_subject)
            .await)
    }

    /// GET with transient-failure retry; safe because reads are idempotent
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.send_once(Method::GET, path, None, None).await {
                Ok(response) => return self.decode(response, path).await,
                Err(e) if e.is_transient() && attempts < self.config.max_read_attempts => {
                    let delay =
                        Duration::from_secs(INITIAL_RETRY_DELAY_SECS << (attempts - 1).min(5));
                    warn!(endpoint = path, attempt = attempts, error = %e, "read failed, retrying");
                    sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Mutations are sent exactly once; a failure is surfaced to the caller,
    /// which rolls back its optimistic state.
    async fn mutate<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        invariant_subject: Option<&EditionId>,
    ) -> Result<()> {
        let body = match body {
            Some(b) => Some(serde_json::to_value(b)?),
            None => None,
        };
        let response = self
            .send_once(method, path, body.as_ref(), invariant_subject)
            .await?;
        debug!(endpoint = path, status = %response.status(), "mutation accepted");
        Ok(())
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response, path: &str) -> Result<T> {
        let status = response.status();
        let text = response.text().await.map_err(|e| {
            ShelfError::remote(
                format!("failed to read response body: {e}"),
                Some(status.as_u16()),
                Some(path.to_string()),
                true,
            )
        })?;

        match serde_json::from_str::<T>(&text) {
            Ok(value) => Ok(value),
            Err(e) => {
                // Keep a window of the body around the parse failure
                let col = e.column();
                let start = col.saturating_sub(200);
                let end = (col + 200).min(text.len());
                Err(ShelfError::InvalidRemoteResponse {
                    message: format!("parse error at col {col}: {e}"),
                    response_body: Some(text[start..end].to_string()),
                })
            }
        }
    }

    fn map_transport(&self, e: reqwest::Error, path: &str) -> ShelfError {
        if e.is_timeout() {
            return ShelfError::Timeout(self.config.timeout.as_secs());
        }
        ShelfError::remote(
            format!("request failed: {e}"),
            None,
            Some(path.to_string()),
            e.is_connect() || e.is_request(),
        )
    }

    async fn map_status(
        &self,
        status: StatusCode,
        response: Response,
        path: &str,
        invariant_subject: Option<&EditionId>,
    ) -> ShelfError {
        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ShelfError::auth_required(format!("remote rejected credential ({status})"))
            }
            StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => match invariant_subject {
                Some(edition) => ShelfError::invariant(
                    format!("remote rejected mutation ({status}): {body}"),
                    edition.as_str(),
                ),
                None => ShelfError::remote(
                    format!("unexpected conflict on read: {body}"),
                    Some(status.as_u16()),
                    Some(path.to_string()),
                    false,
                ),
            },
            StatusCode::TOO_MANY_REQUESTS => ShelfError::remote(
                "rate limited".to_string(),
                Some(status.as_u16()),
                Some(path.to_string()),
                true,
            ),
            s if s.is_server_error() => ShelfError::remote(
                format!("server error: {body}"),
                Some(s.as_u16()),
                Some(path.to_string()),
                true,
            ),
            s => ShelfError::remote(
                format!("request rejected: {body}"),
                Some(s.as_u16()),
                Some(path.to_string()),
                false,
            ),
        }
    }
}

#[async_trait]
impl RemoteCollection for RemoteClient {
    async fn list_shelves(&self) -> Result<Vec<ShelfRecord>> {
        let response: ShelfListResponse = self.get_json(&Self::shelves_path()).await?;
        Ok(response.shelves)
    }

    async fn shelf_editions(&self, shelf: &ShelfId) -> Result<Vec<EditionId>> {
        let response: ShelfEditionsResponse =
            self.get_json(&Self::shelf_editions_path(shelf)).await?;
        Ok(response.editions)
    }

    async fn add_edition(&self, shelf: &ShelfId, edition: &EditionId) -> Result<()> {
        let body = AddEditionRequest {
            edition_id: edition.clone(),
        };
        self.mutate(
            Method::POST,
            &Self::add_edition_path(shelf),
            Some(&body),
            Some(edition),
        )
        .await
    }

    async fn remove_edition(&self, shelf: &ShelfId, edition: &EditionId) -> Result<()> {
        self.mutate::<()>(
            Method::DELETE,
            &Self::remove_edition_path(shelf, edition),
            None,
            Some(edition),
        )
        .await
    }

    async fn fetch_progress(
        &self,
        club: &ClubId,
        edition: &EditionId,
    ) -> Result<Option<ProgressRecord>> {
        let response: ProgressListResponse = self.get_json(&Self::progress_path(club)).await?;
        Ok(response
            .progress
            .into_iter()
            .find(|record| &record.edition_id == edition))
    }

    async fn update_progress(
        &self,
        club: &ClubId,
        update: &ProgressUpdateRecord,
    ) -> Result<ProgressRecord> {
        let body = serde_json::to_value(update)?;
        let response = self
            .send_once(
                Method::POST,
                &Self::progress_update_path(club),
                Some(&body),
                Some(&update.edition_id),
            )
            .await?;
        self.decode(response, &Self::progress_update_path(club)).await
    }
}

// ===== TESTS =====

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{BearerToken, StaticCredentials};

    fn test_client() -> RemoteClient {
        let creds = Arc::new(StaticCredentials(BearerToken::new("t")));
        RemoteClient::new(creds).unwrap()
    }

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::builder()
            .base_url("https://shelves.test")
            .timeout(Duration::from_secs(5))
            .max_read_attempts(3)
            .user_agent("TestAgent/1.0")
            .max_concurrency(4)
            .build();

        assert_eq!(config.base_url, "https://shelves.test");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_read_attempts, 3);
        assert_eq!(config.user_agent, "TestAgent/1.0");
        assert_eq!(config.max_concurrency, 4);
    }

    #[test]
    fn test_invalid_base_url_is_validation_error() {
        let creds = Arc::new(StaticCredentials(BearerToken::new("t")));
        let config = ClientConfig::builder().base_url("not a url").build();
        let err = RemoteClient::with_config(creds, config).unwrap_err();
        assert!(matches!(err, ShelfError::ValidationError(_)));
    }

    #[test]
    fn test_endpoint_paths_encode_ids() {
        let shelf = ShelfId::from("sh 1/ä");
        let edition = EditionId::from("ed?9");
        assert_eq!(
            RemoteClient::shelf_editions_path(&shelf),
            "shelves/sh%201%2F%C3%A4/editions"
        );
        assert!(RemoteClient::remove_edition_path(&shelf, &edition)
            .ends_with("remove_edition?edition_id=ed%3F9"));
    }

    #[test]
    fn test_base_url_join() {
        let client = test_client();
        let url = client.endpoint_url("shelves/sh-1/editions").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.readerly.example/shelves/sh-1/editions"
        );
    }

    #[tokio::test]
    async fn test_auth_headers_carry_bearer_token() {
        let client = test_client();
        let headers = client.auth_headers().await.unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer t");
    }
}
