//! API client for communicating with the treehole REST API.
//!
//! This module provides the `ApiClient` struct for making (optionally
//! authenticated) requests for divisions and hole pages.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::models::{Division, DivisionId, Hole, TagFilter};
use crate::store::{DivisionSource, HoleSource};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

const DIVISIONS_RESOURCE: &str = "divisions";

/// API client for the treehole service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client rooted at `base_url`
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        if let Some(ref token) = self.token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        Ok(headers)
    }

    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(
        response: reqwest::Response,
        resource: &str,
    ) -> Result<Option<reqwest::Response>> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, resource, &body).into())
        }
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/{}", self.base_url, resource)
    }

    /// GET `resource` (a path below the API root) and decode the JSON body.
    async fn get<T: DeserializeOwned>(&self, resource: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.url(resource);
        let url = url.as_str();
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self
                .client
                .get(url)
                .headers(self.auth_headers()?)
                .query(query)
                .send()
                .await
                .map_err(ApiError::from)
                .with_context(|| format!("Failed to send GET request to {}", url))?;

            match Self::check_response_for_retry(response, resource).await? {
                Some(response) => {
                    return response.json().await
                        .with_context(|| format!("Failed to parse JSON response from {}", url));
                }
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited.into());
                    }
                    warn!(url = url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2;
                }
            }
        }
    }

    fn holes_resource(division_id: DivisionId) -> String {
        format!("divisions/{}/holes", division_id)
    }

    /// Query parameters for one page of holes on or before `before`.
    fn holes_query(
        before: DateTime<Utc>,
        size: usize,
        tag: Option<&TagFilter>,
    ) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("offset", before.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ("size", size.to_string()),
        ];
        if let Some(tag) = tag {
            query.push(("tag", tag.query_value().to_string()));
        }
        query
    }

    // ===== Data Fetching Methods =====

    /// Fetch every division
    pub async fn fetch_divisions(&self) -> Result<Vec<Division>> {
        let divisions: Vec<Division> = self.get(DIVISIONS_RESOURCE, &[]).await?;
        debug!(count = divisions.len(), "Divisions response received");
        Ok(divisions)
    }

    /// Fetch up to `size` holes of a division updated on or before `before`
    pub async fn fetch_holes(
        &self,
        division_id: DivisionId,
        before: DateTime<Utc>,
        size: usize,
        tag: Option<&TagFilter>,
    ) -> Result<Vec<Hole>> {
        let query = Self::holes_query(before, size, tag);
        let holes: Vec<Hole> = self.get(&Self::holes_resource(division_id), &query).await?;
        debug!(division_id, count = holes.len(), "Holes response received");
        Ok(holes)
    }
}

#[async_trait]
impl DivisionSource for ApiClient {
    async fn list_divisions(&self) -> Result<Vec<Division>> {
        self.fetch_divisions().await
    }
}

#[async_trait]
impl HoleSource for ApiClient {
    async fn list_holes(
        &self,
        division_id: DivisionId,
        before: DateTime<Utc>,
        size: usize,
        tag: Option<&TagFilter>,
    ) -> Result<Vec<Hole>> {
        self.fetch_holes(division_id, before, size, tag).await
    }
}
