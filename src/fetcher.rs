// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Single-request HTTP access to the GitHub REST API.
//!
//! [`Fetcher`] issues one GET at a time through a [`Transport`], waits out
//! rate-limit rejections according to its [`RetryPolicy`], and reduces every
//! other failure to `None`. Callers treat `None` as "no data", never as a
//! reason to stop.

use std::future::Future;

use http::header::{ACCEPT, HeaderName};
use masterror::AppError;
use octocrab::{Octocrab, service::middleware::retry::RetryConfig};
use serde_json::Value;
use tracing::{debug, warn};

use crate::retry::{Clock, RetryPolicy};

/// Media type requested from the GitHub REST API.
const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";
/// REST API version pinned when a credential is configured.
const GITHUB_API_VERSION: &str = "2022-11-28";
/// Header carrying the epoch second at which the rate-limit window resets.
const RATE_LIMIT_RESET_HEADER: &str = "x-ratelimit-reset";
/// Page size used by [`Fetcher::fetch_all`](crate::Fetcher::fetch_all).
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Status, reset header and body of one HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status:           u16,
    /// Value of the `X-RateLimit-Reset` header, when present and numeric.
    pub rate_limit_reset: Option<i64>,
    /// Response body as text.
    pub body:             String
}

impl RawResponse {
    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns `true` when GitHub rejected the request for exceeding the rate
    /// limit: a 403 whose body mentions the rate limit.
    pub fn is_rate_limited(&self) -> bool {
        self.status == 403 && self.body.to_lowercase().contains("rate limit")
    }
}

/// Low-level GET capability used by [`Fetcher`].
///
/// `route` is an API path relative to the base URL, including its query
/// string. Implementations return `Err` only when no HTTP response was
/// obtained at all.
pub trait Transport {
    /// Performs a GET request and returns the raw response.
    fn get(&self, route: &str) -> impl Future<Output = Result<RawResponse, AppError>>;
}

/// [`Transport`] backed by an [`octocrab`] client pointed at api.github.com.
#[derive(Debug, Clone)]
pub struct GitHubTransport {
    client: Octocrab
}

impl GitHubTransport {
    /// Builds the transport, authenticating with `token` when provided.
    ///
    /// The version header is only sent together with a credential.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] when the underlying HTTP client cannot be built.
    pub fn new(token: Option<&str>) -> Result<Self, AppError> {
        Self::from_builder(client_builder(token))
    }

    /// Builds the transport against another API root, such as a GitHub
    /// Enterprise Server at `https://host/api/v3`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] when `base_uri` is not a valid URI or the HTTP
    /// client cannot be built.
    pub fn with_base_uri(token: Option<&str>, base_uri: &str) -> Result<Self, AppError> {
        let builder = client_builder(token)
            .base_uri(base_uri)
            .map_err(|e| AppError::service(format!("invalid GitHub API URI {base_uri}: {e}")))?;
        Self::from_builder(builder)
    }

    fn from_builder(builder: OctocrabBuilder) -> Result<Self, AppError> {
        let client = builder.build().map_err(|e| {
            AppError::service(format!("failed to initialize GitHub client: {e}"))
        })?;

        Ok(Self {
            client
        })
    }
}

type OctocrabBuilder = octocrab::OctocrabBuilder<
    octocrab::NoSvc,
    octocrab::DefaultOctocrabBuilderConfig,
    octocrab::NoAuth,
    octocrab::NotLayerReady
>;

/// Client builder without octocrab's retry middleware: one
/// [`Transport::get`] is exactly one HTTP request.
fn client_builder(token: Option<&str>) -> OctocrabBuilder {
    let mut builder = Octocrab::builder()
        .add_retry_config(RetryConfig::None)
        .add_header(ACCEPT, GITHUB_MEDIA_TYPE.to_owned());

    if let Some(token) = token {
        builder = builder.personal_token(token.to_owned()).add_header(
            HeaderName::from_static("x-github-api-version"),
            GITHUB_API_VERSION.to_owned()
        );
    }

    builder
}

impl Transport for GitHubTransport {
    async fn get(&self, route: &str) -> Result<RawResponse, AppError> {
        let response = self
            .client
            ._get(route)
            .await
            .map_err(|e| AppError::service(format!("GET {route} failed: {e}")))?;

        let status = response.status().as_u16();
        let rate_limit_reset = response
            .headers()
            .get(RATE_LIMIT_RESET_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<i64>().ok());

        let body = self
            .client
            .body_to_string(response)
            .await
            .map_err(|e| AppError::service(format!("failed to read body of {route}: {e}")))?;

        Ok(RawResponse {
            status,
            rate_limit_reset,
            body
        })
    }
}

/// Rate-limit aware GET client.
///
/// Strictly sequential: each call awaits its response (and any backoff)
/// before returning.
#[derive(Debug)]
pub struct Fetcher<T, C> {
    transport: T,
    clock:     C,
    policy:    RetryPolicy,
    page_size: usize
}

impl<T, C> Fetcher<T, C>
where
    T: Transport,
    C: Clock
{
    /// Creates a fetcher with the default retry policy and page size.
    pub fn new(transport: T, clock: C) -> Self {
        Self {
            transport,
            clock,
            policy: RetryPolicy::default(),
            page_size: DEFAULT_PAGE_SIZE
        }
    }

    /// Replaces the retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the page size used for pagination. Zero is raised to one.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Clock shared with the collector for timestamps.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Page size used for pagination.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Fetches `path` with `query` and decodes the body as JSON.
    ///
    /// Returns `None` when the request fails, stays rate limited after the
    /// permitted retries, answers with an empty body, or the body is not
    /// JSON. Each of these cases is logged.
    pub async fn fetch(&self, path: &str, query: &[(&str, String)]) -> Option<Value> {
        let route = build_route(path, query);
        let response = self.send(&route).await?;

        if response.body.trim().is_empty() {
            debug!(route = %route, status = response.status, "empty response body");
            return None;
        }

        match serde_json::from_str(&response.body) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(route = %route, "response is not valid JSON: {e}");
                None
            }
        }
    }

    /// Reports whether `path` answers with a success status.
    ///
    /// Used for endpoints that signal a boolean through `204 No Content`
    /// versus `404 Not Found`.
    pub async fn probe(&self, path: &str) -> bool {
        self.send(path).await.is_some()
    }

    async fn send(&self, route: &str) -> Option<RawResponse> {
        let mut attempt = 1;

        loop {
            debug!(route = %route, attempt, "GET");
            let response = match self.transport.get(route).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(route = %route, "error making request: {e}");
                    return None;
                }
            };

            if response.is_rate_limited() {
                if !self.policy.allows_retry(attempt) {
                    warn!(route = %route, attempt, "still rate limited, giving up");
                    return None;
                }

                let wait = self
                    .policy
                    .rate_limit_wait(response.rate_limit_reset, self.clock.now().timestamp());
                warn!(route = %route, "rate limit reached, waiting {}s", wait.as_secs());
                self.clock.sleep(wait).await;
                attempt += 1;
                continue;
            }

            if !response.is_success() {
                warn!(route = %route, status = response.status, "request failed");
                return None;
            }

            return Some(response);
        }
    }
}

/// Appends `query` to `path` as a query string.
///
/// Values are inserted verbatim; callers only pass numbers and plain
/// keywords.
pub fn build_route(path: &str, query: &[(&str, String)]) -> String {
    if query.is_empty() {
        return path.to_owned();
    }

    let pairs: Vec<String> = query
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect();
    let separator = if path.contains('?') { '&' } else { '?' };

    format!("{path}{separator}{}", pairs.join("&"))
}
