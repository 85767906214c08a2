//! GitHub gist client.
//!
//! Replaces the content of a single file in a gist with a `PATCH` request.
//! Each publish overwrites the file entirely.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

use crate::config::GistConfig;
use crate::error::{ProxyError, Result};
use crate::publish::SnapshotSink;

/// GitHub REST API version header value.
const GITHUB_API_VERSION: &str = "2022-11-28";

/// Gist API client.
#[derive(Debug, Clone)]
pub struct GistClient {
    config: GistConfig,
    client: Client,
}

impl GistClient {
    /// Creates a new gist client with the given configuration.
    pub fn new(config: GistConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("signatures-proxy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProxyError::publish(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Full URL of the gist being updated.
    pub fn gist_url(&self) -> String {
        format!(
            "{}/gists/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.gist_id
        )
    }

    /// Maps a non-success response to an error.
    fn parse_error(&self, status: StatusCode, body: &str) -> ProxyError {
        match status {
            StatusCode::UNAUTHORIZED => {
                ProxyError::publish("Authentication failed. Check your GITHUB_TOKEN.")
            }
            StatusCode::NOT_FOUND => ProxyError::publish(format!(
                "Gist '{}' not found, or the token cannot access it.",
                self.config.gist_id
            )),
            _ => match serde_json::from_str::<GithubErrorResponse>(body) {
                Ok(error_response) => ProxyError::publish(format!(
                    "Gist API error ({status}): {}",
                    error_response.message
                )),
                Err(_) => ProxyError::publish(format!("Gist API error ({status}): {body}")),
            },
        }
    }
}

#[async_trait]
impl SnapshotSink for GistClient {
    async fn publish(&self, content: &str) -> Result<()> {
        let token = self
            .config
            .token
            .as_deref()
            .ok_or_else(|| ProxyError::publish("GITHUB_TOKEN is not set"))?;

        let mut files = BTreeMap::new();
        files.insert(self.config.file_name.as_str(), GistFileContent { content });
        let payload = GistPatch { files };

        let url = self.gist_url();
        debug!("PATCH {url}");

        let response = self
            .client
            .patch(&url)
            .bearer_auth(token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ProxyError::publish(format!("Request to {url} failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(self.parse_error(status, &body))
    }
}

// Gist API request/response types

#[derive(Debug, Serialize)]
struct GistPatch<'a> {
    files: BTreeMap<&'a str, GistFileContent<'a>>,
}

#[derive(Debug, Serialize)]
struct GistFileContent<'a> {
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct GithubErrorResponse {
    message: String,
}
