//! Cloudflare API Client
//!
//! reqwest-backed transport against the v4 REST API.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::transport::{ApiReply, CloudflareTransport};
use crate::error::TransportError;

pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Cloudflare API client
pub struct CloudflareClient {
    http_client: Client,
    api_token: String,
    base_url: String,
}

impl CloudflareClient {
    /// Create a new client authenticating with a bearer token
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        let http_client = Client::builder()
            .user_agent(concat!("cloudflare-domains/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            api_token: api_token.into(),
            base_url: CLOUDFLARE_API_BASE.to_string(),
        })
    }

    /// Point the client at a different API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl CloudflareTransport for CloudflareClient {
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiReply, TransportError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "Calling Cloudflare API");

        let mut request = self
            .http_client
            .request(method, &url)
            .bearer_auth(&self.api_token);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| TransportError::Request {
            path: path.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| TransportError::Request {
            path: path.to_string(),
            message: e.to_string(),
        })?;

        debug!(status, bytes = text.len(), "Cloudflare API responded");
        Ok(ApiReply::from_text(status, text))
    }
}
