//! HTTP transport for the EC2 query API

use super::transport::{ApiTransport, DESCRIBE_INSTANCES};
use crate::config::{Filter, SdConfig};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and drops control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = match body.char_indices().nth(MAX_LOG_BODY_LENGTH) {
        Some((idx, _)) => format!("{}... [truncated, {} bytes total]", &body[..idx], body.len()),
        None => body.to_string(),
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// HTTP transport for EC2 API calls
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
    api_version: String,
    filters: Vec<Filter>,
    bearer_token: Option<String>,
}

impl HttpTransport {
    /// Create a new HTTP transport
    pub fn new(endpoint: Url, api_version: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("ec2-sd/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint,
            api_version: api_version.to_string(),
            filters: Vec::new(),
            bearer_token: None,
        })
    }

    /// Create a transport from the discovery job configuration
    pub fn from_config(config: &SdConfig) -> Result<Self> {
        let transport = Self::new(
            config.endpoint_url()?,
            &config.api_version,
            config.request_timeout(),
        )?
        .with_filters(config.filters.clone());

        Ok(match &config.bearer_token {
            Some(token) if !token.is_empty() => transport.with_bearer_token(token),
            _ => transport,
        })
    }

    /// Filters applied to `DescribeInstances`
    pub fn with_filters(mut self, filters: Vec<Filter>) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_bearer_token(mut self, token: &str) -> Self {
        self.bearer_token = Some(token.to_string());
        self
    }

    /// Build the request URL for one page of `action`
    pub fn request_url(&self, action: &str, page_token: &str) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("Action", action)
                .append_pair("Version", &self.api_version);
            if !page_token.is_empty() {
                query.append_pair("NextToken", page_token);
            }
            if action == DESCRIBE_INSTANCES {
                for (i, filter) in self.filters.iter().enumerate() {
                    query.append_pair(&format!("Filter.{}.Name", i + 1), &filter.name);
                    for (j, value) in filter.values.iter().enumerate() {
                        query.append_pair(&format!("Filter.{}.Value.{}", i + 1, j + 1), value);
                    }
                }
            }
        }
        url
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn call(&self, action: &str, page_token: &str) -> Result<Vec<u8>> {
        let url = self.request_url(action, page_token);
        tracing::debug!("GET {} (action={})", url.path(), action);

        let mut request = self
            .client
            .get(url)
            .header(ACCEPT, "application/json");
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.context("Failed to send request")?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            // Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!(
                "API error: {} - {}",
                status,
                sanitize_for_log(&String::from_utf8_lossy(&body))
            );
            return Err(anyhow::anyhow!("API request failed: {}", status));
        }

        Ok(body.to_vec())
    }
}
