//! Configuration Management
//!
//! Handles the discovery job configuration for ec2-sd.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// EC2 API version sent with every request
pub const DEFAULT_API_VERSION: &str = "2016-11-15";

/// Region used when neither the config nor the environment names one
pub const DEFAULT_REGION: &str = "us-east-1";

fn default_port() -> u16 {
    80
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_refresh_interval_secs() -> u64 {
    60
}

/// Instance filter, sent as `Filter.N.Name` / `Filter.N.Value.M`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
}

/// Discovery job configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SdConfig {
    /// Region to discover instances in
    #[serde(default)]
    pub region: Option<String>,
    /// Overrides the regional API endpoint
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Port appended to each instance's private IP
    #[serde(default = "default_port")]
    pub port: u16,
    /// Filters applied to the instance listing
    #[serde(default)]
    pub filters: Vec<Filter>,
    /// Bearer token for endpoints fronted by an authenticating proxy
    #[serde(default)]
    pub bearer_token: Option<String>,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

impl Default for SdConfig {
    fn default() -> Self {
        Self {
            region: None,
            endpoint: None,
            port: default_port(),
            filters: Vec::new(),
            bearer_token: None,
            api_version: default_api_version(),
            request_timeout_secs: default_request_timeout_secs(),
            refresh_interval_secs: default_refresh_interval_secs(),
        }
    }
}

impl SdConfig {
    /// Get the default config file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ec2-sd").join("config.yaml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default path is tried and
    /// a missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) if p.exists() => p,
                _ => return Ok(Self::default()),
            },
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        Self::parse(&content, &path)
    }

    /// Parse config text, picking JSON or YAML by file extension
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let config: Self = if is_json {
            serde_json::from_str(content)
                .with_context(|| format!("Failed to parse JSON config {}", path.display()))?
        } else {
            serde_yaml::from_str(content)
                .with_context(|| format!("Failed to parse YAML config {}", path.display()))?
        };

        Ok(config)
    }

    /// Get effective region (config > AWS_REGION > AWS_DEFAULT_REGION > default)
    pub fn effective_region(&self) -> String {
        self.region
            .clone()
            .filter(|r| !r.is_empty())
            .or_else(|| std::env::var("AWS_REGION").ok().filter(|r| !r.is_empty()))
            .or_else(|| std::env::var("AWS_DEFAULT_REGION").ok().filter(|r| !r.is_empty()))
            .unwrap_or_else(|| DEFAULT_REGION.to_string())
    }

    /// Resolve the API endpoint URL
    pub fn endpoint_url(&self) -> Result<Url> {
        let raw = match &self.endpoint {
            Some(endpoint) if !endpoint.is_empty() => endpoint.clone(),
            _ => format!("https://ec2.{}.amazonaws.com/", self.effective_region()),
        };
        Url::parse(&raw).with_context(|| format!("Invalid endpoint URL {:?}", raw))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Check the settings that would otherwise fail later at request time
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            bail!("port must be non-zero");
        }
        if self.refresh_interval_secs == 0 {
            bail!("refresh_interval_secs must be non-zero");
        }
        if self.api_version.is_empty() {
            bail!("api_version must not be empty");
        }
        for filter in &self.filters {
            if filter.name.is_empty() {
                bail!("filter name must not be empty");
            }
        }
        self.endpoint_url()?;
        Ok(())
    }
}
