//! Discovery configuration shared across discovery cycles

use super::zones::{ZoneCache, ZoneMap};
use crate::config::SdConfig;
use crate::ec2::{ApiTransport, HttpTransport};
use anyhow::Result;
use std::sync::Arc;

/// Long-lived state of one discovery job.
///
/// Build it once per job and reuse it for every cycle so the zone map is
/// only looked up once.
pub struct DiscoveryConfig {
    transport: Arc<dyn ApiTransport>,
    port: u16,
    zones: ZoneCache,
}

impl DiscoveryConfig {
    pub fn new(transport: Arc<dyn ApiTransport>, port: u16) -> Self {
        Self {
            transport,
            port,
            zones: ZoneCache::new(),
        }
    }

    /// Build a config talking HTTP to the configured endpoint
    pub fn from_sd_config(config: &SdConfig) -> Result<Self> {
        let transport = HttpTransport::from_config(config)?;
        Ok(Self::new(Arc::new(transport), config.port))
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn transport(&self) -> &dyn ApiTransport {
        self.transport.as_ref()
    }

    /// Zone name to id map, resolved on first use
    pub async fn zone_map(&self) -> Arc<ZoneMap> {
        self.zones.resolve(self.transport.as_ref()).await
    }

    pub fn zone_cache(&self) -> &ZoneCache {
        &self.zones
    }
}
