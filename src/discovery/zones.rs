//! Availability zone resolution
//!
//! Zone ids are not part of the instance record, so they are looked up once
//! per [`DiscoveryConfig`](super::DiscoveryConfig) and kept for its lifetime.

use super::fetcher::fetch_all_pages;
use super::labels::AVAILABILITY_ZONE_ID_LABEL;
use super::response::ZonesResponse;
use crate::ec2::{ApiTransport, DESCRIBE_AVAILABILITY_ZONES};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Zone name to zone id
pub type ZoneMap = HashMap<String, String>;

/// Lazily resolved zone map.
///
/// `None` until the first [`resolve`](Self::resolve); afterwards the stored map
/// is final, including the empty map left behind by a failed lookup.
#[derive(Debug, Default)]
pub struct ZoneCache {
    state: Mutex<Option<Arc<ZoneMap>>>,
}

impl ZoneCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the zone map, fetching it on the first call.
    ///
    /// Concurrent callers wait on the lock and share the first result. A failed
    /// fetch is logged and cached as an empty map; it is never retried.
    pub async fn resolve(&self, transport: &dyn ApiTransport) -> Arc<ZoneMap> {
        let mut state = self.state.lock().await;
        if let Some(map) = state.as_ref() {
            return Arc::clone(map);
        }

        let map = match fetch_all_pages::<ZonesResponse>(transport, DESCRIBE_AVAILABILITY_ZONES).await
        {
            Ok(zones) => {
                tracing::debug!("Loaded {} availability zones", zones.len());
                zones
                    .into_iter()
                    .map(|az| (az.zone_name, az.zone_id))
                    .collect()
            }
            Err(err) => {
                tracing::warn!(
                    "couldn't load availability zones map, so {} label isn't set: {}",
                    AVAILABILITY_ZONE_ID_LABEL,
                    err
                );
                ZoneMap::new()
            }
        };

        let map = Arc::new(map);
        *state = Some(Arc::clone(&map));
        map
    }

    /// Whether a lookup has already happened, successful or not
    pub async fn is_resolved(&self) -> bool {
        self.state.lock().await.is_some()
    }
}
