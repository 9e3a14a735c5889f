//! Transport seam between discovery and the inventory API

use anyhow::Result;
use async_trait::async_trait;

/// Lists instance reservations, paginated
pub const DESCRIBE_INSTANCES: &str = "DescribeInstances";

/// Lists availability zones of the region
pub const DESCRIBE_AVAILABILITY_ZONES: &str = "DescribeAvailabilityZones";

/// Issues one inventory API request.
///
/// Signing, retries and timeouts belong to the implementation. Discovery only
/// sees the raw response body or an opaque error.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Call `action`, continuing from `page_token` (empty for the first page)
    async fn call(&self, action: &str, page_token: &str) -> Result<Vec<u8>>;
}
