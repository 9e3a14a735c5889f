//! Instance discovery
//!
//! One discovery cycle: list every reservation, resolve zone ids, and turn
//! each addressable instance into a label map.

use super::config::DiscoveryConfig;
use super::fetcher::fetch_all_pages;
use super::labels::{build_instance_labels, LabelMap};
use super::response::{InstancesResponse, Reservation};
use crate::ec2::DESCRIBE_INSTANCES;
use crate::error::DiscoveryError;

/// Return labels for all addressable instances visible through `cfg`
pub async fn get_instances_labels(cfg: &DiscoveryConfig) -> Result<Vec<LabelMap>, DiscoveryError> {
    let reservations = get_reservations(cfg).await?;
    let zones = cfg.zone_map().await;

    let mut skipped = 0usize;
    let mut ms = Vec::new();
    for r in &reservations {
        for inst in &r.instances {
            match build_instance_labels(inst, &r.owner_id, cfg.port(), &zones) {
                Some(labels) => ms.push(labels),
                None => skipped += 1,
            }
        }
    }

    tracing::info!(
        "Discovered {} targets from {} reservations ({} instances without private IP skipped)",
        ms.len(),
        reservations.len(),
        skipped
    );
    Ok(ms)
}

/// Fetch every reservation, following continuation tokens
pub async fn get_reservations(cfg: &DiscoveryConfig) -> Result<Vec<Reservation>, DiscoveryError> {
    fetch_all_pages::<InstancesResponse>(cfg.transport(), DESCRIBE_INSTANCES).await
}
