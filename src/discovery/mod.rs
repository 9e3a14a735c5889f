//! Instance discovery pipeline
//!
//! Turns the instance inventory into label maps for scrape target selection.
//!
//! # Architecture
//!
//! - [`fetcher`] - Follows continuation tokens until an action is exhausted
//! - [`response`] - Typed response documents and their decode functions
//! - [`zones`] - Lazily resolved zone name to zone id cache
//! - [`labels`] - Flattens one instance into its label map
//! - [`instances`] - Runs one discovery cycle end to end
//!
//! # Example
//!
//! ```ignore
//! use ec2_sd::discovery::{get_instances_labels, DiscoveryConfig};
//!
//! async fn discover(config: &ec2_sd::config::SdConfig) -> anyhow::Result<()> {
//!     let cfg = DiscoveryConfig::from_sd_config(config)?;
//!     for labels in get_instances_labels(&cfg).await? {
//!         println!("{}", labels["__address__"]);
//!     }
//!     Ok(())
//! }
//! ```

mod config;
pub mod fetcher;
pub mod instances;
pub mod labels;
pub mod response;
pub mod zones;

pub use config::DiscoveryConfig;
pub use fetcher::{fetch_all_pages, Page};
pub use instances::{get_instances_labels, get_reservations};
pub use labels::{build_instance_labels, join_host_port, sanitize_label_name, LabelMap};
pub use response::{
    parse_instances_response, parse_zones_response, AvailabilityZone, Instance,
    InstanceState, InstancesResponse, NetworkInterface, Placement, Reservation, Tag,
    ZonesResponse,
};
pub use zones::{ZoneCache, ZoneMap};
