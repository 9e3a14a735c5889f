//! EC2 service discovery
//!
//! Lists compute instances through the EC2 query API and converts each one
//! into the flat label set used for scrape target selection.
//!
//! - [`config`] - Job configuration file and defaults
//! - [`ec2`] - Transport seam and HTTP transport
//! - [`discovery`] - Pagination, decoding, zone cache and label synthesis
//! - [`error`] - Discovery error types

pub mod config;
pub mod discovery;
pub mod ec2;
pub mod error;

pub use discovery::{get_instances_labels, DiscoveryConfig, LabelMap};
pub use error::{DiscoveryError, ParseError};
