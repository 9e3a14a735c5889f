//! EC2 API interaction module
//!
//! This module provides the request side of discovery: the transport seam the
//! discovery pipeline calls through, and the HTTP implementation of it.
//!
//! # Module Structure
//!
//! - [`transport`] - The `ApiTransport` trait and action names
//! - [`http`] - HTTP transport for the EC2 query API
//!
//! # Example
//!
//! ```ignore
//! use ec2_sd::ec2::{ApiTransport, HttpTransport, DESCRIBE_INSTANCES};
//!
//! async fn example(config: &ec2_sd::config::SdConfig) -> anyhow::Result<()> {
//!     let transport = HttpTransport::from_config(config)?;
//!     let page = transport.call(DESCRIBE_INSTANCES, "").await?;
//!     Ok(())
//! }
//! ```

pub mod http;
pub mod transport;

pub use http::HttpTransport;
pub use transport::{ApiTransport, DESCRIBE_AVAILABILITY_ZONES, DESCRIBE_INSTANCES};
