//! Response documents
//!
//! Typed shapes of the inventory API pages, one decode function per document.
//! Missing fields decode as empty values and unknown fields are ignored.

use crate::error::ParseError;
use serde::Deserialize;

/// One page of `DescribeInstances`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstancesResponse {
    pub reservations: Vec<Reservation>,
    pub next_page_token: String,
}

/// Instances launched together, with the owning account
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Reservation {
    pub owner_id: String,
    pub instances: Vec<Instance>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Instance {
    pub private_ip: String,
    pub architecture: String,
    pub placement: Placement,
    pub image_id: String,
    pub instance_id: String,
    pub lifecycle: String,
    pub state: InstanceState,
    pub instance_type: String,
    pub platform: String,
    pub subnet_id: String,
    pub private_dns_name: String,
    pub public_dns_name: String,
    pub public_ip: String,
    pub vpc_id: String,
    pub network_interfaces: Vec<NetworkInterface>,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Placement {
    pub availability_zone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InstanceState {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkInterface {
    pub subnet_id: String,
    pub ipv6_addresses: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

/// One page of `DescribeAvailabilityZones`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ZonesResponse {
    pub zones: Vec<AvailabilityZone>,
    pub next_page_token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AvailabilityZone {
    pub zone_name: String,
    pub zone_id: String,
}

pub fn parse_instances_response(data: &[u8]) -> Result<InstancesResponse, ParseError> {
    serde_json::from_slice(data).map_err(|e| ParseError::new("InstancesResponse", data, e))
}

pub fn parse_zones_response(data: &[u8]) -> Result<ZonesResponse, ParseError> {
    serde_json::from_slice(data).map_err(|e| ParseError::new("ZonesResponse", data, e))
}
