//! Label Builder
//!
//! Flattens one instance record into the label set handed to target
//! selection. Label names are a fixed contract with relabeling rules and must
//! not change.

use super::response::Instance;
use super::zones::ZoneMap;
use std::collections::{BTreeMap, HashSet};

/// Labels of one discovered target
pub type LabelMap = BTreeMap<String, String>;

pub const ADDRESS_LABEL: &str = "__address__";
pub const ARCHITECTURE_LABEL: &str = "__meta_ec2_architecture";
pub const AMI_LABEL: &str = "__meta_ec2_ami";
pub const AVAILABILITY_ZONE_LABEL: &str = "__meta_ec2_availability_zone";
pub const AVAILABILITY_ZONE_ID_LABEL: &str = "__meta_ec2_availability_zone_id";
pub const INSTANCE_ID_LABEL: &str = "__meta_ec2_instance_id";
pub const INSTANCE_LIFECYCLE_LABEL: &str = "__meta_ec2_instance_lifecycle";
pub const INSTANCE_STATE_LABEL: &str = "__meta_ec2_instance_state";
pub const INSTANCE_TYPE_LABEL: &str = "__meta_ec2_instance_type";
pub const OWNER_ID_LABEL: &str = "__meta_ec2_owner_id";
pub const PLATFORM_LABEL: &str = "__meta_ec2_platform";
pub const PRIMARY_SUBNET_ID_LABEL: &str = "__meta_ec2_primary_subnet_id";
pub const PRIVATE_DNS_NAME_LABEL: &str = "__meta_ec2_private_dns_name";
pub const PRIVATE_IP_LABEL: &str = "__meta_ec2_private_ip";
pub const PUBLIC_DNS_NAME_LABEL: &str = "__meta_ec2_public_dns_name";
pub const PUBLIC_IP_LABEL: &str = "__meta_ec2_public_ip";
pub const VPC_ID_LABEL: &str = "__meta_ec2_vpc_id";
pub const SUBNET_ID_LABEL: &str = "__meta_ec2_subnet_id";
pub const IPV6_ADDRESSES_LABEL: &str = "__meta_ec2_ipv6_addresses";
pub const TAG_LABEL_PREFIX: &str = "__meta_ec2_tag_";

/// Separator of list-valued labels; also wraps both ends of the list
const LIST_SEPARATOR: &str = ",";

/// Join host and port, bracketing IPv6 literals
pub fn join_host_port(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}

/// Replace every character outside `[A-Za-z0-9_]` with `_`
pub fn sanitize_label_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// `,a,b,c,` for `[a, b, c]` and `,,` for an empty list, so regexes in
/// relabeling rules can match `,item,` regardless of position
fn wrap_list(items: &[&str]) -> String {
    format!("{0}{1}{0}", LIST_SEPARATOR, items.join(LIST_SEPARATOR))
}

/// Build target labels for `instance`.
///
/// Returns `None` for instances without a private IP: there is nothing to
/// scrape.
pub fn build_instance_labels(
    instance: &Instance,
    owner_id: &str,
    port: u16,
    zones: &ZoneMap,
) -> Option<LabelMap> {
    if instance.private_ip.is_empty() {
        return None;
    }

    let zone = &instance.placement.availability_zone;
    let zone_id = zones.get(zone).map(String::as_str).unwrap_or_default();

    let mut labels: LabelMap = [
        (ADDRESS_LABEL, join_host_port(&instance.private_ip, port)),
        (ARCHITECTURE_LABEL, instance.architecture.clone()),
        (AMI_LABEL, instance.image_id.clone()),
        (AVAILABILITY_ZONE_LABEL, zone.clone()),
        (AVAILABILITY_ZONE_ID_LABEL, zone_id.to_string()),
        (INSTANCE_ID_LABEL, instance.instance_id.clone()),
        (INSTANCE_LIFECYCLE_LABEL, instance.lifecycle.clone()),
        (INSTANCE_STATE_LABEL, instance.state.name.clone()),
        (INSTANCE_TYPE_LABEL, instance.instance_type.clone()),
        (OWNER_ID_LABEL, owner_id.to_string()),
        (PLATFORM_LABEL, instance.platform.clone()),
        (PRIMARY_SUBNET_ID_LABEL, instance.subnet_id.clone()),
        (PRIVATE_DNS_NAME_LABEL, instance.private_dns_name.clone()),
        (PRIVATE_IP_LABEL, instance.private_ip.clone()),
        (PUBLIC_DNS_NAME_LABEL, instance.public_dns_name.clone()),
        (PUBLIC_IP_LABEL, instance.public_ip.clone()),
        (VPC_ID_LABEL, instance.vpc_id.clone()),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value))
    .collect();

    if !instance.vpc_id.is_empty() {
        let mut seen = HashSet::new();
        let mut subnets = Vec::with_capacity(instance.network_interfaces.len());
        let mut ipv6_addrs = Vec::new();

        for ni in &instance.network_interfaces {
            // First occurrence wins, keeping the interface order
            if !ni.subnet_id.is_empty() && seen.insert(ni.subnet_id.as_str()) {
                subnets.push(ni.subnet_id.as_str());
            }
            ipv6_addrs.extend(ni.ipv6_addresses.iter().map(String::as_str));
        }

        labels.insert(SUBNET_ID_LABEL.to_string(), wrap_list(&subnets));
        if !ipv6_addrs.is_empty() {
            labels.insert(IPV6_ADDRESSES_LABEL.to_string(), wrap_list(&ipv6_addrs));
        }
    }

    for tag in &instance.tags {
        if tag.key.is_empty() || tag.value.is_empty() {
            continue;
        }
        let name = format!("{}{}", TAG_LABEL_PREFIX, sanitize_label_name(&tag.key));
        labels.insert(name, tag.value.clone());
    }

    Some(labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::response::{InstanceState, NetworkInterface, Placement, Tag};

    fn instance() -> Instance {
        Instance {
            private_ip: "172.31.11.152".to_string(),
            architecture: "x86_64".to_string(),
            placement: Placement {
                availability_zone: "eu-west-2c".to_string(),
            },
            image_id: "ami-0e8f6957a4eb67446".to_string(),
            instance_id: "i-0e730b692d9c15460".to_string(),
            state: InstanceState {
                name: "running".to_string(),
            },
            instance_type: "t2.micro".to_string(),
            subnet_id: "subnet-57044c3e".to_string(),
            private_dns_name: "ip-172-31-11-152.eu-west-2.compute.internal".to_string(),
            public_dns_name: "ec2-3-8-232-141.eu-west-2.compute.amazonaws.com".to_string(),
            public_ip: "3.8.232.141".to_string(),
            vpc_id: "vpc-f1eaad99".to_string(),
            network_interfaces: vec![NetworkInterface {
                subnet_id: "subnet-57044c3e".to_string(),
                ipv6_addresses: vec![],
            }],
            tags: vec![Tag {
                key: "foo".to_string(),
                value: "bar".to_string(),
            }],
            ..Default::default()
        }
    }

    fn interfaces(subnets: &[&str]) -> Vec<NetworkInterface> {
        subnets
            .iter()
            .map(|s| NetworkInterface {
                subnet_id: s.to_string(),
                ipv6_addresses: vec![],
            })
            .collect()
    }

    #[test]
    fn test_full_label_set() {
        let zones: ZoneMap = [("eu-west-2c".to_string(), "euw2-az3".to_string())]
            .into_iter()
            .collect();

        let labels = build_instance_labels(&instance(), "793614593844", 423, &zones).unwrap();

        let expected: LabelMap = [
            ("__address__", "172.31.11.152:423"),
            ("__meta_ec2_architecture", "x86_64"),
            ("__meta_ec2_ami", "ami-0e8f6957a4eb67446"),
            ("__meta_ec2_availability_zone", "eu-west-2c"),
            ("__meta_ec2_availability_zone_id", "euw2-az3"),
            ("__meta_ec2_instance_id", "i-0e730b692d9c15460"),
            ("__meta_ec2_instance_lifecycle", ""),
            ("__meta_ec2_instance_state", "running"),
            ("__meta_ec2_instance_type", "t2.micro"),
            ("__meta_ec2_owner_id", "793614593844"),
            ("__meta_ec2_platform", ""),
            ("__meta_ec2_primary_subnet_id", "subnet-57044c3e"),
            ("__meta_ec2_private_dns_name", "ip-172-31-11-152.eu-west-2.compute.internal"),
            ("__meta_ec2_private_ip", "172.31.11.152"),
            ("__meta_ec2_public_dns_name", "ec2-3-8-232-141.eu-west-2.compute.amazonaws.com"),
            ("__meta_ec2_public_ip", "3.8.232.141"),
            ("__meta_ec2_vpc_id", "vpc-f1eaad99"),
            ("__meta_ec2_subnet_id", ",subnet-57044c3e,"),
            ("__meta_ec2_tag_foo", "bar"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        assert_eq!(labels, expected);
    }

    #[test]
    fn test_no_private_ip_no_labels() {
        let inst = Instance {
            private_ip: String::new(),
            ..instance()
        };
        assert!(build_instance_labels(&inst, "1", 80, &ZoneMap::new()).is_none());
    }

    #[test]
    fn test_unknown_zone_has_empty_zone_id() {
        let labels = build_instance_labels(&instance(), "1", 80, &ZoneMap::new()).unwrap();
        assert_eq!(labels[AVAILABILITY_ZONE_ID_LABEL], "");
    }

    #[test]
    fn test_subnets_deduplicated_in_order() {
        let inst = Instance {
            network_interfaces: interfaces(&["s1", "s1", "s2", "", "s3"]),
            ..instance()
        };
        let labels = build_instance_labels(&inst, "1", 80, &ZoneMap::new()).unwrap();
        assert_eq!(labels[SUBNET_ID_LABEL], ",s1,s2,s3,");
    }

    #[test]
    fn test_empty_subnet_list_still_wrapped() {
        let inst = Instance {
            network_interfaces: vec![],
            ..instance()
        };
        let labels = build_instance_labels(&inst, "1", 80, &ZoneMap::new()).unwrap();
        assert_eq!(labels[SUBNET_ID_LABEL], ",,");
        assert!(!labels.contains_key(IPV6_ADDRESSES_LABEL));
    }

    #[test]
    fn test_ipv6_addresses_aggregated() {
        let mut inst = instance();
        inst.network_interfaces = vec![
            NetworkInterface {
                subnet_id: "s1".to_string(),
                ipv6_addresses: vec!["a".to_string(), "b".to_string()],
            },
            NetworkInterface {
                subnet_id: "s2".to_string(),
                ipv6_addresses: vec![],
            },
            NetworkInterface {
                subnet_id: String::new(),
                ipv6_addresses: vec!["c".to_string()],
            },
        ];
        let labels = build_instance_labels(&inst, "1", 80, &ZoneMap::new()).unwrap();
        assert_eq!(labels[IPV6_ADDRESSES_LABEL], ",a,b,c,");
        assert_eq!(labels[SUBNET_ID_LABEL], ",s1,s2,");
    }

    #[test]
    fn test_no_vpc_no_network_labels() {
        let inst = Instance {
            vpc_id: String::new(),
            network_interfaces: vec![NetworkInterface {
                subnet_id: "s1".to_string(),
                ipv6_addresses: vec!["a".to_string()],
            }],
            ..instance()
        };
        let labels = build_instance_labels(&inst, "1", 80, &ZoneMap::new()).unwrap();
        assert!(!labels.contains_key(SUBNET_ID_LABEL));
        assert!(!labels.contains_key(IPV6_ADDRESSES_LABEL));
        assert_eq!(labels[VPC_ID_LABEL], "");
    }

    #[test]
    fn test_tags_filtered_and_sanitized() {
        let tag = |k: &str, v: &str| Tag {
            key: k.to_string(),
            value: v.to_string(),
        };
        let inst = Instance {
            tags: vec![
                tag("", "orphan"),
                tag("empty", ""),
                tag("Env:Prod", "yes"),
                tag("team-name", "sre"),
                tag("team.name", "infra"),
            ],
            ..instance()
        };
        let labels = build_instance_labels(&inst, "1", 80, &ZoneMap::new()).unwrap();

        assert_eq!(labels["__meta_ec2_tag_Env_Prod"], "yes");
        assert_eq!(labels["__meta_ec2_tag_team_name"], "infra");
        assert!(!labels.contains_key("__meta_ec2_tag_empty"));
        assert!(!labels.contains_key("__meta_ec2_tag_"));
        assert!(!labels.values().any(|v| v == "orphan"));
    }

    #[test]
    fn test_join_host_port() {
        assert_eq!(join_host_port("10.0.0.1", 9100), "10.0.0.1:9100");
        assert_eq!(join_host_port("2a05:d01c::1", 9100), "[2a05:d01c::1]:9100");
    }

    #[test]
    fn test_sanitize_label_name() {
        assert_eq!(sanitize_label_name("Env:Prod"), "Env_Prod");
        assert_eq!(sanitize_label_name("aws:cloudformation:stack-name"), "aws_cloudformation_stack_name");
        assert_eq!(sanitize_label_name("ok_Name9"), "ok_Name9");
        assert_eq!(sanitize_label_name("ünï"), "_n_");
    }
}
