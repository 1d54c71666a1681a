use crate::error::{self, Result};
use configuration_derive::Configuration;
use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Resource tags. A `BTreeMap` keeps serialized plans stable across runs.
pub type Tags = BTreeMap<String, String>;

/// The desired network layout of a cluster, as supplied by an operator.
///
/// ```yaml
/// name: demo
/// region: us-west-2
/// cidr: 10.0.0.0/16
/// publicSubnets: [10.0.0.0/24, 10.0.1.0/24]
/// privateSubnets: [10.0.128.0/20, 10.0.144.0/20]
/// privateSubnetEnabled: false
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Default, Configuration)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    /// The cluster name. All resource handles and the cluster ownership tag derive from it.
    pub name: String,

    /// The region the VPC lives in. Endpoint service names are built from it.
    pub region: String,

    /// The VPC CIDR block.
    pub cidr: Ipv4Net,

    /// One public subnet per availability zone, in zone order.
    #[serde(default)]
    pub public_subnets: Vec<Ipv4Net>,

    /// One private subnet per availability zone, in zone order.
    #[serde(default)]
    pub private_subnets: Vec<Ipv4Net>,

    /// Subnets without any route out of the VPC. Either empty or one per availability zone.
    #[serde(default)]
    pub intra_subnets: Vec<Ipv4Net>,

    /// When `true` no NAT gateway is created and interface endpoints are placed into the private
    /// subnets with private DNS. When `false` a NAT gateway provides egress and interface
    /// endpoints are declared without placement.
    #[serde(default)]
    pub private_subnet_enabled: bool,

    /// Provision one NAT gateway per availability zone instead of a single shared one. Only
    /// meaningful when `private_subnet_enabled` is `false`.
    #[serde(default)]
    pub nat_gateway_per_az: bool,

    /// Extra tags applied to every resource in the plan.
    #[serde(default)]
    pub tags: Tags,
}

impl ClusterSpec {
    /// Parse a `ClusterSpec` from a YAML (or JSON) document.
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        serde_yaml::from_str(s).context(error::YamlDeserializationSnafu {
            what: "cluster spec",
        })
    }
}

/// The ordered availability zones a topology is spread across, e.g. `us-west-2a,us-west-2b`.
/// Zones are discovered from the cloud provider and consumed read-only.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AvailabilityZoneSet(Vec<String>);

impl AvailabilityZoneSet {
    pub fn new<I, S>(zones: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(zones.into_iter().map(Into::into).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the zone names that appear more than once.
    pub(crate) fn duplicates(&self) -> Vec<&str> {
        let mut seen = BTreeMap::new();
        for zone in self.iter() {
            *seen.entry(zone).or_insert(0usize) += 1;
        }
        seen.into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(zone, _)| zone)
            .collect()
    }
}

impl Display for AvailabilityZoneSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join(","))
    }
}

impl<S: Into<String>> FromIterator<S> for AvailabilityZoneSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// An opaque handle to a resource in the plan. Handles are derived from the cluster name so that
/// planning the same cluster twice yields the same handles.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceRef(String);

impl ResourceRef {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ResourceRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Configuration;

    #[test]
    fn spec_from_yaml() {
        let spec = ClusterSpec::from_yaml_str(
            r#"
name: demo
region: us-west-2
cidr: 10.0.0.0/16
publicSubnets: [10.0.0.0/24, 10.0.1.0/24]
privateSubnets: [10.0.128.0/20, 10.0.144.0/20]
"#,
        )
        .unwrap();
        assert_eq!(spec.name, "demo");
        assert_eq!(spec.cidr, "10.0.0.0/16".parse::<Ipv4Net>().unwrap());
        assert_eq!(spec.private_subnets.len(), 2);
        assert!(spec.intra_subnets.is_empty());
        assert!(!spec.private_subnet_enabled);
        assert!(!spec.nat_gateway_per_az);
    }

    #[test]
    fn spec_rejects_bad_cidr() {
        let err = ClusterSpec::from_yaml_str("name: demo\nregion: us-west-2\ncidr: 10.0.0.0/33\n")
            .unwrap_err();
        assert!(err.to_string().contains("cluster spec"));
    }

    #[test]
    fn spec_map_overrides() {
        let spec = ClusterSpec {
            name: "demo".to_string(),
            region: "us-west-2".to_string(),
            cidr: "10.0.0.0/16".parse().unwrap(),
            ..Default::default()
        };
        let mut map = spec.into_map().unwrap();
        assert_eq!(map.get("cidr").unwrap(), "10.0.0.0/16");
        map.insert("privateSubnetEnabled".to_string(), true.into());
        let spec = ClusterSpec::from_map(map).unwrap();
        assert!(spec.private_subnet_enabled);
    }

    #[test]
    fn zone_duplicates() {
        let zones = AvailabilityZoneSet::new(["us-west-2a", "us-west-2b", "us-west-2a"]);
        assert_eq!(zones.duplicates(), vec!["us-west-2a"]);
        assert_eq!(zones.to_string(), "us-west-2a,us-west-2b,us-west-2a");
    }
}
