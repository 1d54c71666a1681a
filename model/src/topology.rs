use crate::cluster::{AvailabilityZoneSet, ClusterSpec, ResourceRef, Tags};
use crate::constants::{
    CLUSTER_TAG_OWNED, CLUSTER_TAG_PREFIX, NAME_TAG, ROLE_ELB_TAG, ROLE_INTERNAL_ELB_TAG,
    ROLE_TAG_VALUE, SUBNET_MAX_PREFIX_LEN, VPC_MAX_PREFIX_LEN, VPC_MIN_PREFIX_LEN,
};
use crate::error::{self, Result};
use ipnet::Ipv4Net;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_plain::{derive_display_from_serialize, derive_fromstr_from_deserialize};
use snafu::ensure;
use std::collections::BTreeSet;

/// Which tier of the VPC a subnet (and its route table) belongs to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SubnetTier {
    /// Routes to the internet gateway. Internet-facing load balancers land here.
    Public,
    /// Routes to a NAT gateway when one exists. Internal load balancers land here.
    Private,
    /// No route leaves the VPC.
    Intra,
}

derive_display_from_serialize!(SubnetTier);
derive_fromstr_from_deserialize!(SubnetTier);

/// How private subnets reach the internet.
///
/// Note the inversion: the shared NAT gateway exists exactly when `private_subnet_enabled` is
/// `false`. Clusters that keep workloads in private subnets are expected to reach AWS services
/// through interface endpoints instead of NAT.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NatPolicy {
    /// One NAT gateway in the first public subnet shared by every zone.
    SingleNat,
    /// One NAT gateway in each zone's public subnet.
    PerAzNat,
    /// No NAT gateway.
    None,
}

derive_display_from_serialize!(NatPolicy);
derive_fromstr_from_deserialize!(NatPolicy);

impl NatPolicy {
    /// Derive the NAT policy from the private subnet toggle.
    pub fn for_cluster(private_subnet_enabled: bool, nat_gateway_per_az: bool) -> Self {
        match (private_subnet_enabled, nat_gateway_per_az) {
            (true, _) => NatPolicy::None,
            (false, false) => NatPolicy::SingleNat,
            (false, true) => NatPolicy::PerAzNat,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, NatPolicy::None)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetSpec {
    pub id: ResourceRef,
    pub cidr: Ipv4Net,
    pub availability_zone: String,
    pub tier: SubnetTier,
    pub route_table_id: ResourceRef,
    pub tags: Tags,
}

/// The default route of a route table.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DefaultRoute {
    InternetGateway(ResourceRef),
    NatGateway(ResourceRef),
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteTableSpec {
    pub id: ResourceRef,
    pub tier: SubnetTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_route: Option<DefaultRoute>,
    pub tags: Tags,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteTables {
    pub public: Vec<RouteTableSpec>,
    pub private: Vec<RouteTableSpec>,
    pub intra: Vec<RouteTableSpec>,
}

impl RouteTables {
    pub fn iter(&self) -> impl Iterator<Item = &RouteTableSpec> {
        self.intra
            .iter()
            .chain(self.private.iter())
            .chain(self.public.iter())
    }

    /// The deduplicated union of intra, private and public route table handles.
    pub fn ids(&self) -> BTreeSet<ResourceRef> {
        self.iter().map(|table| table.id.clone()).collect()
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NatGatewaySpec {
    pub id: ResourceRef,
    pub subnet_id: ResourceRef,
    pub availability_zone: String,
    pub tags: Tags,
}

/// Interface endpoints with private DNS only resolve when both settings are on, so the resolver
/// always enables them.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsSettings {
    pub hostnames: bool,
    pub support: bool,
}

impl Default for DnsSettings {
    fn default() -> Self {
        Self {
            hostnames: true,
            support: true,
        }
    }
}

/// The resolved network layout of a cluster. Every downstream stage reads the toggle's effects
/// from this value rather than from the `ClusterSpec`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topology {
    pub cluster: String,
    pub region: String,
    pub vpc_id: ResourceRef,
    pub vpc_cidr: Ipv4Net,
    pub vpc_tags: Tags,
    pub internet_gateway_id: ResourceRef,
    pub default_security_group_id: ResourceRef,
    pub public_subnets: Vec<SubnetSpec>,
    pub private_subnets: Vec<SubnetSpec>,
    pub intra_subnets: Vec<SubnetSpec>,
    pub route_tables: RouteTables,
    pub nat_policy: NatPolicy,
    pub nat_gateways: Vec<NatGatewaySpec>,
    pub dns: DnsSettings,
    /// Extra tags from the cluster spec, applied to resources planned after the topology.
    pub tags: Tags,
}

impl Topology {
    pub fn private_subnet_ids(&self) -> BTreeSet<ResourceRef> {
        self.private_subnets.iter().map(|s| s.id.clone()).collect()
    }

    pub fn subnets(&self) -> impl Iterator<Item = &SubnetSpec> {
        self.public_subnets
            .iter()
            .chain(self.private_subnets.iter())
            .chain(self.intra_subnets.iter())
    }

    /// Tags for a resource named `name`: the cluster's extra tags plus a `Name` tag.
    pub fn resource_tags(&self, name: &str) -> Tags {
        named_tags(&self.tags, name)
    }
}

/// Derive the `Topology` for `spec` spread across `azs`. Validation happens before anything is
/// built, so an `InvalidTopology` error never comes with a partial topology.
pub fn resolve(spec: &ClusterSpec, azs: &AvailabilityZoneSet) -> Result<Topology> {
    validate(spec, azs)?;

    let naming = Naming::new(&spec.name);
    let nat_policy = NatPolicy::for_cluster(spec.private_subnet_enabled, spec.nat_gateway_per_az);
    info!(
        "Resolving topology for cluster '{}' across zones [{}] with NAT policy '{}'",
        spec.name, azs, nat_policy
    );

    let internet_gateway_id = naming.id("igw");
    let public_route_table = RouteTableSpec {
        id: naming.id("public-rt"),
        tier: SubnetTier::Public,
        default_route: Some(DefaultRoute::InternetGateway(internet_gateway_id.clone())),
        tags: named_tags(&spec.tags, naming.id("public-rt").as_str()),
    };

    let public_subnets: Vec<SubnetSpec> = azs
        .iter()
        .zip(spec.public_subnets.iter())
        .map(|(zone, cidr)| {
            naming.subnet(
                &spec.tags,
                SubnetTier::Public,
                zone,
                *cidr,
                &public_route_table.id,
            )
        })
        .collect();

    let nat_gateways: Vec<NatGatewaySpec> = match nat_policy {
        NatPolicy::None => Vec::new(),
        NatPolicy::SingleNat => public_subnets
            .iter()
            .take(1)
            .map(|subnet| naming.nat_gateway(&spec.tags, naming.id("nat"), subnet))
            .collect(),
        NatPolicy::PerAzNat => public_subnets
            .iter()
            .map(|subnet| {
                let id = naming.id(&format!("nat-{}", subnet.availability_zone));
                naming.nat_gateway(&spec.tags, id, subnet)
            })
            .collect(),
    };
    debug!("Planned {} NAT gateway(s)", nat_gateways.len());

    // A single private route table when every zone shares one NAT gateway, otherwise one per
    // zone so that each can route to its own gateway (or nowhere).
    let private_route_tables: Vec<RouteTableSpec> = match nat_policy {
        NatPolicy::SingleNat => vec![RouteTableSpec {
            id: naming.id("private-rt"),
            tier: SubnetTier::Private,
            default_route: nat_gateways
                .first()
                .map(|nat| DefaultRoute::NatGateway(nat.id.clone())),
            tags: named_tags(&spec.tags, naming.id("private-rt").as_str()),
        }],
        NatPolicy::PerAzNat | NatPolicy::None => azs
            .iter()
            .map(|zone| {
                let id = naming.id(&format!("private-rt-{}", zone));
                RouteTableSpec {
                    tags: named_tags(&spec.tags, id.as_str()),
                    id,
                    tier: SubnetTier::Private,
                    default_route: nat_gateways
                        .iter()
                        .find(|nat| nat.availability_zone == zone)
                        .map(|nat| DefaultRoute::NatGateway(nat.id.clone())),
                }
            })
            .collect(),
    };

    let private_subnets: Vec<SubnetSpec> = azs
        .iter()
        .zip(spec.private_subnets.iter())
        .zip(private_route_tables.iter().cycle())
        .map(|((zone, cidr), route_table)| {
            naming.subnet(&spec.tags, SubnetTier::Private, zone, *cidr, &route_table.id)
        })
        .collect();

    let intra_route_tables: Vec<RouteTableSpec> = if spec.intra_subnets.is_empty() {
        Vec::new()
    } else {
        vec![RouteTableSpec {
            id: naming.id("intra-rt"),
            tier: SubnetTier::Intra,
            default_route: None,
            tags: named_tags(&spec.tags, naming.id("intra-rt").as_str()),
        }]
    };

    let intra_subnets: Vec<SubnetSpec> = intra_route_tables
        .first()
        .map(|route_table| {
            azs.iter()
                .zip(spec.intra_subnets.iter())
                .map(|(zone, cidr)| {
                    naming.subnet(&spec.tags, SubnetTier::Intra, zone, *cidr, &route_table.id)
                })
                .collect()
        })
        .unwrap_or_default();

    let vpc_id = naming.id("vpc");
    let topology = Topology {
        cluster: spec.name.clone(),
        region: spec.region.clone(),
        vpc_tags: named_tags(&spec.tags, vpc_id.as_str()),
        vpc_id,
        vpc_cidr: spec.cidr,
        internet_gateway_id,
        default_security_group_id: naming.id("default"),
        public_subnets,
        private_subnets,
        intra_subnets,
        route_tables: RouteTables {
            public: vec![public_route_table],
            private: private_route_tables,
            intra: intra_route_tables,
        },
        nat_policy,
        nat_gateways,
        dns: DnsSettings::default(),
        tags: spec.tags.clone(),
    };
    debug!(
        "Resolved {} subnet(s) and {} route table(s) for cluster '{}'",
        topology.subnets().count(),
        topology.route_tables.iter().count(),
        topology.cluster
    );
    Ok(topology)
}

fn validate(spec: &ClusterSpec, azs: &AvailabilityZoneSet) -> Result<()> {
    let cluster = spec.name.as_str();
    ensure!(
        !spec.name.trim().is_empty(),
        error::InvalidTopologySnafu {
            cluster,
            reason: "the cluster name must not be empty",
        }
    );
    ensure!(
        !spec.region.trim().is_empty(),
        error::InvalidTopologySnafu {
            cluster,
            reason: "the region must not be empty",
        }
    );
    ensure!(
        !azs.is_empty(),
        error::InvalidTopologySnafu {
            cluster,
            reason: "at least one availability zone is required",
        }
    );
    let duplicates = azs.duplicates();
    ensure!(
        duplicates.is_empty(),
        error::InvalidTopologySnafu {
            cluster,
            reason: format!("duplicate availability zones [{}]", duplicates.join(",")),
        }
    );

    let vpc = spec.cidr;
    ensure!(
        vpc.trunc() == vpc,
        error::InvalidTopologySnafu {
            cluster,
            reason: format!("VPC CIDR '{}' has host bits set, expected '{}'", vpc, vpc.trunc()),
        }
    );
    ensure!(
        (VPC_MIN_PREFIX_LEN..=VPC_MAX_PREFIX_LEN).contains(&vpc.prefix_len()),
        error::InvalidTopologySnafu {
            cluster,
            reason: format!(
                "VPC CIDR '{}' must have a prefix length between /{} and /{}",
                vpc, VPC_MIN_PREFIX_LEN, VPC_MAX_PREFIX_LEN
            ),
        }
    );

    check_count(cluster, SubnetTier::Public, spec.public_subnets.len(), azs.len())?;
    check_count(cluster, SubnetTier::Private, spec.private_subnets.len(), azs.len())?;
    if !spec.intra_subnets.is_empty() {
        check_count(cluster, SubnetTier::Intra, spec.intra_subnets.len(), azs.len())?;
    }

    let subnets: Vec<(SubnetTier, Ipv4Net)> = spec
        .public_subnets
        .iter()
        .map(|cidr| (SubnetTier::Public, *cidr))
        .chain(spec.private_subnets.iter().map(|c| (SubnetTier::Private, *c)))
        .chain(spec.intra_subnets.iter().map(|c| (SubnetTier::Intra, *c)))
        .collect();

    for (tier, subnet) in &subnets {
        ensure!(
            subnet.trunc() == *subnet,
            error::InvalidTopologySnafu {
                cluster,
                reason: format!("{} subnet '{}' has host bits set", tier, subnet),
            }
        );
        ensure!(
            subnet.prefix_len() <= SUBNET_MAX_PREFIX_LEN,
            error::InvalidTopologySnafu {
                cluster,
                reason: format!(
                    "{} subnet '{}' is smaller than /{}",
                    tier, subnet, SUBNET_MAX_PREFIX_LEN
                ),
            }
        );
        ensure!(
            vpc.contains(subnet),
            error::InvalidTopologySnafu {
                cluster,
                reason: format!("{} subnet '{}' is outside VPC CIDR '{}'", tier, subnet, vpc),
            }
        );
    }

    for (i, (tier_a, a)) in subnets.iter().enumerate() {
        for (tier_b, b) in subnets.iter().skip(i + 1) {
            ensure!(
                !overlaps(a, b),
                error::InvalidTopologySnafu {
                    cluster,
                    reason: format!(
                        "{} subnet '{}' overlaps {} subnet '{}'",
                        tier_a, a, tier_b, b
                    ),
                }
            );
        }
    }
    Ok(())
}

fn check_count(cluster: &str, tier: SubnetTier, actual: usize, zones: usize) -> Result<()> {
    ensure!(
        actual == zones,
        error::InvalidTopologySnafu {
            cluster,
            reason: format!(
                "expected {} {} subnet(s), one per availability zone, but found {}",
                zones, tier, actual
            ),
        }
    );
    Ok(())
}

/// Two CIDR blocks overlap exactly when one contains the other.
fn overlaps(a: &Ipv4Net, b: &Ipv4Net) -> bool {
    a.contains(b) || b.contains(a)
}

fn named_tags(extra: &Tags, name: &str) -> Tags {
    let mut tags = extra.clone();
    tags.insert(NAME_TAG.to_string(), name.to_string());
    tags
}

/// Builds the deterministic handles and tags for a cluster's resources.
struct Naming<'a> {
    cluster: &'a str,
}

impl<'a> Naming<'a> {
    fn new(cluster: &'a str) -> Self {
        Self { cluster }
    }

    fn id(&self, suffix: &str) -> ResourceRef {
        ResourceRef::new(format!("{}-{}", self.cluster, suffix))
    }

    fn subnet(
        &self,
        extra: &Tags,
        tier: SubnetTier,
        zone: &str,
        cidr: Ipv4Net,
        route_table_id: &ResourceRef,
    ) -> SubnetSpec {
        let id = self.id(&format!("{}-{}", tier, zone));
        let mut tags = named_tags(extra, id.as_str());
        tags.insert(
            format!("{}{}", CLUSTER_TAG_PREFIX, self.cluster),
            CLUSTER_TAG_OWNED.to_string(),
        );
        match tier {
            SubnetTier::Public => {
                tags.insert(ROLE_ELB_TAG.to_string(), ROLE_TAG_VALUE.to_string());
            }
            SubnetTier::Private => {
                tags.insert(ROLE_INTERNAL_ELB_TAG.to_string(), ROLE_TAG_VALUE.to_string());
            }
            SubnetTier::Intra => {}
        }
        SubnetSpec {
            id,
            cidr,
            availability_zone: zone.to_string(),
            tier,
            route_table_id: route_table_id.clone(),
            tags,
        }
    }

    fn nat_gateway(&self, extra: &Tags, id: ResourceRef, subnet: &SubnetSpec) -> NatGatewaySpec {
        NatGatewaySpec {
            tags: named_tags(extra, id.as_str()),
            id,
            subnet_id: subnet.id.clone(),
            availability_zone: subnet.availability_zone.clone(),
        }
    }
}
