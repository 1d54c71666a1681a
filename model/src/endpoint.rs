use crate::cluster::{ResourceRef, Tags};
use crate::constants::AWS_SERVICE_PREFIX;
use crate::topology::Topology;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_plain::{derive_display_from_serialize, derive_fromstr_from_deserialize};
use std::collections::BTreeSet;
use tabled::{Style, Table, Tabled};

/// The AWS services reachable through a VPC endpoint, in declaration order. The first element is
/// the catalog name, the second the service suffix of `com.amazonaws.<region>.<service>`.
const CATALOG: &[(&str, &str)] = &[
    ("sqs", "sqs"),
    ("s3", "s3"),
    ("dynamodb", "dynamodb"),
    ("ec2_autoscaling", "autoscaling"),
    ("ec2", "ec2"),
    ("ecr_dkr", "ecr.dkr"),
    ("ecr_api", "ecr.api"),
    ("monitoring", "monitoring"),
    ("logs", "logs"),
    ("elasticloadbalancing", "elasticloadbalancing"),
    ("api_gateway", "execute-api"),
    ("ssm", "ssm"),
    ("ssmmessages", "ssmmessages"),
    ("sts", "sts"),
];

/// Services that AWS only offers through route-table based gateway endpoints.
const GATEWAY_SERVICES: &[&str] = &["s3", "dynamodb"];

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum EndpointKind {
    /// An elastic network interface placed into subnets and guarded by security groups.
    Interface,
    /// A route table target. No network interface, no security group.
    Gateway,
}

derive_display_from_serialize!(EndpointKind);
derive_fromstr_from_deserialize!(EndpointKind);

#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointCatalogEntry {
    pub name: String,
    pub service: String,
}

impl EndpointCatalogEntry {
    pub fn new<S1, S2>(name: S1, service: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self {
            name: name.into(),
            service: service.into(),
        }
    }

    pub fn kind(&self) -> EndpointKind {
        if GATEWAY_SERVICES.contains(&self.service.as_str()) {
            EndpointKind::Gateway
        } else {
            EndpointKind::Interface
        }
    }

    /// The full AWS service name, e.g. `com.amazonaws.us-west-2.ecr.dkr`. Whether the service
    /// exists in `region` is only known to the apply engine.
    pub fn aws_service_name(&self, region: &str) -> String {
        format!("{}.{}.{}", AWS_SERVICE_PREFIX, region, self.service)
    }
}

/// The fixed endpoint catalog in declaration order.
pub fn catalog() -> Vec<EndpointCatalogEntry> {
    CATALOG
        .iter()
        .map(|(name, service)| EndpointCatalogEntry::new(*name, *service))
        .collect()
}

/// Render the catalog as a table of name, service name and kind for `region`.
pub fn catalog_table(catalog: &[EndpointCatalogEntry], region: &str) -> String {
    let rows: Vec<CatalogRow> = catalog
        .iter()
        .map(|entry| CatalogRow {
            name: entry.name.clone(),
            service: entry.aws_service_name(region),
            kind: entry.kind().to_string(),
        })
        .collect();
    Table::new(rows).with(Style::blank()).to_string()
}

#[derive(Tabled)]
struct CatalogRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "SERVICE")]
    service: String,
    #[tabled(rename = "KIND")]
    kind: String,
}

/// A planned VPC endpoint. Gateway endpoints only carry route tables; interface endpoints only
/// carry subnets and security groups.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointSpec {
    pub id: ResourceRef,
    pub name: String,
    pub aws_service_name: String,
    pub kind: EndpointKind,
    pub private_dns_enabled: bool,
    pub subnet_ids: BTreeSet<ResourceRef>,
    pub security_group_ids: BTreeSet<ResourceRef>,
    pub route_table_ids: BTreeSet<ResourceRef>,
    pub tags: Tags,
}

impl EndpointSpec {
    /// An interface endpoint without subnets is declared but has no network interface.
    pub fn is_placed(&self) -> bool {
        match self.kind {
            EndpointKind::Interface => !self.subnet_ids.is_empty(),
            EndpointKind::Gateway => !self.route_table_ids.is_empty(),
        }
    }
}

/// Plan one endpoint per catalog entry, in catalog order.
///
/// Interface endpoints are only placed into the private subnets, behind the default security
/// group and with private DNS, when `private_subnet_enabled` is set. Otherwise the cluster
/// relies on NAT egress and the endpoints stay unplaced.
pub fn plan(
    topology: &Topology,
    catalog: &[EndpointCatalogEntry],
    private_subnet_enabled: bool,
) -> Vec<EndpointSpec> {
    let endpoints: Vec<EndpointSpec> = catalog
        .iter()
        .map(|entry| endpoint(topology, entry, private_subnet_enabled))
        .collect();
    info!(
        "Planned {} endpoint(s) for cluster '{}', {} placed",
        endpoints.len(),
        topology.cluster,
        endpoints.iter().filter(|e| e.is_placed()).count()
    );
    endpoints
}

fn endpoint(
    topology: &Topology,
    entry: &EndpointCatalogEntry,
    private_subnet_enabled: bool,
) -> EndpointSpec {
    let kind = entry.kind();
    let id = ResourceRef::new(format!("{}-{}-endpoint", topology.cluster, entry.name));
    let (private_dns_enabled, subnet_ids, security_group_ids, route_table_ids) = match kind {
        EndpointKind::Gateway => (
            false,
            BTreeSet::new(),
            BTreeSet::new(),
            topology.route_tables.ids(),
        ),
        EndpointKind::Interface if private_subnet_enabled => (
            true,
            topology.private_subnet_ids(),
            BTreeSet::from([topology.default_security_group_id.clone()]),
            BTreeSet::new(),
        ),
        EndpointKind::Interface => (false, BTreeSet::new(), BTreeSet::new(), BTreeSet::new()),
    };
    debug!(
        "Endpoint '{}' is a {} endpoint with {} subnet(s) and {} route table(s)",
        entry.name,
        kind,
        subnet_ids.len(),
        route_table_ids.len()
    );
    EndpointSpec {
        tags: topology.resource_tags(id.as_str()),
        id,
        name: entry.name.clone(),
        aws_service_name: entry.aws_service_name(&topology.region),
        kind,
        private_dns_enabled,
        subnet_ids,
        security_group_ids,
        route_table_ids,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn catalog_order_and_size() {
        let names: Vec<String> = catalog().into_iter().map(|e| e.name).collect();
        assert_eq!(names.len(), 14);
        assert_eq!(names.first().unwrap(), "sqs");
        assert_eq!(names.last().unwrap(), "sts");
    }

    #[test]
    fn classification() {
        let gateways: Vec<String> = catalog()
            .into_iter()
            .filter(|e| e.kind() == EndpointKind::Gateway)
            .map(|e| e.name)
            .collect();
        assert_eq!(gateways, vec!["s3", "dynamodb"]);
    }

    #[test]
    fn service_name() {
        let entry = EndpointCatalogEntry::new("ecr_dkr", "ecr.dkr");
        assert_eq!(
            entry.aws_service_name("eu-west-1"),
            "com.amazonaws.eu-west-1.ecr.dkr"
        );
    }

    #[test]
    fn table_lists_every_entry() {
        let table = catalog_table(&catalog(), "us-east-1");
        assert!(table.contains("NAME"));
        assert!(table.contains("com.amazonaws.us-east-1.execute-api"));
        assert!(table.contains("Gateway"));
        for entry in catalog() {
            assert!(table.contains(&entry.aws_service_name("us-east-1")));
        }
    }
}
