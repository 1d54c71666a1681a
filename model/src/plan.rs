use crate::access::{synthesize, AccessRuleSet};
use crate::cluster::{AvailabilityZoneSet, ClusterSpec};
use crate::endpoint::{plan, EndpointCatalogEntry, EndpointSpec};
use crate::error::{self, Result};
use crate::topology::{resolve, Topology};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use serde_plain::{derive_display_from_serialize, derive_fromstr_from_deserialize};
use snafu::ResultExt;
use std::collections::BTreeMap;
use tabled::{Style, Table, Tabled};

/// The output format of a rendered plan.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanFormat {
    Yaml,
    Json,
}

derive_display_from_serialize!(PlanFormat);
derive_fromstr_from_deserialize!(PlanFormat);

/// The declarative resource graph for one cluster: the resolved topology, its endpoints and the
/// default security group's access rules. Building the same plan twice yields identical output,
/// which lets an apply engine diff it against what it applied before.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisioningPlan {
    pub topology: Topology,
    pub endpoints: Vec<EndpointSpec>,
    pub access_rules: AccessRuleSet,
}

impl ProvisioningPlan {
    /// Run the resolver, the endpoint planner and the access rule synthesizer in order.
    pub fn build(
        spec: &ClusterSpec,
        azs: &AvailabilityZoneSet,
        catalog: &[EndpointCatalogEntry],
    ) -> Result<Self> {
        let topology = resolve(spec, azs)?;
        let endpoints = plan(&topology, catalog, spec.private_subnet_enabled);
        let access_rules = synthesize(&topology, topology.vpc_cidr);
        info!("Built provisioning plan for cluster '{}'", topology.cluster);
        Ok(Self {
            topology,
            endpoints,
            access_rules,
        })
    }

    pub fn render(&self, format: PlanFormat) -> Result<String> {
        match format {
            PlanFormat::Yaml => serde_yaml::to_string(self).context(error::YamlSerializationSnafu {
                what: "provisioning plan",
            }),
            PlanFormat::Json => {
                serde_json::to_string_pretty(self).context(error::JsonSerializationSnafu {
                    what: "provisioning plan",
                })
            }
        }
    }

    /// Parse a previously rendered plan. JSON is accepted as well since it is valid YAML.
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        serde_yaml::from_str(s).context(error::YamlDeserializationSnafu {
            what: "provisioning plan",
        })
    }

    /// Every resource in the plan keyed by kind and handle.
    fn resources(&self) -> Result<BTreeMap<ResourceKey, Value>> {
        let topology = &self.topology;
        let mut resources = BTreeMap::new();
        resources.insert(
            ResourceKey::new("vpc", topology.vpc_id.as_str()),
            json!({
                "cidr": topology.vpc_cidr,
                "dns": topology.dns,
                "tags": topology.vpc_tags,
            }),
        );
        resources.insert(
            ResourceKey::new("internetGateway", topology.internet_gateway_id.as_str()),
            json!({ "vpc": topology.vpc_id }),
        );
        resources.insert(
            ResourceKey::new("securityGroup", topology.default_security_group_id.as_str()),
            json!({ "vpc": topology.vpc_id, "default": true }),
        );
        for subnet in topology.subnets() {
            resources.insert(
                ResourceKey::new("subnet", subnet.id.as_str()),
                to_value(subnet, "subnet")?,
            );
        }
        for table in topology.route_tables.iter() {
            resources.insert(
                ResourceKey::new("routeTable", table.id.as_str()),
                to_value(table, "route table")?,
            );
        }
        for nat in &topology.nat_gateways {
            resources.insert(
                ResourceKey::new("natGateway", nat.id.as_str()),
                to_value(nat, "NAT gateway")?,
            );
        }
        for endpoint in &self.endpoints {
            resources.insert(
                ResourceKey::new("endpoint", endpoint.id.as_str()),
                to_value(endpoint, "endpoint")?,
            );
        }
        for rule in self.access_rules.iter() {
            resources.insert(
                ResourceKey::new("accessRule", &rule.id),
                to_value(rule, "access rule")?,
            );
        }
        Ok(resources)
    }

    /// Compare this plan against `previous`, the plan that was last applied. Access rules owned
    /// by someone else are carried over from `previous`, so they never show up as deletions.
    pub fn diff(&self, previous: &ProvisioningPlan) -> Result<PlanDiff> {
        let desired = ProvisioningPlan {
            access_rules: self.access_rules.reconcile(&previous.access_rules),
            ..self.clone()
        }
        .resources()?;
        let applied = previous.resources()?;
        let mut changes = Vec::new();
        for (key, value) in &desired {
            match applied.get(key) {
                None => changes.push(ResourceChange::new(key, ChangeAction::Create)),
                Some(old) if old != value => {
                    changes.push(ResourceChange::new(key, ChangeAction::Update))
                }
                Some(_) => {}
            }
        }
        for key in applied.keys().filter(|key| !desired.contains_key(*key)) {
            changes.push(ResourceChange::new(key, ChangeAction::Delete));
        }
        changes.sort_by(|a, b| (&a.kind, &a.id).cmp(&(&b.kind, &b.id)));
        Ok(PlanDiff { changes })
    }
}

fn to_value<T: Serialize>(resource: &T, what: &str) -> Result<Value> {
    serde_json::to_value(resource).context(error::JsonSerializationSnafu { what })
}

#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
struct ResourceKey {
    kind: &'static str,
    id: String,
}

impl ResourceKey {
    fn new(kind: &'static str, id: &str) -> Self {
        Self {
            kind,
            id: id.to_string(),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeAction {
    Create,
    Update,
    Delete,
}

derive_display_from_serialize!(ChangeAction);
derive_fromstr_from_deserialize!(ChangeAction);

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Tabled)]
#[serde(rename_all = "camelCase")]
pub struct ResourceChange {
    #[tabled(rename = "KIND")]
    pub kind: String,
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "ACTION")]
    pub action: ChangeAction,
}

impl ResourceChange {
    fn new(key: &ResourceKey, action: ChangeAction) -> Self {
        Self {
            kind: key.kind.to_string(),
            id: key.id.clone(),
            action,
        }
    }
}

/// The resources an apply engine has to touch to move from one plan to the next.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDiff {
    pub changes: Vec<ResourceChange>,
}

impl PlanDiff {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Create a table containing every change.
    pub fn to_table(&self) -> String {
        Table::new(self.changes.clone()).with(Style::blank()).to_string()
    }
}
