use crate::cluster::ResourceRef;
use crate::constants::{HTTPS_PORT, VPC_HTTPS_INGRESS_RULE};
use crate::topology::Topology;
use ipnet::Ipv4Net;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_plain::{derive_display_from_serialize, derive_fromstr_from_deserialize};
use std::collections::BTreeSet;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Ingress,
    Egress,
}

derive_display_from_serialize!(Direction);
derive_fromstr_from_deserialize!(Direction);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
}

derive_display_from_serialize!(Protocol);
derive_fromstr_from_deserialize!(Protocol);

/// Who manages a rule. Rules this crate plans are `Clusternet`; anything found on the security
/// group that was added by someone else is `External` and is never altered.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleOwner {
    Clusternet,
    External,
}

derive_display_from_serialize!(RuleOwner);
derive_fromstr_from_deserialize!(RuleOwner);

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRule {
    /// The identity of the rule. Ownership is decided per identity.
    pub id: String,
    pub direction: Direction,
    pub protocol: Protocol,
    pub from_port: u16,
    pub to_port: u16,
    pub source_cidr: Ipv4Net,
    pub security_group_id: ResourceRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub owner: RuleOwner,
}

/// A set of access rules ordered by rule identity. Deserialized sets are reordered and
/// deduplicated the same way as ones built with `new`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<AccessRule>", into = "Vec<AccessRule>")]
pub struct AccessRuleSet(Vec<AccessRule>);

impl AccessRuleSet {
    pub fn new<I: IntoIterator<Item = AccessRule>>(rules: I) -> Self {
        let mut set = Self::default();
        for rule in rules {
            set.insert(rule);
        }
        set
    }

    /// Insert `rule`, replacing any rule with the same identity.
    pub fn insert(&mut self, rule: AccessRule) {
        match self.0.binary_search_by(|r| r.id.cmp(&rule.id)) {
            Ok(i) => self.0[i] = rule,
            Err(i) => self.0.insert(i, rule),
        }
    }

    pub fn get(&self, id: &str) -> Option<&AccessRule> {
        self.0
            .binary_search_by(|r| r.id.as_str().cmp(id))
            .ok()
            .and_then(|i| self.0.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &AccessRule> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merge this freshly synthesized set into `current`, the rules already on the security
    /// group. Rules owned by someone else are carried over untouched, including when their
    /// identity collides with one of ours. Our stale rules are dropped.
    pub fn reconcile(&self, current: &AccessRuleSet) -> AccessRuleSet {
        let external: BTreeSet<&str> = current
            .iter()
            .filter(|rule| rule.owner != RuleOwner::Clusternet)
            .map(|rule| rule.id.as_str())
            .collect();
        let mut merged = AccessRuleSet::new(
            current
                .iter()
                .filter(|rule| rule.owner != RuleOwner::Clusternet)
                .cloned(),
        );
        for rule in self.iter() {
            if external.contains(rule.id.as_str()) {
                warn!(
                    "Access rule '{}' is owned by someone else, leaving it unchanged",
                    rule.id
                );
                continue;
            }
            merged.insert(rule.clone());
        }
        merged
    }
}

impl From<Vec<AccessRule>> for AccessRuleSet {
    fn from(rules: Vec<AccessRule>) -> Self {
        Self::new(rules)
    }
}

impl From<AccessRuleSet> for Vec<AccessRule> {
    fn from(set: AccessRuleSet) -> Self {
        set.0
    }
}

impl IntoIterator for AccessRuleSet {
    type Item = AccessRule;
    type IntoIter = std::vec::IntoIter<AccessRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Synthesize the ingress rules for the default security group: HTTPS from anywhere inside the
/// VPC, which interface endpoints and in-cluster service calls need. Nothing is opened to the
/// internet.
pub fn synthesize(topology: &Topology, vpc_cidr: Ipv4Net) -> AccessRuleSet {
    let rule = AccessRule {
        id: VPC_HTTPS_INGRESS_RULE.to_string(),
        direction: Direction::Ingress,
        protocol: Protocol::Tcp,
        from_port: HTTPS_PORT,
        to_port: HTTPS_PORT,
        source_cidr: vpc_cidr,
        security_group_id: topology.default_security_group_id.clone(),
        description: Some("HTTPS from within the VPC".to_string()),
        owner: RuleOwner::Clusternet,
    };
    debug!(
        "Allowing {} {}-{} from '{}' into '{}'",
        rule.protocol, rule.from_port, rule.to_port, rule.source_cidr, rule.security_group_id
    );
    AccessRuleSet::new([rule])
}
