/*!

This library derives the network layout of a Kubernetes cluster's VPC. Given a `ClusterSpec` and
the availability zones to spread across, it resolves the subnets, route tables, NAT gateways and
DNS settings (`resolve`), plans a VPC endpoint for every entry of the service catalog (`plan`),
and synthesizes the default security group's ingress rules (`synthesize`). The results form a
`ProvisioningPlan` that an external apply engine turns into real resources.

Planning is pure: the same inputs always give a byte-identical plan.

!*/

#![deny(
    clippy::expect_used,
    clippy::get_unwrap,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::panicking_unwrap,
    clippy::unwrap_in_result,
    clippy::unwrap_used
)]

// Lets `#[derive(Configuration)]` name this crate from inside it.
extern crate self as clusternet_model;

pub use access::{synthesize, AccessRule, AccessRuleSet, Direction, Protocol, RuleOwner};
pub use cluster::{AvailabilityZoneSet, ClusterSpec, ResourceRef, Tags};
pub use configuration::Configuration;
pub use endpoint::{catalog, catalog_table, plan, EndpointCatalogEntry, EndpointKind, EndpointSpec};
pub use error::{Error, Result};
pub use plan::{ChangeAction, PlanDiff, PlanFormat, ProvisioningPlan, ResourceChange};
pub use topology::{
    resolve, DefaultRoute, DnsSettings, NatGatewaySpec, NatPolicy, RouteTableSpec, RouteTables,
    SubnetSpec, SubnetTier, Topology,
};

mod access;
mod cluster;
mod configuration;
pub mod constants;
mod endpoint;
mod error;
mod plan;
pub mod system;
mod topology;
