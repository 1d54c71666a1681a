mod data;

use clusternet_model::{
    catalog, plan, resolve, synthesize, AccessRule, ChangeAction, Direction, EndpointKind,
    NatPolicy, PlanFormat, ProvisioningPlan, Protocol, ResourceRef, RuleOwner,
};
use std::collections::{BTreeMap, BTreeSet};

#[test]
fn demo_cluster() {
    let spec = data::spec("demo");
    let zones = data::zones("us-west-2", 3);
    let plan = ProvisioningPlan::build(&spec, &zones, &catalog()).unwrap();

    assert_eq!(plan.topology.nat_policy, NatPolicy::SingleNat);
    assert_eq!(plan.endpoints.len(), 14);
    for endpoint in &plan.endpoints {
        match endpoint.kind {
            EndpointKind::Interface => {
                assert!(endpoint.subnet_ids.is_empty(), "{}", endpoint.name);
                assert!(endpoint.security_group_ids.is_empty(), "{}", endpoint.name);
                assert!(endpoint.route_table_ids.is_empty(), "{}", endpoint.name);
                assert!(!endpoint.private_dns_enabled);
            }
            EndpointKind::Gateway => {
                assert!(["s3", "dynamodb"].contains(&endpoint.name.as_str()));
                assert!(!endpoint.route_table_ids.is_empty());
                assert!(endpoint.subnet_ids.is_empty());
                assert!(endpoint.security_group_ids.is_empty());
            }
        }
    }
    assert_eq!(
        plan.endpoints[1].aws_service_name,
        "com.amazonaws.us-west-2.s3"
    );
    assert_eq!(
        plan.endpoints[0].tags.get("Project").map(String::as_str),
        Some("demo")
    );
}

#[test]
fn nat_policy_follows_toggle() {
    for (name, count) in [("demo", 3), ("private", 2)] {
        let spec = data::spec(name);
        let topology = resolve(&spec, &data::zones(&spec.region, count)).unwrap();
        assert_eq!(
            topology.nat_policy != NatPolicy::None,
            !spec.private_subnet_enabled
        );
    }
}

#[test]
fn interface_endpoints_placed_in_private_subnets() {
    let spec = data::spec("private");
    let topology = resolve(&spec, &data::zones("eu-west-1", 2)).unwrap();
    let endpoints = plan(&topology, &catalog(), spec.private_subnet_enabled);
    let private: BTreeSet<_> = topology.private_subnets.iter().map(|s| s.id.clone()).collect();
    for endpoint in endpoints
        .iter()
        .filter(|e| e.kind == EndpointKind::Interface)
    {
        assert_eq!(endpoint.subnet_ids, private);
        assert!(endpoint.private_dns_enabled);
        assert_eq!(
            endpoint.security_group_ids,
            BTreeSet::from([topology.default_security_group_id.clone()])
        );
    }
}

#[test]
fn gateway_endpoints_use_every_route_table() {
    for private_subnet_enabled in [true, false] {
        let mut spec = data::spec("private");
        spec.private_subnet_enabled = private_subnet_enabled;
        let topology = resolve(&spec, &data::zones("eu-west-1", 2)).unwrap();
        let expected: BTreeSet<_> = topology
            .route_tables
            .intra
            .iter()
            .chain(topology.route_tables.private.iter())
            .chain(topology.route_tables.public.iter())
            .map(|table| table.id.clone())
            .collect();
        let endpoints = plan(&topology, &catalog(), private_subnet_enabled);
        for endpoint in endpoints.iter().filter(|e| e.kind == EndpointKind::Gateway) {
            assert_eq!(endpoint.route_table_ids, expected);
        }
    }
}

#[test]
fn endpoints_follow_catalog_order() {
    let spec = data::spec("demo");
    let topology = resolve(&spec, &data::zones("us-west-2", 3)).unwrap();
    let names: Vec<String> = plan(&topology, &catalog(), false)
        .into_iter()
        .map(|e| e.name)
        .collect();
    let expected: Vec<String> = catalog().into_iter().map(|e| e.name).collect();
    assert_eq!(names, expected);
}

#[test]
fn single_https_rule() {
    let spec = data::spec("private");
    let topology = resolve(&spec, &data::zones("eu-west-1", 2)).unwrap();
    let rules = synthesize(&topology, topology.vpc_cidr);
    assert_eq!(rules.len(), 1);
    let rule = rules.iter().next().unwrap();
    assert_eq!((rule.from_port, rule.to_port), (443, 443));
    assert_eq!(rule.protocol, Protocol::Tcp);
    assert_eq!(rule.source_cidr, topology.vpc_cidr);
    assert_eq!(rule.security_group_id, topology.default_security_group_id);
}

#[test]
fn rendering_is_idempotent() {
    let spec = data::spec("private");
    let zones = data::zones("eu-west-1", 2);
    for format in [PlanFormat::Yaml, PlanFormat::Json] {
        let first = ProvisioningPlan::build(&spec, &zones, &catalog())
            .unwrap()
            .render(format)
            .unwrap();
        let second = ProvisioningPlan::build(&spec, &zones, &catalog())
            .unwrap()
            .render(format)
            .unwrap();
        assert_eq!(first, second);
        let parsed = ProvisioningPlan::from_yaml_str(&first).unwrap();
        assert!(parsed
            .diff(&ProvisioningPlan::build(&spec, &zones, &catalog()).unwrap())
            .unwrap()
            .is_empty());
    }
}

#[test]
fn diff_after_toggle() {
    let spec = data::spec("demo");
    let zones = data::zones("us-west-2", 3);
    let before = ProvisioningPlan::build(&spec, &zones, &catalog()).unwrap();
    let mut private = spec.clone();
    private.private_subnet_enabled = true;
    let after = ProvisioningPlan::build(&private, &zones, &catalog()).unwrap();

    let diff = after.diff(&before).unwrap();
    let find = |kind: &str, id: &str| {
        diff.changes
            .iter()
            .find(|c| c.kind == kind && c.id == id)
            .map(|c| c.action)
    };
    assert_eq!(find("natGateway", "demo-nat"), Some(ChangeAction::Delete));
    assert_eq!(find("routeTable", "demo-private-rt"), Some(ChangeAction::Delete));
    assert_eq!(
        find("routeTable", "demo-private-rt-us-west-2a"),
        Some(ChangeAction::Create)
    );
    assert_eq!(find("subnet", "demo-private-us-west-2a"), Some(ChangeAction::Update));
    assert_eq!(find("endpoint", "demo-sqs-endpoint"), Some(ChangeAction::Update));
    assert_eq!(find("vpc", "demo-vpc"), None);
    assert_eq!(find("accessRule", "clusternet/vpc-https-ingress"), None);
    assert!(diff.to_table().contains("natGateway"));
}

#[test]
fn invalid_topology_emits_nothing() {
    let spec = data::spec("demo");
    let err = ProvisioningPlan::build(&spec, &data::zones("us-west-2", 2), &catalog()).unwrap_err();
    assert!(err.is_invalid_topology());
}

#[test]
fn handles_are_unique() {
    for (private_subnet_enabled, nat_gateway_per_az) in [(false, false), (false, true), (true, false)]
    {
        let mut spec = data::spec("private");
        spec.private_subnet_enabled = private_subnet_enabled;
        spec.nat_gateway_per_az = nat_gateway_per_az;
        let plan = ProvisioningPlan::build(&spec, &data::zones("eu-west-1", 2), &catalog()).unwrap();
        let topology = &plan.topology;

        let mut handles: Vec<&ResourceRef> = vec![
            &topology.vpc_id,
            &topology.internet_gateway_id,
            &topology.default_security_group_id,
        ];
        handles.extend(topology.subnets().map(|s| &s.id));
        handles.extend(topology.route_tables.iter().map(|t| &t.id));
        handles.extend(topology.nat_gateways.iter().map(|n| &n.id));
        handles.extend(plan.endpoints.iter().map(|e| &e.id));

        let mut seen: BTreeMap<&ResourceRef, usize> = BTreeMap::new();
        for handle in &handles {
            *seen.entry(*handle).or_default() += 1;
        }
        let duplicates: Vec<_> = seen.into_iter().filter(|(_, count)| *count > 1).collect();
        assert!(duplicates.is_empty(), "{:?}", duplicates);
    }
}

#[test]
fn diff_keeps_external_rules() {
    let spec = data::spec("demo");
    let zones = data::zones("us-west-2", 3);
    let desired = ProvisioningPlan::build(&spec, &zones, &catalog()).unwrap();
    let mut applied = desired.clone();
    applied.access_rules.insert(AccessRule {
        id: "ssh".to_string(),
        direction: Direction::Ingress,
        protocol: Protocol::Tcp,
        from_port: 22,
        to_port: 22,
        source_cidr: "10.0.0.0/16".parse().unwrap(),
        security_group_id: desired.topology.default_security_group_id.clone(),
        description: None,
        owner: RuleOwner::External,
    });
    let diff = desired.diff(&applied).unwrap();
    assert!(diff.is_empty(), "{:?}", diff.changes);

    // A stale rule of our own is still removed.
    let mut stale = applied.access_rules.get("ssh").unwrap().clone();
    stale.id = "clusternet/retired".to_string();
    stale.owner = RuleOwner::Clusternet;
    applied.access_rules.insert(stale);
    let diff = desired.diff(&applied).unwrap();
    assert_eq!(diff.changes.len(), 1);
    assert_eq!(diff.changes[0].id, "clusternet/retired");
    assert_eq!(diff.changes[0].action, ChangeAction::Delete);
}
