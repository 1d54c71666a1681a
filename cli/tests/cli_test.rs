use assert_cmd::Command;
use std::process::Output;

fn clusternet(args: &[&str]) -> Output {
    let mut cmd = Command::cargo_bin("clusternet").unwrap();
    cmd.env_remove("RUST_LOG").args(args);
    cmd.output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).unwrap()
}

#[test]
fn plan_with_shared_nat() {
    let spec = data::demo_spec_path();
    let output = clusternet(&[
        "plan",
        "--spec",
        spec.to_str().unwrap(),
        "--zones",
        data::DEMO_ZONES,
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    let plan = stdout(&output);
    assert!(plan.contains("natPolicy: singleNat"));
    assert!(plan.contains("com.amazonaws.us-west-2.dynamodb"));
    assert!(plan.contains("demo-public-us-west-2c"));
}

#[test]
fn plan_override_toggle_as_json() {
    let spec = data::demo_spec_path();
    let output = clusternet(&[
        "plan",
        "--spec",
        spec.to_str().unwrap(),
        "--zones",
        data::DEMO_ZONES,
        "--private-subnet-enabled",
        "true",
        "--output",
        "json",
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    let plan: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(plan["topology"]["natPolicy"], "none");
    assert_eq!(plan["endpoints"][0]["privateDnsEnabled"], true);
    assert_eq!(
        plan["endpoints"][0]["subnetIds"].as_array().unwrap().len(),
        3
    );
}

#[test]
fn plan_rejects_zone_mismatch() {
    let spec = data::demo_spec_path();
    let output = clusternet(&[
        "plan",
        "--spec",
        spec.to_str().unwrap(),
        "--zones",
        "us-west-2a,us-west-2b",
    ]);
    assert!(!output.status.success());
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("Invalid topology for cluster 'demo'"));
}

#[test]
fn plan_requires_zones() {
    let spec = data::demo_spec_path();
    let output = clusternet(&["plan", "--spec", spec.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("--discover-zones"));
}

#[test]
fn diff_against_applied_plan() {
    let spec = data::demo_spec_path();
    let dir = tempfile::tempdir().unwrap();
    let previous = dir.path().join("previous.yaml");
    let output = clusternet(&[
        "plan",
        "--spec",
        spec.to_str().unwrap(),
        "--zones",
        data::DEMO_ZONES,
        "--out",
        previous.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", stderr(&output));

    let output = clusternet(&[
        "diff",
        "--spec",
        spec.to_str().unwrap(),
        "--zones",
        data::DEMO_ZONES,
        "--previous",
        previous.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "No changes.");

    let output = clusternet(&[
        "diff",
        "--spec",
        spec.to_str().unwrap(),
        "--zones",
        data::DEMO_ZONES,
        "--private-subnet-enabled",
        "true",
        "--previous",
        previous.to_str().unwrap(),
        "--json",
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    let diff: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let changes = diff["changes"].as_array().unwrap();
    assert!(changes
        .iter()
        .any(|c| c["kind"] == "natGateway" && c["action"] == "delete"));
}

#[test]
fn catalog_lists_gateways() {
    let output = clusternet(&["catalog", "--region", "ap-south-1"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let table = stdout(&output);
    assert!(table.contains("com.amazonaws.ap-south-1.s3"));
    assert_eq!(table.matches("Gateway").count(), 2);
}

#[test]
fn rbac_objects() {
    let output = clusternet(&["rbac", "--namespace", "metrics"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let yaml = stdout(&output);
    assert!(yaml.contains("system:auth-delegator"));
    assert!(yaml.contains("namespace: metrics"));
}
