use clusternet_model::{AvailabilityZoneSet, ClusterSpec};
use std::path::PathBuf;

/// Returns the path to a cluster spec under `tests/data`.
pub fn spec_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(format!("{}.yaml", name))
}

/// Reads and parses a cluster spec under `tests/data`.
pub fn spec(name: &str) -> ClusterSpec {
    let yaml = std::fs::read_to_string(spec_path(name)).unwrap();
    ClusterSpec::from_yaml_str(&yaml).unwrap()
}

/// The first `count` zones of `region`.
pub fn zones(region: &str, count: usize) -> AvailabilityZoneSet {
    ["a", "b", "c", "d"]
        .iter()
        .take(count)
        .map(|suffix| format!("{}{}", region, suffix))
        .collect()
}
