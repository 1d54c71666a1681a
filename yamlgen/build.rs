/*!

The metrics adapter RBAC objects are modeled as Rust structs in the model crate. Here we generate
the corresponding k8s yaml file. Crates that depend on it can add yamlgen as a build dependency to
ensure the file is current. Scripts can call `cargo build --package yamlgen`.

!*/

use clusternet_model::system::MetricsAdapter;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

const YAMLGEN_DIR: &str = env!("CARGO_MANIFEST_DIR");
const HEADER: &str = "# This file is generated. Do not edit.\n";

fn main() {
    // Re-run this build script if the model changes.
    println!("cargo:rerun-if-changed=../model/src");

    let dir = PathBuf::from(YAMLGEN_DIR).join("deploy");
    fs::create_dir_all(&dir)
        .unwrap_or_else(|e| panic!("unable to create '{}': {}", dir.display(), e));
    let path = dir.join("metrics-adapter-rbac.yaml");

    let mut f = File::create(&path)
        .unwrap_or_else(|e| panic!("unable to open file '{}' for writing: {}", path.display(), e));

    let yaml = MetricsAdapter::default()
        .to_yaml()
        .expect("unable to render the metrics adapter RBAC objects");
    f.write_all(HEADER.as_bytes())
        .expect("unable to write file header");
    f.write_all(yaml.as_bytes())
        .expect("unable to write the metrics adapter RBAC objects");
}
