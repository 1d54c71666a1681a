/*!

This crate is used to write out the YAML representation of the Kubernetes objects declared next
to the network plan, currently the custom metrics adapter's RBAC objects.
These objects are defined in Rust and can be printed with `clusternet rbac`, thus the YAML
representation is not strictly necessary.
It does come in handy though for reference, testing and GitOps style deployment.

This `lib.rs` file is intentionally empty as `yamlgen` provides a `build.rs` that is invoked during
builds of other crates that specify `yamlgen` as a `build-dependency`.

!*/
