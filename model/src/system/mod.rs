/// Kubernetes objects declared alongside the network plan. They are passed through to the
/// cluster as-is.
mod metrics_adapter;

pub use metrics_adapter::{MetricsAdapter, RbacObject};
