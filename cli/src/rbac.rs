use anyhow::{Context, Result};
use clap::Parser;
use clusternet_model::constants::{METRICS_ADAPTER_NAME, METRICS_ADAPTER_NAMESPACE};
use clusternet_model::system::MetricsAdapter;

/// Print the RBAC objects the custom metrics adapter needs.
#[derive(Debug, Parser)]
pub(crate) struct Rbac {
    /// The name of the adapter's service account.
    #[clap(long = "name", default_value = METRICS_ADAPTER_NAME)]
    name: String,

    /// The namespace the adapter runs in.
    #[clap(long = "namespace", default_value = METRICS_ADAPTER_NAMESPACE)]
    namespace: String,
}

impl Rbac {
    pub(crate) fn run(self) -> Result<()> {
        let yaml = MetricsAdapter::new(self.name, self.namespace)
            .to_yaml()
            .context("Unable to render the metrics adapter RBAC objects")?;
        print!("{}", yaml);
        Ok(())
    }
}
