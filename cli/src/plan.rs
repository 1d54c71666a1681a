use crate::cluster_args::ClusterArgs;
use anyhow::{Context, Result};
use clap::Parser;
use clusternet_model::{catalog, PlanFormat, ProvisioningPlan};
use std::path::PathBuf;

/// Resolve the topology, plan endpoints and access rules, and print the resulting plan.
#[derive(Debug, Parser)]
pub(crate) struct Plan {
    #[clap(flatten)]
    cluster: ClusterArgs,

    /// The output format [yaml|json].
    #[clap(long = "output", short = 'o', default_value = "yaml")]
    output: PlanFormat,

    /// Write the plan to this file instead of stdout.
    #[clap(long = "out", parse(from_os_str))]
    out: Option<PathBuf>,
}

impl Plan {
    pub(crate) async fn run(self) -> Result<()> {
        let (spec, zones) = self.cluster.load().await?;
        let plan = ProvisioningPlan::build(&spec, &zones, &catalog())
            .context(format!("Unable to plan cluster '{}'", spec.name))?;
        let rendered = plan
            .render(self.output)
            .context("Unable to render the plan")?;
        match self.out {
            Some(path) => tokio::fs::write(&path, rendered)
                .await
                .context(format!("Unable to write plan to '{}'", path.display()))?,
            None => println!("{}", rendered),
        }
        Ok(())
    }
}
