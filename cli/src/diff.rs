use crate::cluster_args::ClusterArgs;
use anyhow::{Context, Result};
use clap::Parser;
use clusternet_model::{catalog, ProvisioningPlan};
use std::path::PathBuf;

/// Compare the plan for a cluster spec against a previously applied plan.
#[derive(Debug, Parser)]
pub(crate) struct Diff {
    #[clap(flatten)]
    cluster: ClusterArgs,

    /// Path to the previously applied plan (YAML or JSON).
    #[clap(long = "previous", parse(from_os_str))]
    previous: PathBuf,

    /// Output the changes in JSON format.
    #[clap(long = "json")]
    json: bool,
}

impl Diff {
    pub(crate) async fn run(self) -> Result<()> {
        let previous = tokio::fs::read_to_string(&self.previous)
            .await
            .context(format!(
                "Unable to read previous plan '{}'",
                self.previous.display()
            ))?;
        let previous = ProvisioningPlan::from_yaml_str(&previous)
            .context("Unable to parse previous plan")?;

        let (spec, zones) = self.cluster.load().await?;
        let plan = ProvisioningPlan::build(&spec, &zones, &catalog())
            .context(format!("Unable to plan cluster '{}'", spec.name))?;
        let diff = plan.diff(&previous).context("Unable to compare plans")?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&diff).context("Could not create string from diff.")?
            );
        } else if diff.is_empty() {
            println!("No changes.");
        } else {
            println!("{}", diff.to_table());
        }
        Ok(())
    }
}
