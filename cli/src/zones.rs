use anyhow::{Context, Result};
use clap::Parser;
use clusternet_aws::aws::aws_config;
use clusternet_aws::constants::DEFAULT_REGION;
use clusternet_aws::discover_zones;

/// List the availability zones of a region.
#[derive(Debug, Parser)]
pub(crate) struct Zones {
    /// The region to list zones for.
    #[clap(long = "region", default_value = DEFAULT_REGION)]
    region: String,

    /// Only list the first `limit` zones in name order.
    #[clap(long = "limit")]
    limit: Option<usize>,

    /// The role to assume for the EC2 call.
    #[clap(long = "assume-role")]
    assume_role: Option<String>,

    /// Output the zones in JSON format.
    #[clap(long = "json")]
    json: bool,
}

impl Zones {
    pub(crate) async fn run(self) -> Result<()> {
        let config = aws_config(&self.assume_role, &None, &Some(self.region.clone())).await;
        let ec2_client = aws_sdk_ec2::Client::new(&config);
        let zones = discover_zones(&ec2_client, &self.region, self.limit)
            .await
            .context("Unable to discover availability zones")?;
        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&zones).context("Could not create string from zones.")?
            );
        } else {
            println!("{}", zones);
        }
        Ok(())
    }
}
