use anyhow::{ensure, Context, Result};
use clap::Parser;
use clusternet_aws::aws::aws_config;
use clusternet_aws::discover_zones;
use clusternet_model::{AvailabilityZoneSet, ClusterSpec, Configuration};
use log::{debug, info};
use std::path::PathBuf;

/// Arguments shared by every subcommand that builds a plan.
#[derive(Debug, Parser)]
pub(crate) struct ClusterArgs {
    /// Path to the cluster spec (YAML or JSON).
    #[clap(long = "spec", short = 'f', parse(from_os_str))]
    spec: PathBuf,

    /// The availability zones to spread the cluster across, in order, e.g.
    /// `us-west-2a,us-west-2b`. One is needed per public subnet.
    #[clap(
        long = "zones",
        use_value_delimiter = true,
        value_delimiter = ',',
        conflicts_with = "discover-zones"
    )]
    zones: Vec<String>,

    /// Discover the availability zones from EC2 instead of passing `--zones`. The first zones in
    /// name order are used, one per public subnet.
    #[clap(long = "discover-zones")]
    discover_zones: bool,

    /// Override the region of the cluster spec.
    #[clap(long = "region")]
    region: Option<String>,

    /// Override `privateSubnetEnabled` of the cluster spec.
    #[clap(long = "private-subnet-enabled")]
    private_subnet_enabled: Option<bool>,

    /// The role to assume when discovering availability zones.
    #[clap(long = "assume-role")]
    assume_role: Option<String>,
}

impl ClusterArgs {
    /// Read the cluster spec, apply any overrides and find the zones to plan across.
    pub(crate) async fn load(&self) -> Result<(ClusterSpec, AvailabilityZoneSet)> {
        let spec = self.read_spec().await?;
        let zones = if self.discover_zones {
            let config = aws_config(&self.assume_role, &None, &Some(spec.region.clone())).await;
            let ec2_client = aws_sdk_ec2::Client::new(&config);
            discover_zones(&ec2_client, &spec.region, Some(spec.public_subnets.len()))
                .await
                .context("Unable to discover availability zones")?
        } else {
            ensure!(
                !self.zones.is_empty(),
                "Either '--zones' or '--discover-zones' is required"
            );
            AvailabilityZoneSet::new(self.zones.iter().cloned())
        };
        info!("Planning '{}' across zones [{}]", spec.name, zones);
        Ok((spec, zones))
    }

    async fn read_spec(&self) -> Result<ClusterSpec> {
        let yaml = tokio::fs::read_to_string(&self.spec)
            .await
            .context(format!("Unable to read cluster spec '{}'", self.spec.display()))?;
        let spec = ClusterSpec::from_yaml_str(&yaml)
            .context(format!("Unable to parse cluster spec '{}'", self.spec.display()))?;
        if self.region.is_none() && self.private_subnet_enabled.is_none() {
            return Ok(spec);
        }

        let mut map = spec
            .into_map()
            .context("Unable to apply command line overrides")?;
        if let Some(region) = &self.region {
            debug!("Overriding region with '{}'", region);
            map.insert("region".to_string(), region.clone().into());
        }
        if let Some(private_subnet_enabled) = self.private_subnet_enabled {
            debug!(
                "Overriding privateSubnetEnabled with '{}'",
                private_subnet_enabled
            );
            map.insert(
                "privateSubnetEnabled".to_string(),
                private_subnet_enabled.into(),
            );
        }
        ClusterSpec::from_map(map).context("Unable to apply command line overrides")
    }
}
