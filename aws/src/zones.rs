use crate::error::{self, Result};
use aws_sdk_ec2::model::{AvailabilityZone, Filter};
use clusternet_model::AvailabilityZoneSet;
use log::{debug, info};
use snafu::{ensure, ResultExt};

const ZONE_TYPE_AVAILABILITY_ZONE: &str = "availability-zone";

/// Discover the available availability zones of `region`. Local zones and wavelength zones are
/// skipped. Zones are returned in name order; when `limit` is set only the first `limit` zones
/// are returned and it is an error for fewer to exist.
pub async fn discover_zones(
    ec2_client: &aws_sdk_ec2::Client,
    region: &str,
    limit: Option<usize>,
) -> Result<AvailabilityZoneSet> {
    info!("Discovering availability zones in '{}'", region);
    let output = ec2_client
        .describe_availability_zones()
        .filters(Filter::builder().name("state").values("available").build())
        .filters(
            Filter::builder()
                .name("zone-type")
                .values(ZONE_TYPE_AVAILABILITY_ZONE)
                .build(),
        )
        .send()
        .await
        .context(error::DescribeAvailabilityZonesSnafu { region })?;
    select_zones(output.availability_zones().unwrap_or_default(), region, limit)
}

fn select_zones(
    zones: &[AvailabilityZone],
    region: &str,
    limit: Option<usize>,
) -> Result<AvailabilityZoneSet> {
    let mut names: Vec<String> = zones
        .iter()
        .filter(|zone| {
            zone.zone_type()
                .map(|zone_type| zone_type == ZONE_TYPE_AVAILABILITY_ZONE)
                .unwrap_or(true)
        })
        .filter_map(|zone| zone.zone_name().map(str::to_string))
        .collect();
    names.sort();
    names.dedup();
    debug!("Available zones in '{}': {:?}", region, names);
    ensure!(!names.is_empty(), error::NoZonesSnafu { region });

    if let Some(limit) = limit {
        ensure!(
            names.len() >= limit,
            error::NotEnoughZonesSnafu {
                region,
                available: names.len(),
                requested: limit,
            }
        );
        names.truncate(limit);
    }
    Ok(AvailabilityZoneSet::new(names))
}
