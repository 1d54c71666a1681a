use aws_sdk_ec2::error::DescribeAvailabilityZonesError;
use aws_sdk_ec2::types::SdkError;
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Unable to describe availability zones in '{}': {}", region, source))]
    DescribeAvailabilityZones {
        region: String,
        source: SdkError<DescribeAvailabilityZonesError>,
    },

    #[snafu(display("No available availability zones were found in '{}'", region))]
    NoZones { region: String },

    #[snafu(display(
        "Only {} availability zone(s) are available in '{}' but {} were requested",
        available,
        region,
        requested
    ))]
    NotEnoughZones {
        region: String,
        available: usize,
        requested: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
