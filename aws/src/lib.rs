/*!

`clusternet-aws` is the thin layer between the planner and AWS.
`aws` sets up the SDK config, `zones` discovers the availability zones a topology is spread
across. Nothing in this crate creates or modifies AWS resources.

!*/

use constants::DEFAULT_LEVEL_FILTER;
use env_logger::Builder;
pub use error::{Error, Result};
use log::LevelFilter;
use std::env;
pub use zones::discover_zones;

pub mod aws;
pub mod constants;
mod error;
mod zones;

/// Extract the value of `RUST_LOG` if it exists, otherwise log this application at `log_level`
/// (or `DEFAULT_LEVEL_FILTER`).
pub fn init_logger(bin_crate: &str, log_level: Option<LevelFilter>) {
    match env::var(env_logger::DEFAULT_FILTER_ENV).ok() {
        Some(_) => {
            // RUST_LOG exists; env_logger will use it.
            Builder::from_default_env().init();
        }
        None => {
            // RUST_LOG does not exist; use default log level except AWS SDK.
            let log_level = log_level.unwrap_or(DEFAULT_LEVEL_FILTER);
            Builder::new()
                // Set log level to Error for crates other than our own.
                .filter_level(LevelFilter::Error)
                // Set all of our crates to the desired level.
                .filter(Some(bin_crate), log_level)
                .filter(Some("clusternet_aws"), log_level)
                .filter(Some("clusternet_model"), log_level)
                .init();
        }
    }
}
