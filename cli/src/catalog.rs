use anyhow::{Context, Result};
use clap::Parser;
use clusternet_aws::constants::DEFAULT_REGION;
use clusternet_model::{catalog, catalog_table};

/// Show the VPC endpoint catalog and how each entry is classified.
#[derive(Debug, Parser)]
pub(crate) struct Catalog {
    /// The region used to build the service names.
    #[clap(long = "region", default_value = DEFAULT_REGION)]
    region: String,

    /// Output the catalog in JSON format.
    #[clap(long = "json")]
    json: bool,
}

impl Catalog {
    pub(crate) fn run(self) -> Result<()> {
        let catalog = catalog();
        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&catalog)
                    .context("Could not create string from catalog.")?
            );
        } else {
            println!("{}", catalog_table(&catalog, &self.region));
        }
        Ok(())
    }
}
