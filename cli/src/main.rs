/*!

This is the command line interface for planning a cluster's VPC: subnets, NAT, VPC endpoints and
the default security group's ingress rules.

!*/

mod catalog;
mod cluster_args;
mod diff;
mod plan;
mod rbac;
mod zones;

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

/// The command line interface for planning a Kubernetes cluster's network topology.
#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Args {
    /// Set logging verbosity [trace|debug|info|warn|error]. If the environment variable `RUST_LOG`
    /// is present, it overrides the default logging behavior. See https://docs.rs/env_logger/latest
    #[clap(long = "log-level", default_value = "info")]
    log_level: LevelFilter,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Parser)]
enum Command {
    /// Plan the topology, endpoints and access rules of a cluster.
    Plan(plan::Plan),
    /// Compare a cluster's plan against a previously applied plan.
    Diff(diff::Diff),
    /// List the availability zones of a region.
    Zones(zones::Zones),
    /// Show the VPC endpoint catalog.
    Catalog(catalog::Catalog),
    /// Print the metrics adapter RBAC objects.
    Rbac(rbac::Rbac),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    clusternet_aws::init_logger(env!("CARGO_CRATE_NAME"), Some(args.log_level));
    if let Err(e) = run(args).await {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Plan(plan) => plan.run().await,
        Command::Diff(diff) => diff.run().await,
        Command::Zones(zones) => zones.run().await,
        Command::Catalog(catalog) => catalog.run(),
        Command::Rbac(rbac) => rbac.run(),
    }
}
