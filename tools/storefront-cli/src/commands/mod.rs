//! CLI command implementations.

pub mod config;
pub mod coupons;
pub mod demo;
pub mod run;

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Script of cart steps (TOML).
    pub script: PathBuf,

    /// Print the order API payload instead of the summary.
    #[arg(long, conflicts_with = "order")]
    pub export: bool,

    /// Place an order with the customer details in this file (TOML).
    #[arg(long)]
    pub order: Option<PathBuf>,
}

/// Arguments for the demo command.
#[derive(Args)]
pub struct DemoArgs {
    /// Coupon code to apply after seeding.
    #[arg(short, long)]
    pub coupon: Option<String>,
}

/// Arguments for the coupons command.
#[derive(Args)]
pub struct CouponsArgs {
    /// Only show this code.
    pub code: Option<String>,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file.
    Validate,
}
