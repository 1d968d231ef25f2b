//! Storefront CLI - drive the cart engine from the command line.
//!
//! Commands:
//! - `storefront run <script>` - Apply a script of cart steps
//! - `storefront demo` - Seed the demo cart and print it
//! - `storefront coupons` - List the coupon catalog
//! - `storefront config` - Manage configuration

mod commands;
mod config;
mod context;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ConfigArgs, CouponsArgs, DemoArgs, RunArgs};

/// Storefront CLI - price carts, apply coupons and place orders
#[derive(Parser)]
#[command(name = "storefront")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a script of cart steps and print the result
    Run(RunArgs),

    /// Seed the demo products and print the cart
    Demo(DemoArgs),

    /// List redeemable coupon codes
    Coupons(CouponsArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let ctx = context::Context::load(cli.config.as_deref(), output)?;

    // Execute command
    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args, &ctx),
        Commands::Demo(args) => commands::demo::run(args, &ctx),
        Commands::Coupons(args) => commands::coupons::run(args, &ctx),
        Commands::Config(args) => commands::config::run(args, &ctx),
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
