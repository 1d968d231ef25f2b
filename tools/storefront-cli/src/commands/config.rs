//! Configuration management commands.

use std::fs;
use std::io::IsTerminal;

use anyhow::{bail, Result};
use dialoguer::Confirm;
use storefront_cart::cart::CouponRule;
use storefront_cart::CartConfig;

use super::{ConfigArgs, ConfigCommand};
use crate::config::{generate_default_config, CONFIG_NAMES};
use crate::context::Context;

/// Run the config command.
pub fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(built-in defaults)"),
    }

    let cart = &ctx.config.cart;
    ctx.output.info("");
    ctx.output.info("[cart]");
    ctx.output.kv("tax_rate", &format!("{} ({})", cart.tax_rate, cart.tax_percentage()));
    ctx.output.kv("include_tax", &cart.include_tax.to_string());
    ctx.output.kv(
        "shipping_fee_per_item",
        &cart.shipping_fee_per_item.display(&cart.currency),
    );
    ctx.output.kv("include_shipping", &cart.include_shipping.to_string());
    ctx.output.kv("currency", &cart.currency);

    ctx.output.info("");
    ctx.output.info("[cart.coupons]");
    for (code, rule) in cart.coupons.iter() {
        let value = match rule {
            CouponRule::Percentage(percent) => format!("{}%", percent.normalize()),
            CouponRule::Special(_) => "free shipping".to_string(),
        };
        ctx.output.kv(code, &value);
    }

    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join(CONFIG_NAMES[0]);

    if config_path.exists() && !force {
        let overwrite = std::io::stdin().is_terminal()
            && Confirm::new()
                .with_prompt(format!("{} exists. Overwrite?", config_path.display()))
                .default(false)
                .interact()?;
        if !overwrite {
            bail!(
                "Config file already exists: {}. Use --force to overwrite.",
                config_path.display()
            );
        }
    }

    fs::write(&config_path, generate_default_config())?;
    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let (errors, warnings) = check(&ctx.config.cart);

    if errors.is_empty() && warnings.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for error in &errors {
        ctx.output.error(&format!("Error: {}", error));
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    if !errors.is_empty() {
        bail!("Configuration has {} error(s)", errors.len());
    }

    ctx.output.success("Configuration is valid (with warnings)");

    Ok(())
}

/// Collect errors and warnings for a cart configuration.
fn check(cart: &CartConfig) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if let Err(e) = cart.validate() {
        errors.push(e.to_string());
    }
    if cart.currency.trim().is_empty() {
        warnings.push("cart.currency is empty; amounts print without a symbol".to_string());
    }
    if cart.coupons.is_empty() {
        warnings.push("cart.coupons is empty; every code will be rejected".to_string());
    }
    if !cart.include_tax && !cart.tax_rate.is_zero() {
        warnings.push(format!(
            "cart.tax_rate {} is ignored while include_tax is false",
            cart.tax_rate
        ));
    }

    (errors, warnings)
}
