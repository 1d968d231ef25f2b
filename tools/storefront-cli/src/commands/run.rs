//! Run a script of cart steps.
//!
//! A script is a TOML file with a `[[steps]]` array; each step names its
//! operation in `op`:
//!
//! ```toml
//! [[steps]]
//! op = "add"
//! id = "1"
//! name = "Face Oil Premium"
//! price = 24990
//! quantity = 2
//!
//! [[steps]]
//! op = "coupon"
//! code = "save10"
//! ```

use std::path::Path;

use anyhow::{Context as _, Result};
use chrono::Utc;
use serde::Deserialize;
use storefront_cart::cart::ProductInput;
use storefront_cart::checkout::{place_order, OrderDetails};
use storefront_cart::{CartEngine, ConfigOverrides, ProductId, StateStore};

use super::RunArgs;
use crate::context::Context;
use crate::output::Output;

/// A cart script.
#[derive(Debug, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Script {
    /// Parse a script from TOML.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse script: {}", path.display()))
    }
}

/// One cart operation.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Add {
        #[serde(flatten)]
        product: ProductInput,
    },
    Remove {
        id: ProductId,
    },
    Update {
        id: ProductId,
        quantity: i64,
    },
    Increment {
        id: ProductId,
    },
    Decrement {
        id: ProductId,
    },
    Clear,
    Coupon {
        code: String,
    },
    RemoveCoupon,
    Config {
        #[serde(flatten)]
        overrides: ConfigOverrides,
    },
    Open,
    Close,
}

impl Step {
    /// Short label for progress messages.
    pub fn label(&self) -> &'static str {
        match self {
            Step::Add { .. } => "add",
            Step::Remove { .. } => "remove",
            Step::Update { .. } => "update",
            Step::Increment { .. } => "increment",
            Step::Decrement { .. } => "decrement",
            Step::Clear => "clear",
            Step::Coupon { .. } => "coupon",
            Step::RemoveCoupon => "remove_coupon",
            Step::Config { .. } => "config",
            Step::Open => "open",
            Step::Close => "close",
        }
    }

    /// Apply the step to a cart.
    ///
    /// Only a rejected product fails the step; a rejected coupon is
    /// reported and the script carries on.
    pub fn apply<S: StateStore>(self, engine: &mut CartEngine<S>, output: &Output) -> Result<()> {
        match self {
            Step::Add { product } => engine.add_item(product)?,
            Step::Remove { id } => engine.remove_item(&id),
            Step::Update { id, quantity } => engine.update_quantity(&id, quantity),
            Step::Increment { id } => engine.increment_item(&id),
            Step::Decrement { id } => engine.decrement_item(&id),
            Step::Clear => engine.clear_cart(),
            Step::Coupon { code } => {
                let outcome = engine.apply_coupon(&code);
                if outcome.is_success() {
                    output.success(&outcome.message);
                } else {
                    output.warn(&format!("{}: {}", outcome.message, outcome.code));
                }
            }
            Step::RemoveCoupon => {
                if let Some(coupon) = engine.remove_coupon() {
                    output.info(&format!("Removed coupon {}", coupon.code));
                }
            }
            Step::Config { overrides } => engine.update_config(overrides),
            Step::Open => engine.open_cart(),
            Step::Close => engine.close_cart(),
        }
        Ok(())
    }
}

/// Run the run command.
pub fn run(args: RunArgs, ctx: &Context) -> Result<()> {
    let script = Script::load(&ctx.resolve_path(&args.script))?;
    let mut engine = ctx.engine();

    let total = script.steps.len();
    for (i, step) in script.steps.into_iter().enumerate() {
        let label = step.label();
        ctx.output.debug(&format!("[{}/{}] {}", i + 1, total, label));
        step.apply(&mut engine, &ctx.output)
            .with_context(|| format!("Step {} ({}) failed", i + 1, label))?;
    }

    if let Some(path) = args.order {
        let path = ctx.resolve_path(&path);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read order details: {}", path.display()))?;
        let details: OrderDetails = toml::from_str(&content)
            .with_context(|| format!("Failed to parse order details: {}", path.display()))?;

        let order = place_order(&mut engine, details, Utc::now()).context("Order not placed")?;
        ctx.output.success(&format!(
            "Order placed: {} via {}",
            order.totals.total.display(&engine.config().currency),
            order.payment.method.display_name()
        ));
        ctx.output.json(&order);
        return Ok(());
    }

    if args.export {
        ctx.output.json(&engine.export_for_api());
    } else {
        ctx.output.summary(&engine.cart_summary());
    }

    Ok(())
}
