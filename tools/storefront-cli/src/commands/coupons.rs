//! List the coupon catalog.

use anyhow::{bail, Result};
use serde::Serialize;
use storefront_cart::cart::{normalize_code, CouponCatalog, CouponKind, CouponRule};

use super::CouponsArgs;
use crate::context::Context;

/// A catalog entry as printed.
#[derive(Debug, Serialize, PartialEq)]
pub struct CouponRow {
    pub code: String,
    #[serde(rename = "type")]
    pub kind: CouponKind,
    pub description: String,
}

/// Describe catalog entries, optionally filtered to one code.
pub fn rows(catalog: &CouponCatalog, only: Option<&str>) -> Vec<CouponRow> {
    let wanted = only.map(normalize_code);
    catalog
        .iter()
        .filter(|(code, _)| wanted.as_deref().map_or(true, |w| w == *code))
        .map(|(code, rule)| {
            let coupon = rule.redeem(code);
            let description = match rule {
                CouponRule::Percentage(percent) => {
                    format!("{}% off the subtotal", percent.normalize())
                }
                CouponRule::Special(_) => "Free shipping".to_string(),
            };
            CouponRow {
                code: coupon.code,
                kind: coupon.kind,
                description,
            }
        })
        .collect()
}

/// Run the coupons command.
pub fn run(args: CouponsArgs, ctx: &Context) -> Result<()> {
    let rows = rows(&ctx.config.cart.coupons, args.code.as_deref());

    if let Some(code) = &args.code {
        if rows.is_empty() {
            bail!("Unknown coupon code: {}", code);
        }
    }

    if ctx.output.is_json() {
        ctx.output.json(&rows);
        return Ok(());
    }

    ctx.output.header("Coupons");
    let widths = [12, 30];
    ctx.output.table_row(&["Code", "Discount"], &widths);
    for row in &rows {
        ctx.output
            .table_row(&[row.code.as_str(), row.description.as_str()], &widths);
    }

    Ok(())
}
