//! Output formatting for the CLI.

use console::style;
use storefront_cart::CartSummary;

/// Output handler for CLI messages.
#[derive(Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    /// Create a new output handler.
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    /// Print an info message.
    pub fn info(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("ℹ").blue(), msg);
    }

    /// Print a success message.
    pub fn success(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("✓").green(), msg);
    }

    /// Print a warning message.
    pub fn warn(&self, msg: &str) {
        if self.json {
            return;
        }
        eprintln!("{} {}", style("⚠").yellow(), msg);
    }

    /// Print an error message.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
            return;
        }
        eprintln!("{} {}", style("✗").red(), style(msg).red());
    }

    /// Print a debug message (only in verbose mode).
    pub fn debug(&self, msg: &str) {
        if !self.verbose || self.json {
            return;
        }
        eprintln!("{} {}", style("→").dim(), style(msg).dim());
    }

    /// Print a header/title.
    pub fn header(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print JSON output.
    pub fn json<T: serde::Serialize>(&self, value: &T) {
        if let Ok(json) = serde_json::to_string_pretty(value) {
            println!("{}", json);
        }
    }

    /// Print a key-value pair.
    pub fn kv(&self, key: &str, value: &str) {
        if self.json {
            return;
        }
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a table row.
    pub fn table_row(&self, cols: &[&str], widths: &[usize]) {
        if self.json {
            return;
        }
        let formatted: Vec<String> = cols
            .iter()
            .zip(widths.iter())
            .map(|(col, width)| format!("{:width$}", col, width = width))
            .collect();
        println!("  {}", formatted.join("  "));
    }

    /// Print a cart summary as a table, or as JSON in JSON mode.
    pub fn summary(&self, summary: &CartSummary) {
        if self.json {
            self.json(summary);
            return;
        }

        self.header("Cart");
        if summary.is_empty {
            self.info("Your cart is empty");
            return;
        }

        let widths = [6, 34, 5, 14];
        self.table_row(&["ID", "Product", "Qty", "Line total"], &widths);
        for line in &summary.items {
            let quantity = line.quantity.to_string();
            self.table_row(
                &[
                    line.id.as_str(),
                    line.name.as_str(),
                    quantity.as_str(),
                    line.line_total_formatted.as_str(),
                ],
                &widths,
            );
        }

        println!();
        self.kv("Subtotal", &summary.subtotal_formatted);
        if summary.include_tax {
            self.kv(&format!("Tax ({})", summary.tax_percentage), &summary.tax_formatted);
        }
        if summary.include_shipping {
            self.kv("Shipping", &summary.shipping_formatted);
        }
        if let Some(coupon) = &summary.applied_coupon {
            self.kv(
                &format!("Discount ({})", coupon.code),
                &format!("-{}", summary.discount_formatted),
            );
        }
        self.kv(
            "Total",
            &style(&summary.total_formatted).bold().to_string(),
        );
        self.kv(
            "Items",
            &format!("{} ({} unique)", summary.item_count, summary.unique_item_count),
        );
    }

    /// Check if verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Check if JSON mode is enabled.
    pub fn is_json(&self) -> bool {
        self.json
    }
}
