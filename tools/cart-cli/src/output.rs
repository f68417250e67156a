//! Output formatting for the CLI.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use turbo_cart::{Cart, Notification, Price};

/// Output handler for CLI messages.
#[derive(Debug, Clone)]
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
    pub fn json<T: Serialize>(&self, value: &T) {
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

    /// Print a list item.
    pub fn list_item(&self, item: &str) {
        if self.json {
            return;
        }
        println!("  {} {}", style("•").dim(), item);
    }

    /// Print a table row.
    pub fn table_row(&self, cols: &[&str], widths: &[usize]) {
        if self.json {
            return;
        }
        println!("  {}", format_row(cols, widths));
    }

    /// Show a notification raised by a cart operation.
    ///
    /// In JSON mode it goes to stderr as a `{"notification": ...}` object.
    pub fn notification(&self, notification: &Notification) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "notification": notification }));
            return;
        }
        eprintln!("{} {}", style("✗").red(), style(&notification.message).red());
    }

    /// Print the cart as a table, or as JSON in JSON mode.
    pub fn cart(&self, cart: &Cart) {
        if self.json {
            self.json(&CartView::new(cart));
            return;
        }

        if cart.is_empty() {
            self.info("Your cart is empty");
            return;
        }

        self.header(&format!("Cart ({} products, {} units)", cart.len(), cart.unit_count()));
        self.table_row(&["ID", "PRODUCT", "PRICE", "QTY", "SUBTOTAL"], &CART_WIDTHS);
        for item in cart {
            let id = item.id().to_string();
            let price = format_price(item.product.unit_price());
            let amount = item.amount.to_string();
            let subtotal = format_price(item.subtotal());
            self.table_row(
                &[&id, &item.product.title, &price, &amount, &subtotal],
                &CART_WIDTHS,
            );
        }
        println!();
        self.kv("Total", &style(format_price(cart.total())).bold().to_string());
    }

    /// Create a spinner for indeterminate progress.
    pub fn spinner(&self, msg: &str) -> ProgressBar {
        if self.json {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) =
            ProgressStyle::default_spinner().template("{spinner:.green} {msg}")
        {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }

    /// Check if JSON mode is enabled.
    pub fn is_json(&self) -> bool {
        self.json
    }
}

const CART_WIDTHS: [usize; 5] = [6, 32, 10, 5, 10];

fn format_row(cols: &[&str], widths: &[usize]) -> String {
    cols.iter()
        .zip(widths.iter())
        .map(|(col, width)| format!("{:width$}", col, width = width))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

fn format_price(price: Option<Price>) -> String {
    price.map_or_else(|| "overflow".to_string(), |price| price.to_string())
}

/// JSON shape of `turbo-cart show --json`.
#[derive(Debug, Serialize)]
struct CartView<'a> {
    items: &'a Cart,
    products: usize,
    units: u64,
    total: Option<Price>,
}

impl<'a> CartView<'a> {
    fn new(cart: &'a Cart) -> Self {
        Self {
            items: cart,
            products: cart.len(),
            units: cart.unit_count(),
            total: cart.total(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use turbo_cart::{LineItem, Product, ProductId};

    #[test]
    fn test_format_row_pads_columns() {
        assert_eq!(format_row(&["1", "Tênis"], &[4, 8]), "1     Tênis");
    }

    #[test]
    fn test_cart_view_json() {
        let mut cart = Cart::new();
        let product = Product::new(ProductId::new(1), "Tênis", Price::from_cents(17990), "img");
        cart.push(LineItem::new(product));
        cart.set_amount(ProductId::new(1), 2);

        let value = serde_json::to_value(CartView::new(&cart)).unwrap();
        assert_eq!(value["products"], 1);
        assert_eq!(value["units"], 2);
        assert_eq!(value["total"], 359.8);
        assert_eq!(value["items"][0]["amount"], 2);
        assert_eq!(value["items"][0]["title"], "Tênis");
    }
}
