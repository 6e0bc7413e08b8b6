use serde::{Deserialize, Serialize};

use crate::domain::cart::{grand_total, item_count, line_total, Cart};
use crate::domain::product::ProductId;

pub const DEFAULT_CURRENCY: &str = "₽";

/// Renders a whole-number price the way the storefront shows it: digits
/// grouped in threes with a space, then the currency sign.
pub fn format_price(amount: u64, currency: &str) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(digit);
    }

    if currency.is_empty() {
        return grouped;
    }
    format!("{grouped} {currency}")
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSummaryLine {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: u64,
    pub line_total: u64,
    pub display_line_total: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSummary {
    pub lines: Vec<CartSummaryLine>,
    pub distinct_products: usize,
    pub item_count: u64,
    pub grand_total: u64,
    pub display_grand_total: String,
}

impl CartSummary {
    pub fn from_cart(cart: &Cart, currency: &str) -> Self {
        let lines = cart
            .lines()
            .iter()
            .map(|line| {
                let total = line_total(line);
                CartSummaryLine {
                    product_id: line.product_id().clone(),
                    name: line.product.name.clone(),
                    quantity: line.quantity,
                    unit_price: line.unit_price(),
                    line_total: total,
                    display_line_total: format_price(total, currency),
                }
            })
            .collect::<Vec<_>>();
        let total = grand_total(cart);

        Self {
            distinct_products: lines.len(),
            lines,
            item_count: item_count(cart),
            grand_total: total,
            display_grand_total: format_price(total, currency),
        }
    }
}
