use serde::{Deserialize, Serialize};

use crate::domain::product::{Product, ProductId};

/// One product snapshot plus the quantity selected for purchase.
///
/// The snapshot is taken when the product is first added, so the line keeps
/// the name and price it was added with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    fn new(product: Product) -> Self {
        Self { product, quantity: 1 }
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product.id
    }

    pub fn unit_price(&self) -> u64 {
        self.product.unit_price
    }
}

/// Insertion-ordered cart holding at most one line per product id.
///
/// Every mutation consumes the cart and returns the next value, so callers
/// replace their state wholesale and never observe a partially applied change.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id() == product_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Appends a quantity-1 line for a new product, or bumps the existing line
    /// in place.
    pub fn add(mut self, product: &Product) -> Self {
        match self.position(&product.id) {
            Some(index) => {
                let line = &mut self.lines[index];
                line.quantity = line.quantity.saturating_add(1);
            }
            None => self.lines.push(CartLine::new(product.clone())),
        }
        self
    }

    /// Drops the line for `product_id`. Absent ids are ignored.
    pub fn remove(mut self, product_id: &ProductId) -> Self {
        self.lines.retain(|line| line.product_id() != product_id);
        self
    }

    /// Shifts a line's quantity by `delta`, clamped to a floor of 1.
    ///
    /// Removal is a separate action: a decrement never deletes a line.
    pub fn set_quantity_delta(mut self, product_id: &ProductId, delta: i64) -> Self {
        if let Some(index) = self.position(product_id) {
            let line = &mut self.lines[index];
            line.quantity = clamp_quantity(line.quantity, delta);
        }
        self
    }

    fn position(&self, product_id: &ProductId) -> Option<usize> {
        self.lines.iter().position(|line| line.product_id() == product_id)
    }
}

fn clamp_quantity(current: u32, delta: i64) -> u32 {
    let next = i64::from(current).saturating_add(delta).max(1);
    u32::try_from(next).unwrap_or(u32::MAX)
}

pub fn line_total(line: &CartLine) -> u64 {
    line.unit_price().saturating_mul(u64::from(line.quantity))
}

pub fn grand_total(cart: &Cart) -> u64 {
    cart.lines().iter().map(line_total).fold(0, u64::saturating_add)
}

/// Sum of quantities, as opposed to `cart.lines().len()` which counts
/// distinct products.
pub fn item_count(cart: &Cart) -> u64 {
    cart.lines().iter().map(|line| u64::from(line.quantity)).sum()
}
