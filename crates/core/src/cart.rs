//! Client-side cart ledger.
//!
//! The cart holds at most one line per product id and never stores a
//! quantity below one. All operations are synchronous and leave those two
//! invariants intact.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::product::Product;
use crate::types::ProductId;

/// One cart entry: a product snapshot plus how many of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineItem {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

impl CartLineItem {
    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.product.id
    }

    /// `price * quantity`, saturating at [`Decimal::MAX`].
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product
            .price
            .saturating_mul(Decimal::from(self.quantity))
    }
}

/// Ordered collection of line items, in the order products were first added.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Cart {
    lines: Vec<CartLineItem>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add `quantity` of `product`.
    ///
    /// Merges into the existing line for the same id, otherwise appends a new
    /// line. Adding zero is a no-op. There is no stock check here.
    pub fn add_to_cart(&mut self, product: &Product, quantity: u32) {
        if quantity == 0 {
            return;
        }
        match self.line_mut(product.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.lines.push(CartLineItem {
                product: product.clone(),
                quantity,
            }),
        }
    }

    /// Add a single unit of `product`.
    pub fn add_one(&mut self, product: &Product) {
        self.add_to_cart(product, 1);
    }

    /// Remove the line for `id`. Absent ids are ignored.
    pub fn remove_from_cart(&mut self, id: ProductId) {
        self.lines.retain(|line| line.id() != id);
    }

    /// Set the quantity for `id` to exactly `new_quantity`.
    ///
    /// Zero or negative removes the line. Absent ids are ignored. Values
    /// above `u32::MAX` are clamped.
    pub fn update_quantity(&mut self, id: ProductId, new_quantity: i64) {
        if new_quantity <= 0 {
            self.remove_from_cart(id);
            return;
        }
        if let Some(line) = self.line_mut(id) {
            line.quantity = u32::try_from(new_quantity).unwrap_or(u32::MAX);
        }
    }

    /// Sum of `price * quantity` over all lines.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.lines
            .iter()
            .fold(Decimal::ZERO, |total, line| total.saturating_add(line.line_total()))
    }

    /// Sum of quantities (not the number of distinct products).
    #[must_use]
    pub fn total_item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Number of distinct products in the cart.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLineItem] {
        &self.lines
    }

    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartLineItem> {
        self.lines.iter().find(|line| line.id() == id)
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    fn line_mut(&mut self, id: ProductId) -> Option<&mut CartLineItem> {
        self.lines.iter_mut().find(|line| line.id() == id)
    }
}
