//! Plain-text rendering of storefront state.

use std::fmt::Write;

use megacart_core::{Cart, CurrencyCode, Price, Product};
use megacart_storefront::Connectivity;
use megacart_storefront::api::User;
use rust_decimal::Decimal;

pub const OFFLINE_NOTICE: &str = "Backend unreachable, showing sample products.";

pub fn price(amount: Decimal) -> String {
    Price::new(amount, CurrencyCode::default()).display()
}

/// One product per line: id, name, category, price, rating.
pub fn product_table(products: &[&Product]) -> String {
    if products.is_empty() {
        return "No products found".to_string();
    }

    let mut out = String::new();
    for product in products {
        let _ = write!(
            out,
            "{:>4}  {:<28} {:<12} {:>12}  {:.1}★ ({})",
            product.id,
            product.name,
            product.category,
            price(product.price),
            product.rating,
            product.reviews
        );
        if !product.in_stock {
            out.push_str("  [out of stock]");
        }
        out.push('\n');
    }
    out.pop();
    out
}

/// Cart lines followed by the item count and total.
pub fn cart_summary(cart: &Cart) -> String {
    if cart.is_empty() {
        return "Your cart is empty".to_string();
    }

    let mut out = String::new();
    for line in cart.lines() {
        let _ = writeln!(
            out,
            "{:>4}  {:<28} x{:<4} {:>12}",
            line.id(),
            line.product.name,
            line.quantity,
            price(line.line_total())
        );
    }
    let _ = write!(
        out,
        "{} item(s), total {}",
        cart.total_item_count(),
        price(cart.total_price())
    );
    out
}

pub const fn connectivity(connectivity: Connectivity) -> &'static str {
    match connectivity {
        Connectivity::Connected => "Connected",
        Connectivity::Disconnected => "Disconnected",
        Connectivity::Unknown => "Unknown",
    }
}

pub fn user(user: &User) -> String {
    if user.name.is_empty() {
        user.email.to_string()
    } else {
        format!("{} <{}>", user.name, user.email)
    }
}
