//! Sample catalog shown when the products source cannot be reached.

use rust_decimal::Decimal;

use crate::product::Product;
use crate::types::ProductId;

/// Built-in products substituted for the live catalog on network failure.
///
/// Categories line up with [`crate::category::DEFAULT_CATEGORIES`] so the
/// fallback catalog and fallback category list stay consistent.
#[must_use]
pub fn sample_products() -> Vec<Product> {
    vec![
        Product::new(ProductId::new(1), "Wireless Headphones", Decimal::from(7_999))
            .with_description("Over-ear headphones with active noise cancellation")
            .with_category("Electronics")
            .with_image("🎧")
            .with_rating(4.5, 128),
        Product::new(ProductId::new(2), "Smart Watch", Decimal::from(15_999))
            .with_description("Fitness tracking, heart rate and notifications")
            .with_category("Electronics")
            .with_image("⌚")
            .with_rating(4.3, 89),
        Product::new(ProductId::new(3), "Running Shoes", Decimal::from(4_499))
            .with_description("Lightweight cushioned shoes for daily runs")
            .with_category("Sports")
            .with_image("👟")
            .with_rating(4.6, 214),
        Product::new(ProductId::new(4), "Yoga Mat", Decimal::from(1_299))
            .with_description("Non-slip mat with extra cushioning")
            .with_category("Sports")
            .with_image("🧘")
            .with_rating(4.4, 97),
        Product::new(ProductId::new(5), "Coffee Maker", Decimal::from(5_499))
            .with_description("Drip coffee maker with programmable timer")
            .with_category("Home")
            .with_image("☕")
            .with_rating(4.2, 61),
        Product::new(ProductId::new(6), "Desk Lamp", Decimal::from(1_899))
            .with_description("Adjustable LED lamp with three brightness levels")
            .with_category("Home")
            .with_image("💡")
            .with_rating(4.1, 45)
            .out_of_stock(),
        Product::new(ProductId::new(7), "Leather Wallet", Decimal::from(2_499))
            .with_description("Slim bifold wallet in genuine leather")
            .with_category("Accessories")
            .with_image("👛")
            .with_rating(4.5, 152),
        Product::new(ProductId::new(8), "Sunglasses", Decimal::from(3_299))
            .with_description("Polarized unisex sunglasses with UV protection")
            .with_category("Accessories")
            .with_image("🕶️")
            .with_rating(4.0, 73),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::category::DEFAULT_CATEGORIES;

    #[test]
    fn test_sample_ids_are_unique() {
        let products = sample_products();
        let ids: HashSet<_> = products.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), products.len());
    }

    #[test]
    fn test_sample_categories_are_defaults() {
        assert!(
            sample_products()
                .iter()
                .all(|p| DEFAULT_CATEGORIES.contains(&p.category.as_str()))
        );
    }
}
