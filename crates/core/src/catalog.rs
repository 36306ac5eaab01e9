//! Catalog filtering.
//!
//! [`filter`] is the pure derivation from `(products, FilterState)` to the
//! visible list. [`CatalogView`] wraps it with a memo so the storefront can
//! ask for the visible products on every keystroke without re-scanning an
//! unchanged catalog.

use rust_decimal::Decimal;

use crate::category::ALL_CATEGORIES;
use crate::product::Product;
use crate::types::ProductId;

/// User-controlled filter inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    /// Case-insensitive substring matched against product names.
    pub search_term: String,
    /// Exact category name, or [`ALL_CATEGORIES`] for no category filter.
    pub selected_category: String,
    /// Inclusive lower price bound.
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound.
    pub max_price: Option<Decimal>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            selected_category: ALL_CATEGORIES.to_owned(),
            min_price: None,
            max_price: None,
        }
    }
}

impl FilterState {
    #[must_use]
    pub fn new(search_term: impl Into<String>, selected_category: impl Into<String>) -> Self {
        Self {
            search_term: search_term.into(),
            selected_category: selected_category.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_price_range(mut self, min: Option<Decimal>, max: Option<Decimal>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    /// Whether this state lets every product through.
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.search_term.is_empty()
            && self.selected_category == ALL_CATEGORIES
            && self.min_price.is_none()
            && self.max_price.is_none()
    }

    fn matcher(&self) -> Matcher<'_> {
        Matcher {
            needle: self.search_term.to_lowercase(),
            state: self,
        }
    }
}

struct Matcher<'a> {
    needle: String,
    state: &'a FilterState,
}

impl Matcher<'_> {
    fn matches(&self, product: &Product) -> bool {
        let state = self.state;
        (self.needle.is_empty() || product.name.to_lowercase().contains(&self.needle))
            && (state.selected_category == ALL_CATEGORIES
                || product.category == state.selected_category)
            && state.min_price.is_none_or(|min| product.price >= min)
            && state.max_price.is_none_or(|max| product.price <= max)
    }
}

/// Return the products matching `state`, in input order.
#[must_use]
pub fn filter(products: &[Product], state: &FilterState) -> Vec<Product> {
    let matcher = state.matcher();
    products
        .iter()
        .filter(|product| matcher.matches(product))
        .cloned()
        .collect()
}

/// A catalog plus its current filter, with the filtered result memoized.
///
/// The memo is keyed on the catalog generation (bumped whenever the product
/// list is replaced) and the full [`FilterState`].
#[derive(Debug, Clone, Default)]
pub struct CatalogView {
    products: Vec<Product>,
    generation: u64,
    state: FilterState,
    memo: Option<Memo>,
    #[cfg(test)]
    recomputations: u64,
}

#[derive(Debug, Clone)]
struct Memo {
    generation: u64,
    state: FilterState,
    indices: Vec<usize>,
}

impl CatalogView {
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            ..Self::default()
        }
    }

    /// Replace the whole catalog. The filter state is kept.
    pub fn replace_products(&mut self, products: Vec<Product>) {
        self.products = products;
        self.generation = self.generation.wrapping_add(1);
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub const fn filter_state(&self) -> &FilterState {
        &self.state
    }

    pub fn set_filter_state(&mut self, state: FilterState) {
        self.state = state;
    }

    pub fn set_search_term(&mut self, search_term: impl Into<String>) {
        self.state.search_term = search_term.into();
    }

    pub fn select_category(&mut self, category: impl Into<String>) {
        self.state.selected_category = category.into();
    }

    pub const fn set_price_range(&mut self, min: Option<Decimal>, max: Option<Decimal>) {
        self.state.min_price = min;
        self.state.max_price = max;
    }

    /// Look a product up by id in the full (unfiltered) catalog.
    #[must_use]
    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|product| product.id == id)
    }

    /// The products passing the current filter, in catalog order.
    pub fn visible(&mut self) -> Vec<&Product> {
        self.refresh();
        let indices = self.memo.as_ref().map_or(&[][..], |memo| memo.indices.as_slice());
        indices
            .iter()
            .filter_map(|&index| self.products.get(index))
            .collect()
    }

    /// Number of products passing the current filter.
    pub fn visible_count(&mut self) -> usize {
        self.refresh();
        self.memo.as_ref().map_or(0, |memo| memo.indices.len())
    }

    fn refresh(&mut self) {
        let fresh = self
            .memo
            .as_ref()
            .is_some_and(|memo| memo.generation == self.generation && memo.state == self.state);
        if fresh {
            return;
        }

        let matcher = self.state.matcher();
        let indices = self
            .products
            .iter()
            .enumerate()
            .filter(|(_, product)| matcher.matches(product))
            .map(|(index, _)| index)
            .collect();
        self.memo = Some(Memo {
            generation: self.generation,
            state: self.state.clone(),
            indices,
        });
        #[cfg(test)]
        {
            self.recomputations += 1;
        }
    }
}
