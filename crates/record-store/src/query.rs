//! Browse filters for the catalog.

use common::Money;

use crate::Product;

/// Builder for farmer-facing catalog browsing.
///
/// Filters apply on top of the baseline browse predicate (published,
/// available, positive stock), which the store implementations enforce
/// themselves.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Case-insensitive substring match on name or description.
    pub search: Option<String>,

    /// Exact category match.
    pub category: Option<String>,

    /// Minimum unit price (inclusive).
    pub min_price: Option<Money>,

    /// Maximum unit price (inclusive).
    pub max_price: Option<Money>,
}

impl ProductFilter {
    /// Creates a new empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by a case-insensitive text search over name and description.
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Filters by category.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Filters by minimum unit price (inclusive).
    pub fn min_price(mut self, price: Money) -> Self {
        self.min_price = Some(price);
        self
    }

    /// Filters by maximum unit price (inclusive).
    pub fn max_price(mut self, price: Money) -> Self {
        self.max_price = Some(price);
        self
    }

    /// Returns true if the product passes every configured filter.
    ///
    /// Does not include the baseline browse predicate.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(ref term) = self.search {
            let term = term.to_lowercase();
            if !product.name.to_lowercase().contains(&term)
                && !product.description.to_lowercase().contains(&term)
            {
                return false;
            }
        }
        if let Some(ref category) = self.category
            && &product.category != category
        {
            return false;
        }
        if let Some(min) = self.min_price
            && product.price < min
        {
            return false;
        }
        if let Some(max) = self.max_price
            && product.price > max
        {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{ShopId, UserId};

    fn sample() -> Product {
        let mut product = Product::new(
            ShopId::new(),
            UserId::new(),
            "Neem Oil Spray",
            "pesticide",
            Money::from_rupees(120),
            10,
        );
        product.description = "Cold-pressed neem concentrate".to_string();
        product
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(ProductFilter::new().matches(&sample()));
    }

    #[test]
    fn search_is_case_insensitive_over_name_and_description() {
        let product = sample();
        assert!(ProductFilter::new().search("NEEM").matches(&product));
        assert!(ProductFilter::new().search("concentrate").matches(&product));
        assert!(!ProductFilter::new().search("urea").matches(&product));
    }

    #[test]
    fn category_must_match_exactly() {
        let product = sample();
        assert!(ProductFilter::new().category("pesticide").matches(&product));
        assert!(!ProductFilter::new().category("fertilizer").matches(&product));
    }

    #[test]
    fn price_band_is_inclusive() {
        let product = sample();
        let filter = ProductFilter::new()
            .min_price(Money::from_rupees(120))
            .max_price(Money::from_rupees(120));
        assert!(filter.matches(&product));

        let filter = ProductFilter::new().min_price(Money::from_rupees(121));
        assert!(!filter.matches(&product));
    }
}
