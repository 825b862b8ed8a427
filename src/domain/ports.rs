use crate::domain::model::{Amount, Category, PartCandidate, PartId};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Ordering applied by the catalog before truncating to a limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortSpec {
    /// Cheapest first, ties broken by rating.
    PriceAscRatingDesc,
    /// Most expensive first, ties broken by rating.
    PriceDescRatingDesc,
    RatingDesc,
}

/// Inclusive price bounds. A missing lower bound means "anything up to max".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRange {
    pub min: Option<Amount>,
    pub max: Amount,
}

impl PriceRange {
    pub fn between(min: Amount, max: Amount) -> Self {
        Self {
            min: Some(min),
            max,
        }
    }

    pub fn up_to(max: Amount) -> Self {
        Self { min: None, max }
    }

    pub fn contains(&self, price: Amount) -> bool {
        self.min.map_or(true, |min| price >= min) && price <= self.max
    }
}

/// Read-only view of the parts catalog.
pub trait CatalogQuery: Send + Sync {
    fn query_by_category_price_range(
        &self,
        category: Category,
        range: PriceRange,
        sort: SortSpec,
        limit: usize,
    ) -> Vec<PartCandidate>;

    fn query_all_by_category(&self, category: Category) -> Vec<PartCandidate>;

    /// Unknown ids are skipped.
    fn find_by_ids(&self, ids: &[PartId]) -> Vec<PartCandidate>;
}

/// Ordered (category, percent) pairs per purpose.
pub trait UsageWeights: Send + Sync {
    fn weights_for(&self, purpose: &str) -> Vec<(Category, u32)>;
}

/// Somewhere a catalog snapshot can be loaded from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn load(&self) -> Result<Vec<PartCandidate>>;

    fn describe(&self) -> String;
}
