use crate::domain::model::{Category, PartCandidate, PartId};
use crate::domain::ports::{CatalogQuery, CatalogSource, PriceRange, SortSpec};
use crate::utils::error::Result;
use std::cmp::Ordering;

/// Catalog snapshot held in memory. Queries never touch the source again.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    parts: Vec<PartCandidate>,
}

impl InMemoryCatalog {
    pub fn new(parts: Vec<PartCandidate>) -> Self {
        Self { parts }
    }

    pub async fn from_source(source: &dyn CatalogSource) -> Result<Self> {
        tracing::info!("📥 Loading catalog from {}", source.describe());
        let parts = source.load().await?;
        tracing::info!("📦 Catalog loaded: {} parts", parts.len());
        Ok(Self::new(parts))
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

fn by_rating_desc(a: &PartCandidate, b: &PartCandidate) -> Ordering {
    b.rating().total_cmp(&a.rating())
}

fn compare(sort: SortSpec, a: &PartCandidate, b: &PartCandidate) -> Ordering {
    match sort {
        SortSpec::PriceAscRatingDesc => a.price.cmp(&b.price).then_with(|| by_rating_desc(a, b)),
        SortSpec::PriceDescRatingDesc => b.price.cmp(&a.price).then_with(|| by_rating_desc(a, b)),
        SortSpec::RatingDesc => by_rating_desc(a, b),
    }
}

impl CatalogQuery for InMemoryCatalog {
    fn query_by_category_price_range(
        &self,
        category: Category,
        range: PriceRange,
        sort: SortSpec,
        limit: usize,
    ) -> Vec<PartCandidate> {
        let mut matches: Vec<PartCandidate> = self
            .parts
            .iter()
            .filter(|part| part.category == category && range.contains(part.price))
            .cloned()
            .collect();
        // 穩定排序，同分保留目錄順序
        matches.sort_by(|a, b| compare(sort, a, b));
        matches.truncate(limit);
        matches
    }

    fn query_all_by_category(&self, category: Category) -> Vec<PartCandidate> {
        self.parts
            .iter()
            .filter(|part| part.category == category)
            .cloned()
            .collect()
    }

    fn find_by_ids(&self, ids: &[PartId]) -> Vec<PartCandidate> {
        ids.iter()
            .filter_map(|id| self.parts.iter().find(|part| part.id == *id))
            .cloned()
            .collect()
    }
}
