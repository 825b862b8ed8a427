use crate::domain::model::{Amount, Category, PartCandidate, SelectionResult, UpgradeOption};
use crate::domain::ports::{CatalogQuery, PriceRange, SortSpec};
use std::fmt;

/// Only these categories are offered as upgrades.
pub const UPGRADE_CATEGORIES: [Category; 2] = [Category::Cpu, Category::Gpu];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpgradeLimits {
    /// Below this much unspent budget no upgrades are proposed.
    pub min_leftover: Amount,
    pub max_options: usize,
}

impl Default for UpgradeLimits {
    fn default() -> Self {
        Self {
            min_leftover: 50_000,
            max_options: 3,
        }
    }
}

/// Where a price sits within its category's catalog range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceTier {
    Entry,
    Mainstream,
    Flagship,
}

impl PriceTier {
    /// Thirds of the [cheapest, dearest] span. A zero-width span is mainstream.
    pub fn within(price: Amount, prices: &[Amount]) -> Self {
        let (Some(low), Some(high)) = (prices.iter().min(), prices.iter().max()) else {
            return PriceTier::Mainstream;
        };
        let span = high - low;
        if span == 0 {
            return PriceTier::Mainstream;
        }
        let offset = (price - low).clamp(0, span);
        if offset * 3 < span {
            PriceTier::Entry
        } else if offset * 3 < span * 2 {
            PriceTier::Mainstream
        } else {
            PriceTier::Flagship
        }
    }
}

impl fmt::Display for PriceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PriceTier::Entry => "entry",
            PriceTier::Mainstream => "mainstream",
            PriceTier::Flagship => "flagship",
        })
    }
}

fn benefit_phrase(category: Category) -> &'static str {
    match category {
        Category::Cpu => "Faster multi-core and single-thread performance",
        Category::Gpu => "Higher frame rates and faster rendering",
        _ => "Better performance",
    }
}

pub struct UpgradeAdvisor<'a, C: CatalogQuery + ?Sized> {
    catalog: &'a C,
    limits: UpgradeLimits,
}

impl<'a, C: CatalogQuery + ?Sized> UpgradeAdvisor<'a, C> {
    pub fn new(catalog: &'a C, limits: UpgradeLimits) -> Self {
        Self { catalog, limits }
    }

    pub fn suggest(
        &self,
        selection: &SelectionResult,
        budget: Amount,
        total_price: Amount,
    ) -> Vec<UpgradeOption> {
        let leftover = budget - total_price;
        if leftover < self.limits.min_leftover {
            tracing::debug!(
                "Leftover {} below {}, no upgrades proposed",
                leftover,
                self.limits.min_leftover
            );
            return Vec::new();
        }

        UPGRADE_CATEGORIES
            .iter()
            .filter_map(|category| selection.get(category))
            .flat_map(|current| self.options_for(current, leftover))
            .collect()
    }

    fn options_for(&self, current: &PartCandidate, leftover: Amount) -> Vec<UpgradeOption> {
        let category = current.category;
        let range = PriceRange::between(current.price + 1, current.price.saturating_add(leftover));
        let candidates = self.catalog.query_by_category_price_range(
            category,
            range,
            SortSpec::RatingDesc,
            self.limits.max_options,
        );
        if candidates.is_empty() {
            return Vec::new();
        }

        let prices: Vec<Amount> = self
            .catalog
            .query_all_by_category(category)
            .iter()
            .map(|part| part.price)
            .collect();

        candidates
            .into_iter()
            .map(|part| {
                let tier = PriceTier::within(part.price, &prices);
                UpgradeOption {
                    category,
                    additional_cost: part.price - current.price,
                    benefit: format!("{} ({} tier)", benefit_phrase(category), tier),
                    part,
                }
            })
            .collect()
    }
}
