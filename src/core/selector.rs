//! Picks the single best-matching part for one category and sub-budget.

use crate::core::stages::{retain_if_any, Stage, StagePipeline};
use crate::domain::model::{percent_of, Amount, Category, PartCandidate};
use crate::domain::ports::{CatalogQuery, PriceRange, SortSpec};
use crate::domain::preferences::{Preferences, RecommendStyle};

/// Lower price multiplier never drops below 30% of the sub-budget.
const MIN_LOWER_PERCENT: i64 = 30;

const NOTEBOOK_PURPOSE: [&str; 4] = ["노트북", "notebook", "laptop", "랩탑"];
const MOBILE_RAM: [&str; 6] = ["노트북", "notebook", "랩탑", "laptop", "so-dimm", "sodimm"];
const ENCLOSURE: [&str; 5] = ["외장", "enclosure", "도킹", "docking", "hdd 케이스"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionLimits {
    /// Candidates fetched from the price window.
    pub primary: usize,
    /// Candidates fetched after dropping the lower bound.
    pub widened: usize,
}

impl Default for SelectionLimits {
    fn default() -> Self {
        Self {
            primary: 10,
            widened: 5,
        }
    }
}

/// Per-request facts that are not preferences.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    pub purpose: &'a str,
    pub preferences: &'a Preferences,
}

impl<'a> RequestContext<'a> {
    pub fn new(purpose: &'a str, preferences: &'a Preferences) -> Self {
        Self {
            purpose,
            preferences,
        }
    }

    pub fn is_notebook_build(&self) -> bool {
        let purpose = self.purpose.to_lowercase();
        NOTEBOOK_PURPOSE.iter().any(|kw| purpose.contains(kw))
    }
}

/// Inclusive search bounds derived from a sub-budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceWindow {
    pub min: Amount,
    pub max: Amount,
}

impl PriceWindow {
    pub fn for_budget(budget: Amount, prefs: &Preferences) -> Self {
        let flex_upper = (prefs.flex_multiplier() * 100.0).round() as i64;
        let (lower, upper) = match prefs.recommend_style {
            RecommendStyle::Value => (60, 90),
            RecommendStyle::HighEnd => (90, flex_upper),
            RecommendStyle::Balanced => (80, flex_upper),
        };
        let widen = i64::from(prefs.budget_flexibility);
        let lower = (lower - widen).max(MIN_LOWER_PERCENT);
        let upper = upper + widen;

        Self {
            min: percent_of(budget, lower),
            max: percent_of(budget, upper),
        }
    }

    pub fn range(&self) -> PriceRange {
        PriceRange::between(self.min, self.max)
    }
}

pub fn sort_spec(style: RecommendStyle) -> SortSpec {
    match style {
        RecommendStyle::Value => SortSpec::PriceAscRatingDesc,
        RecommendStyle::HighEnd => SortSpec::PriceDescRatingDesc,
        RecommendStyle::Balanced => SortSpec::RatingDesc,
    }
}

fn mentions_any(part: &PartCandidate, keys: &[&str], keywords: &[&str]) -> bool {
    let name = part.name_lower();
    keywords.iter().any(|kw| name.contains(kw))
        || keys
            .iter()
            .any(|key| keywords.iter().any(|kw| part.spec_lower(key).contains(kw)))
}

fn is_mobile_ram(part: &PartCandidate) -> bool {
    mentions_any(part, &["product_class", "device_type", "memory_type"], &MOBILE_RAM)
}

fn is_drive_enclosure(part: &PartCandidate) -> bool {
    mentions_any(part, &["product_class", "product_type"], &ENCLOSURE)
}

/// Category-specific pruning that runs before any preference stage.
fn exclude_unfit(
    category: Category,
    candidates: Vec<PartCandidate>,
    ctx: &RequestContext<'_>,
) -> Vec<PartCandidate> {
    match category {
        Category::Ram if !ctx.is_notebook_build() => {
            retain_if_any(candidates, |part| !is_mobile_ram(part))
        }
        Category::Case => candidates
            .into_iter()
            .filter(|part| !is_drive_enclosure(part))
            .collect(),
        Category::Cooler => Stage::AirCooled.apply(candidates),
        _ => candidates,
    }
}

fn brand_of(part: &PartCandidate) -> Option<String> {
    match part.manufacturer.as_deref().map(str::trim) {
        Some(m) if !m.is_empty() => Some(m.to_lowercase()),
        _ => part.name.split_whitespace().next().map(str::to_lowercase),
    }
}

pub struct CandidateSelector<'a, C: CatalogQuery + ?Sized> {
    catalog: &'a C,
    limits: SelectionLimits,
}

impl<'a, C: CatalogQuery + ?Sized> CandidateSelector<'a, C> {
    pub fn new(catalog: &'a C, limits: SelectionLimits) -> Self {
        Self { catalog, limits }
    }

    pub fn select(
        &self,
        category: Category,
        budget: Amount,
        ctx: &RequestContext<'_>,
    ) -> Option<PartCandidate> {
        self.select_admitting(category, budget, ctx, &|_| true)
    }

    /// Like [`select`](Self::select), but only candidates accepted by `admit`
    /// are considered at all.
    pub fn select_admitting(
        &self,
        category: Category,
        budget: Amount,
        ctx: &RequestContext<'_>,
        admit: &dyn Fn(&PartCandidate) -> bool,
    ) -> Option<PartCandidate> {
        let prefs = ctx.preferences;
        let window = PriceWindow::for_budget(budget, prefs);
        let sort = sort_spec(prefs.recommend_style);

        let fetch = |range: PriceRange, limit: usize| -> Vec<PartCandidate> {
            let mut found = self
                .catalog
                .query_by_category_price_range(category, range, sort, limit);
            found.retain(|part| admit(part));
            found
        };

        let mut candidates = fetch(window.range(), self.limits.primary);
        if candidates.is_empty() {
            tracing::debug!(
                "🔍 No {} in {}..={}, widening to <= {}",
                category,
                window.min,
                window.max,
                window.max
            );
            candidates = fetch(PriceRange::up_to(window.max), self.limits.widened);
        }
        if candidates.is_empty() {
            tracing::debug!("No {} candidates for sub-budget {}", category, budget);
            return None;
        }

        let candidates = exclude_unfit(category, candidates, ctx);
        let candidates = StagePipeline::for_category(category, prefs).run(candidates);

        if let Some(brand) = prefs.preferred_brand.as_deref() {
            let brand = brand.to_lowercase();
            if let Some(pinned) = candidates
                .iter()
                .find(|part| brand_of(part).as_deref() == Some(brand.as_str()))
            {
                tracing::debug!("Brand pin '{}' picked {} #{}", brand, category, pinned.id);
                return Some(pinned.clone());
            }
        }

        candidates.into_iter().next()
    }
}
