//! Entry points used by transports: build a recommendation, or check a set of
//! parts someone already picked.

use crate::core::allocator::BudgetAllocator;
use crate::core::compatibility::CompatibilityChecker;
use crate::core::resolution::{Resolution, ResolutionLoop, DEFAULT_COOLER_RESERVE_PERCENT};
use crate::core::selector::{CandidateSelector, RequestContext, SelectionLimits};
use crate::core::upgrade::{UpgradeAdvisor, UpgradeLimits};
use crate::domain::model::{
    total_price, Amount, CompatibilityOutcome, PartId, Recommendation, SelectionResult,
};
use crate::domain::ports::{CatalogQuery, UsageWeights};
use crate::domain::preferences::Preferences;
use crate::utils::error::{AdvisorError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildRequest {
    pub budget: Amount,
    pub purpose: String,
    #[serde(default)]
    pub preferences: Map<String, Value>,
}

impl BuildRequest {
    pub fn new(budget: Amount, purpose: impl Into<String>) -> Self {
        Self {
            budget,
            purpose: purpose.into(),
            preferences: Map::new(),
        }
    }

    pub fn with_preferences(mut self, preferences: Map<String, Value>) -> Self {
        self.preferences = preferences;
        self
    }
}

impl Validate for BuildRequest {
    fn validate(&self) -> Result<()> {
        if self.budget <= 0 {
            return Err(AdvisorError::invalid_request(format!(
                "budget must be positive, got {}",
                self.budget
            )));
        }
        if self.purpose.trim().is_empty() {
            return Err(AdvisorError::invalid_request("purpose must not be empty"));
        }
        Ok(())
    }
}

/// Tunables shared by every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub selection: SelectionLimits,
    pub cooler_reserve_percent: u32,
    pub upgrade: UpgradeLimits,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            selection: SelectionLimits::default(),
            cooler_reserve_percent: DEFAULT_COOLER_RESERVE_PERCENT,
            upgrade: UpgradeLimits::default(),
        }
    }
}

pub struct BuildAdvisor<C: CatalogQuery, W: UsageWeights> {
    catalog: C,
    weights: W,
    settings: EngineSettings,
}

impl<C: CatalogQuery, W: UsageWeights> BuildAdvisor<C, W> {
    pub fn new(catalog: C, weights: W, settings: EngineSettings) -> Self {
        Self {
            catalog,
            weights,
            settings,
        }
    }

    pub fn recommend(&self, request: &BuildRequest) -> Result<Recommendation> {
        request.validate()?;
        let preferences = Preferences::from_map(&request.preferences);
        let ctx = RequestContext::new(request.purpose.trim(), &preferences);
        tracing::info!(
            "🧮 Recommending a {} build with budget {}",
            ctx.purpose,
            request.budget
        );

        let resolution = ResolutionLoop::new(
            BudgetAllocator::new(&self.weights),
            CandidateSelector::new(&self.catalog, self.settings.selection),
            self.settings.cooler_reserve_percent,
        )
        .run(request.budget, &ctx);

        let total = total_price(&resolution.selection);
        let upgrade_options = UpgradeAdvisor::new(&self.catalog, self.settings.upgrade).suggest(
            &resolution.selection,
            request.budget,
            total,
        );
        let explanation = explain(ctx.purpose, request.budget, total, &resolution);

        tracing::info!(
            "✅ Picked {} parts, total {} ({})",
            resolution.selection.len(),
            total,
            resolution.outcome.summary
        );

        Ok(Recommendation {
            recommended_parts: resolution.selection,
            total_price: total,
            budget_allocation: resolution.allocation,
            compatibility_check: resolution.outcome,
            upgrade_options,
            explanation,
        })
    }

    pub fn check_compatibility(&self, part_ids: &[PartId]) -> Result<CompatibilityOutcome> {
        if part_ids.is_empty() {
            return Err(AdvisorError::invalid_request("at least one part id is required"));
        }

        let parts = self.catalog.find_by_ids(part_ids);
        if parts.len() < part_ids.len() {
            tracing::warn!(
                "⚠️ {} of {} part ids were not found in the catalog",
                part_ids.len() - parts.len(),
                part_ids.len()
            );
        }

        // 同類別重複時以最後一個為準
        let selection: SelectionResult = parts
            .into_iter()
            .map(|part| (part.category, part))
            .collect();
        Ok(CompatibilityChecker::new().check(&selection))
    }
}

fn explain(purpose: &str, budget: Amount, total: Amount, resolution: &Resolution) -> String {
    let mut text = format!(
        "Recommended {} parts for {} at a total of {} ({}% of the {} budget). {}",
        resolution.selection.len(),
        purpose,
        total,
        i128::from(total) * 100 / i128::from(budget),
        budget,
        resolution.outcome.summary
    );
    if !resolution.repaired.is_empty() {
        let repaired: Vec<String> = resolution.repaired.iter().map(|c| c.to_string()).collect();
        text.push_str(&format!(
            " Replaced {} to resolve compatibility conflicts.",
            repaired.join(", ")
        ));
    }
    text
}
