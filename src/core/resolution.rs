use crate::core::allocator::BudgetAllocator;
use crate::core::compatibility::{CompatibilityChecker, Rule};
use crate::core::selector::{CandidateSelector, RequestContext};
use crate::domain::model::{
    percent_of, Amount, BudgetAllocation, Category, CompatibilityOutcome, PartCandidate,
    SelectionResult,
};
use crate::domain::ports::{CatalogQuery, UsageWeights};

/// Share of the total budget used when the allocation has no cooler.
pub const DEFAULT_COOLER_RESERVE_PERCENT: u32 = 3;

/// What one pass of allocate, select, check and repair produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub allocation: BudgetAllocation,
    pub selection: SelectionResult,
    pub outcome: CompatibilityOutcome,
    /// Categories whose pick was replaced during repair.
    pub repaired: Vec<Category>,
}

pub struct ResolutionLoop<'a, C: CatalogQuery + ?Sized, W: UsageWeights + ?Sized> {
    allocator: BudgetAllocator<'a, W>,
    selector: CandidateSelector<'a, C>,
    checker: CompatibilityChecker,
    cooler_reserve_percent: u32,
}

impl<'a, C: CatalogQuery + ?Sized, W: UsageWeights + ?Sized> ResolutionLoop<'a, C, W> {
    pub fn new(
        allocator: BudgetAllocator<'a, W>,
        selector: CandidateSelector<'a, C>,
        cooler_reserve_percent: u32,
    ) -> Self {
        Self {
            allocator,
            selector,
            checker: CompatibilityChecker::new(),
            cooler_reserve_percent,
        }
    }

    pub fn run(&self, budget: Amount, ctx: &RequestContext<'_>) -> Resolution {
        let prefs = ctx.preferences;
        let allocation = self.allocator.allocate(ctx.purpose, budget, prefs);
        tracing::debug!("Allocated {} categories: {:?}", allocation.len(), allocation);

        let mut selection = SelectionResult::new();
        for entry in allocation.iter().filter(|entry| entry.amount > 0) {
            match self.selector.select(entry.category, entry.amount, ctx) {
                Some(part) => {
                    selection.insert(entry.category, part);
                }
                None => tracing::warn!(
                    "⚠️ No {} found for sub-budget {}",
                    entry.category,
                    entry.amount
                ),
            }
        }

        if !allocation.contains(Category::Cooler) && prefs.ratio_override(Category::Cooler) != Some(0) {
            let reserve = percent_of(budget, i64::from(self.cooler_reserve_percent));
            tracing::debug!("No cooler allocated, forcing one with reserve {}", reserve);
            if let Some(cooler) = self.selector.select(Category::Cooler, reserve, ctx) {
                selection.insert(Category::Cooler, cooler);
            }
        }

        let report = self.checker.check_detailed(&selection);
        if report.outcome.is_compatible {
            return Resolution {
                allocation,
                selection,
                outcome: report.outcome,
                repaired: Vec::new(),
            };
        }

        tracing::info!(
            "🔧 Selection incompatible ({:?}), attempting one repair pass",
            report.failed_rules
        );
        let repaired = self.repair(&allocation, &mut selection, &report.failed_rules, ctx);

        // 僅重新檢查一次，不再迭代
        let outcome = self.checker.check(&selection);
        if !outcome.is_compatible {
            tracing::warn!("⚠️ Selection still incompatible after repair: {}", outcome.summary);
        }

        Resolution {
            allocation,
            selection,
            outcome,
            repaired,
        }
    }

    fn repair(
        &self,
        allocation: &BudgetAllocation,
        selection: &mut SelectionResult,
        failed_rules: &[Rule],
        ctx: &RequestContext<'_>,
    ) -> Vec<Category> {
        let mut targets: Vec<Category> = Vec::new();
        for rule in failed_rules {
            if !targets.contains(&rule.repair_target()) {
                targets.push(rule.repair_target());
            }
        }

        let mut repaired = Vec::new();
        for target in targets {
            let Some(budget) = allocation.get(target) else {
                continue;
            };
            let rules: Vec<Rule> = failed_rules
                .iter()
                .copied()
                .filter(|rule| rule.repair_target() == target)
                .collect();

            let current = selection.clone();
            let admit = |candidate: &PartCandidate| {
                let mut trial = current.clone();
                trial.insert(target, candidate.clone());
                self.checker.passes(&trial, &rules)
            };

            match self.selector.select_admitting(target, budget, ctx, &admit) {
                Some(part) => {
                    tracing::info!("🔁 Replaced {} with #{} {}", target, part.id, part.name);
                    selection.insert(target, part);
                    repaired.push(target);
                }
                None => tracing::warn!("No compatible {} found, keeping the original pick", target),
            }
        }
        repaired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::catalog::InMemoryCatalog;
    use crate::adapters::weights::WeightTable;
    use crate::core::selector::SelectionLimits;
    use crate::domain::model::{PartId, Specs};
    use crate::domain::preferences::Preferences;
    use serde_json::json;

    fn part(
        id: PartId,
        category: Category,
        price: i64,
        rating: f64,
        specs: &[(&str, &str)],
    ) -> PartCandidate {
        PartCandidate {
            id,
            name: format!("{} #{}", category, id),
            category,
            price,
            manufacturer: None,
            star_rating: Some(rating),
            review_count: None,
            warranty_info: None,
            specs: specs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<Specs>(),
        }
    }

    fn table() -> WeightTable {
        let mut table = WeightTable::empty();
        table.insert(
            "workstation",
            vec![(Category::Cpu, 40), (Category::Motherboard, 40), (Category::Psu, 20)],
        );
        table
    }

    fn run(catalog: &InMemoryCatalog, table: &WeightTable, prefs: &Preferences) -> Resolution {
        let resolution = ResolutionLoop::new(
            BudgetAllocator::new(table),
            CandidateSelector::new(catalog, SelectionLimits::default()),
            DEFAULT_COOLER_RESERVE_PERCENT,
        );
        resolution.run(1_000_000, &RequestContext::new("workstation", prefs))
    }

    #[test]
    fn test_socket_conflict_is_repaired_on_board() {
        let catalog = InMemoryCatalog::new(vec![
            part(1, Category::Cpu, 400_000, 4.8, &[("socket", "AM5"), ("tdp", "105W")]),
            part(2, Category::Motherboard, 400_000, 5.0, &[("socket", "AM4")]),
            part(3, Category::Motherboard, 390_000, 4.1, &[("socket", "AM5")]),
            part(4, Category::Psu, 200_000, 4.5, &[("rated_output", "850W")]),
        ]);
        let resolution = run(&catalog, &table(), &Preferences::default());

        assert_eq!(resolution.selection[&Category::Motherboard].id, 3);
        assert_eq!(resolution.repaired, vec![Category::Motherboard]);
        assert!(resolution.outcome.is_compatible);
    }

    #[test]
    fn test_underpowered_psu_is_repaired() {
        let catalog = InMemoryCatalog::new(vec![
            part(1, Category::Cpu, 400_000, 4.8, &[("socket", "AM5"), ("tdp", "170W")]),
            part(2, Category::Motherboard, 400_000, 5.0, &[("socket", "AM5")]),
            part(3, Category::Psu, 200_000, 5.0, &[("rated_output", "300W")]),
            part(4, Category::Psu, 180_000, 4.0, &[("rated_output", "750W")]),
        ]);
        let resolution = run(&catalog, &table(), &Preferences::default());

        assert_eq!(resolution.selection[&Category::Psu].id, 4);
        assert_eq!(resolution.repaired, vec![Category::Psu]);
        assert!(resolution.outcome.errors.is_empty());
    }

    #[test]
    fn test_socket_and_power_conflicts_repaired_in_one_pass() {
        let catalog = InMemoryCatalog::new(vec![
            part(1, Category::Cpu, 400_000, 4.8, &[("socket", "AM5"), ("tdp", "170W")]),
            part(2, Category::Motherboard, 400_000, 5.0, &[("socket", "AM4")]),
            part(3, Category::Motherboard, 390_000, 4.1, &[("socket", "AM5")]),
            part(4, Category::Psu, 200_000, 5.0, &[("rated_output", "300W")]),
            part(5, Category::Psu, 180_000, 4.0, &[("rated_output", "750W")]),
        ]);
        let resolution = run(&catalog, &table(), &Preferences::default());

        assert_eq!(
            resolution.repaired,
            vec![Category::Motherboard, Category::Psu]
        );
        assert_eq!(resolution.selection[&Category::Motherboard].id, 3);
        assert_eq!(resolution.selection[&Category::Psu].id, 5);
        // 修復後的結果就是對最終組合的單次檢查
        assert_eq!(
            resolution.outcome,
            CompatibilityChecker::new().check(&resolution.selection)
        );
        assert!(resolution.outcome.is_compatible);
    }

    #[test]
    fn test_unrepairable_conflict_keeps_original_and_reports() {
        let catalog = InMemoryCatalog::new(vec![
            part(1, Category::Cpu, 400_000, 4.8, &[("socket", "LGA1700")]),
            part(2, Category::Motherboard, 400_000, 5.0, &[("socket", "AM5")]),
            part(3, Category::Psu, 200_000, 5.0, &[("rated_output", "850W")]),
        ]);
        let resolution = run(&catalog, &table(), &Preferences::default());

        assert_eq!(resolution.selection[&Category::Motherboard].id, 2);
        assert!(resolution.repaired.is_empty());
        assert!(!resolution.outcome.is_compatible);
        assert_eq!(resolution.outcome.errors.len(), 1);
    }

    #[test]
    fn test_cooler_forced_when_not_allocated() {
        let catalog = InMemoryCatalog::new(vec![
            part(1, Category::Cpu, 400_000, 4.8, &[("socket", "AM5")]),
            part(9, Category::Cooler, 30_000, 4.5, &[]),
        ]);
        let resolution = run(&catalog, &table(), &Preferences::default());
        assert_eq!(resolution.selection[&Category::Cooler].id, 9);
        assert!(!resolution.allocation.contains(Category::Cooler));
    }

    #[test]
    fn test_cooler_not_forced_when_excluded() {
        let catalog = InMemoryCatalog::new(vec![part(9, Category::Cooler, 30_000, 4.5, &[])]);
        let prefs = Preferences::from_map(
            json!({"component_ratios": {"cooler": 0}}).as_object().unwrap(),
        );
        let resolution = run(&catalog, &table(), &prefs);
        assert!(!resolution.selection.contains_key(&Category::Cooler));
    }

    #[test]
    fn test_compatible_selection_skips_repair() {
        let catalog = InMemoryCatalog::new(vec![
            part(1, Category::Cpu, 400_000, 4.8, &[("socket", "AM5"), ("tdp", "65W")]),
            part(2, Category::Motherboard, 400_000, 5.0, &[("chipset", "B650")]),
            part(3, Category::Psu, 200_000, 5.0, &[("rated_output", "650W")]),
        ]);
        let resolution = run(&catalog, &table(), &Preferences::default());
        assert!(resolution.repaired.is_empty());
        assert!(resolution.outcome.is_compatible);
        assert_eq!(resolution.selection.len(), 3);
    }
}
