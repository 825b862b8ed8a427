use crate::domain::model::{percent_of, Amount, BudgetAllocation, Category, CategoryBudget};
use crate::domain::ports::UsageWeights;
use crate::domain::preferences::Preferences;

/// Used when no weight table exists for the requested purpose.
pub const FALLBACK_WEIGHTS: [(Category, u32); 9] = [
    (Category::Cpu, 25),
    (Category::Cooler, 3),
    (Category::Gpu, 30),
    (Category::Ram, 10),
    (Category::Ssd, 8),
    (Category::Hdd, 2),
    (Category::Motherboard, 12),
    (Category::Psu, 6),
    (Category::Case, 4),
];

pub struct BudgetAllocator<'a, W: UsageWeights + ?Sized> {
    weights: &'a W,
}

impl<'a, W: UsageWeights + ?Sized> BudgetAllocator<'a, W> {
    pub fn new(weights: &'a W) -> Self {
        Self { weights }
    }

    /// Splits `budget` proportionally. Percentages are never normalized. A ratio
    /// override replaces the table percent, and an override of 0 drops the category.
    pub fn allocate(&self, purpose: &str, budget: Amount, prefs: &Preferences) -> BudgetAllocation {
        let mut rows = self.weights.weights_for(purpose);
        if rows.is_empty() {
            tracing::debug!("No weight table for purpose '{}', using fallback", purpose);
            rows = FALLBACK_WEIGHTS.to_vec();
        }

        let entries = rows
            .into_iter()
            .filter_map(|(category, percent)| match prefs.ratio_override(category) {
                Some(0) => {
                    tracing::debug!("{} excluded by component ratio override", category);
                    None
                }
                Some(ratio) => {
                    tracing::debug!("{} ratio overridden: {}% -> {}%", category, percent, ratio);
                    Some((category, ratio))
                }
                None => Some((category, percent)),
            })
            .map(|(category, percent)| CategoryBudget {
                category,
                amount: percent_of(budget, i64::from(percent)),
            })
            .collect();

        BudgetAllocation { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::weights::WeightTable;
    use serde_json::json;

    fn prefs(value: serde_json::Value) -> Preferences {
        Preferences::from_map(value.as_object().unwrap())
    }

    #[test]
    fn test_allocation_floors_each_share() {
        let mut table = WeightTable::empty();
        table.insert("gaming", vec![(Category::Gpu, 45), (Category::Cpu, 33)]);
        let allocation =
            BudgetAllocator::new(&table).allocate("gaming", 1_234_567, &Preferences::default());

        assert_eq!(allocation.get(Category::Gpu), Some(1_234_567 * 45 / 100));
        assert_eq!(allocation.get(Category::Cpu), Some(407_407));
        assert_eq!(allocation.entries[0].category, Category::Gpu);
    }

    #[test]
    fn test_unknown_purpose_uses_fallback() {
        let table = WeightTable::builtin();
        let allocation =
            BudgetAllocator::new(&table).allocate("mining rig", 1_000_000, &Preferences::default());

        assert_eq!(allocation.len(), FALLBACK_WEIGHTS.len());
        assert_eq!(allocation.get(Category::Cpu), Some(250_000));
        assert_eq!(allocation.get(Category::Hdd), Some(20_000));
    }

    #[test]
    fn test_zero_ratio_excludes_category() {
        let table = WeightTable::builtin();
        let p = prefs(json!({"component_ratios": {"gpu": 0}}));
        let allocation = BudgetAllocator::new(&table).allocate("gaming", 2_000_000, &p);

        assert!(!allocation.contains(Category::Gpu));
        assert_eq!(allocation.get(Category::Cpu), Some(400_000));
    }

    #[test]
    fn test_nonzero_ratio_replaces_table_percent() {
        let table = WeightTable::builtin();
        let p = prefs(json!({"component_ratios": {"cpu": 50}}));
        let allocation = BudgetAllocator::new(&table).allocate("gaming", 1_000_000, &p);

        assert_eq!(allocation.get(Category::Cpu), Some(500_000));
        // 其他類別不重新分配
        assert_eq!(allocation.get(Category::Gpu), Some(450_000));
    }

    #[test]
    fn test_huge_budget_does_not_overflow() {
        let table = WeightTable::builtin();
        let allocation =
            BudgetAllocator::new(&table).allocate("gaming", Amount::MAX, &Preferences::default());
        assert_eq!(allocation.get(Category::Gpu), Some(percent_of(Amount::MAX, 45)));
        assert!(allocation.entries.iter().all(|entry| entry.amount > 0));
    }

    #[test]
    fn test_zero_ratio_applies_to_fallback_table() {
        let table = WeightTable::empty();
        let p = prefs(json!({"component_ratios": {"storage": 0}}));
        let allocation = BudgetAllocator::new(&table).allocate("anything", 1_000_000, &p);

        assert!(!allocation.contains(Category::Ssd));
        assert!(!allocation.contains(Category::Hdd));
        assert_eq!(allocation.len(), 7);
    }

    #[test]
    fn test_percentages_are_not_normalized() {
        let mut table = WeightTable::empty();
        table.insert("lopsided", vec![(Category::Cpu, 80), (Category::Gpu, 80)]);
        let allocation =
            BudgetAllocator::new(&table).allocate("lopsided", 100_000, &Preferences::default());
        assert_eq!(allocation.get(Category::Cpu), Some(80_000));
        assert_eq!(allocation.get(Category::Gpu), Some(80_000));
    }
}
