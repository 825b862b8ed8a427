use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

pub type PartId = u64;

/// 金額一律以整數貨幣單位處理
pub type Amount = i64;

/// floor(amount × percent / 100), widened so large budgets saturate instead of overflowing.
pub fn percent_of(amount: Amount, percent: i64) -> Amount {
    let scaled = i128::from(amount) * i128::from(percent) / 100;
    Amount::try_from(scaled).unwrap_or(if scaled < 0 { Amount::MIN } else { Amount::MAX })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "CPU", alias = "cpu")]
    Cpu,
    #[serde(rename = "쿨러", alias = "cooler", alias = "COOLER")]
    Cooler,
    #[serde(rename = "그래픽카드", alias = "gpu", alias = "GPU")]
    Gpu,
    #[serde(rename = "RAM", alias = "ram")]
    Ram,
    #[serde(rename = "SSD", alias = "ssd")]
    Ssd,
    #[serde(rename = "HDD", alias = "hdd")]
    Hdd,
    #[serde(rename = "메인보드", alias = "motherboard", alias = "mainboard")]
    Motherboard,
    #[serde(rename = "파워", alias = "psu", alias = "PSU")]
    Psu,
    #[serde(rename = "케이스", alias = "case", alias = "CASE")]
    Case,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Cpu,
        Category::Cooler,
        Category::Gpu,
        Category::Ram,
        Category::Ssd,
        Category::Hdd,
        Category::Motherboard,
        Category::Psu,
        Category::Case,
    ];

    /// The label the catalog stores for this category.
    pub fn catalog_label(self) -> &'static str {
        match self {
            Category::Cpu => "CPU",
            Category::Cooler => "쿨러",
            Category::Gpu => "그래픽카드",
            Category::Ram => "RAM",
            Category::Ssd => "SSD",
            Category::Hdd => "HDD",
            Category::Motherboard => "메인보드",
            Category::Psu => "파워",
            Category::Case => "케이스",
        }
    }

    fn keys(self) -> &'static [&'static str] {
        match self {
            Category::Cpu => &["cpu"],
            Category::Cooler => &["cooler"],
            Category::Gpu => &["gpu", "vga", "graphics"],
            Category::Ram => &["ram", "memory"],
            Category::Ssd => &["ssd"],
            Category::Hdd => &["hdd"],
            Category::Motherboard => &["mainboard", "motherboard", "board"],
            Category::Psu => &["psu", "power"],
            Category::Case => &["case"],
        }
    }

    /// Resolves a ratio/weight key or a catalog label. `storage` covers both drive
    /// categories, so more than one category can come back.
    pub fn from_key(key: &str) -> Vec<Category> {
        let key = key.trim();
        let lower = key.to_lowercase();
        if lower == "storage" {
            return vec![Category::Ssd, Category::Hdd];
        }
        Category::ALL
            .into_iter()
            .filter(|category| {
                category.catalog_label() == key || category.keys().contains(&lower.as_str())
            })
            .collect()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.catalog_label())
    }
}

/// 半結構化規格，鍵值皆為字串，來源由爬蟲決定
pub type Specs = BTreeMap<String, String>;

/// Flattens a raw spec object into strings. Numbers and booleans are kept as
/// their text form; nulls and nested values are dropped like a missing field.
pub fn specs_from_map(map: Map<String, Value>) -> Specs {
    map.into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(text) => Some((key, text)),
            Value::Number(number) => Some((key, number.to_string())),
            Value::Bool(flag) => Some((key, flag.to_string())),
            Value::Null => None,
            other => {
                tracing::warn!("⚠️ Dropping non-scalar spec '{}': {}", key, other);
                None
            }
        })
        .collect()
}

fn deserialize_specs<'de, D>(deserializer: D) -> std::result::Result<Specs, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Map<String, Value>>::deserialize(deserializer)?;
    Ok(raw.map(specs_from_map).unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartCandidate {
    pub id: PartId,
    pub name: String,
    pub category: Category,
    pub price: Amount,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub star_rating: Option<f64>,
    #[serde(default)]
    pub review_count: Option<u32>,
    #[serde(default)]
    pub warranty_info: Option<String>,
    #[serde(default, deserialize_with = "deserialize_specs")]
    pub specs: Specs,
}

impl PartCandidate {
    /// Returns a spec value, treating blank strings as absent.
    pub fn spec(&self, key: &str) -> Option<&str> {
        self.specs
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// First non-blank value among alias keys.
    pub fn spec_any(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.spec(key))
    }

    pub fn spec_lower(&self, key: &str) -> String {
        self.spec(key).unwrap_or_default().to_lowercase()
    }

    pub fn name_lower(&self) -> String {
        self.name.to_lowercase()
    }

    pub fn rating(&self) -> f64 {
        self.star_rating.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBudget {
    pub category: Category,
    pub amount: Amount,
}

/// Per-category sub-budgets, in the priority order of the table that produced them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetAllocation {
    pub entries: Vec<CategoryBudget>,
}

impl BudgetAllocation {
    pub fn get(&self, category: Category) -> Option<Amount> {
        self.entries
            .iter()
            .find(|entry| entry.category == category)
            .map(|entry| entry.amount)
    }

    pub fn contains(&self, category: Category) -> bool {
        self.get(category).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryBudget> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One winner per category. May be incomplete.
pub type SelectionResult = BTreeMap<Category, PartCandidate>;

pub fn total_price(selection: &SelectionResult) -> Amount {
    selection.values().map(|part| part.price).sum()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityOutcome {
    pub is_compatible: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub summary: String,
}

impl CompatibilityOutcome {
    pub fn new() -> Self {
        Self {
            is_compatible: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            summary: String::new(),
        }
    }

    pub fn add_error(&mut self, error: String) {
        self.errors.push(error);
        self.is_compatible = false;
    }

    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Recomputes the summary from the error and warning counts.
    pub fn finalize(mut self) -> Self {
        self.summary = if !self.errors.is_empty() {
            format!(
                "Parts are incompatible, {} errors to resolve.",
                self.errors.len()
            )
        } else if !self.warnings.is_empty() {
            format!(
                "Parts are compatible with caveats, {} warnings to review.",
                self.warnings.len()
            )
        } else {
            "All parts are fully compatible.".to_string()
        };
        self
    }
}

impl Default for CompatibilityOutcome {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeOption {
    pub category: Category,
    pub part: PartCandidate,
    pub additional_cost: Amount,
    pub benefit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub recommended_parts: SelectionResult,
    pub total_price: Amount,
    pub budget_allocation: BudgetAllocation,
    pub compatibility_check: CompatibilityOutcome,
    pub upgrade_options: Vec<UpgradeOption>,
    pub explanation: String,
}
