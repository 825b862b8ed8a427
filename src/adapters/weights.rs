use crate::domain::model::Category;
use crate::domain::ports::UsageWeights;
use std::collections::HashMap;

type Row = (Category, u32);

const GAMING: &[Row] = &[
    (Category::Gpu, 45),
    (Category::Cpu, 20),
    (Category::Ram, 10),
    (Category::Motherboard, 8),
    (Category::Ssd, 6),
    (Category::Psu, 5),
    (Category::Case, 4),
    (Category::Cooler, 2),
];

const VIDEO_EDITING: &[Row] = &[
    (Category::Gpu, 30),
    (Category::Cpu, 28),
    (Category::Ram, 14),
    (Category::Motherboard, 10),
    (Category::Ssd, 8),
    (Category::Psu, 5),
    (Category::Case, 2),
    (Category::Cooler, 2),
];

const DEVELOPMENT: &[Row] = &[
    (Category::Cpu, 30),
    (Category::Gpu, 25),
    (Category::Ram, 16),
    (Category::Motherboard, 10),
    (Category::Ssd, 8),
    (Category::Psu, 5),
    (Category::Cooler, 3),
    (Category::Case, 2),
];

const DESIGN: &[Row] = &[
    (Category::Gpu, 35),
    (Category::Cpu, 22),
    (Category::Ram, 14),
    (Category::Motherboard, 8),
    (Category::Ssd, 8),
    (Category::Psu, 6),
    (Category::Case, 3),
    (Category::Cooler, 3),
];

const OFFICE: &[Row] = &[
    (Category::Cpu, 25),
    (Category::Ssd, 15),
    (Category::Ram, 12),
    (Category::Motherboard, 10),
    (Category::Psu, 10),
    (Category::Case, 10),
    (Category::Cooler, 5),
];

const BUILTIN: &[(&[&str], &[Row])] = &[
    (&["gaming", "게이밍", "게임"], GAMING),
    (&["video_editing", "영상 편집", "영상편집"], VIDEO_EDITING),
    (&["development", "코딩·ai", "코딩", "ai"], DEVELOPMENT),
    (&["design", "디자인"], DESIGN),
    (&["office", "사무용", "사무"], OFFICE),
];

fn purpose_key(purpose: &str) -> String {
    purpose.trim().to_lowercase()
}

/// Every builtin spelling of `purpose`, or just the purpose itself.
fn alias_group(purpose: &str) -> Vec<String> {
    let key = purpose_key(purpose);
    BUILTIN
        .iter()
        .find(|(aliases, _)| aliases.contains(&key.as_str()))
        .map(|(aliases, _)| aliases.iter().map(|alias| alias.to_string()).collect())
        .unwrap_or_else(|| vec![key])
}

/// Usage-type weight tables keyed by purpose.
#[derive(Debug, Clone, Default)]
pub struct WeightTable {
    rows: HashMap<String, Vec<Row>>,
}

impl WeightTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut table = Self::empty();
        for (aliases, rows) in BUILTIN {
            for alias in aliases.iter() {
                table.rows.insert(alias.to_string(), rows.to_vec());
            }
        }
        table
    }

    /// Replaces the rows for `purpose` and all of its builtin aliases.
    pub fn insert(&mut self, purpose: &str, rows: Vec<Row>) {
        for alias in alias_group(purpose) {
            self.rows.insert(alias, rows.clone());
        }
    }
}

impl UsageWeights for WeightTable {
    fn weights_for(&self, purpose: &str) -> Vec<(Category, u32)> {
        self.rows
            .get(&purpose_key(purpose))
            .cloned()
            .unwrap_or_default()
    }
}
