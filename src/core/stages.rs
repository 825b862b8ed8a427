//! Preference pipeline applied to the candidates fetched for one category.
//!
//! Every stage is one of two kinds. A narrowing stage keeps only the candidates
//! it admits, unless that would leave nothing, in which case the list is left
//! alone. A reordering stage never removes anything; it stable-sorts so earlier
//! ties keep their catalog order.

use crate::core::inference::{first_number, is_air_cooled, tdp_watts};
use crate::domain::model::{Category, PartCandidate};
use crate::domain::preferences::{
    AsCriteria, CaseSize, ColorTheme, Material, NoiseCriteria, PanelType, Preferences,
};
use regex::Regex;
use std::cmp::{Ordering, Reverse};
use std::sync::OnceLock;

/// Sort key for CPUs whose TDP is unknown under power saving.
const UNKNOWN_TDP: i64 = 999;
const QUIET_DBA: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Narrow,
    Reorder,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    CaseSize(CaseSize),
    PanelType(PanelType),
    ColorTheme(Vec<ColorTheme>),
    Material(Material),
    DomesticService,
    Durability,
    Expandability,
    RgbLighting,
    LowTdp,
    LowNoise,
    AirCooled,
}

impl Stage {
    pub fn effect(&self) -> Effect {
        match self {
            Stage::CaseSize(_) | Stage::PanelType(_) | Stage::Material(_) => Effect::Narrow,
            _ => Effect::Reorder,
        }
    }

    /// Predicate for narrowing stages and for "matches first" reorderings.
    pub fn admits(&self, part: &PartCandidate) -> bool {
        match self {
            Stage::CaseSize(size) => matches_case_size(part, *size),
            Stage::PanelType(panel) => matches_panel(part, *panel),
            Stage::ColorTheme(themes) => themes.iter().any(|theme| matches_color(part, *theme)),
            Stage::Material(material) => matches_material(part, *material),
            Stage::DomesticService => has_domestic_service(part),
            Stage::RgbLighting => has_rgb(part),
            Stage::LowNoise => is_low_noise(part),
            Stage::AirCooled => is_air_cooled(part),
            Stage::Durability | Stage::Expandability | Stage::LowTdp => true,
        }
    }

    fn compare(&self, a: &PartCandidate, b: &PartCandidate) -> Ordering {
        match self {
            Stage::Durability => Reverse(durability_score(a)).cmp(&Reverse(durability_score(b))),
            Stage::Expandability => {
                Reverse(expandability_score(a)).cmp(&Reverse(expandability_score(b)))
            }
            Stage::LowTdp => tdp_watts(a)
                .unwrap_or(UNKNOWN_TDP)
                .cmp(&tdp_watts(b).unwrap_or(UNKNOWN_TDP)),
            // true 排在前面
            _ => self.admits(b).cmp(&self.admits(a)),
        }
    }

    pub fn apply(&self, mut candidates: Vec<PartCandidate>) -> Vec<PartCandidate> {
        match self.effect() {
            Effect::Narrow => retain_if_any(candidates, |part| self.admits(part)),
            Effect::Reorder => {
                candidates.sort_by(|a, b| self.compare(a, b));
                candidates
            }
        }
    }
}

/// Keeps the admitted candidates, or all of them if none is admitted.
pub fn retain_if_any<F>(candidates: Vec<PartCandidate>, admit: F) -> Vec<PartCandidate>
where
    F: Fn(&PartCandidate) -> bool,
{
    let admitted: Vec<PartCandidate> = candidates.iter().filter(|p| admit(p)).cloned().collect();
    if admitted.is_empty() {
        candidates
    } else {
        admitted
    }
}

/// Ordered stages for one category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StagePipeline {
    stages: Vec<Stage>,
}

impl StagePipeline {
    pub fn for_category(category: Category, prefs: &Preferences) -> Self {
        let mut stages = Vec::new();
        let is_case = category == Category::Case;

        if is_case {
            stages.extend(prefs.case_size.map(Stage::CaseSize));
            stages.extend(prefs.panel_type.map(Stage::PanelType));
        }
        if matches!(category, Category::Case | Category::Cooler | Category::Ram)
            && !prefs.color_themes.is_empty()
        {
            stages.push(Stage::ColorTheme(prefs.color_themes.clone()));
        }
        if is_case {
            stages.extend(prefs.material.map(Stage::Material));
        }
        if prefs.as_criteria == AsCriteria::Domestic {
            stages.push(Stage::DomesticService);
        }
        if prefs.wants_long_lifecycle() {
            stages.push(Stage::Durability);
        }
        if category == Category::Motherboard && prefs.upgrade_plan {
            stages.push(Stage::Expandability);
        }
        if prefs.rgb_lighting {
            stages.push(Stage::RgbLighting);
        }
        if category == Category::Cpu && prefs.power_saving {
            stages.push(Stage::LowTdp);
        }
        if matches!(category, Category::Cooler | Category::Psu)
            && prefs.noise_criteria == NoiseCriteria::Silent
        {
            stages.push(Stage::LowNoise);
        }

        Self { stages }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn run(&self, candidates: Vec<PartCandidate>) -> Vec<PartCandidate> {
        self.stages.iter().fold(candidates, |list, stage| {
            if list.is_empty() {
                return list;
            }
            let list = stage.apply(list);
            tracing::trace!("stage {:?} -> {} candidates", stage, list.len());
            list
        })
    }
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| text.contains(kw))
}

fn matches_case_size(part: &PartCandidate, size: CaseSize) -> bool {
    let keywords = size.spec_keywords();
    [
        part.spec_lower("case_size"),
        part.spec_lower("product_class"),
        part.name_lower(),
    ]
    .iter()
    .any(|text| contains_any(text, keywords))
}

fn matches_panel(part: &PartCandidate, panel: PanelType) -> bool {
    let front = part.spec_lower("panel_front");
    let side = format!("{} {}", part.spec_lower("panel_side"), part.spec_lower("side_panel"));
    let name = part.name_lower();
    match panel {
        PanelType::TemperedGlass => {
            let kws = ["강화유리", "tempered"];
            contains_any(&front, &kws) || contains_any(&side, &kws) || contains_any(&name, &kws)
        }
        PanelType::Closed => {
            let kws = ["폐쇄", "closed"];
            contains_any(&front, &kws) || contains_any(&side, &kws) || contains_any(&name, &kws)
        }
        PanelType::Mesh => {
            let kws = ["메시", "메쉬", "mesh"];
            contains_any(&front, &kws) || contains_any(&name, &kws)
        }
        PanelType::FrontGlass => {
            contains_any(&front, &["유리", "glass"]) || name.contains("전면유리")
        }
    }
}

fn matches_color(part: &PartCandidate, theme: ColorTheme) -> bool {
    let keywords = theme.keywords();
    contains_any(&part.name_lower(), &keywords) || contains_any(&part.spec_lower("led_color"), &keywords)
}

fn matches_material(part: &PartCandidate, material: Material) -> bool {
    let keywords = material.name_keywords();
    contains_any(&part.name_lower(), keywords) || contains_any(&part.spec_lower("material"), keywords)
}

fn has_domestic_service(part: &PartCandidate) -> bool {
    const DOMESTIC_BRANDS: [&str; 6] = ["삼성", "samsung", "lg", "한화", "하이닉스", "hynix"];
    const DOMESTIC_SERVICE: [&str; 4] = ["국내", "한국", "domestic", "korea"];

    let manufacturer = part.manufacturer.as_deref().unwrap_or_default().to_lowercase();
    let warranty = part.warranty_info.as_deref().unwrap_or_default().to_lowercase();
    contains_any(&manufacturer, &DOMESTIC_BRANDS) || contains_any(&warranty, &DOMESTIC_SERVICE)
}

fn warranty_years(part: &PartCandidate) -> Option<i64> {
    let warranty = part.warranty_info.as_deref()?.to_lowercase();
    if !(warranty.contains('년') || warranty.contains("year")) {
        return None;
    }
    first_number(&warranty)
}

/// Rating, review volume and warranty length folded into one score.
pub fn durability_score(part: &PartCandidate) -> i64 {
    let rating = (part.rating() * 10.0) as i64;
    let reviews = i64::from(part.review_count.unwrap_or(0) / 10).min(20);
    let warranty = match warranty_years(part) {
        Some(years) if years >= 5 => 15,
        Some(years) if years >= 3 => 10,
        Some(years) if years >= 2 => 5,
        _ => 0,
    };
    rating + reviews + warranty
}

/// Slot counts that matter when a later upgrade is planned.
pub fn expandability_score(part: &PartCandidate) -> i64 {
    let count = |keys: &[&str]| part.spec_any(keys).and_then(first_number).unwrap_or(0);
    let mut score = 0;
    if count(&["pcie_slots"]) >= 3 {
        score += 10;
    }
    if count(&["ram_slots", "memory_slots"]) >= 4 {
        score += 10;
    }
    if count(&["m2_slots"]) >= 2 {
        score += 10;
    }
    if count(&["sata_ports"]) >= 6 {
        score += 5;
    }
    score
}

fn has_rgb(part: &PartCandidate) -> bool {
    ["led_system", "led_light", "product_class"]
        .iter()
        .any(|key| part.spec_lower(key).contains("rgb"))
}

fn is_low_noise(part: &PartCandidate) -> bool {
    static DBA: OnceLock<Regex> = OnceLock::new();

    let noise = part.spec_lower("max_fan_noise");
    if contains_any(&noise, &["저소음", "무소음", "silent"])
        || part.spec_lower("product_class").contains("저소음")
    {
        return true;
    }
    let re = DBA.get_or_init(|| Regex::new(r"\d+(\.\d+)?").expect("static regex"));
    re.find(&noise)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .is_some_and(|dba| dba <= QUIET_DBA)
}
