//! Typed view over the loose preference bag a client sends with a build request.
//!
//! Unrecognized keys and values that do not parse are dropped here, so the rest
//! of the engine only sees well-formed options.

use crate::domain::model::Category;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecommendStyle {
    Value,
    #[default]
    Balanced,
    HighEnd,
}

impl RecommendStyle {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "value" => Some(Self::Value),
            "balanced" => Some(Self::Balanced),
            "highend" | "high_end" => Some(Self::HighEnd),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AiFlexibility {
    #[default]
    Strict,
    Flexible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AsCriteria {
    Domestic,
    #[default]
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoiseCriteria {
    Silent,
    #[default]
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseSize {
    FullTower,
    MidTower,
    MiniTower,
    SmallFormFactor,
}

impl CaseSize {
    const TABLE: [(CaseSize, &'static [&'static str], &'static [&'static str]); 4] = [
        (CaseSize::FullTower, &["빅타워", "full tower"], &["빅타워", "full"]),
        (CaseSize::MidTower, &["미들타워", "mid tower"], &["미들", "mid"]),
        (CaseSize::MiniTower, &["미니타워", "mini tower"], &["미니", "mini"]),
        (CaseSize::SmallFormFactor, &["sff", "small form"], &["sff", "small"]),
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        let lower = raw.to_lowercase();
        Self::TABLE
            .iter()
            .find(|(_, requested, _)| requested.iter().any(|kw| lower.contains(kw)))
            .map(|(size, _, _)| *size)
    }

    /// Keywords that identify this size on a catalog entry.
    pub fn spec_keywords(self) -> &'static [&'static str] {
        Self::TABLE
            .iter()
            .find(|(size, _, _)| *size == self)
            .map(|(_, _, keywords)| *keywords)
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelType {
    TemperedGlass,
    Closed,
    Mesh,
    FrontGlass,
}

impl PanelType {
    pub fn parse(raw: &str) -> Option<Self> {
        let lower = raw.to_lowercase();
        if lower.contains("강화유리") || lower.contains("tempered") {
            Some(Self::TemperedGlass)
        } else if lower.contains("폐쇄") || lower.contains("closed") {
            Some(Self::Closed)
        } else if lower.contains("메시") || lower.contains("mesh") {
            Some(Self::Mesh)
        } else if lower.contains("전면유리") || lower.contains("front glass") {
            Some(Self::FrontGlass)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Material {
    Steel,
    Aluminum,
    Plastic,
}

impl Material {
    pub fn parse(raw: &str) -> Option<Self> {
        let lower = raw.to_lowercase();
        if lower.contains("철제") || lower.contains("스틸") || lower.contains("steel") {
            Some(Self::Steel)
        } else if lower.contains("알루미늄") || lower.contains("aluminum") {
            Some(Self::Aluminum)
        } else if lower.contains("플라스틱") || lower.contains("plastic") {
            Some(Self::Plastic)
        } else {
            None
        }
    }

    pub fn name_keywords(self) -> &'static [&'static str] {
        match self {
            Self::Steel => &["스틸", "steel", "철제", "metal"],
            Self::Aluminum => &["알루미늄", "aluminum", "알미늄"],
            Self::Plastic => &["플라스틱", "plastic"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTheme {
    Black,
    White,
    Silver,
    Red,
    Blue,
}

impl ColorTheme {
    const TABLE: [(ColorTheme, &'static str, &'static str); 5] = [
        (ColorTheme::Black, "블랙", "black"),
        (ColorTheme::White, "화이트", "white"),
        (ColorTheme::Silver, "실버", "silver"),
        (ColorTheme::Red, "레드", "red"),
        (ColorTheme::Blue, "블루", "blue"),
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        let lower = raw.to_lowercase();
        Self::TABLE
            .iter()
            .find(|(_, korean, english)| lower.contains(korean) || lower.contains(english))
            .map(|(theme, _, _)| *theme)
    }

    pub fn keywords(self) -> [&'static str; 2] {
        Self::TABLE
            .iter()
            .find(|(theme, _, _)| *theme == self)
            .map(|(_, korean, english)| [*korean, *english])
            .unwrap_or(["", ""])
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Preferences {
    pub recommend_style: RecommendStyle,
    pub ai_flexibility: AiFlexibility,
    pub preferred_brand: Option<String>,
    pub budget_flexibility: u32,
    pub component_ratios: BTreeMap<Category, u32>,
    pub case_size: Option<CaseSize>,
    pub panel_type: Option<PanelType>,
    pub color_themes: Vec<ColorTheme>,
    pub material: Option<Material>,
    pub as_criteria: AsCriteria,
    pub lifecycle_years: Option<u32>,
    pub upgrade_plan: bool,
    pub rgb_lighting: bool,
    pub power_saving: bool,
    pub noise_criteria: NoiseCriteria,
}

pub const MAX_BUDGET_FLEXIBILITY: u32 = 20;

/// Lifecycle targets at or above this many years favour durable parts.
pub const LONG_LIFECYCLE_YEARS: u32 = 5;

impl Preferences {
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let mut prefs = Preferences::default();

        if let Some(style) = string_value(map, "recommend_style").and_then(|s| RecommendStyle::parse(&s)) {
            prefs.recommend_style = style;
        }
        if string_value(map, "ai_flexibility").as_deref() == Some("flexible") {
            prefs.ai_flexibility = AiFlexibility::Flexible;
        }
        prefs.preferred_brand = string_value(map, "preferred_brand")
            .map(|brand| brand.trim().to_string())
            .filter(|brand| !brand.is_empty());
        if let Some(flex) = number_value(map, "budget_flexibility") {
            prefs.budget_flexibility = flex.clamp(0, MAX_BUDGET_FLEXIBILITY as i64) as u32;
        }
        if let Some(Value::Object(ratios)) = map.get("component_ratios") {
            for (key, value) in ratios {
                let Some(percent) = as_number(value) else {
                    continue;
                };
                for category in Category::from_key(key) {
                    prefs
                        .component_ratios
                        .insert(category, percent.clamp(0, 100) as u32);
                }
            }
        }

        prefs.case_size = string_value(map, "case_size").and_then(|s| CaseSize::parse(&s));
        prefs.panel_type = string_value(map, "panel_type").and_then(|s| PanelType::parse(&s));
        prefs.material = string_value(map, "material").and_then(|s| Material::parse(&s));
        prefs.color_themes = match map.get("color_theme") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .filter_map(ColorTheme::parse)
                .collect(),
            Some(Value::String(theme)) => ColorTheme::parse(theme).into_iter().collect(),
            _ => Vec::new(),
        };

        if string_value(map, "as_criteria").as_deref() == Some("domestic") {
            prefs.as_criteria = AsCriteria::Domestic;
        }
        prefs.lifecycle_years = string_value(map, "lifecycle").and_then(|s| parse_years(&s));
        prefs.upgrade_plan = bool_value(map, "upgrade_plan");
        prefs.rgb_lighting = bool_value(map, "rgb_lighting");
        prefs.power_saving = bool_value(map, "power_saving");
        if string_value(map, "noise_criteria").as_deref() == Some("silent") {
            prefs.noise_criteria = NoiseCriteria::Silent;
        }

        prefs
    }

    /// Upper price multiplier for the balanced and high-end styles.
    pub fn flex_multiplier(&self) -> f64 {
        match self.ai_flexibility {
            AiFlexibility::Flexible => 1.3,
            AiFlexibility::Strict => 1.2,
        }
    }

    pub fn wants_long_lifecycle(&self) -> bool {
        self.lifecycle_years
            .is_some_and(|years| years >= LONG_LIFECYCLE_YEARS)
    }

    /// `Some(0)` means the category is excluded outright.
    pub fn ratio_override(&self, category: Category) -> Option<u32> {
        self.component_ratios.get(&category).copied()
    }
}

fn string_value(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f.round() as i64),
        _ => None,
    }
}

fn number_value(map: &Map<String, Value>, key: &str) -> Option<i64> {
    map.get(key).and_then(as_number)
}

fn bool_value(map: &Map<String, Value>, key: &str) -> bool {
    match map.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// "5년 이상", "7 years" and "10" all yield a year count.
fn parse_years(raw: &str) -> Option<u32> {
    static YEARS: OnceLock<Regex> = OnceLock::new();
    let re = YEARS.get_or_init(|| Regex::new(r"(\d+)").expect("static regex"));
    re.captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn prefs(value: Value) -> Preferences {
        match value {
            Value::Object(map) => Preferences::from_map(&map),
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_defaults_when_empty() {
        let p = prefs(json!({}));
        assert_eq!(p.recommend_style, RecommendStyle::Balanced);
        assert_eq!(p.ai_flexibility, AiFlexibility::Strict);
        assert_eq!(p.budget_flexibility, 0);
        assert!(p.preferred_brand.is_none());
        assert!(!p.rgb_lighting);
    }

    #[test]
    fn test_unknown_keys_and_bad_values_are_ignored() {
        let p = prefs(json!({
            "workload_intensity": "heavy",
            "recommend_style": "luxury",
            "budget_flexibility": "lots"
        }));
        assert_eq!(p, Preferences::default());
    }

    #[test]
    fn test_budget_flexibility_is_clamped() {
        assert_eq!(prefs(json!({"budget_flexibility": 35})).budget_flexibility, 20);
        assert_eq!(prefs(json!({"budget_flexibility": -4})).budget_flexibility, 0);
        assert_eq!(prefs(json!({"budget_flexibility": "15"})).budget_flexibility, 15);
    }

    #[test]
    fn test_component_ratios_accept_aliases() {
        let p = prefs(json!({
            "component_ratios": {"gpu": 0, "storage": 7, "mainboard": 10, "etc": 1}
        }));
        assert_eq!(p.ratio_override(Category::Gpu), Some(0));
        assert_eq!(p.ratio_override(Category::Ssd), Some(7));
        assert_eq!(p.ratio_override(Category::Hdd), Some(7));
        assert_eq!(p.ratio_override(Category::Motherboard), Some(10));
        assert_eq!(p.component_ratios.len(), 4);
    }

    #[test]
    fn test_color_theme_string_or_list() {
        assert_eq!(
            prefs(json!({"color_theme": "화이트"})).color_themes,
            vec![ColorTheme::White]
        );
        assert_eq!(
            prefs(json!({"color_theme": ["black", "purple", "Red"]})).color_themes,
            vec![ColorTheme::Black, ColorTheme::Red]
        );
    }

    #[test]
    fn test_toggles_accept_strings() {
        let p = prefs(json!({
            "rgb_lighting": "true",
            "power_saving": true,
            "upgrade_plan": "false",
            "noise_criteria": "silent",
            "as_criteria": "domestic"
        }));
        assert!(p.rgb_lighting);
        assert!(p.power_saving);
        assert!(!p.upgrade_plan);
        assert_eq!(p.noise_criteria, NoiseCriteria::Silent);
        assert_eq!(p.as_criteria, AsCriteria::Domestic);
    }

    #[test]
    fn test_lifecycle_years() {
        assert!(prefs(json!({"lifecycle": "5년 이상"})).wants_long_lifecycle());
        assert!(prefs(json!({"lifecycle": "7 years"})).wants_long_lifecycle());
        assert!(!prefs(json!({"lifecycle": "3년"})).wants_long_lifecycle());
        assert!(!prefs(json!({"lifecycle": "a while"})).wants_long_lifecycle());
    }

    #[test]
    fn test_case_panel_material_parsing() {
        let p = prefs(json!({
            "case_size": "미들타워",
            "panel_type": "tempered glass",
            "material": "Aluminum"
        }));
        assert_eq!(p.case_size, Some(CaseSize::MidTower));
        assert_eq!(p.panel_type, Some(PanelType::TemperedGlass));
        assert_eq!(p.material, Some(Material::Aluminum));
    }

    #[test]
    fn test_flex_multiplier() {
        assert_eq!(prefs(json!({})).flex_multiplier(), 1.2);
        assert_eq!(
            prefs(json!({"ai_flexibility": "flexible"})).flex_multiplier(),
            1.3
        );
    }
}
