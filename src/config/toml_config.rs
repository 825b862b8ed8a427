use crate::adapters::sources::{CsvFileSource, HttpCatalogSource, JsonFileSource};
use crate::adapters::weights::WeightTable;
use crate::core::advisor::EngineSettings;
use crate::core::selector::SelectionLimits;
use crate::core::upgrade::UpgradeLimits;
use crate::domain::model::{Amount, Category};
use crate::domain::ports::CatalogSource;
use crate::utils::error::{AdvisorError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    pub selection: SelectionConfig,
    pub budget: BudgetConfig,
    pub upgrade: UpgradeConfig,
    pub catalog: CatalogConfig,
    /// purpose -> category key -> percent
    pub usage_weights: BTreeMap<String, BTreeMap<String, u32>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub primary_limit: usize,
    pub widened_limit: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        let limits = SelectionLimits::default();
        Self {
            primary_limit: limits.primary,
            widened_limit: limits.widened,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    pub cooler_reserve_percent: u32,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            cooler_reserve_percent: EngineSettings::default().cooler_reserve_percent,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeConfig {
    pub min_leftover: Amount,
    pub max_options: usize,
}

impl Default for UpgradeConfig {
    fn default() -> Self {
        let limits = UpgradeLimits::default();
        Self {
            min_leftover: limits.min_leftover,
            max_options: limits.max_options,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// File path (`.json` or `.csv`) or an http(s) URL.
    pub source: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl AdvisorConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| AdvisorError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CATALOG_URL})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static regex"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            selection: SelectionLimits {
                primary: self.selection.primary_limit,
                widened: self.selection.widened_limit,
            },
            cooler_reserve_percent: self.budget.cooler_reserve_percent,
            upgrade: UpgradeLimits {
                min_leftover: self.upgrade.min_leftover,
                max_options: self.upgrade.max_options,
            },
        }
    }

    /// Built-in tables, with any configured purposes replacing them. Rows are
    /// ordered by share, largest first.
    pub fn weight_table(&self) -> Result<WeightTable> {
        let mut table = WeightTable::builtin();
        for (purpose, shares) in &self.usage_weights {
            let mut rows: Vec<(Category, u32)> = Vec::new();
            for (key, percent) in shares {
                let categories = Category::from_key(key);
                if categories.is_empty() {
                    return Err(AdvisorError::InvalidConfigValueError {
                        field: format!("usage_weights.{}", purpose),
                        value: key.clone(),
                        reason: "Unknown part category".to_string(),
                    });
                }
                rows.extend(categories.into_iter().map(|category| (category, *percent)));
            }
            rows.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
            tracing::debug!("Weight table for '{}' overridden: {:?}", purpose, rows);
            table.insert(purpose, rows);
        }
        Ok(table)
    }

    /// `override_source` (e.g. from the command line) wins over the file.
    pub fn catalog_source(&self, override_source: Option<&str>) -> Result<Box<dyn CatalogSource>> {
        let source = override_source
            .or(self.catalog.source.as_deref())
            .ok_or_else(|| AdvisorError::MissingConfigError {
                field: "catalog.source".to_string(),
            })?;

        validation::validate_catalog_source("catalog.source", source)?;
        if validation::is_remote_source(source) {
            let mut http = HttpCatalogSource::new(source);
            if let Some(seconds) = self.catalog.timeout_seconds {
                http = http.with_timeout(Duration::from_secs(seconds));
            }
            return Ok(Box::new(http));
        }

        if source.to_lowercase().ends_with(".csv") {
            Ok(Box::new(CsvFileSource::new(source)))
        } else {
            Ok(Box::new(JsonFileSource::new(source)))
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_limit("selection.primary_limit", self.selection.primary_limit)?;
        validation::validate_limit("selection.widened_limit", self.selection.widened_limit)?;
        validation::validate_percent("budget.cooler_reserve_percent", self.budget.cooler_reserve_percent)?;
        validation::validate_amount("upgrade.min_leftover", self.upgrade.min_leftover)?;
        validation::validate_limit("upgrade.max_options", self.upgrade.max_options)?;

        if let Some(source) = self.catalog.source.as_deref() {
            validation::validate_catalog_source("catalog.source", source)?;
        }

        for (purpose, shares) in &self.usage_weights {
            if purpose.trim().is_empty() {
                return Err(AdvisorError::ConfigValidationError {
                    field: "usage_weights".to_string(),
                    message: "purpose name cannot be empty".to_string(),
                });
            }
            for percent in shares.values() {
                validation::validate_percent(&format!("usage_weights.{}", purpose), *percent)?;
            }
        }
        self.weight_table().map(|_| ())
    }
}

impl Validate for AdvisorConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::UsageWeights;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AdvisorConfig::from_toml_str("").unwrap();
        assert_eq!(config.engine_settings(), EngineSettings::default());
        assert!(config.catalog.source.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[selection]
primary_limit = 20
widened_limit = 8

[budget]
cooler_reserve_percent = 5

[upgrade]
min_leftover = 100000
max_options = 2

[catalog]
source = "https://parts.example.com/catalog.json"
timeout_seconds = 15

[usage_weights.streaming]
cpu = 30
gpu = 35
storage = 10
"#;
        let config = AdvisorConfig::from_toml_str(toml_content).unwrap();
        let settings = config.engine_settings();
        assert_eq!(settings.selection.primary, 20);
        assert_eq!(settings.selection.widened, 8);
        assert_eq!(settings.cooler_reserve_percent, 5);
        assert_eq!(settings.upgrade.min_leftover, 100_000);
        assert!(config.validate().is_ok());

        let table = config.weight_table().unwrap();
        assert_eq!(
            table.weights_for("Streaming"),
            vec![
                (Category::Gpu, 35),
                (Category::Cpu, 30),
                (Category::Ssd, 10),
                (Category::Hdd, 10),
            ]
        );
        assert!(!table.weights_for("gaming").is_empty());
    }

    #[test]
    fn test_weight_override_reaches_builtin_aliases() {
        let config =
            AdvisorConfig::from_toml_str("[usage_weights.gaming]\ngpu = 50\ncpu = 30\n").unwrap();
        let table = config.weight_table().unwrap();
        let expected = vec![(Category::Gpu, 50), (Category::Cpu, 30)];
        assert_eq!(table.weights_for("gaming"), expected);
        assert_eq!(table.weights_for("게이밍"), expected);
        assert_eq!(table.weights_for("게임"), expected);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("PC_ADVISOR_TEST_CATALOG", "/data/parts.csv");
        let config =
            AdvisorConfig::from_toml_str("[catalog]\nsource = \"${PC_ADVISOR_TEST_CATALOG}\"\n")
                .unwrap();
        assert_eq!(config.catalog.source.as_deref(), Some("/data/parts.csv"));
        std::env::remove_var("PC_ADVISOR_TEST_CATALOG");

        let untouched =
            AdvisorConfig::from_toml_str("[catalog]\nsource = \"${PC_ADVISOR_UNSET_VAR}\"\n").unwrap();
        assert_eq!(untouched.catalog.source.as_deref(), Some("${PC_ADVISOR_UNSET_VAR}"));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let zero_limit = AdvisorConfig::from_toml_str("[selection]\nprimary_limit = 0\n").unwrap();
        assert!(zero_limit.validate().is_err());

        let bad_url = AdvisorConfig::from_toml_str("[catalog]\nsource = \"https://\"\n").unwrap();
        assert!(bad_url.validate().is_err());

        let unknown_category =
            AdvisorConfig::from_toml_str("[usage_weights.gaming]\nsoundcard = 10\n").unwrap();
        assert!(matches!(
            unknown_category.validate(),
            Err(AdvisorError::InvalidConfigValueError { .. })
        ));

        let too_big = AdvisorConfig::from_toml_str("[usage_weights.gaming]\ngpu = 140\n").unwrap();
        assert!(too_big.validate().is_err());
    }

    #[test]
    fn test_catalog_source_selection() {
        let config = AdvisorConfig::default();
        assert!(matches!(
            config.catalog_source(None),
            Err(AdvisorError::MissingConfigError { .. })
        ));
        let csv = config.catalog_source(Some("parts.CSV")).unwrap();
        assert!(csv.describe().starts_with("csv file"));
        let json = config.catalog_source(Some("parts.json")).unwrap();
        assert!(json.describe().starts_with("json file"));
        let http = config.catalog_source(Some("http://localhost:9/parts")).unwrap();
        assert!(http.describe().starts_with("http endpoint"));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[upgrade]\nmax_options = 5\n")
            .unwrap();
        let config = AdvisorConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.upgrade.max_options, 5);
        assert_eq!(config.selection.primary_limit, 10);
    }
}
