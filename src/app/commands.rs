//! Command runners shared by the CLI and tests: load the catalog, run one
//! request, wrap the result in a report.

use crate::adapters::catalog::InMemoryCatalog;
use crate::adapters::weights::WeightTable;
use crate::config::toml_config::AdvisorConfig;
use crate::core::advisor::{BuildAdvisor, BuildRequest};
use crate::domain::model::{CompatibilityOutcome, PartId, Recommendation};
use crate::utils::error::{AdvisorError, Result};
use crate::utils::validation::Validate;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Report<T> {
    pub command: &'static str,
    pub generated_at: DateTime<Utc>,
    pub result: T,
}

impl<T: Serialize> Report<T> {
    fn new(command: &'static str, result: T) -> Self {
        Self {
            command,
            generated_at: Utc::now(),
            result,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub async fn load_catalog(config: &AdvisorConfig, override_source: Option<&str>) -> Result<InMemoryCatalog> {
    let source = config.catalog_source(override_source)?;
    InMemoryCatalog::from_source(&*source).await
}

async fn advisor(
    config: &AdvisorConfig,
    override_source: Option<&str>,
) -> Result<BuildAdvisor<InMemoryCatalog, WeightTable>> {
    config.validate()?;
    let catalog = load_catalog(config, override_source).await?;
    Ok(BuildAdvisor::new(catalog, config.weight_table()?, config.engine_settings()))
}

pub async fn run_recommend(
    config: &AdvisorConfig,
    override_source: Option<&str>,
    request: &BuildRequest,
) -> Result<Report<Recommendation>> {
    // 先驗證請求，避免無效請求還去載入目錄
    request.validate()?;
    let advisor = advisor(config, override_source).await?;
    let recommendation = advisor.recommend(request)?;
    Ok(Report::new("recommend", recommendation))
}

pub async fn run_check(
    config: &AdvisorConfig,
    override_source: Option<&str>,
    part_ids: &[PartId],
) -> Result<Report<CompatibilityOutcome>> {
    if part_ids.is_empty() {
        return Err(AdvisorError::invalid_request("at least one part id is required"));
    }
    let advisor = advisor(config, override_source).await?;
    let outcome = advisor.check_compatibility(part_ids)?;
    Ok(Report::new("check", outcome))
}
