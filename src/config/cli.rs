use crate::config::toml_config::AdvisorConfig;
use crate::core::advisor::BuildRequest;
use crate::domain::model::{Amount, PartId};
use crate::utils::error::{AdvisorError, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::{Map, Value};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "pc-build-advisor")]
#[command(about = "Recommends compatible PC part builds from a parts catalog")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Command {
    /// Recommend a full build for a budget and purpose.
    Recommend(RecommendArgs),
    /// Check a set of catalog parts for compatibility.
    Check(CheckArgs),
}

#[derive(Clone, Debug, Args)]
pub struct RecommendArgs {
    /// Catalog file (.json/.csv) or http(s) URL; overrides the config file
    #[arg(long)]
    pub catalog: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub budget: Amount,

    #[arg(long)]
    pub purpose: String,

    /// Preferences as a JSON object
    #[arg(long)]
    pub preferences: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct CheckArgs {
    #[arg(long)]
    pub catalog: Option<String>,

    #[arg(long, value_delimiter = ',', num_args = 1..)]
    pub ids: Vec<PartId>,
}

impl CliArgs {
    pub fn load_config(&self) -> Result<AdvisorConfig> {
        match self.config.as_deref() {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                AdvisorConfig::from_file(path)
            }
            None => Ok(AdvisorConfig::default()),
        }
    }
}

impl RecommendArgs {
    pub fn to_request(&self) -> Result<BuildRequest> {
        let preferences = match self.preferences.as_deref() {
            None => Map::new(),
            Some(raw) => match serde_json::from_str::<Value>(raw)? {
                Value::Object(map) => map,
                other => {
                    return Err(AdvisorError::invalid_request(format!(
                        "preferences must be a JSON object, got {}",
                        other
                    )))
                }
            },
        };
        Ok(BuildRequest::new(self.budget, self.purpose.clone()).with_preferences(preferences))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recommend() {
        let args = CliArgs::parse_from([
            "pc-build-advisor",
            "recommend",
            "--catalog",
            "parts.json",
            "--budget",
            "1500000",
            "--purpose",
            "gaming",
            "--preferences",
            r#"{"recommend_style": "value"}"#,
            "-v",
        ]);
        assert!(args.verbose);
        let Command::Recommend(recommend) = args.command else {
            panic!("expected recommend");
        };
        let request = recommend.to_request().unwrap();
        assert_eq!(request.budget, 1_500_000);
        assert_eq!(request.preferences["recommend_style"], "value");
    }

    #[test]
    fn test_parse_check_ids() {
        let args = CliArgs::parse_from([
            "pc-build-advisor",
            "--log-format",
            "json",
            "check",
            "--ids",
            "3,1,2",
        ]);
        assert_eq!(args.log_format, LogFormat::Json);
        let Command::Check(check) = args.command else {
            panic!("expected check");
        };
        assert_eq!(check.ids, vec![3, 1, 2]);
        assert!(check.catalog.is_none());
    }

    #[test]
    fn test_non_object_preferences_rejected() {
        let args = RecommendArgs {
            catalog: None,
            budget: 100,
            purpose: "office".to_string(),
            preferences: Some("[1, 2]".to_string()),
        };
        assert!(matches!(
            args.to_request(),
            Err(AdvisorError::InvalidRequest { .. })
        ));
    }
}
