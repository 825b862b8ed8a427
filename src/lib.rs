pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use adapters::{InMemoryCatalog, WeightTable};
pub use config::AdvisorConfig;
pub use core::advisor::{BuildAdvisor, BuildRequest, EngineSettings};
pub use domain::model::{
    Category, CompatibilityOutcome, PartCandidate, PartId, Recommendation, UpgradeOption,
};
pub use utils::error::{AdvisorError, Result};
