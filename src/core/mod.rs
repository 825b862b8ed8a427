pub mod advisor;
pub mod allocator;
pub mod compatibility;
pub mod inference;
pub mod resolution;
pub mod selector;
pub mod stages;
pub mod upgrade;

pub use advisor::{BuildAdvisor, BuildRequest, EngineSettings};
pub use compatibility::CompatibilityChecker;
