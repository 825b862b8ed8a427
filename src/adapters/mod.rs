// Adapters layer: concrete catalog and weight-table implementations behind the domain ports
pub mod catalog;
pub mod sources;
pub mod weights;

pub use catalog::InMemoryCatalog;
pub use sources::{CsvFileSource, HttpCatalogSource, JsonFileSource};
pub use weights::WeightTable;
