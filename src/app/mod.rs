pub mod commands;

pub use commands::{load_catalog, run_check, run_recommend, Report};
