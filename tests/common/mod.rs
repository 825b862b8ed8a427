#![allow(dead_code)]

use pc_build_advisor::{InMemoryCatalog, PartCandidate};
use std::path::PathBuf;

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn parts() -> Vec<PartCandidate> {
    let raw = std::fs::read_to_string(fixture_path("catalog.json")).expect("fixture catalog");
    serde_json::from_str(&raw).expect("valid fixture catalog")
}

pub fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::new(parts())
}
