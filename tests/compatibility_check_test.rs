mod common;

use pc_build_advisor::{AdvisorError, BuildAdvisor, EngineSettings, InMemoryCatalog, WeightTable};

fn advisor() -> BuildAdvisor<InMemoryCatalog, WeightTable> {
    BuildAdvisor::new(
        common::catalog(),
        WeightTable::builtin(),
        EngineSettings::default(),
    )
}

#[test]
fn test_full_compatible_build() {
    let outcome = advisor()
        .check_compatibility(&[101, 401, 301, 201, 601, 701, 801, 501])
        .unwrap();
    assert!(outcome.is_compatible);
    assert!(outcome.errors.is_empty());
    assert!(outcome.warnings.is_empty());
    assert_eq!(outcome.summary, "All parts are fully compatible.");
}

#[test]
fn test_socket_mismatch_is_an_error() {
    let outcome = advisor()
        .check_compatibility(&[101, 402, 301, 601])
        .unwrap();
    assert!(!outcome.is_compatible);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].contains("AM5"));
    assert!(outcome.errors[0].contains("LGA1700"));
    assert!(outcome.summary.contains("1 errors"));
}

#[test]
fn test_weak_psu_is_an_error() {
    let outcome = advisor().check_compatibility(&[101, 201, 602]).unwrap();
    assert!(!outcome.is_compatible);
    assert!(outcome.errors[0].contains("500W"));
    assert!(outcome.errors[0].contains("606W"));
}

#[test]
fn test_check_is_idempotent() {
    let advisor = advisor();
    let ids = [101, 402, 301, 601, 702];
    let first = advisor.check_compatibility(&ids).unwrap();
    let second = advisor.check_compatibility(&ids).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_later_id_wins_within_category() {
    let outcome = advisor().check_compatibility(&[402, 101, 401]).unwrap();
    assert!(outcome.is_compatible);
}

#[test]
fn test_unknown_case_form_factor_is_a_warning() {
    // 702 carries no recognizable form factor
    let outcome = advisor().check_compatibility(&[401, 702]).unwrap();
    assert!(outcome.is_compatible);
    assert_eq!(outcome.warnings.len(), 1);
    assert!(outcome.summary.contains("1 warnings"));
}

#[test]
fn test_empty_ids_rejected() {
    let err = advisor().check_compatibility(&[]).unwrap_err();
    assert!(matches!(err, AdvisorError::InvalidRequest { .. }));
}
