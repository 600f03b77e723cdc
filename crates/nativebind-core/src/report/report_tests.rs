#![allow(non_snake_case)]

use super::*;

fn outcome(module: &str, status: ModuleStatus, warnings: usize) -> ModuleOutcome {
    ModuleOutcome {
        module: module.to_string(),
        status,
        diagnostics: (0..warnings)
            .map(|i| Diagnostic::new(format!("#/p{i}"), "skipped"))
            .collect(),
    }
}

#[test]
fn GenerationReport___empty___has_no_failures() {
    let report = GenerationReport::default();

    assert!(!report.has_failures());
    assert_eq!(report.generated_count(), 0);
    assert_eq!(report.warning_count(), 0);
}

#[test]
fn GenerationReport___mixed_outcomes___counts_each_kind() {
    let mut report = GenerationReport::default();
    report.push(outcome("Device", ModuleStatus::Generated, 2));
    report.push(outcome("Internal", ModuleStatus::Skipped, 0));
    report.push(outcome(
        "Broken",
        ModuleStatus::Failed(GenError::HeterogeneousArrayItems { path: "#/a".into() }),
        0,
    ));

    assert!(report.has_failures());
    assert_eq!(report.generated_count(), 1);
    assert_eq!(report.warning_count(), 2);
    let failures: Vec<&str> = report.failures().map(|(m, _)| m).collect();
    assert_eq!(failures, vec!["Broken"]);
}

#[test]
fn Diagnostic___from_error___keeps_path_and_message() {
    let err = GenError::UndeterminedPropertyType {
        path: "Device#/definitions/Info/properties/extra".to_string(),
    };

    let diagnostic = Diagnostic::from_error(&err);

    assert_eq!(diagnostic.path, "Device#/definitions/Info/properties/extra");
    assert!(diagnostic.message.contains("undetermined property type"));
}

#[test]
fn Diagnostic___display___prefixes_path() {
    let diagnostic = Diagnostic::new("#/a", "temporal-set is not supported");

    assert_eq!(diagnostic.to_string(), "#/a: temporal-set is not supported");
}
