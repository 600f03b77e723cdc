#![allow(non_snake_case)]

use super::*;
use tempfile::TempDir;

#[test]
fn run___valid_config___ok() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nativebind.toml");
    std::fs::write(
        &path,
        r#"
log_level = "debug"

[modules]
include = ["Device", "Types"]
"#,
    )
    .unwrap();

    assert!(run(Some(path)).is_ok());
}

#[test]
fn run___invalid_identifier___error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nativebind.toml");
    std::fs::write(&path, "[runtime]\nsdk_namespace = \"Firebolt SDK\"\n").unwrap();

    let err = run(Some(path)).unwrap_err();

    assert!(format!("{err:#}").contains("runtime.sdk_namespace"));
}

#[test]
fn run___missing_file___error() {
    let temp = TempDir::new().unwrap();

    assert!(run(Some(temp.path().join("absent.toml"))).is_err());
}
