//! Integration tests for Settings loading from a project directory.
//!
//! Note: These tests run without a global config (temp directories only),
//! so the project-local file layers directly over the compiled defaults.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use classtree::config::{local_config_path, Settings};

#[test]
fn given_no_local_config_when_load_then_defaults() {
    let project = TempDir::new().unwrap();

    let settings = Settings::load(Some(project.path())).expect("load settings");

    assert_eq!(settings, Settings::default());
}

#[test]
fn given_local_config_when_load_then_overrides_specified_fields() {
    // Arrange
    let project = TempDir::new().unwrap();
    fs::write(
        local_config_path(project.path()),
        r#"
root_name = "customers"
show_data = true
"#,
    )
    .unwrap();

    // Act
    let settings = Settings::load(Some(project.path())).expect("load settings");

    // Assert
    assert_eq!(settings.root_name, "customers");
    assert!(settings.show_data);
    assert!(settings.record_count, "unspecified field keeps default");
    assert!(settings.rules_file.is_none());
}

#[test]
fn given_relative_rules_file_when_load_then_resolved_against_project_dir() {
    let project = TempDir::new().unwrap();
    fs::write(
        local_config_path(project.path()),
        "rules_file = \"rules/customers.toml\"\n",
    )
    .unwrap();

    let settings = Settings::load(Some(project.path())).expect("load settings");

    assert_eq!(
        settings.rules_file,
        Some(project.path().join("rules/customers.toml"))
    );
}

#[test]
fn given_absolute_rules_file_when_load_then_kept_as_is() {
    let project = TempDir::new().unwrap();
    fs::write(
        local_config_path(project.path()),
        "rules_file = \"/etc/classtree/rules.toml\"\n",
    )
    .unwrap();

    let settings = Settings::load(Some(project.path())).expect("load settings");

    assert_eq!(
        settings.rules_file,
        Some(PathBuf::from("/etc/classtree/rules.toml"))
    );
}

#[test]
fn given_malformed_local_config_when_load_then_config_error() {
    let project = TempDir::new().unwrap();
    fs::write(local_config_path(project.path()), "root_name = [").unwrap();

    let result = Settings::load(Some(project.path()));

    assert!(matches!(
        result,
        Err(classtree::application::ApplicationError::Config { .. })
    ));
}

#[test]
fn given_effective_settings_when_to_toml_then_round_trips() {
    let settings = Settings {
        root_name: "all".into(),
        show_data: true,
        ..Settings::default()
    };

    let rendered = settings.to_toml().unwrap();
    let parsed: Settings = toml::from_str(&rendered).unwrap();

    assert_eq!(parsed, settings);
}
