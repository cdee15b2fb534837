// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Parley configuration system.

use parley_config::diagnostic::ConfigError;
use parley_config::model::ParleyConfig;
use parley_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_parley_config() {
    let toml = r#"
[server]
host = "0.0.0.0"
port = 9000

[storage]
database_path = "/tmp/parley-test.db"
wal_mode = false

[delivery]
outbound_buffer = 16

[logging]
level = "debug"
json = true
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.storage.database_path, "/tmp/parley-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.delivery.outbound_buffer, 16);
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.json);
}

/// Sections that are omitted fall back to defaults.
#[test]
fn partial_toml_keeps_defaults() {
    let config = load_config_from_str("[server]\nport = 1234\n").unwrap();
    let defaults = ParleyConfig::default();
    assert_eq!(config.server.port, 1234);
    assert_eq!(config.server.host, defaults.server.host);
    assert_eq!(config.delivery.outbound_buffer, defaults.delivery.outbound_buffer);
}

/// A misspelled key yields an UnknownKey diagnostic with a suggestion.
#[test]
fn unknown_key_suggests_correction() {
    let errors = load_and_validate_str("[server]\nprot = 80\n").unwrap_err();
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "prot");
            assert_eq!(suggestion.as_deref(), Some("port"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

/// An unknown section is rejected at the top level.
#[test]
fn unknown_section_is_rejected() {
    let errors = load_and_validate_str("[telegram]\nbot_token = \"x\"\n").unwrap_err();
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::UnknownKey { key, .. } if key == "telegram"))
    );
}

/// A string where a number belongs is reported as an invalid type.
#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[server]\nport = \"eighty\"\n").unwrap_err();
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { .. } | ConfigError::Other(_)))
    );
}

/// Semantic validation runs after a successful parse.
#[test]
fn validation_errors_surface_through_loader() {
    let errors = load_and_validate_str("[delivery]\noutbound_buffer = 0\n").unwrap_err();
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("outbound_buffer"))
    ));
}

/// An explicit config file is loaded and validated.
#[test]
fn explicit_path_is_loaded() {
    let dir = std::env::temp_dir().join(format!("parley-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("parley.toml");
    std::fs::write(&path, "[logging]\nlevel = \"warn\"\n").unwrap();

    let config = load_and_validate_path(&path).unwrap();
    assert_eq!(config.logging.level, "warn");

    std::fs::remove_dir_all(&dir).unwrap();
}

/// Typos in an explicit file are reported with a suggestion.
#[test]
fn explicit_path_typo_is_reported() {
    let dir = std::env::temp_dir().join(format!("parley-config-span-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("parley.toml");
    std::fs::write(&path, "[storage]\nwal_mod = true\n").unwrap();

    let errors = load_and_validate_path(&path).unwrap_err();
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "wal_mod");
            assert_eq!(suggestion.as_deref(), Some("wal_mode"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }

    std::fs::remove_dir_all(&dir).unwrap();
}
