//! Configuration loading and installation tests
use std::fs;
use std::sync::Arc;

use serde_json::json;
use tagdi::*;
use tempfile::TempDir;

const TOML_CONFIG: &str = r#"
[parameters]
"http.port" = 8080
"http.host" = "127.0.0.1"
debug = true

[parameters.limits]
requests = 100

[aliases]
"logger #private" = "logger.console"
"store" = "store.memory"
"#;

#[test]
fn test_load_toml_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("container.toml");
    fs::write(&path, TOML_CONFIG).unwrap();

    let config = ContainerConfig::load(&path).unwrap();
    assert_eq!(config.parameters["http.port"], json!(8080));
    assert_eq!(config.parameters["limits"], json!({ "requests": 100 }));
    assert_eq!(config.aliases.len(), 2);
}

#[test]
fn test_load_json_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("container.json");
    fs::write(
        &path,
        r#"{ "parameters": { "name": "svc" }, "aliases": { "main": "svc.main" } }"#,
    )
    .unwrap();

    let config = ContainerConfig::load(&path).unwrap();
    assert_eq!(config.parameters["name"], json!("svc"));
    assert_eq!(config.aliases["main"], "svc.main");
}

#[test]
fn test_unknown_extension_is_read_as_toml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("container.conf");
    fs::write(&path, "[parameters]\nretries = 3\n").unwrap();

    let config = ContainerConfig::load(&path).unwrap();
    assert_eq!(config.parameters["retries"], json!(3));
}

#[test]
fn test_load_errors() {
    let dir = TempDir::new().unwrap();

    let missing = ContainerConfig::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(missing, DIError::ConfigIo { .. }));
    assert!(missing.is_configuration());

    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();
    let broken = ContainerConfig::load(&path).unwrap_err();
    assert!(matches!(broken, DIError::ConfigParse { .. }));
}

#[test]
fn test_install_into_builder() {
    let builder = ContainerBuilder::new();
    builder.set_value("logger.console", String::from("console")).unwrap();
    builder
        .set_factory("store.memory #shared", |_| Ok(Arc::new(Vec::<u8>::new())))
        .unwrap();

    ContainerConfig::from_toml_str(TOML_CONFIG)
        .unwrap()
        .install(&builder)
        .unwrap();

    // hooks only run at sealing time
    assert!(!builder.has_parameter("http.port"));
    assert!(!builder.has_definition("logger"));

    let container = builder.get_container().unwrap();
    assert_eq!(container.parameter::<u16>("http.port").unwrap(), 8080);
    assert_eq!(container.parameter::<String>("http.host").unwrap(), "127.0.0.1");
    assert!(container.parameter::<bool>("debug").unwrap());

    assert!(matches!(
        container.get("logger"),
        Err(DIError::PrivateService { .. })
    ));
    assert!(container.get_as::<Vec<u8>>("store").is_ok());
}

#[test]
fn test_configured_alias_gives_way_to_definition() {
    let builder = ContainerBuilder::new();
    builder.set_value("store.memory", "memory").unwrap();
    builder.set_value("store", "custom").unwrap();

    ContainerConfig::from_toml_str(TOML_CONFIG)
        .unwrap()
        .install(&builder)
        .unwrap();
    builder.set_value("logger.console", "console").unwrap();

    let container = builder.get_container().unwrap();
    assert_eq!(*container.get_as::<&str>("store").unwrap(), "custom");
    assert!(!container.registry().get_definition("store").unwrap().is_alias());
}

#[test]
fn test_configured_alias_to_missing_target_fails_sealing() {
    let builder = ContainerBuilder::new();
    ContainerConfig::from_json_str(r#"{ "aliases": { "a": "missing" } }"#)
        .unwrap()
        .install(&builder)
        .unwrap();

    let err = builder.get_container().unwrap_err();
    assert!(matches!(err, DIError::AliasTargetNotFound { .. }));
    assert!(!builder.is_sealed());
}
