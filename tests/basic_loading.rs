//! Integration tests for basic configuration loading.

#![allow(unsafe_code)] // For env var manipulation in tests

use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tierconf::prelude::*;

#[derive(Debug, Default, Clone, PartialEq)]
struct ServerConfig {
    port: u16,
    host: String,
    timeout: Duration,
}

impl Unmarshal for ServerConfig {
    fn fields() -> Fields<Self> {
        Fields::new()
            .field("Port", |s: &mut Self, v| s.port = v)
            .field("Host", |s: &mut Self, v| s.host = v)
            .field("Timeout", |s: &mut Self, v| s.timeout = v)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct DatabaseConfig {
    url: String,
    max_connections: u32,
}

impl Unmarshal for DatabaseConfig {
    fn fields() -> Fields<Self> {
        Fields::new()
            .field("Url", |d: &mut Self, v| d.url = v)
            .field("MaxConnections", |d: &mut Self, v| d.max_connections = v)
            .key("max_connections")
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct AppConfig {
    server: ServerConfig,
    database: DatabaseConfig,
}

impl Unmarshal for AppConfig {
    fn fields() -> Fields<Self> {
        Fields::new()
            .nested("Server", |a: &mut Self| &mut a.server)
            .nested("Database", |a: &mut Self| &mut a.database)
    }
}

const BASE: &str = r#"
server:
  port: 8080
  host: localhost
  timeout: 30s
database:
  url: postgres://localhost/db
  max_connections: 10
"#;

fn write(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

#[tokio::test]
async fn test_load_single_yaml_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write(temp_dir.path(), "config.yaml", BASE);

    let config = TierConfig::builder()
        .with_file(&config_path)
        .build()
        .await
        .unwrap();

    let cfg: AppConfig = config.unmarshal().unwrap();
    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.server.host, "localhost");
    assert_eq!(cfg.server.timeout, Duration::from_secs(30));
    assert_eq!(cfg.database.url, "postgres://localhost/db");
    assert_eq!(cfg.database.max_connections, 10);
}

#[tokio::test]
async fn test_file_precedence_merges_deeply() {
    let temp_dir = TempDir::new().unwrap();
    let default_path = write(temp_dir.path(), "default.yaml", BASE);
    let override_path = write(temp_dir.path(), "override.toml", "[server]\nport = 9090\n");

    let config = TierConfig::builder()
        .with_file(&default_path)
        .with_file(&override_path)
        .build()
        .await
        .unwrap();

    let cfg: AppConfig = config.unmarshal().unwrap();
    assert_eq!(cfg.server.port, 9090);
    assert_eq!(cfg.server.host, "localhost");
    assert_eq!(cfg.database.max_connections, 10);
}

#[tokio::test]
async fn test_env_overrides() {
    use std::env;

    let temp_dir = TempDir::new().unwrap();
    let config_path = write(temp_dir.path(), "config.yaml", BASE);

    unsafe {
        env::set_var("TIERCONF_IT_SERVER__PORT", "9999");
        env::set_var("TIERCONF_IT_DATABASE__MAX_CONNECTIONS", "50");
    }

    let config = TierConfig::builder()
        .with_file(&config_path)
        .with_env_overrides("TIERCONF_IT", "__")
        .build()
        .await
        .unwrap();

    unsafe {
        env::remove_var("TIERCONF_IT_SERVER__PORT");
        env::remove_var("TIERCONF_IT_DATABASE__MAX_CONNECTIONS");
    }

    assert_eq!(config.get_as::<u16>("server.port").unwrap(), Some(9999));
    assert_eq!(
        config.get_as::<String>("server.host").unwrap().as_deref(),
        Some("localhost")
    );
    assert_eq!(config.get_as::<u32>("database.max_connections").unwrap(), Some(50));
}

#[tokio::test]
async fn test_defaults_sit_under_files() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write(temp_dir.path(), "config.json", r#"{"server": {"port": 7000}}"#);

    let defaults = tierconf::sources::MemorySource::new("d")
        .with_value("server.port", 1)
        .with_value("server.workers", 4)
        .load()
        .unwrap();

    let config = TierConfig::builder()
        .with_defaults(defaults)
        .with_file(&config_path)
        .build()
        .await
        .unwrap();

    assert_eq!(config.get_or("server.port", 0u16), 7000);
    assert_eq!(config.get_or("server.workers", 0u8), 4);
}

#[tokio::test]
async fn test_validation_failure() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write(temp_dir.path(), "config.yaml", "server:\n  port: 80\n");

    let result = TierConfig::builder()
        .with_file(&config_path)
        .with_validation(|snapshot: &Snapshot| match snapshot.get_as::<u16>("server.port") {
            Ok(Some(port)) if port >= 1024 => Ok(()),
            _ => Err(ValidationError::invalid_field("server.port", "must be >= 1024")),
        })
        .build()
        .await;

    let err = result.err().unwrap();
    assert!(err.to_string().contains("Configuration validation failed"));
}

#[tokio::test]
async fn test_reload() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write(temp_dir.path(), "config.yaml", BASE);

    let config = TierConfig::builder()
        .with_file(&config_path)
        .build()
        .await
        .unwrap();
    assert_eq!(config.get_or("server.port", 0u16), 8080);

    fs::write(&config_path, BASE.replace("8080", "9090")).unwrap();
    config.reload().await.unwrap();

    assert_eq!(config.get_or("server.port", 0u16), 9090);
}

#[tokio::test]
async fn test_reload_failure_keeps_previous_snapshot() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write(temp_dir.path(), "config.yaml", BASE);

    let config = TierConfig::builder()
        .with_file(&config_path)
        .build()
        .await
        .unwrap();

    fs::remove_file(&config_path).unwrap();
    assert!(config.reload().await.is_err());
    assert_eq!(config.get_or("server.port", 0u16), 8080);
}

#[tokio::test]
async fn test_manual_update_and_clone() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write(temp_dir.path(), "config.yaml", BASE);

    let config = TierConfig::builder()
        .with_file(&config_path)
        .build()
        .await
        .unwrap();
    let config_clone = config.clone();

    let tree = tierconf::sources::MemorySource::new("update")
        .with_value("server.port", 7777)
        .with_value("server.host", "127.0.0.1")
        .load()
        .unwrap();
    config.update(tree).await.unwrap();

    let server: ServerConfig = config_clone.unmarshal_key("server").unwrap().unwrap();
    assert_eq!(server.port, 7777);
    assert_eq!(server.host, "127.0.0.1");
    assert!(!config_clone.is_set("database"));
}

#[tokio::test]
async fn test_custom_separator() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write(temp_dir.path(), "config.yaml", BASE);

    let config = TierConfig::builder()
        .with_file(&config_path)
        .with_separator("::")
        .build()
        .await
        .unwrap();

    assert_eq!(config.get_as::<u16>("server::port").unwrap(), Some(8080));
    assert_eq!(config.get("server.port"), None);
    assert!(config.keys().contains(&"database::url".to_string()));
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Limits {
    max_conns: u32,
    idle_timeout: Duration,
}

impl Unmarshal for Limits {
    fn fields() -> Fields<Self> {
        Fields::new()
            .field("MaxConns", |l: &mut Self, v| l.max_conns = v)
            .field("IdleTimeout", |l: &mut Self, v| l.idle_timeout = v)
    }
}

#[tokio::test]
async fn test_mixed_case_keys_bind_through_default_field_keys() {
    let temp_dir = TempDir::new().unwrap();
    let yaml_path = write(
        temp_dir.path(),
        "limits.yaml",
        "limits:\n  maxConns: 16\n  idleTimeout: 45s\n",
    );
    let toml_path = write(temp_dir.path(), "override.toml", "[limits]\nmaxConns = 32\n");

    let config = TierConfig::builder()
        .with_file(&yaml_path)
        .build()
        .await
        .unwrap();

    assert_eq!(config.get("limits.maxConns"), Some(Value::Int(16)));
    assert_eq!(config.get("limits.maxconns"), None);
    let limits: Limits = config.unmarshal_key("limits").unwrap().unwrap();
    assert_eq!(
        limits,
        Limits {
            max_conns: 16,
            idle_timeout: Duration::from_secs(45),
        }
    );

    let layered = TierConfig::builder()
        .with_file(&yaml_path)
        .with_file(&toml_path)
        .build()
        .await
        .unwrap();

    let limits: Limits = layered.unmarshal_key("limits").unwrap().unwrap();
    assert_eq!(limits.max_conns, 32);
    assert_eq!(limits.idle_timeout, Duration::from_secs(45));
    assert!(layered.keys().contains(&"limits.idleTimeout".to_string()));
}
