//! Tests for config loading

use std::io::Write;
use std::path::{Path, PathBuf};

use serial_test::serial;
use tempfile::NamedTempFile;

use daily_shuffle::config::Config;
use daily_shuffle::storage::StoreBackend;
use daily_shuffle::utils::time::Zone;

const ENV_VARS: &[&str] = &[
    "DAILY_SHUFFLE_HOST",
    "DAILY_SHUFFLE_PORT",
    "DAILY_SHUFFLE_REQUEST_LOGGING",
    "DAILY_SHUFFLE_STORE",
    "DAILY_SHUFFLE_SQLITE_PATH",
    "DAILY_SHUFFLE_COLLECTION",
    "DAILY_SHUFFLE_PUBLISH_TIME",
    "DAILY_SHUFFLE_TIMEZONE",
    "DAILY_SHUFFLE_SCHEDULE_ENABLED",
    "DAILY_SHUFFLE_PUBLISH_ON_STARTUP",
    "DAILY_SHUFFLE_LOG_LEVEL",
    "DAILY_SHUFFLE_LOG_FORMAT",
];

fn clear_env() {
    for name in ENV_VARS {
        std::env::remove_var(name);
    }
}

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
#[serial]
fn test_from_env_defaults() {
    clear_env();

    let config = Config::from_env().unwrap();

    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.store.backend, StoreBackend::Sqlite);
    assert_eq!(config.store.collection, "daily_shuffle");
    assert_eq!(config.schedule.publish_time, "00:00");
    assert_eq!(config.schedule.timezone, Zone::Utc);
    assert!(config.schedule.enabled);
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_env();
    std::env::set_var("DAILY_SHUFFLE_PORT", "9090");
    std::env::set_var("DAILY_SHUFFLE_STORE", "memory");
    std::env::set_var("DAILY_SHUFFLE_COLLECTION", "staging_shuffle");
    std::env::set_var("DAILY_SHUFFLE_PUBLISH_TIME", "06:30");
    std::env::set_var("DAILY_SHUFFLE_TIMEZONE", "local");
    std::env::set_var("DAILY_SHUFFLE_SCHEDULE_ENABLED", "false");
    std::env::set_var("DAILY_SHUFFLE_PUBLISH_ON_STARTUP", "yes");

    let config = Config::from_env().unwrap();
    clear_env();

    assert_eq!(config.server.port, 9090);
    assert_eq!(config.store.backend, StoreBackend::Memory);
    assert_eq!(config.store.collection, "staging_shuffle");
    assert_eq!(config.schedule.publish_time, "06:30");
    assert_eq!(config.schedule.timezone, Zone::Local);
    assert!(!config.schedule.enabled);
    assert!(config.schedule.publish_on_startup);
}

#[test]
#[serial]
fn test_from_env_rejects_bad_values() {
    clear_env();
    std::env::set_var("DAILY_SHUFFLE_PORT", "not-a-port");
    assert!(Config::from_env().is_err());

    clear_env();
    std::env::set_var("DAILY_SHUFFLE_STORE", "postgres");
    assert!(Config::from_env().is_err());

    clear_env();
    std::env::set_var("DAILY_SHUFFLE_TIMEZONE", "Mars/Olympus");
    assert!(Config::from_env().is_err());

    clear_env();
}

#[test]
fn test_from_file_partial() {
    let file = write_config(
        r#"
[server]
port = 3000

[schedule]
publish_time = "12:00"
"#,
    );

    let config = Config::from_file(file.path()).unwrap();

    assert_eq!(config.server.port, 3000);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.schedule.publish_time, "12:00");
    assert_eq!(config.store.sqlite_path, PathBuf::from("data/daily_shuffle.db"));
    assert!(config.validate().is_ok());
}

#[test]
fn test_from_file_invalid_toml() {
    let file = write_config("[server\nport = ");
    assert!(Config::from_file(file.path()).is_err());
}

#[test]
fn test_from_file_missing() {
    assert!(Config::from_file(Path::new("/nonexistent/daily-shuffle.toml")).is_err());
}

#[test]
fn test_bundled_config_is_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config.toml");

    let config = Config::from_file(&path).unwrap();

    assert!(config.validate().is_ok());
    assert_eq!(config.store.backend, StoreBackend::Sqlite);
    assert_eq!(config.logging.format, "text");
}
