use sdbclient::sdb::Dialect;
use std::env;
use std::fs;
use std::sync::Mutex;
use tempfile::TempDir;

// Environment variables are process-wide; tests touching them run one at a time
static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Test loading configuration from YAML file
#[test]
fn test_load_yaml_config() {
    let yaml = r#"
profiles:
  test:
    access_key: AKIATEST
    secret_key: secrettest
    dialect: sds
    endpoint: http://127.0.0.1:9000/

default_profile: test

codec:
  number_padding: 12
  float_precision: 3

client:
  request_timeout: 120
  max_pages: 25
"#;

    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, yaml).unwrap();

    let config = sdbclient::config::load_from_yaml(&config_path).unwrap();

    assert_eq!(config.profiles.len(), 1);
    let profile = config.profiles.get("test").unwrap();
    assert_eq!(profile.access_key, "AKIATEST");
    assert_eq!(profile.secret_key, "secrettest");
    assert_eq!(profile.dialect, Dialect::Sds);
    assert_eq!(profile.endpoint.as_deref(), Some("http://127.0.0.1:9000/"));

    assert_eq!(config.default_profile, Some("test".to_string()));
    assert_eq!(config.codec.number_padding, 12);
    assert_eq!(config.codec.float_precision, 3);
    assert_eq!(config.client.request_timeout, 120);
    assert_eq!(config.client.max_pages, Some(25));
}

/// Test loading configuration from environment variables (AWS standard format)
#[test]
fn test_load_env_config_aws_format() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

    let saved = save_env(&[
        "AWS_ACCESS_KEY_ID",
        "AWS_SECRET_ACCESS_KEY",
        "SDB_DIALECT",
        "SDB_ENDPOINT",
        "SDB_NUMBER_PADDING",
        "SDB_FLOAT_PRECISION",
        "SDB_REQUEST_TIMEOUT",
        "SDB_MAX_PAGES",
    ]);

    env::set_var("AWS_ACCESS_KEY_ID", "test_key");
    env::set_var("AWS_SECRET_ACCESS_KEY", "test_secret");
    env::set_var("SDB_DIALECT", "sds");
    env::set_var("SDB_ENDPOINT", "http://localhost:8080/");
    env::set_var("SDB_NUMBER_PADDING", "10");
    env::set_var("SDB_FLOAT_PRECISION", "2");
    env::set_var("SDB_REQUEST_TIMEOUT", "5");
    env::set_var("SDB_MAX_PAGES", "7");

    let config = sdbclient::config::load_from_env().unwrap();

    assert_eq!(config.profiles.len(), 1);
    let profile = config.profiles.get("default").unwrap();
    assert_eq!(profile.access_key, "test_key");
    assert_eq!(profile.secret_key, "test_secret");
    assert_eq!(profile.dialect, Dialect::Sds);
    assert_eq!(profile.endpoint.as_deref(), Some("http://localhost:8080/"));
    assert_eq!(config.default_profile, Some("default".to_string()));

    assert_eq!(config.codec.number_padding, 10);
    assert_eq!(config.codec.float_precision, 2);
    assert_eq!(config.client.request_timeout, 5);
    assert_eq!(config.client.max_pages, Some(7));

    restore_env(saved);
}

/// Test loading configuration from environment variables (SDB_ format)
#[test]
fn test_load_env_config_sdb_format() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

    let saved = save_env(&[
        "AWS_ACCESS_KEY_ID",
        "AWS_SECRET_ACCESS_KEY",
        "SDB_ACCESS_KEY",
        "SDB_SECRET_KEY",
        "SDB_DIALECT",
        "SDB_ENDPOINT",
    ]);

    env::remove_var("AWS_ACCESS_KEY_ID");
    env::remove_var("AWS_SECRET_ACCESS_KEY");
    env::remove_var("SDB_DIALECT");
    env::remove_var("SDB_ENDPOINT");
    env::set_var("SDB_ACCESS_KEY", "legacy_key");
    env::set_var("SDB_SECRET_KEY", "legacy_secret");

    let config = sdbclient::config::load_from_env().unwrap();

    let profile = config.profiles.get("default").unwrap();
    assert_eq!(profile.access_key, "legacy_key");
    assert_eq!(profile.secret_key, "legacy_secret");
    // Should use the default dialect when not specified
    assert_eq!(profile.dialect, Dialect::Sdb);
    assert!(profile.endpoint.is_none());

    restore_env(saved);
}

/// Test that an unknown dialect is rejected
#[test]
fn test_load_env_config_bad_dialect() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

    let saved = save_env(&["AWS_ACCESS_KEY_ID", "AWS_SECRET_ACCESS_KEY", "SDB_DIALECT"]);

    env::set_var("AWS_ACCESS_KEY_ID", "key");
    env::set_var("AWS_SECRET_ACCESS_KEY", "secret");
    env::set_var("SDB_DIALECT", "dynamo");

    assert!(sdbclient::config::load_from_env().is_err());

    restore_env(saved);
}

/// Test default values
#[test]
fn test_default_values() {
    let yaml = r#"
profiles:
  minimal:
    access_key: key
    secret_key: secret
"#;

    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, yaml).unwrap();

    let config = sdbclient::config::load_from_yaml(&config_path).unwrap();

    let profile = config.profiles.get("minimal").unwrap();
    assert_eq!(profile.dialect, Dialect::Sdb);
    assert_eq!(profile.endpoint, None);

    assert_eq!(config.default_profile, None);
    assert_eq!(config.codec.number_padding, 32);
    assert_eq!(config.codec.float_precision, 8);
    assert_eq!(config.client.request_timeout, 30);
    assert_eq!(config.client.max_pages, None);
}

/// Test that settings no request could satisfy are rejected on load
#[test]
fn test_load_yaml_rejects_zero_settings() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yaml");

    fs::write(
        &config_path,
        "profiles: {}\ncodec:\n  number_padding: 0\n",
    )
    .unwrap();
    assert!(sdbclient::config::load_from_yaml(&config_path).is_err());

    fs::write(&config_path, "profiles: {}\nclient:\n  max_pages: 0\n").unwrap();
    assert!(sdbclient::config::load_from_yaml(&config_path).is_err());
}

/// Test that a zero page cap from the environment is rejected
#[test]
fn test_load_env_config_zero_max_pages() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

    let saved = save_env(&["AWS_ACCESS_KEY_ID", "AWS_SECRET_ACCESS_KEY", "SDB_DIALECT", "SDB_MAX_PAGES"]);

    env::set_var("AWS_ACCESS_KEY_ID", "key");
    env::set_var("AWS_SECRET_ACCESS_KEY", "secret");
    env::remove_var("SDB_DIALECT");
    env::set_var("SDB_MAX_PAGES", "0");

    assert!(sdbclient::config::load_from_env().is_err());

    restore_env(saved);
}

/// Test get_profile method
#[test]
fn test_get_profile() {
    let yaml = r#"
profiles:
  prod:
    access_key: prod_key
    secret_key: prod_secret
  dev:
    access_key: dev_key
    secret_key: dev_secret
    dialect: sds

default_profile: prod
"#;

    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, yaml).unwrap();

    let config = sdbclient::config::load_from_yaml(&config_path).unwrap();

    // Get specific profile
    let dev_profile = config.get_profile(Some("dev")).unwrap();
    assert_eq!(dev_profile.access_key, "dev_key");
    assert_eq!(dev_profile.dialect, Dialect::Sds);

    // Get default profile (None specified, should use default_profile)
    let default_profile = config.get_profile(None).unwrap();
    assert_eq!(default_profile.access_key, "prod_key");

    // Get non-existent profile
    assert!(config.get_profile(Some("nonexistent")).is_none());
}

/// Test load_config picks the requested profile from the file
#[test]
fn test_load_config_with_profile() {
    let yaml = r#"
profiles:
  a:
    access_key: a_key
    secret_key: a_secret
  b:
    access_key: b_key
    secret_key: b_secret
default_profile: a
"#;

    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, yaml).unwrap();
    let path = config_path.to_str().unwrap();

    let config = sdbclient::config::load_config(Some(path), Some("b")).unwrap();
    assert_eq!(config.default_profile, Some("b".to_string()));
    assert_eq!(config.get_profile(None).unwrap().access_key, "b_key");

    assert!(sdbclient::config::load_config(Some(path), Some("c")).is_err());
}

fn save_env(keys: &[&'static str]) -> Vec<(&'static str, Option<String>)> {
    keys.iter().map(|k| (*k, env::var(k).ok())).collect()
}

/// Helper function to restore environment variables
fn restore_env(saved: Vec<(&'static str, Option<String>)>) {
    for (key, orig_val) in saved {
        match orig_val {
            Some(val) => env::set_var(key, val),
            None => env::remove_var(key),
        }
    }
}
