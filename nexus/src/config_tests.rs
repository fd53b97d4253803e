use super::*;
use libnexus::retention::SortStrategy;
use tempfile::tempdir;

#[test]
fn test_save_then_load_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config.registry.host = "http://nexus.local:8081".to_string();
    config.registry.repository = Some("docker-hosted".to_string());
    config.retention.sort = SortStrategy::Numeric;

    save_config(&config, &path).unwrap();
    let loaded = load_config(&path).unwrap();

    assert_eq!(loaded.registry.host, "http://nexus.local:8081");
    assert_eq!(loaded.registry.repository.as_deref(), Some("docker-hosted"));
    assert_eq!(loaded.retention.sort, SortStrategy::Numeric);
}

#[test]
fn test_load_missing_config_gives_defaults() {
    let dir = tempdir().unwrap();
    let config = load_config(&dir.path().join("absent.toml")).unwrap();

    assert_eq!(config.retention.keep_all_group, "prod");
    assert_eq!(config.network.timeout, 30);
}

#[test]
fn test_load_invalid_config_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[registry\nhost = ").unwrap();

    let err = load_config(&path).unwrap_err();
    assert!(err.contains("Failed to load config"));
}

#[test]
fn test_save_and_load_credentials() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("credentials.toml");
    let key = RegistryKey::new("nexus.local", Some("docker"));

    save_credentials(&path, &key, &Credentials::basic("admin", "admin123")).unwrap();

    let creds = load_credentials(&path, &key).unwrap();
    assert_eq!(creds.username(), Some("admin"));
    assert!(load_credentials(&path, &RegistryKey::new("elsewhere", Some("docker"))).is_none());
    assert!(load_credentials(&path, &RegistryKey::new("nexus.local", Some("other"))).is_none());
}

#[test]
fn test_load_credentials_without_file() {
    let dir = tempdir().unwrap();
    let key = RegistryKey::new("nexus.local", None);
    assert!(load_credentials(&dir.path().join("none.toml"), &key).is_none());
}

#[test]
fn test_load_credentials_with_empty_host() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("credentials.toml");
    save_credentials(&path, &RegistryKey::new("nexus.local", None), &Credentials::basic("admin", "pw"))
        .unwrap();

    assert!(load_credentials(&path, &RegistryKey::new("", None)).is_none());
}

#[test]
fn test_load_credentials_ignores_corrupt_store() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("credentials.toml");
    fs::write(&path, "[[registry]\n").unwrap();

    assert!(load_credentials(&path, &RegistryKey::new("nexus.local", None)).is_none());
}

#[test]
fn test_forget_credentials_without_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("credentials.toml");

    let removed = forget_credentials(&path, &RegistryKey::new("nexus.local", None)).unwrap();

    assert!(!removed);
    assert!(!path.exists());
}
