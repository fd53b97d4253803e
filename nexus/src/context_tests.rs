use super::*;
use libnexus::auth::{CredentialStore, FileCredentialStore};
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_verbosity_from_count() {
    assert_eq!(VerbosityLevel::from_count(0), VerbosityLevel::Normal);
    assert_eq!(VerbosityLevel::from_count(1), VerbosityLevel::Verbose);
    assert_eq!(VerbosityLevel::from_count(2), VerbosityLevel::VeryVerbose);
    assert_eq!(VerbosityLevel::from_count(3), VerbosityLevel::Trace);
    assert_eq!(VerbosityLevel::from_count(9), VerbosityLevel::Trace);
}

#[test]
fn test_verbosity_ordering() {
    assert!(VerbosityLevel::Normal < VerbosityLevel::Verbose);
    assert!(VerbosityLevel::VeryVerbose < VerbosityLevel::Trace);
}

#[test]
fn test_filter_directive_per_level() {
    assert_eq!(VerbosityLevel::Normal.filter_directive(), "warn");
    assert_eq!(VerbosityLevel::Verbose.filter_directive(), "info");
    assert_eq!(VerbosityLevel::VeryVerbose.filter_directive(), "debug");
    assert_eq!(VerbosityLevel::Trace.filter_directive(), "trace");
}

fn ctx_for(host: &str, repository: Option<&str>, creds_path: PathBuf) -> AppContext {
    let mut config = Config::default();
    config.registry.host = host.to_string();
    config.registry.repository = repository.map(str::to_string);
    AppContext::with_paths(config, PathBuf::from("/nonexistent/config.toml"), creds_path)
}

#[test]
fn test_credentials_for_configured_repository() {
    let dir = tempdir().unwrap();
    let creds_path = dir.path().join("credentials.toml");
    let mut store = FileCredentialStore::open(&creds_path).unwrap();
    store
        .store(
            &RegistryKey::new("nexus.local:8081", Some("docker-hosted")),
            &Credentials::basic("ci", "secret"),
        )
        .unwrap();

    let ctx = ctx_for("http://nexus.local:8081", Some("docker-hosted"), creds_path);

    assert_eq!(ctx.credentials().unwrap().username(), Some("ci"));
}

#[test]
fn test_host_wide_credentials_cover_configured_repository() {
    let dir = tempdir().unwrap();
    let creds_path = dir.path().join("credentials.toml");
    let mut store = FileCredentialStore::open(&creds_path).unwrap();
    store
        .store(&RegistryKey::new("nexus.local:8081", None), &Credentials::basic("admin", "pw"))
        .unwrap();

    let ctx = ctx_for("nexus.local:8081", Some("docker-proxy"), creds_path);

    assert_eq!(ctx.credentials().unwrap().username(), Some("admin"));
}

#[test]
fn test_no_credentials_for_other_host() {
    let dir = tempdir().unwrap();
    let creds_path = dir.path().join("credentials.toml");
    let mut store = FileCredentialStore::open(&creds_path).unwrap();
    store
        .store(&RegistryKey::new("other:5000", None), &Credentials::basic("ci", "secret"))
        .unwrap();

    let ctx = ctx_for("nexus.local:8081", None, creds_path);

    assert!(ctx.credentials().is_none());
}
