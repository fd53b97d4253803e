use super::*;

#[test]
fn test_credentials_anonymous_has_no_header() {
    let creds = Credentials::anonymous();
    assert!(creds.is_anonymous());
    assert_eq!(creds.username(), None);
    assert_eq!(creds.to_header_value(), None);
}

#[test]
fn test_credentials_basic_header() {
    let creds = Credentials::basic("admin", "admin123");

    assert_eq!(creds.username(), Some("admin"));
    assert_eq!(
        creds.to_header_value().as_deref(),
        Some("Basic YWRtaW46YWRtaW4xMjM=")
    );
}

#[test]
fn test_try_basic_trims_username() {
    let creds = Credentials::try_basic("  deployer ", "secret").unwrap();
    assert_eq!(creds, Credentials::basic("deployer", "secret"));
}

#[test]
fn test_try_basic_rejects_blank_fields() {
    assert!(Credentials::try_basic("", "secret").is_err());
    assert!(Credentials::try_basic("   ", "secret").is_err());
    assert!(Credentials::try_basic("deployer", "").is_err());
}

#[test]
fn test_password_with_colon_is_encoded_verbatim() {
    let header = Credentials::basic("ci", "p:a:ss").to_header_value().unwrap();
    let encoded = header.trim_start_matches("Basic ");

    use base64::{Engine as _, engine::general_purpose};
    let decoded = general_purpose::STANDARD.decode(encoded).unwrap();
    assert_eq!(String::from_utf8(decoded).unwrap(), "ci:p:a:ss");
}
