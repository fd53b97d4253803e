use super::*;

#[test]
fn test_format_size_kibibytes() {
    assert_eq!(format_size(1024 * 5), "5 KiB");
}

#[test]
fn test_format_size_megabytes() {
    assert_eq!(format_size(1024 * 1024 * 2), "2 MiB");
}

#[test]
fn test_format_size_zero() {
    assert_eq!(format_size(0), "0 B");
}
