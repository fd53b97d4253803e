//! Human-readable byte sizes.

use humansize::{BINARY, format_size as format_size_human};

#[cfg(test)]
mod tests;

/// Formats a byte size using binary units (KiB, MiB).
///
/// # Examples
///
/// ```
/// use libnexus::format::format_size;
///
/// assert_eq!(format_size(1024 * 1024 * 5), "5 MiB");
/// assert_eq!(format_size(512), "512 B");
/// ```
pub fn format_size(size_bytes: u64) -> String {
    format_size_human(size_bytes, BINARY)
}
