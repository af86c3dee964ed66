//! Formatting utilities

use humansize::{DECIMAL, format_size};

/// Format file size in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, DECIMAL)
}

/// Format a percentage
pub fn format_percentage(value: f64) -> String {
    format!("{value:.1}%")
}

/// Format a compression ratio
pub fn format_compression_ratio(original: u64, compressed: u64) -> String {
    if original == 0 {
        "N/A".to_string()
    } else {
        let ratio = 100.0 - (compressed as f64 / original as f64 * 100.0);
        format_percentage(ratio)
    }
}

/// Format a resource hash as fixed-width hex
pub fn format_hash(hash: u64) -> String {
    format!("{hash:#018x}")
}

/// Parse a hash given in decimal or `0x`-prefixed hex
pub fn parse_hash(text: &str) -> Option<u64> {
    let text = text.trim();
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16).ok(),
        None => text.replace('_', "").parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1024), "1.02 kB");
        assert_eq!(format_bytes(1048576), "1.05 MB");
        assert_eq!(format_bytes(1073741824), "1.07 GB");
    }

    #[test]
    fn test_format_compression_ratio() {
        assert_eq!(format_compression_ratio(1000, 500), "50.0%");
        assert_eq!(format_compression_ratio(1000, 250), "75.0%");
        assert_eq!(format_compression_ratio(1000, 1000), "0.0%");
        assert_eq!(format_compression_ratio(0, 0), "N/A");
    }

    #[test]
    fn test_format_hash() {
        assert_eq!(format_hash(0x1234), "0x0000000000001234");
    }

    #[test]
    fn test_parse_hash() {
        assert_eq!(parse_hash("0x0123456789ABCDEF"), Some(0x0123_4567_89AB_CDEF));
        assert_eq!(parse_hash("0X0123_4567_89ab_cdef"), Some(0x0123_4567_89AB_CDEF));
        assert_eq!(parse_hash("81985529216486895"), Some(0x0123_4567_89AB_CDEF));
        assert_eq!(parse_hash(" 42 "), Some(42));
        assert_eq!(parse_hash("0xZZ"), None);
        assert_eq!(parse_hash("-1"), None);
    }
}
