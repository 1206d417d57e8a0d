//! Human-readable byte sizes.

const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Format a byte count with two decimals, e.g. `1536` -> `"1.50 KB"`.
pub fn format_bytes(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}

/// Percentage saved going from `before` to `after`, two decimals.
pub fn savings_percent(before: u64, after: u64) -> f64 {
    if before == 0 {
        return 0.0;
    }
    let saved = (before as f64 - after as f64) / before as f64 * 100.0;
    (saved * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0.00 B");
        assert_eq!(format_bytes(512), "512.00 B");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.00 GB");
    }

    #[test]
    fn test_savings_percent() {
        assert_eq!(savings_percent(200, 50), 75.0);
        assert_eq!(savings_percent(3, 2), 33.33);
        assert_eq!(savings_percent(0, 10), 0.0);
    }
}
