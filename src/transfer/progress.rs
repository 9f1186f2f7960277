//! Packaging progress tracking.
//!
//! Converts cumulative processed-byte counts into the percentage lines
//! shown in the CI log.

/// Progress gauge for the packaging stage.
///
/// Percentages round up and are clamped to 100: zip bookkeeping can push
/// the processed count slightly past the precomputed total.
#[derive(Debug, Clone)]
pub struct PackagingProgress {
    total_bytes: u64,
    processed_bytes: u64,
}

impl PackagingProgress {
    pub fn new(total_bytes: u64) -> Self {
        Self {
            total_bytes,
            processed_bytes: 0,
        }
    }

    /// Record a new cumulative byte count. The count never moves backwards.
    pub fn update(&mut self, processed_bytes: u64) {
        self.processed_bytes = self.processed_bytes.max(processed_bytes);
    }

    pub fn processed_bytes(&self) -> u64 {
        self.processed_bytes
    }

    /// Current percentage, 0-100.
    pub fn percent(&self) -> u8 {
        percent_of(self.processed_bytes, self.total_bytes)
    }

    pub fn is_complete(&self) -> bool {
        self.processed_bytes >= self.total_bytes
    }
}

/// `ceil(processed / total * 100)`, clamped to 100.
///
/// A zero total (empty directory) reports 100.
pub fn percent_of(processed: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let percent = (processed as f64 / total as f64 * 100.0).ceil();
    percent.min(100.0) as u8
}

/// Format bytes as a human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds_up() {
        assert_eq!(percent_of(1, 3), 34);
        assert_eq!(percent_of(0, 3), 0);
        assert_eq!(percent_of(3, 3), 100);
    }

    #[test]
    fn percent_clamps_at_100() {
        // Archive overhead can push processed past the scan total.
        assert_eq!(percent_of(1050, 1000), 100);
    }

    #[test]
    fn percent_of_empty_total_is_100() {
        assert_eq!(percent_of(0, 0), 100);
    }

    #[test]
    fn gauge_is_monotonic() {
        let mut gauge = PackagingProgress::new(100);
        gauge.update(40);
        assert_eq!(gauge.percent(), 40);

        // A stale smaller count must not move the gauge backwards.
        gauge.update(10);
        assert_eq!(gauge.processed_bytes(), 40);
        assert_eq!(gauge.percent(), 40);

        gauge.update(100);
        assert!(gauge.is_complete());
        assert_eq!(gauge.percent(), 100);
    }

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(0), "0.00 B");
        assert_eq!(format_bytes(1023), "1023.00 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1024 * 1024), "1.00 MB");
    }
}
