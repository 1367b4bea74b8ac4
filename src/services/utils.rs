//! # utils.rs
//!
//! Enthält allgemeine Hilfsfunktionen, z.B. für Zeitstempel.

use chrono::{DateTime, Utc};

/// Returns the current timestamp in ISO 8601 format in UTC with microsecond precision.
///
/// All timestamps stored by this library (e.g. `RedemptionRecord::redeemed_at`,
/// `ExchangeRate::updated_at`) use this single canonical format so that string
/// comparison and parsing behave consistently.
///
/// # Returns
///
/// A string representing the timestamp in ISO 8601 format (YYYY-MM-DDTHH:MM:SS.ffffffZ).
pub fn get_current_timestamp() -> String {
    let now: DateTime<Utc> = Utc::now();
    // %Y-%m-%dT%H:%M:%S%.6fZ
    now.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use regex::Regex;

    use super::get_current_timestamp;

    // Helper function to parse the timestamp string and check basic format
    fn parse_and_validate_format(timestamp_str: &str) -> Result<DateTime<Utc>, String> {
        let re = Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d{6}Z$").unwrap();
        if !re.is_match(timestamp_str) {
            return Err(format!(
                "Timestamp '{}' does not match expected format YYYY-MM-DDTHH:MM:SS.ffffffZ",
                timestamp_str
            ));
        }

        DateTime::parse_from_rfc3339(timestamp_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| format!("Failed to parse timestamp '{}': {}", timestamp_str, e))
    }

    #[test]
    fn test_get_current_timestamp_format() {
        let timestamp = get_current_timestamp();
        println!("Current Timestamp: {}", timestamp);
        assert!(parse_and_validate_format(&timestamp).is_ok());
    }

    #[test]
    fn test_timestamps_are_monotonic_enough_for_ordering() {
        let first = get_current_timestamp();
        let second = get_current_timestamp();
        // String-Vergleich entspricht bei diesem Format dem Zeit-Vergleich.
        assert!(second >= first);
    }
}
