//! Provides formatting helpers for durations as reported in log messages.
use std::fmt::Write;
use std::time::Duration;

/// Lists the units used by [format_duration](format_duration) along with their size in millis.
const UNITS: [(&str, u128); 5] = [
    ("d", 1000 * 60 * 60 * 24),
    ("h", 1000 * 60 * 60),
    ("m", 1000 * 60),
    ("s", 1000),
    ("ms", 1),
];

/// Formats a duration into a string like "5d 3h 17m 2s 12ms".
///
/// As the format indicates this is mostly used for TTLs which rather run in seconds or minutes
/// than several days. Units which would be zero are skipped entirely, an empty duration is
/// reported as "0ms".
///
/// # Examples
///
/// ```
/// # use std::time::Duration;
/// assert_eq!(memocache::fmt::format_duration(Duration::ZERO), "0ms");
/// assert_eq!(memocache::fmt::format_duration(Duration::from_millis(13)), "13ms");
/// assert_eq!(memocache::fmt::format_duration(Duration::from_millis(1013)), "1s 13ms");
/// assert_eq!(memocache::fmt::format_duration(Duration::from_millis(62_013)), "1m 2s 13ms");
/// assert_eq!(memocache::fmt::format_duration(Duration::from_secs(60 * 61)), "1h 1m");
/// assert_eq!(memocache::fmt::format_duration(Duration::from_secs(4 * 60 * 60)), "4h");
/// assert_eq!(memocache::fmt::format_duration(Duration::from_secs(24 * 60 * 60 + 60 * 60 + 59)), "1d 1h 59s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let mut result = String::new();

    let mut value = duration.as_millis();
    for (unit, millis) in UNITS {
        let amount = value / millis;
        if amount > 0 {
            if !result.is_empty() {
                result.push(' ');
            }
            let _ = write!(result, "{}{}", amount, unit);
            value %= millis;
        }
    }

    if result.is_empty() {
        result.push_str("0ms");
    }

    result
}

#[cfg(test)]
mod tests {
    use crate::fmt::format_duration;
    use std::time::Duration;

    #[test]
    fn sub_millisecond_durations_are_reported_as_zero() {
        assert_eq!(format_duration(Duration::from_micros(999)), "0ms");
    }

    #[test]
    fn long_ttls_are_formatted() {
        assert_eq!(
            format_duration(Duration::from_secs(3 * 24 * 60 * 60 + 17 * 60 + 2)),
            "3d 17m 2s"
        );
    }
}
