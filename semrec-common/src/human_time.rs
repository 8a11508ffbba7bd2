//! Human-readable elapsed time formatting
//!
//! Format is picked from the magnitude of the value:
//! - `X.XXs` below 100 seconds
//! - `M:SS.Xs` below 100 minutes
//! - `H:MM:SS` below 25 hours
//! - `Dd-H:MM:SS` from 25 hours on

use std::time::Duration;

const SHORT_FORMAT_MAX: u64 = 100;
const MEDIUM_FORMAT_MAX: u64 = 6000;
const LONG_FORMAT_MAX: u64 = 90000;

/// Format an elapsed duration for run summaries
///
/// # Examples
///
/// ```
/// use semrec_common::human_time::format_elapsed;
/// use std::time::Duration;
///
/// assert_eq!(format_elapsed(Duration::from_millis(4500)), "4.50s");
/// assert_eq!(format_elapsed(Duration::from_secs(330)), "5:30.0s");
/// assert_eq!(format_elapsed(Duration::from_secs(7261)), "2:01:01");
/// assert_eq!(format_elapsed(Duration::from_secs(93784)), "1d-2:03:04");
/// ```
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();

    if secs < SHORT_FORMAT_MAX {
        format!("{:.2}s", elapsed.as_secs_f64())
    } else if secs < MEDIUM_FORMAT_MAX {
        let minutes = secs / 60;
        let rem = elapsed.as_secs_f64() - (minutes * 60) as f64;
        format!("{}:{:04.1}s", minutes, rem)
    } else if secs < LONG_FORMAT_MAX {
        format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else {
        let days = secs / 86400;
        let rem = secs % 86400;
        format!(
            "{}d-{}:{:02}:{:02}",
            days,
            rem / 3600,
            (rem % 3600) / 60,
            rem % 60
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_format() {
        assert_eq!(format_elapsed(Duration::ZERO), "0.00s");
        assert_eq!(format_elapsed(Duration::from_millis(1250)), "1.25s");
        assert_eq!(format_elapsed(Duration::from_secs(99)), "99.00s");
    }

    #[test]
    fn test_medium_format() {
        assert_eq!(format_elapsed(Duration::from_secs(100)), "1:40.0s");
        assert_eq!(format_elapsed(Duration::from_secs(120)), "2:00.0s");
        assert_eq!(format_elapsed(Duration::from_secs(5999)), "99:59.0s");
    }

    #[test]
    fn test_long_format() {
        assert_eq!(format_elapsed(Duration::from_secs(6000)), "1:40:00");
        assert_eq!(format_elapsed(Duration::from_secs(3661 + 3600)), "2:01:01");
        assert_eq!(format_elapsed(Duration::from_secs(89999)), "24:59:59");
    }

    #[test]
    fn test_day_format() {
        assert_eq!(format_elapsed(Duration::from_secs(90000)), "1d-1:00:00");
        assert_eq!(format_elapsed(Duration::from_secs(604800)), "7d-0:00:00");
    }
}
