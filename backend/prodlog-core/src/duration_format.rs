// src/duration_format.rs
use chrono::Duration;
use once_cell::sync::Lazy;
use regex::Regex;

// "H:MM:SS", "HH:MM:SS.ffffff" or "N days HH:MM:SS", as a spreadsheet export writes them
static DURATION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\d+)\s*days?,?\s+)?(\d+):([0-5]?\d):([0-5]?\d)(?:\.(\d{1,9}))?$")
        .expect("duration pattern is a valid regex")
});

const SECONDS_PER_HOUR: i64 = 3600;
const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;

/// Renders a duration as zero-padded `HH:MM:SS`.
///
/// Sub-second precision is truncated, never rounded. Hours are not wrapped
/// at 24, so a month of work reads e.g. `152:07:13`. Negative values get a
/// leading `-` in front of the formatted magnitude.
pub fn format_duration(duration: Duration) -> String {
    if duration < Duration::zero() {
        return format!("-{}", format_seconds((-duration).num_seconds().unsigned_abs()));
    }
    format_seconds(duration.num_seconds().unsigned_abs())
}

fn format_seconds(total_seconds: u64) -> String {
    let hours = total_seconds / SECONDS_PER_HOUR as u64;
    let remainder = total_seconds % SECONDS_PER_HOUR as u64;
    format!("{:02}:{:02}:{:02}", hours, remainder / 60, remainder % 60)
}

/// Parses duration text as found in the UPT / Expected Time columns.
///
/// Returns `None` for anything that isn't a non-negative time span; callers
/// treat that as a missing value rather than an error.
pub fn parse_duration(text: &str) -> Option<Duration> {
    let captures = DURATION_PATTERN.captures(text.trim())?;

    let number = |index: usize| -> Option<i64> {
        match captures.get(index) {
            Some(m) => m.as_str().parse::<i64>().ok(),
            None => Some(0),
        }
    };

    let days = number(1)?;
    let hours = number(2)?;
    let minutes = number(3)?;
    let seconds = number(4)?;

    let total_seconds = days
        .checked_mul(SECONDS_PER_DAY)?
        .checked_add(hours.checked_mul(SECONDS_PER_HOUR)?)?
        .checked_add(minutes * 60 + seconds)?;

    // Fraction digits are left-aligned: ".5" is half a second
    let nanos = match captures.get(5) {
        Some(fraction) => {
            let digits = fraction.as_str();
            let padded = format!("{:0<9}", digits);
            padded.parse::<i64>().ok()?
        }
        None => 0,
    };

    Duration::try_seconds(total_seconds)?.checked_add(&Duration::nanoseconds(nanos))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_zero_padded_hours_minutes_seconds() {
        assert_eq!(format_duration(Duration::seconds(277)), "00:04:37");
        assert_eq!(format_duration(Duration::zero()), "00:00:00");
        assert_eq!(format_duration(Duration::hours(2) + Duration::minutes(20)), "02:20:00");
    }

    #[test]
    fn hours_do_not_wrap_at_a_day() {
        let duration = Duration::hours(152) + Duration::minutes(7) + Duration::seconds(13);
        assert_eq!(format_duration(duration), "152:07:13");
    }

    #[test]
    fn sub_second_precision_is_truncated_not_rounded() {
        let duration = Duration::seconds(59) + Duration::milliseconds(999);
        assert_eq!(format_duration(duration), "00:00:59");
    }

    #[test]
    fn negative_durations_prefix_sign_to_magnitude() {
        assert_eq!(format_duration(Duration::seconds(-23)), "-00:00:23");
        assert_eq!(
            format_duration(-(Duration::hours(1) + Duration::seconds(5))),
            "-01:00:05"
        );
    }

    #[test]
    fn negative_sub_second_difference_keeps_its_sign() {
        assert_eq!(format_duration(Duration::milliseconds(-400)), "-00:00:00");
        assert_eq!(format_duration(Duration::milliseconds(-1600)), "-00:00:01");
        assert_eq!(format_duration(Duration::milliseconds(400)), "00:00:00");
    }

    #[test]
    fn parses_single_digit_hours() {
        assert_eq!(parse_duration("0:04:37"), Some(Duration::seconds(277)));
        assert_eq!(parse_duration(" 01:15:00 "), Some(Duration::minutes(75)));
    }

    #[test]
    fn parses_day_prefix_and_fraction() {
        assert_eq!(
            parse_duration("1 days 00:00:30"),
            Some(Duration::days(1) + Duration::seconds(30))
        );
        assert_eq!(
            parse_duration("0 days 00:00:01.5"),
            Some(Duration::seconds(1) + Duration::milliseconds(500))
        );
    }

    #[test]
    fn rejects_garbage_and_negative_spans() {
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("nan"), None);
        assert_eq!(parse_duration("NaT"), None);
        assert_eq!(parse_duration("-0:01:00"), None);
        assert_eq!(parse_duration("0:75:00"), None);
        assert_eq!(parse_duration("12:00"), None);
    }

    #[test]
    fn parse_then_format_is_identity_for_padded_text() {
        for text in ["00:00:00", "00:04:37", "02:20:00", "23:59:59", "100:00:01"] {
            let parsed = parse_duration(text).unwrap();
            assert_eq!(format_duration(parsed), text, "round trip of {}", text);
        }
    }

    #[test]
    fn parse_then_format_drops_fraction() {
        let parsed = parse_duration("00:10:05.987654").unwrap();
        assert_eq!(format_duration(parsed), "00:10:05");
    }
}
