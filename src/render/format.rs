//! Number, percentage and timestamp formatting shared by both renderers.
//!
//! Dates are shown in en-US short form. Timestamps carrying a `Z` or an
//! offset are converted to the local zone; naive timestamps are already
//! local and are shown as written.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

/// Fixed-point rendering that rounds the exact decimal value of `value`,
/// ties away from zero. `2.675` is stored as `2.67499...` and gives `2.67`.
/// Magnitudes of `1e21` and above fall back to exponent form.
pub fn to_fixed(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return if value.is_nan() {
            "NaN".to_string()
        } else if value > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        };
    }
    if value.abs() >= 1e21 {
        return exponent_form(value);
    }

    // Every finite f64 has a terminating expansion within 1074 fractional digits.
    let exact = format!("{:.*}", digits.max(1074), value.abs());
    let (int_part, frac) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let mut kept: Vec<u8> = int_part
        .bytes()
        .chain(frac.bytes().take(digits))
        .collect();
    if frac.as_bytes().get(digits).is_some_and(|d| *d >= b'5') {
        round_up(&mut kept);
    }

    let int_len = kept.len() - digits;
    let mut out = String::with_capacity(kept.len() + 2);
    // Avoid "-0.00".
    if value < 0.0 && kept.iter().any(|d| *d != b'0') {
        out.push('-');
    }
    out.extend(kept[..int_len].iter().map(|d| *d as char));
    if digits > 0 {
        out.push('.');
        out.extend(kept[int_len..].iter().map(|d| *d as char));
    }
    out
}

/// Add one unit in the last place of a decimal digit string.
fn round_up(digits: &mut Vec<u8>) {
    for d in digits.iter_mut().rev() {
        if *d == b'9' {
            *d = b'0';
        } else {
            *d += 1;
            return;
        }
    }
    digits.insert(0, b'1');
}

/// `1e+21`, `-2.5e+22`
fn exponent_form(value: f64) -> String {
    let s = format!("{value:e}");
    match s.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => s,
    }
}

/// `$` followed by the amount to two decimals.
pub fn money(value: f64) -> String {
    format!("${}", to_fixed(value, 2))
}

/// Plain number the way a JSON value prints: `3`, `2.5`.
pub fn plain_number(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        format!("{value}")
    }
}

/// Clamp a percentage to the drawable range [0, 100].
pub fn clamp_pct(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// Parse the timestamp forms the service is known to emit.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

const INVALID_DATE: &str = "Invalid Date";

/// `Jan 15`
pub fn short_date(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|dt| dt.format("%b %-d").to_string())
        .unwrap_or_else(|| INVALID_DATE.to_string())
}

/// `Jan 15, 02:00 PM`. Missing timestamps are invalid dates.
pub fn short_date_time(raw: Option<&str>) -> String {
    raw.and_then(parse_timestamp)
        .map(|dt| dt.format("%b %-d, %I:%M %p").to_string())
        .unwrap_or_else(|| INVALID_DATE.to_string())
}

/// `02:30 PM`
pub fn clock_time(raw: &str) -> Option<String> {
    parse_timestamp(raw).map(|dt| dt.format("%I:%M %p").to_string())
}

/// `2:30:05 PM`, used for "Analysis completed at".
pub fn completed_time(at: &DateTime<Local>) -> String {
    at.format("%-I:%M:%S %p").to_string()
}

/// First `n` characters of `s`.
pub fn take_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn to_fixed_rounds_half_away_from_zero() {
        assert_eq!(to_fixed(123.4, 2), "123.40");
        assert_eq!(to_fixed(0.0, 2), "0.00");
        assert_eq!(to_fixed(74.5, 0), "75");
        assert_eq!(to_fixed(2.25, 1), "2.3");
        assert_eq!(to_fixed(0.125, 2), "0.13");
        assert_eq!(to_fixed(-2.5, 0), "-3");
        assert_eq!(to_fixed(-0.0001, 2), "0.00");
        assert_eq!(to_fixed(f64::NAN, 2), "NaN");
    }

    #[test]
    fn to_fixed_uses_the_stored_binary_value() {
        // Both literals sit just below the tie once stored as f64.
        assert_eq!(to_fixed(2.675, 2), "2.67");
        assert_eq!(to_fixed(1.45, 1), "1.4");
        assert_eq!(money(1.005), "$1.00");
    }

    #[test]
    fn to_fixed_carries_through_nines() {
        assert_eq!(to_fixed(9.995, 2), "9.99");
        assert_eq!(to_fixed(9.9951, 2), "10.00");
        assert_eq!(to_fixed(99.5, 0), "100");
        assert_eq!(to_fixed(0.96, 1), "1.0");
    }

    #[test]
    fn to_fixed_huge_values_use_exponent_form() {
        assert_eq!(to_fixed(1e21, 2), "1e+21");
        assert_eq!(to_fixed(-2.5e22, 2), "-2.5e+22");
        assert_eq!(to_fixed(1e20, 0), "100000000000000000000");
    }

    #[test]
    fn money_prefixes_dollar() {
        assert_eq!(money(123.4), "$123.40");
        assert_eq!(money(0.0), "$0.00");
        assert_eq!(money(1234.567), "$1234.57");
    }

    #[test]
    fn plain_number_matches_json_text() {
        assert_eq!(plain_number(3.0), "3");
        assert_eq!(plain_number(2.5), "2.5");
        assert_eq!(plain_number(-0.0), "0");
    }

    #[test]
    fn clamp_pct_bounds() {
        assert_eq!(clamp_pct(150.0), 100.0);
        assert_eq!(clamp_pct(-5.0), 0.0);
        assert_eq!(clamp_pct(42.5), 42.5);
        assert_eq!(clamp_pct(f64::NAN), 0.0);
    }

    #[test]
    fn parses_common_timestamp_forms() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2024-01-15T14:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15 14:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15T14:30:00.000"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15T14:30"), Some(expected));
        assert!(parse_timestamp("2024-01-15").is_some());
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn offset_timestamps_convert_to_local_time() {
        let utc = parse_timestamp("2024-01-15T14:30:00Z").unwrap();
        let shifted = parse_timestamp("2024-01-15T16:30:00+02:00").unwrap();
        assert_eq!(utc, shifted);

        let expected = Utc
            .with_ymd_and_hms(2024, 1, 15, 14, 30, 0)
            .unwrap()
            .with_timezone(&Local)
            .naive_local();
        assert_eq!(utc, expected);
    }

    #[test]
    fn date_formats() {
        assert_eq!(short_date("2024-01-05"), "Jan 5");
        assert_eq!(short_date("garbage"), "Invalid Date");
        assert_eq!(short_date_time(Some("2024-03-09T14:05:00")), "Mar 9, 02:05 PM");
        assert_eq!(short_date_time(Some("2024-03-09T09:00:00")), "Mar 9, 09:00 AM");
        assert_eq!(short_date_time(None), "Invalid Date");
        assert_eq!(clock_time("2024-01-15T14:30:00").as_deref(), Some("02:30 PM"));
        assert_eq!(clock_time("nope"), None);
    }

    #[test]
    fn completed_time_has_no_leading_zero() {
        let at = Local.with_ymd_and_hms(2024, 1, 15, 9, 5, 7).unwrap();
        assert_eq!(completed_time(&at), "9:05:07 AM");
    }

    #[test]
    fn take_chars_is_char_based() {
        assert_eq!(take_chars("Monday", 3), "Mon");
        assert_eq!(take_chars("Mo", 3), "Mo");
        assert_eq!(take_chars("Ünter", 3), "Ünt");
    }
}
