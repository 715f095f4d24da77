use chrono::{DateTime, Utc};

/// Compact stat value, e.g. 950 -> "950", 1234 -> "1.2K", 3_400_000 -> "3.4M".
pub fn compact_number(value: f64) -> String {
    const UNITS: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];
    let abs = value.abs();
    for (scale, suffix) in UNITS {
        if abs >= scale {
            return format!("{}{suffix}", trim_decimal(value / scale));
        }
    }
    trim_decimal(value)
}

fn trim_decimal(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        format!("{rounded:.1}")
    }
}

/// Relative age such as "3 days ago" or "just now".
pub fn relative_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = now.signed_duration_since(then).num_seconds();
    if secs < 60 {
        return "just now".to_string();
    }
    let (amount, unit) = match secs {
        s if s < 3600 => (s / 60, "minute"),
        s if s < 86_400 => (s / 3600, "hour"),
        s if s < 30 * 86_400 => (s / 86_400, "day"),
        s if s < 365 * 86_400 => (s / (30 * 86_400), "month"),
        s => (s / (365 * 86_400), "year"),
    };
    let plural = if amount == 1 { "" } else { "s" };
    format!("{amount} {unit}{plural} ago")
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    #[test]
    fn compact_number_suffixes() {
        assert_eq!(compact_number(950.0), "950");
        assert_eq!(compact_number(1234.0), "1.2K");
        assert_eq!(compact_number(3_400_000.0), "3.4M");
        assert_eq!(compact_number(2_000_000_000.0), "2B");
        assert_eq!(compact_number(12.345), "12.3");
    }

    #[test]
    fn relative_age_buckets() {
        let now = Utc::now();
        assert_eq!(relative_age(now - TimeDelta::seconds(5), now), "just now");
        assert_eq!(relative_age(now - TimeDelta::minutes(1), now), "1 minute ago");
        assert_eq!(relative_age(now - TimeDelta::hours(5), now), "5 hours ago");
        assert_eq!(relative_age(now - TimeDelta::days(3), now), "3 days ago");
        assert_eq!(relative_age(now - TimeDelta::days(400), now), "1 year ago");
    }
}
