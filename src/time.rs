use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

/// Current UTC time at millisecond precision, the resolution timestamps are stored with
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// RFC 3339 with a `Z` suffix; fractional seconds only when non-zero
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Whole seconds between `start` and `stop`, rounding halves up.
///
/// A `stop` before `start` gives a negative count.
pub fn elapsed_seconds(start: &DateTime<Utc>, stop: &DateTime<Utc>) -> i64 {
    let millis = (*stop - *start).num_milliseconds();

    (millis + 500).div_euclid(1000)
}

pub fn seconds_to_string(seconds: i64) -> String {
    if seconds == 0 {
        return "0s".to_string();
    }

    let mut time_str = String::new();
    if seconds < 0 {
        time_str.push('-');
    }
    let seconds = seconds.unsigned_abs();

    let hours = seconds / 3600;
    if hours > 0 {
        time_str += &format!("{}h", hours);
    }
    let minutes = seconds % 3600 / 60;
    if minutes > 0 {
        time_str += &format!("{}m", minutes);
    }
    let seconds = seconds % 60;
    if seconds > 0 {
        time_str += &format!("{}s", seconds);
    }

    time_str
}

/// Serde adapter writing timestamps through [`format_timestamp`]
pub mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;

        DateTime::parse_from_rfc3339(&raw)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
