use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use tracing::debug;

// ── TimestampProcessor ────────────────────────────────────────────────────────

/// Numeric timestamps above this magnitude are taken to be milliseconds.
const MILLIS_THRESHOLD: f64 = 1e11;
/// Numeric timestamps above this magnitude are taken to be microseconds.
const MICROS_THRESHOLD: f64 = 1e14;

/// Parses the `timestamp` and `datetime` cells of an input row.
pub struct TimestampProcessor;

impl TimestampProcessor {
    /// Attempt to parse a [`serde_json::Value`] into a UTC [`DateTime`].
    ///
    /// Handles:
    /// * `null`       → `None`
    /// * JSON string  → ISO 8601 / RFC 3339 (including `Z`-suffix) or common
    ///   date-time patterns.
    /// * JSON number  → Unix timestamp in seconds, milliseconds or
    ///   microseconds, picked by magnitude.
    pub fn parse(value: &Value) -> Option<DateTime<Utc>> {
        match value {
            Value::Null => None,
            Value::String(s) => Self::parse_str(s.as_str()),
            Value::Number(n) => Self::parse_epoch(n.as_f64()?),
            _ => None,
        }
    }

    fn parse_epoch(raw: f64) -> Option<DateTime<Utc>> {
        if !raw.is_finite() {
            return None;
        }
        let secs = if raw.abs() >= MICROS_THRESHOLD {
            raw / 1_000_000.0
        } else if raw.abs() >= MILLIS_THRESHOLD {
            raw / 1_000.0
        } else {
            raw
        };
        let whole = secs.floor();
        let nanos = ((secs - whole) * 1_000_000_000.0).round().min(999_999_999.0) as u32;
        DateTime::from_timestamp(whole as i64, nanos)
    }

    fn parse_str(s: &str) -> Option<DateTime<Utc>> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        let normalised = if let Some(stripped) = s.strip_suffix('Z') {
            format!("{}+00:00", stripped)
        } else {
            s.to_string()
        };

        if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
            return Some(dt.with_timezone(&Utc));
        }

        if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
            return Some(dt.with_timezone(&Utc));
        }

        const FORMATS: &[&str] = &[
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%d",
        ];

        for fmt in FORMATS {
            if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
                return Some(Utc.from_utc_datetime(&naive));
            }
            if let Ok(date) = chrono::NaiveDate::parse_from_str(s, fmt) {
                let naive = date.and_hms_opt(0, 0, 0)?;
                return Some(Utc.from_utc_datetime(&naive));
            }
        }

        // A numeric string such as "1488628800".
        if let Ok(raw) = s.parse::<f64>() {
            return Self::parse_epoch(raw);
        }

        debug!("could not parse timestamp string \"{}\"", s);
        None
    }
}

// ── CellExtractor ─────────────────────────────────────────────────────────────

/// Reads typed values out of the positional cells of a raw row.
pub struct CellExtractor;

impl CellExtractor {
    /// A required text cell. Only JSON strings are accepted.
    pub fn required_text(value: &Value) -> Option<String> {
        value.as_str().map(str::to_string)
    }

    /// An optional text cell; `null` and non-text values map to `None`.
    pub fn optional_text(value: &Value) -> Option<String> {
        Self::required_text(value)
    }
}
