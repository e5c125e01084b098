use chrono::{DateTime, NaiveDate, Utc};

/// Axis label format for dates, e.g. `"Mar 2017"`.
pub const DATE_LABEL_FORMAT: &str = "%b %Y";

/// Format a count with thousands separators.
///
/// # Examples
///
/// ```
/// use timeline_core::formatting::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(999), "999");
/// assert_eq!(format_count(1234567), "1,234,567");
/// ```
pub fn format_count(value: usize) -> String {
    group_thousands(&value.to_string())
}

/// Format a calendar date as an axis label.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use timeline_core::formatting::format_date_label;
///
/// let d = NaiveDate::from_ymd_opt(2017, 3, 4).unwrap();
/// assert_eq!(format_date_label(d), "Mar 2017");
/// ```
pub fn format_date_label(date: NaiveDate) -> String {
    date.format(DATE_LABEL_FORMAT).to_string()
}

/// Format a timestamp for tabular previews, e.g. `"2017-03-04 12:00"`.
pub fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M").to_string()
}

/// Insert comma thousands separators into a string of ASCII digits.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    if len <= 3 {
        return digits.to_string();
    }
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
