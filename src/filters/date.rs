use chrono::{DateTime, TimeZone, Utc};

/// Format an instant as `yyyy-MM-dd` in UTC.
///
/// The input's own offset is irrelevant: two values denoting the same
/// instant always format identically, whatever the process timezone.
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>) -> String {
    date.with_timezone(&Utc).format("%Y-%m-%d").to_string()
}

/// RFC 2822 timestamp in UTC, as RSS `pubDate` expects.
pub fn format_rfc2822<Tz: TimeZone>(date: &DateTime<Tz>) -> String {
    date.with_timezone(&Utc).to_rfc2822()
}
