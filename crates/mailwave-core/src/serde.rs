// Module name shadows the `serde` crate — use `::serde` for the external crate.
use ::serde::Serializer;
use chrono::{DateTime, SecondsFormat, Utc};

/// Serialize `DateTime<Utc>` as RFC 3339 with exactly three fractional-second
/// digits (`2026-08-11T11:09:00.000Z`). Send records and tracking timestamps
/// use this via `#[serde(serialize_with)]` so consumers of the content-store
/// PATCH payload see one stable timestamp shape.
pub fn to_rfc3339_ms<S>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}
