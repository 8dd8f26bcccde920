//! Column codecs shared by the repositories.

use std::str::FromStr;

use chrono::SecondsFormat;
use labhub_domain::time::Timestamp;

/// Fixed-width RFC 3339 so that text ordering matches time ordering.
pub(crate) fn encode_timestamp(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode_timestamp(raw: &str) -> Result<Timestamp, sqlx::Error> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.to_utc())
        .map_err(|err| sqlx::Error::Decode(Box::new(err)))
}

/// Parse any `FromStr` column, reporting failures as decode errors.
pub(crate) fn decode<T>(raw: &str) -> Result<T, sqlx::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    T::from_str(raw).map_err(|err| sqlx::Error::Decode(Box::new(err)))
}
