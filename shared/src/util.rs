use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Current UTC calendar date
pub fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

/// UTC calendar date of an epoch-millis timestamp
pub fn millis_to_date(millis: i64) -> Option<NaiveDate> {
    chrono::DateTime::from_timestamp_millis(millis).map(|dt| dt.date_naive())
}

/// Distinguish an absent field from an explicit `null` in patch payloads.
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`:
/// absent → `None`, `null` → `Some(None)`, value → `Some(Some(v))`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
