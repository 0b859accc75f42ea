//! Calendar dates as the backend writes them.
//!
//! Dates arrive either as `yyyy-MM-dd` or as a full date-time whose time
//! part is irrelevant; empty strings and nulls mean "no date". Dates are
//! always sent back as `yyyy-MM-dd`.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serializer};

use monitoring_shared::constants::API_DATE_FORMAT;

pub fn parse(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, API_DATE_FORMAT).ok()
}

pub fn format(date: NaiveDate) -> String {
    date.format(API_DATE_FORMAT).to_string()
}

/// `#[serde(with = "crate::dates::optional")]` for `Option<NaiveDate>` fields.
pub mod optional {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => serializer.serialize_str(&format(*date)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => parse(text)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {text}"))),
        }
    }
}
