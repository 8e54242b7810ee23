use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{borrow::Borrow, fmt};
use thiserror::Error as ThisError;

#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum RefError {
    #[error("Does not match as {ref_type}: {input}")]
    BadFormat {
        ref_type: &'static str,
        input: String,
    },
    #[error("Not a calendar date: {0}")]
    BadDate(String),
}

/// Stable identity of a message author or mention target.
///
/// Any string is accepted, including empty ones. An id that does not look like
/// a snowflake is still its own identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct AuthorId(String);

impl AuthorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for AuthorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for AuthorId {
    fn from(value: String) -> Self {
        AuthorId(value)
    }
}

impl From<&str> for AuthorId {
    fn from(value: &str) -> Self {
        AuthorId(value.to_string())
    }
}

impl From<&AuthorId> for String {
    fn from(value: &AuthorId) -> String {
        value.0.clone()
    }
}

impl Borrow<str> for AuthorId {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

/// Map key for a reaction emoji.
///
/// The name is the identity whenever it is non-blank, otherwise the id is. Keeping
/// the rule in one normalized value means `Eq`, `Hash` and `Ord` always agree.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub enum EmojiKey {
    Name(String),
    Id(String),
}

impl EmojiKey {
    pub fn from_parts(id: Option<&str>, name: Option<&str>) -> Self {
        match name.map(str::trim) {
            Some(name) if !name.is_empty() => EmojiKey::Name(name.to_string()),
            _ => EmojiKey::Id(id.map(str::trim).unwrap_or_default().to_string()),
        }
    }
}

impl From<EmojiKey> for String {
    fn from(value: EmojiKey) -> String {
        value.to_string()
    }
}

impl fmt::Display for EmojiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmojiKey::Name(name) => f.write_str(name),
            EmojiKey::Id(id) => write!(f, "id:{}", id),
        }
    }
}

pub fn date_prefix_regex() -> &'static Regex {
    lazy_static! {
        static ref RE: Regex =
            Regex::new(r"^(?P<year>[0-9]{4})-(?P<month>[0-9]{2})-(?P<day>[0-9]{2})").unwrap();
    }
    &*RE
}

// "timestamp": "2018-10-18T08:52:29.781+00:00"
pub fn parse_message_date(timestamp: &str) -> Result<NaiveDate, RefError> {
    let caps = date_prefix_regex()
        .captures(timestamp)
        .ok_or_else(|| RefError::BadFormat {
            ref_type: "Date",
            input: timestamp.to_string(),
        })?;

    // the regex only lets ascii digits through
    let year: i32 = caps["year"].parse().unwrap_or_default();
    let month: u32 = caps["month"].parse().unwrap_or_default();
    let day: u32 = caps["day"].parse().unwrap_or_default();

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| RefError::BadDate(caps[0].to_string()))
}

/// Renders a date as `d.m.yyyy` without zero padding, e.g. `18.10.2018`.
pub fn format_day_month_year(date: &NaiveDate) -> String {
    date.format("%-d.%-m.%Y").to_string()
}
