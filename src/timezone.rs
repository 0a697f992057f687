use std::fmt;

use chrono::{DateTime, Offset, TimeZone as _, Utc};
use chrono_tz::Tz;
use lazy_static::lazy_static;
use regex::Regex;
use time::{format_description::FormatItem, macros::format_description, Date, OffsetDateTime, UtcOffset};

use crate::error::Error;

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// An IANA timezone used to decide which calendar day an instant belongs to.
///
/// Day boundaries always follow the user's local calendar, never UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(Tz);

impl Timezone {
    #[cfg(test)]
    pub const UTC: Timezone = Timezone(Tz::UTC);

    /// Parses an IANA identifier such as `America/New_York`.
    pub fn parse(name: &str) -> Result<Self, Error> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Validation("timezone is required".into()));
        }
        name.parse::<Tz>()
            .map(Timezone)
            .map_err(|_| Error::InvalidTimezone(name.to_string()))
    }

    /// Like [`Timezone::parse`], for an optional request parameter.
    pub fn require(name: Option<&str>) -> Result<Self, Error> {
        Self::parse(name.unwrap_or_default())
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    fn offset_at(&self, instant: OffsetDateTime) -> UtcOffset {
        // offsets are whole seconds, so sub-second precision is irrelevant here
        let Some(utc) = DateTime::<Utc>::from_timestamp(instant.unix_timestamp(), 0) else {
            return UtcOffset::UTC;
        };
        let seconds = self
            .0
            .offset_from_utc_datetime(&utc.naive_utc())
            .fix()
            .local_minus_utc();
        UtcOffset::from_whole_seconds(seconds).unwrap_or(UtcOffset::UTC)
    }

    /// Wall-clock view of `instant` in this timezone.
    pub fn local(&self, instant: OffsetDateTime) -> OffsetDateTime {
        instant.to_offset(self.offset_at(instant))
    }

    /// Calendar date that `instant` falls on when observed in this timezone.
    pub fn date_of(&self, instant: OffsetDateTime) -> Date {
        self.local(instant).date()
    }

    /// Today's calendar date in this timezone.
    pub fn today(&self) -> Date {
        self.date_of(OffsetDateTime::now_utc())
    }

    pub fn is_today(&self, date: Date) -> bool {
        self.is_today_at(date, OffsetDateTime::now_utc())
    }

    /// Whether `date` is the local calendar day at instant `now`.
    pub fn is_today_at(&self, date: Date, now: OffsetDateTime) -> bool {
        self.date_of(now) == date
    }
}

impl fmt::Display for Timezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Formats a calendar date as `YYYY-MM-DD`.
pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

/// Parses a strict `YYYY-MM-DD` calendar date.
pub fn parse_date(text: &str) -> Result<Date, Error> {
    lazy_static! {
        static ref DATE_RE: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
    }
    if !DATE_RE.is_match(text) {
        return Err(Error::Validation(format!(
            "invalid date format {text:?}, use YYYY-MM-DD"
        )));
    }
    Date::parse(text, DATE_FORMAT)
        .map_err(|_| Error::Validation(format!("{text:?} is not a calendar date")))
}

/// serde adapter rendering [`Date`] as `YYYY-MM-DD`.
pub mod calendar_date {
    use serde::Serializer;
    use time::Date;

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_date(*date))
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};
        use time::Date;

        pub fn serialize<S: Serializer>(
            date: &Option<Date>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match date {
                Some(d) => serializer.serialize_some(&super::super::format_date(*d)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Date>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|text| super::super::parse_date(&text).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}
