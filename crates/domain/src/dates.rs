// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! ISO date parsing and calendar-month arithmetic.
//!
//! All dates in the planner are plain calendar dates (`time::Date`) in the
//! `yyyy-MM-dd` wire format. There is no time-of-day or timezone component.

use crate::error::DomainError;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, Month};

/// The `yyyy-MM-dd` format used on the wire and in filters.
pub const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Parses an ISO `yyyy-MM-dd` date supplied for `field`.
///
/// # Errors
///
/// Returns `DomainError::InvalidDate` if the value is not a valid calendar date
/// in the expected format.
pub fn parse_iso_date(field: &str, value: &str) -> Result<Date, DomainError> {
    Date::parse(value.trim(), ISO_DATE).map_err(|err| DomainError::InvalidDate {
        field: field.to_string(),
        value: value.to_string(),
        error: err.to_string(),
    })
}

/// Formats a date as `yyyy-MM-dd`.
#[must_use]
pub fn format_iso_date(date: Date) -> String {
    // The format only contains year/month/day components, which every Date has.
    date.format(ISO_DATE).unwrap_or_else(|_| date.to_string())
}

/// Returns the first day of the month containing `date`.
#[must_use]
pub fn first_day_of_month(date: Date) -> Date {
    date.replace_day(1).unwrap_or(date)
}

/// Returns the last day of the month containing `date`.
///
/// # Errors
///
/// Returns an error if the following month is outside the supported range.
pub fn last_day_of_month(date: Date) -> Result<Date, DomainError> {
    let next = first_day_of_next_month(date)?;
    next.previous_day()
        .ok_or_else(|| DomainError::DateArithmeticOverflow {
            operation: format!("finding the last day of the month of {date}"),
        })
}

/// Returns the first day of the month following the month containing `date`.
///
/// # Errors
///
/// Returns an error if the result is outside the supported date range.
pub fn first_day_of_next_month(date: Date) -> Result<Date, DomainError> {
    let (year, month) = match date.month() {
        Month::December => (date.year() + 1, Month::January),
        other => (date.year(), other.next()),
    };
    Date::from_calendar_date(year, month, 1).map_err(|_| DomainError::DateArithmeticOverflow {
        operation: format!("advancing past the month of {date}"),
    })
}

/// Returns the first and last day of the calendar month following `today`.
///
/// # Errors
///
/// Returns an error if the following month is outside the supported range.
pub fn next_month_span(today: Date) -> Result<(Date, Date), DomainError> {
    let start = first_day_of_next_month(today)?;
    let end = last_day_of_month(start)?;
    Ok((start, end))
}

/// Serde adapter for `yyyy-MM-dd` dates.
pub mod iso_date {
    use super::ISO_DATE;
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    /// Serializes a date as `yyyy-MM-dd`.
    ///
    /// # Errors
    ///
    /// Returns the serializer's error if formatting fails.
    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        let text = date.format(ISO_DATE).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }

    /// Deserializes a `yyyy-MM-dd` date.
    ///
    /// # Errors
    ///
    /// Returns the deserializer's error if the text is not a valid date.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let text = String::deserialize(deserializer)?;
        Date::parse(&text, ISO_DATE).map_err(serde::de::Error::custom)
    }

    /// Serde adapter for optional `yyyy-MM-dd` dates (`null` when absent).
    pub mod option {
        use super::ISO_DATE;
        use serde::{Deserialize, Deserializer, Serializer};
        use time::Date;

        /// Serializes an optional date.
        ///
        /// # Errors
        ///
        /// Returns the serializer's error if formatting fails.
        #[allow(clippy::ref_option)]
        pub fn serialize<S: Serializer>(
            date: &Option<Date>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match date {
                Some(date) => {
                    let text = date.format(ISO_DATE).map_err(serde::ser::Error::custom)?;
                    serializer.serialize_some(&text)
                }
                None => serializer.serialize_none(),
            }
        }

        /// Deserializes an optional date; `null` and `""` both mean absent.
        ///
        /// # Errors
        ///
        /// Returns the deserializer's error if the text is not a valid date.
        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Date>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(text) if !text.trim().is_empty() => Date::parse(text.trim(), ISO_DATE)
                    .map(Some)
                    .map_err(serde::de::Error::custom),
                _ => Ok(None),
            }
        }
    }
}
