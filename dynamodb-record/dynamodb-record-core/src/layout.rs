/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Text layouts for time fields.

use std::fmt;
use time::error::InvalidFormatDescription;
use time::format_description::well_known::{Iso8601, Rfc2822, Rfc3339};
use time::format_description::OwnedFormatItem;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

use crate::error::Error;

/// How a time value is written into and read back from a string attribute.
#[derive(Clone, Default)]
pub enum TimeLayout {
    /// RFC 3339, e.g. `2019-12-16T23:48:18Z`.
    #[default]
    Rfc3339,
    /// RFC 2822, e.g. `Mon, 16 Dec 2019 23:48:18 +0000`.
    Rfc2822,
    /// ISO 8601 in its default extended form.
    Iso8601,
    /// Whole seconds since the Unix epoch.
    UnixSeconds,
    /// A [`time` format description](https://time-rs.github.io/book/api/format-description.html).
    Custom {
        /// The description as written in the annotation.
        source: String,
        /// The compiled description.
        items: OwnedFormatItem,
    },
}

impl fmt::Debug for TimeLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeLayout::Rfc3339 => f.write_str("Rfc3339"),
            TimeLayout::Rfc2822 => f.write_str("Rfc2822"),
            TimeLayout::Iso8601 => f.write_str("Iso8601"),
            TimeLayout::UnixSeconds => f.write_str("UnixSeconds"),
            TimeLayout::Custom { source, .. } => f.debug_tuple("Custom").field(source).finish(),
        }
    }
}

impl PartialEq for TimeLayout {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TimeLayout::Custom { source: a, .. }, TimeLayout::Custom { source: b, .. }) => a == b,
            (a, b) => std::mem::discriminant(a) == std::mem::discriminant(b),
        }
    }
}

impl Eq for TimeLayout {}

impl TimeLayout {
    /// Compiles a layout annotation.
    ///
    /// The keywords `RFC3339`, `RFC2822`, `ISO8601` and `unix` are recognized regardless of case;
    /// anything else is compiled as a format description like `[year]-[month]-[day]`.
    pub fn compile(layout: &str) -> Result<Self, InvalidFormatDescription> {
        if layout.eq_ignore_ascii_case("rfc3339") {
            return Ok(TimeLayout::Rfc3339);
        }
        if layout.eq_ignore_ascii_case("rfc2822") {
            return Ok(TimeLayout::Rfc2822);
        }
        if layout.eq_ignore_ascii_case("iso8601") {
            return Ok(TimeLayout::Iso8601);
        }
        if layout.eq_ignore_ascii_case("unix") {
            return Ok(TimeLayout::UnixSeconds);
        }
        let items = time::format_description::parse_owned::<1>(layout)?;
        Ok(TimeLayout::Custom {
            source: layout.to_string(),
            items,
        })
    }

    /// Formats `value` with this layout.
    pub fn format(&self, value: &OffsetDateTime) -> Result<String, Error> {
        let formatted = match self {
            TimeLayout::Rfc3339 => value.format(&Rfc3339),
            TimeLayout::Rfc2822 => value.format(&Rfc2822),
            TimeLayout::Iso8601 => value.format(&Iso8601::DEFAULT),
            TimeLayout::UnixSeconds => return Ok(value.unix_timestamp().to_string()),
            TimeLayout::Custom { items, .. } => value.format(items),
        };
        formatted.map_err(|err| {
            Error::conversion(format!("cannot format time with layout {self:?}")).with_source(err)
        })
    }

    /// Parses `text` with this layout.
    ///
    /// Custom layouts without an offset are read as UTC, and layouts without a time of day
    /// are read as midnight.
    pub fn parse(&self, text: &str) -> Result<OffsetDateTime, Error> {
        let parsed = match self {
            TimeLayout::Rfc3339 => OffsetDateTime::parse(text, &Rfc3339),
            TimeLayout::Rfc2822 => OffsetDateTime::parse(text, &Rfc2822),
            TimeLayout::Iso8601 => OffsetDateTime::parse(text, &Iso8601::DEFAULT),
            TimeLayout::UnixSeconds => return parse_unix_seconds(text),
            TimeLayout::Custom { items, .. } => OffsetDateTime::parse(text, items)
                .or_else(|err| {
                    PrimitiveDateTime::parse(text, items)
                        .map(PrimitiveDateTime::assume_utc)
                        .map_err(|_| err)
                })
                .or_else(|err| {
                    Date::parse(text, items)
                        .map(|date| date.with_time(Time::MIDNIGHT).assume_utc())
                        .map_err(|_| err)
                }),
        };
        parsed.map_err(|err| {
            Error::conversion(format!("cannot parse `{text}` with layout {self:?}")).with_source(err)
        })
    }
}

pub(crate) fn parse_unix_seconds(text: &str) -> Result<OffsetDateTime, Error> {
    let seconds = crate::number::parse::<i64>(text, "unix timestamp")?;
    OffsetDateTime::from_unix_timestamp(seconds).map_err(|err| {
        Error::conversion(format!("`{seconds}` is outside the supported time range")).with_source(err)
    })
}
