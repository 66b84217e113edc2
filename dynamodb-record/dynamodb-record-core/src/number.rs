/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Canonical decimal text for DynamoDB numbers.
//!
//! DynamoDB numbers travel as strings. They never use exponential notation and carry no
//! insignificant trailing zeros.

use std::fmt::Display;
use std::str::FromStr;

use crate::error::Error;

/// Default number of fractional digits used when marshalling floating point fields.
pub const DEFAULT_FLOAT_PRECISION: usize = 14;

/// Formats a floating point value as canonical decimal text.
///
/// With a precision the value is rounded to that many fractional digits before trimming;
/// without one the shortest text that parses back to the same value is used.
pub(crate) fn format_float<F>(
    value: F,
    finite: bool,
    precision: Option<usize>,
) -> Result<String, Error>
where
    F: Display,
{
    if !finite {
        return Err(Error::conversion(format!(
            "`{value}` cannot be represented as a DynamoDB number"
        )));
    }
    let text = match precision {
        Some(precision) => format!("{value:.precision$}"),
        None => value.to_string(),
    };
    Ok(trim_fraction(text))
}

fn trim_fraction(mut text: String) -> String {
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    if text == "-0" {
        text.remove(0);
    }
    text
}

/// Parses decimal text into `T`, reporting the target type on failure.
pub(crate) fn parse<T>(text: &str, type_name: &'static str) -> Result<T, Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    text.parse::<T>().map_err(|err| {
        Error::conversion(format!("cannot parse `{text}` as {type_name}")).with_source(err)
    })
}
