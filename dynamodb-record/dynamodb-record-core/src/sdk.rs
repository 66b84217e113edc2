/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Conversions to and from the AWS SDK for DynamoDB attribute values.

use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashMap;

use crate::error::Error;
use crate::value::{AttrValue, Item};

// Helper to get type name from AttributeValue
fn attribute_type_name(av: &AttributeValue) -> &'static str {
    match av {
        AttributeValue::S(_) => "S",
        AttributeValue::N(_) => "N",
        AttributeValue::B(_) => "B",
        AttributeValue::Ss(_) => "SS",
        AttributeValue::Ns(_) => "NS",
        AttributeValue::Bs(_) => "BS",
        AttributeValue::M(_) => "M",
        AttributeValue::L(_) => "L",
        AttributeValue::Null(_) => "NULL",
        AttributeValue::Bool(_) => "BOOL",
        _ => "Unknown",
    }
}

impl From<AttrValue> for AttributeValue {
    fn from(value: AttrValue) -> Self {
        match value {
            AttrValue::S(s) => AttributeValue::S(s),
            AttrValue::N(n) => AttributeValue::N(n),
            AttrValue::B(b) => AttributeValue::B(b),
            AttrValue::Bool(b) => AttributeValue::Bool(b),
            AttrValue::L(l) => AttributeValue::L(l.into_iter().map(Into::into).collect()),
            AttrValue::M(m) => AttributeValue::M(into_sdk_item(m)),
            AttrValue::Ss(ss) => AttributeValue::Ss(ss.into_iter().collect()),
        }
    }
}

/// `NS`, `BS` and `NULL` values have no [`AttrValue`] counterpart and are rejected.
impl TryFrom<AttributeValue> for AttrValue {
    type Error = Error;

    fn try_from(value: AttributeValue) -> Result<Self, Self::Error> {
        Ok(match value {
            AttributeValue::S(s) => AttrValue::S(s),
            AttributeValue::N(n) => AttrValue::N(n),
            AttributeValue::B(b) => AttrValue::B(b),
            AttributeValue::Bool(b) => AttrValue::Bool(b),
            AttributeValue::L(l) => AttrValue::L(
                l.into_iter()
                    .enumerate()
                    .map(|(index, value)| {
                        AttrValue::try_from(value).map_err(|err| err.with_attribute(index.to_string()))
                    })
                    .collect::<Result<_, _>>()?,
            ),
            AttributeValue::M(m) => AttrValue::M(from_sdk_item(m)?),
            AttributeValue::Ss(ss) => AttrValue::Ss(ss.into_iter().collect()),
            other => {
                return Err(Error::invalid_type(
                    "one of S, N, B, BOOL, L, M, SS",
                    attribute_type_name(&other),
                ))
            }
        })
    }
}

/// Converts an item into the SDK's representation.
pub fn into_sdk_item(item: Item) -> HashMap<String, AttributeValue> {
    item.into_iter()
        .map(|(name, value)| (name, value.into()))
        .collect()
}

/// Converts an item returned by the SDK, naming the attribute that could not be converted.
pub fn from_sdk_item(item: HashMap<String, AttributeValue>) -> Result<Item, Error> {
    item.into_iter()
        .map(|(name, value)| match AttrValue::try_from(value) {
            Ok(value) => Ok((name, value)),
            Err(err) => Err(err.with_attribute(name)),
        })
        .collect()
}
