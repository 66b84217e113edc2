/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The wire representation of DynamoDB attribute values.

use aws_smithy_types::Blob;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A DynamoDB item: attribute names mapped to their values.
pub type Item = HashMap<String, AttrValue>;

/// A single DynamoDB attribute value.
///
/// This mirrors the subset of the DynamoDB attribute encoding produced and consumed by the
/// [`Mapper`](crate::Mapper). Numbers are carried as their decimal text, exactly as they travel
/// on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// A string.
    S(String),
    /// A number, as decimal text without exponent.
    N(String),
    /// Raw binary data.
    B(Blob),
    /// A boolean.
    Bool(bool),
    /// An ordered list of values.
    L(Vec<AttrValue>),
    /// A nested map of values.
    M(Item),
    /// A set of distinct strings.
    Ss(BTreeSet<String>),
}

impl AttrValue {
    /// Returns the [`WireKind`] of this value.
    pub fn kind(&self) -> WireKind {
        match self {
            AttrValue::S(_) => WireKind::S,
            AttrValue::N(_) => WireKind::N,
            AttrValue::B(_) => WireKind::B,
            AttrValue::Bool(_) => WireKind::Bool,
            AttrValue::L(_) => WireKind::L,
            AttrValue::M(_) => WireKind::M,
            AttrValue::Ss(_) => WireKind::Ss,
        }
    }

    /// Returns the DynamoDB type descriptor of this value, e.g. `"S"` or `"BOOL"`.
    pub fn type_name(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Returns the string if this is an `S` value.
    pub fn as_s(&self) -> Option<&str> {
        match self {
            AttrValue::S(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the number text if this is an `N` value.
    pub fn as_n(&self) -> Option<&str> {
        match self {
            AttrValue::N(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the blob if this is a `B` value.
    pub fn as_b(&self) -> Option<&Blob> {
        match self {
            AttrValue::B(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the boolean if this is a `BOOL` value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the elements if this is an `L` value.
    pub fn as_l(&self) -> Option<&[AttrValue]> {
        match self {
            AttrValue::L(l) => Some(l),
            _ => None,
        }
    }

    /// Returns the nested item if this is an `M` value.
    pub fn as_m(&self) -> Option<&Item> {
        match self {
            AttrValue::M(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the strings if this is an `SS` value.
    pub fn as_ss(&self) -> Option<&BTreeSet<String>> {
        match self {
            AttrValue::Ss(ss) => Some(ss),
            _ => None,
        }
    }
}

/// The wire kind a field is encoded as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireKind {
    /// String (`S`)
    S,
    /// Number (`N`)
    N,
    /// Binary (`B`)
    B,
    /// Boolean (`BOOL`)
    Bool,
    /// List (`L`)
    L,
    /// Map (`M`)
    M,
    /// String set (`SS`)
    Ss,
}

impl WireKind {
    /// Returns the DynamoDB type descriptor for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            WireKind::S => "S",
            WireKind::N => "N",
            WireKind::B => "B",
            WireKind::Bool => "BOOL",
            WireKind::L => "L",
            WireKind::M => "M",
            WireKind::Ss => "SS",
        }
    }
}

impl fmt::Display for WireKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WireKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "S" => WireKind::S,
            "N" => WireKind::N,
            "B" => WireKind::B,
            "BOOL" => WireKind::Bool,
            "L" => WireKind::L,
            "M" => WireKind::M,
            "SS" => WireKind::Ss,
            other => {
                return Err(Error::conversion(format!(
                    "`{other}` is not a supported attribute type (expected one of S, N, B, BOOL, L, M, SS)"
                )))
            }
        })
    }
}
