/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Tag-driven mapping between Rust structs and DynamoDB items.
//!
//! Derive [`Record`](macro@Record) on a struct, annotate its fields with `#[dynamo(...)]`, and
//! use a [`Mapper`] to convert between the struct and an [`Item`].
//!
//! ```ignore
//! use dynamodb_record::{Mapper, Record};
//!
//! #[derive(Record)]
//! pub struct Person {
//!     #[dynamo(attr = "PK", fmt = "Team#{team}#Person#{}", idx = "primary")]
//!     pub name: String,
//!     #[dynamo(attr = "SK", idx = "primary")]
//!     pub team: String,
//!     #[dynamo(prec = 2)]
//!     pub score: f64,
//! }
//!
//! let mapper = Mapper::default();
//! let person = Person { name: "bar".into(), team: "foo".into(), score: 33.234 };
//!
//! let item = mapper.marshal(&person)?;
//! // PK = S("Team#foo#Person#bar"), SK = S("foo"), score = N("33.23")
//! let key = mapper.primary_key(&person)?;
//! // PK and SK only
//! let back: Person = mapper.from_item(&item)?;
//! ```
//!
//! See [`dynamodb_record_core`] for the full list of annotations.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub use dynamodb_record_core::*;
pub use dynamodb_record_macros::Record;
