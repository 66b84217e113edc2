/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Core types for mapping annotated Rust structs to DynamoDB items.
//!
//! This crate provides:
//!
//! - [`Record`] and [`FieldValue`] - field introspection, normally derived with `#[derive(Record)]`
//! - [`RecordDescriptor`] - per-field metadata compiled once per record type from its annotations
//! - [`Template`] - format templates like `Person#{}` that render into and parse from strings
//! - [`Mapper`] - marshalling, unmarshalling and key derivation
//! - [`AttrValue`] and [`Item`] - the wire representation, convertible to the AWS SDK's types
//!   with the `sdk` feature
//!
//! # Annotations
//!
//! | key (default) | meaning |
//! |---|---|
//! | `attr` | attribute name; `-` excludes the field |
//! | `type` | wire kind: `S`, `N`, `B`, `BOOL`, `L`, `M` or `SS` |
//! | `fmt` | format template, e.g. `Team#{team}#Person#{}` |
//! | `prec` | fractional digits for floats (default 14) |
//! | `layout` | time layout: `RFC3339`, `RFC2822`, `ISO8601`, `unix` or a format description |
//! | `idx` | index the field is part of |
//! | `copy` | comma-separated attributes the value is also written to |
//! | `copyidx` | attribute whose value stands in for the field in key derivation |
//!
//! The keys themselves are configurable through [`TagNames`].

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod cache;
pub mod config;
pub mod descriptor;
pub mod error;
mod field;
pub mod layout;
mod mapper;
mod number;
mod record;
#[cfg(feature = "sdk")]
pub mod sdk;
pub mod template;
mod value;

pub use aws_smithy_types::Blob;
pub use config::{AdditionalAttributes, Config, ConfigBuilder, TagNames};
pub use descriptor::{FieldDescriptor, RecordDescriptor, ValueSpec};
pub use error::{Error, ErrorKind};
pub use field::FieldValue;
pub use layout::TimeLayout;
pub use mapper::Mapper;
pub use number::DEFAULT_FLOAT_PRECISION;
pub use record::{FieldDecl, Record, Shape};
#[cfg(feature = "sdk")]
pub use sdk::{from_sdk_item, into_sdk_item};
pub use template::{Template, TemplateMatch};
pub use value::{AttrValue, Item, WireKind};
