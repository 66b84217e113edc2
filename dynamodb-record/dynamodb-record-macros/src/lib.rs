/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Derive macro for `dynamodb-record`.
//!
//! `#[derive(Record)]` implements `Record` and `FieldValue` for a struct with named fields.
//! Fields are annotated with `#[dynamo(key = value, ...)]`; the annotations are passed through
//! verbatim and interpreted when the record's descriptors are compiled. `#[dynamo(skip)]` and
//! non-`pub` fields are never stored and must implement `Default`.

#![warn(missing_docs)]

extern crate proc_macro;

use proc_macro::TokenStream;
use syn::DeriveInput;

use crate::derive::record_impl;

mod derive;

/// Derives `Record` and `FieldValue` for a struct.
#[proc_macro_derive(Record, attributes(dynamo))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    record_impl(input).into()
}
