/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Field introspection for record types.

use crate::field::FieldValue;

/// A composite type that can be marshalled into a DynamoDB item.
///
/// Implementations are normally generated with `#[derive(Record)]`. The declarations returned
/// by [`Record::fields`] are compiled into descriptors once per type and cached by the
/// [`Mapper`](crate::Mapper); the accessors are then used positionally.
pub trait Record: FieldValue + Sized + 'static {
    /// Returns the declared fields in declaration order.
    fn fields() -> Vec<FieldDecl>;

    /// Returns the field at declaration position `index`, or `None` for hidden fields.
    fn field(&self, index: usize) -> Option<&dyn FieldValue>;

    /// Returns the field at declaration position `index` mutably, or `None` for hidden fields.
    fn field_mut(&mut self, index: usize) -> Option<&mut dyn FieldValue>;

    /// Returns the name used for this record in logs and errors.
    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// The static type shape of a field.
///
/// Used to infer a field's wire kind when its annotations do not name one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// Text.
    String,
    /// Any integer width.
    Integer,
    /// `f32` or `f64`.
    Float,
    /// A boolean.
    Bool,
    /// Raw bytes.
    Blob,
    /// A point in time.
    Time,
    /// A sequence of elements of the given shape.
    List(Box<Shape>),
    /// A set of distinct strings.
    StringSet,
    /// A nested record.
    Record,
    /// A value that may be absent.
    Optional(Box<Shape>),
    /// A type with no default wire kind.
    Opaque,
}

impl Shape {
    /// Strips any [`Shape::Optional`] layers.
    pub fn unwrap_optional(&self) -> &Shape {
        let mut shape = self;
        while let Shape::Optional(inner) = shape {
            shape = inner;
        }
        shape
    }
}

/// A declared field and its raw `#[dynamo(...)]` annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    name: &'static str,
    shape: Shape,
    exported: bool,
    tags: &'static [(&'static str, &'static str)],
}

impl FieldDecl {
    /// Declares an accessible field.
    pub fn new(name: &'static str, shape: Shape) -> Self {
        Self {
            name,
            shape,
            exported: true,
            tags: &[],
        }
    }

    /// Declares a field that is never marshalled, such as a private or skipped field.
    pub fn hidden(name: &'static str) -> Self {
        Self {
            name,
            shape: Shape::Opaque,
            exported: false,
            tags: &[],
        }
    }

    /// Sets the field's annotations as `(key, value)` pairs.
    pub fn with_tags(mut self, tags: &'static [(&'static str, &'static str)]) -> Self {
        self.tags = tags;
        self
    }

    /// The field's name in Rust.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The field's type shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Whether the field is accessible to the mapper.
    pub fn exported(&self) -> bool {
        self.exported
    }

    /// The raw annotations.
    pub fn tags(&self) -> &'static [(&'static str, &'static str)] {
        self.tags
    }

    /// Returns the value of the annotation `key`, if present.
    pub fn tag(&self, key: &str) -> Option<&'static str> {
        self.tags
            .iter()
            .find(|(candidate, _)| *candidate == key)
            .map(|(_, value)| *value)
    }
}
