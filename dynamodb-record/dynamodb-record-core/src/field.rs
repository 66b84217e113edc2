/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Per-kind conversions between native field values and their wire forms.

use aws_smithy_types::Blob;
use std::collections::{BTreeSet, HashSet};
use time::OffsetDateTime;

use crate::descriptor::ValueSpec;
use crate::error::Error;
use crate::layout::{self, TimeLayout};
use crate::mapper::Mapper;
use crate::number;
use crate::record::Shape;
use crate::value::{AttrValue, Item, WireKind};

/// A native value that can be stored in a record field.
///
/// Each method converts the value to or from one wire kind. The [`Mapper`] picks the method
/// from the field's compiled descriptor; kinds a type does not support keep the default
/// implementation, which fails with [`ErrorKind::UnsupportedKind`](crate::ErrorKind::UnsupportedKind).
pub trait FieldValue {
    /// The static shape of this type, used to infer a default wire kind.
    fn shape() -> Shape
    where
        Self: Sized;

    /// The zero value, used when a field or list element has to be allocated during unmarshal.
    fn empty() -> Self
    where
        Self: Sized;

    /// Returns true if the value is absent and should not be written.
    fn is_null(&self) -> bool {
        false
    }

    /// Returns the value's canonical text, as substituted into templates and written to `S`.
    fn text(&self, _layout: &TimeLayout) -> Result<String, Error> {
        Err(Error::unsupported_kind(WireKind::S))
    }

    /// Replaces the value from its canonical text.
    fn set_text(&mut self, _text: &str, _layout: &TimeLayout) -> Result<(), Error> {
        Err(Error::unsupported_kind(WireKind::S))
    }

    /// Returns the value as DynamoDB number text.
    fn number(&self, _precision: Option<usize>) -> Result<String, Error> {
        Err(Error::unsupported_kind(WireKind::N))
    }

    /// Replaces the value from DynamoDB number text.
    fn set_number(&mut self, _text: &str) -> Result<(), Error> {
        Err(Error::unsupported_kind(WireKind::N))
    }

    /// Returns the value as binary data.
    fn blob(&self) -> Result<Blob, Error> {
        Err(Error::unsupported_kind(WireKind::B))
    }

    /// Replaces the value from binary data.
    fn set_blob(&mut self, _value: &Blob) -> Result<(), Error> {
        Err(Error::unsupported_kind(WireKind::B))
    }

    /// Returns the value as a boolean.
    fn boolean(&self) -> Result<bool, Error> {
        Err(Error::unsupported_kind(WireKind::Bool))
    }

    /// Replaces the value from a boolean.
    fn set_boolean(&mut self, _value: bool) -> Result<(), Error> {
        Err(Error::unsupported_kind(WireKind::Bool))
    }

    /// Encodes each element with `element`.
    fn list(&self, _mapper: &Mapper, _element: &ValueSpec) -> Result<Vec<AttrValue>, Error> {
        Err(Error::unsupported_kind(WireKind::L))
    }

    /// Replaces the value with one element per stored value, each decoded with `element`.
    fn set_list(
        &mut self,
        _mapper: &Mapper,
        _values: &[AttrValue],
        _element: &ValueSpec,
    ) -> Result<(), Error> {
        Err(Error::unsupported_kind(WireKind::L))
    }

    /// Marshals the value as a nested item.
    fn map(&self, _mapper: &Mapper) -> Result<Item, Error> {
        Err(Error::unsupported_kind(WireKind::M))
    }

    /// Unmarshals a nested item into the value.
    fn set_map(&mut self, _mapper: &Mapper, _item: &Item) -> Result<(), Error> {
        Err(Error::unsupported_kind(WireKind::M))
    }

    /// Returns the value as a single byte, for types that make up binary sequences.
    #[doc(hidden)]
    fn to_byte(&self) -> Option<u8> {
        None
    }

    /// Builds the value from a single byte, for types that make up binary sequences.
    #[doc(hidden)]
    fn from_byte(_byte: u8) -> Option<Self>
    where
        Self: Sized,
    {
        None
    }

    /// Returns the value as a set of distinct strings.
    fn string_set(&self, _layout: &TimeLayout) -> Result<BTreeSet<String>, Error> {
        Err(Error::unsupported_kind(WireKind::Ss))
    }

    /// Replaces the value from a set of strings.
    fn set_string_set(
        &mut self,
        _values: &BTreeSet<String>,
        _layout: &TimeLayout,
    ) -> Result<(), Error> {
        Err(Error::unsupported_kind(WireKind::Ss))
    }
}

// ============================================================================
// Scalars
// ============================================================================

impl FieldValue for String {
    fn shape() -> Shape {
        Shape::String
    }

    fn empty() -> Self {
        String::new()
    }

    fn text(&self, _layout: &TimeLayout) -> Result<String, Error> {
        Ok(self.clone())
    }

    fn set_text(&mut self, text: &str, _layout: &TimeLayout) -> Result<(), Error> {
        text.clone_into(self);
        Ok(())
    }
}

macro_rules! integer_field {
    ($($ty:ty $({ $($extra:tt)* })?),* $(,)?) => {
        $(
            impl FieldValue for $ty {
                fn shape() -> Shape {
                    Shape::Integer
                }

                fn empty() -> Self {
                    0
                }

                fn text(&self, _layout: &TimeLayout) -> Result<String, Error> {
                    Ok(self.to_string())
                }

                fn set_text(&mut self, text: &str, _layout: &TimeLayout) -> Result<(), Error> {
                    self.set_number(text)
                }

                fn number(&self, _precision: Option<usize>) -> Result<String, Error> {
                    Ok(self.to_string())
                }

                fn set_number(&mut self, text: &str) -> Result<(), Error> {
                    *self = number::parse(text, stringify!($ty))?;
                    Ok(())
                }

                $($($extra)*)?
            }
        )*
    };
}

integer_field!(
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8 {
        fn to_byte(&self) -> Option<u8> {
            Some(*self)
        }

        fn from_byte(byte: u8) -> Option<Self> {
            Some(byte)
        }
    },
    u16,
    u32,
    u64,
    u128,
    usize,
);

macro_rules! float_field {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FieldValue for $ty {
                fn shape() -> Shape {
                    Shape::Float
                }

                fn empty() -> Self {
                    0.0
                }

                fn text(&self, _layout: &TimeLayout) -> Result<String, Error> {
                    number::format_float(*self, self.is_finite(), None)
                }

                fn set_text(&mut self, text: &str, _layout: &TimeLayout) -> Result<(), Error> {
                    self.set_number(text)
                }

                fn number(&self, precision: Option<usize>) -> Result<String, Error> {
                    number::format_float(*self, self.is_finite(), precision)
                }

                fn set_number(&mut self, text: &str) -> Result<(), Error> {
                    *self = number::parse(text, stringify!($ty))?;
                    Ok(())
                }
            }
        )*
    };
}

float_field!(f32, f64);

impl FieldValue for bool {
    fn shape() -> Shape {
        Shape::Bool
    }

    fn empty() -> Self {
        false
    }

    fn text(&self, _layout: &TimeLayout) -> Result<String, Error> {
        Ok(self.to_string())
    }

    fn set_text(&mut self, text: &str, _layout: &TimeLayout) -> Result<(), Error> {
        *self = number::parse(text, "bool")?;
        Ok(())
    }

    fn boolean(&self) -> Result<bool, Error> {
        Ok(*self)
    }

    fn set_boolean(&mut self, value: bool) -> Result<(), Error> {
        *self = value;
        Ok(())
    }
}

impl FieldValue for Blob {
    fn shape() -> Shape {
        Shape::Blob
    }

    fn empty() -> Self {
        Blob::new(Vec::new())
    }

    fn blob(&self) -> Result<Blob, Error> {
        Ok(self.clone())
    }

    fn set_blob(&mut self, value: &Blob) -> Result<(), Error> {
        *self = value.clone();
        Ok(())
    }
}

/// Time values are text in their field's layout, or Unix epoch seconds as numbers.
impl FieldValue for OffsetDateTime {
    fn shape() -> Shape {
        Shape::Time
    }

    fn empty() -> Self {
        OffsetDateTime::UNIX_EPOCH
    }

    fn text(&self, layout: &TimeLayout) -> Result<String, Error> {
        layout.format(self)
    }

    fn set_text(&mut self, text: &str, layout: &TimeLayout) -> Result<(), Error> {
        *self = layout.parse(text)?;
        Ok(())
    }

    fn number(&self, _precision: Option<usize>) -> Result<String, Error> {
        Ok(self.unix_timestamp().to_string())
    }

    fn set_number(&mut self, text: &str) -> Result<(), Error> {
        *self = layout::parse_unix_seconds(text)?;
        Ok(())
    }
}

// ============================================================================
// Collection types
// ============================================================================

/// `Vec<u8>` is binary data; every other element type makes a list.
impl<T: FieldValue> FieldValue for Vec<T> {
    fn shape() -> Shape {
        if T::from_byte(0).is_some() {
            Shape::Blob
        } else {
            Shape::List(Box::new(T::shape()))
        }
    }

    fn empty() -> Self {
        Vec::new()
    }

    fn list(&self, mapper: &Mapper, element: &ValueSpec) -> Result<Vec<AttrValue>, Error> {
        self.iter()
            .enumerate()
            .map(|(index, value)| {
                mapper
                    .encode_value(value, element)
                    .map_err(|err| err.with_attribute(index.to_string()))
            })
            .collect()
    }

    fn set_list(
        &mut self,
        mapper: &Mapper,
        values: &[AttrValue],
        element: &ValueSpec,
    ) -> Result<(), Error> {
        let mut decoded = Vec::with_capacity(values.len());
        for (index, value) in values.iter().enumerate() {
            let mut target = T::empty();
            mapper
                .decode_value(&mut target, value, element)
                .map_err(|err| err.with_attribute(index.to_string()))?;
            decoded.push(target);
        }
        *self = decoded;
        Ok(())
    }

    fn blob(&self) -> Result<Blob, Error> {
        if T::from_byte(0).is_none() {
            return Err(Error::unsupported_kind(WireKind::B));
        }
        self.iter()
            .map(T::to_byte)
            .collect::<Option<Vec<u8>>>()
            .map(Blob::new)
            .ok_or_else(|| Error::unsupported_kind(WireKind::B))
    }

    fn set_blob(&mut self, value: &Blob) -> Result<(), Error> {
        *self = value
            .as_ref()
            .iter()
            .map(|byte| T::from_byte(*byte))
            .collect::<Option<Vec<T>>>()
            .ok_or_else(|| Error::unsupported_kind(WireKind::B))?;
        Ok(())
    }

    fn string_set(&self, layout: &TimeLayout) -> Result<BTreeSet<String>, Error> {
        self.iter().map(|value| value.text(layout)).collect()
    }

    fn set_string_set(
        &mut self,
        values: &BTreeSet<String>,
        layout: &TimeLayout,
    ) -> Result<(), Error> {
        *self = values
            .iter()
            .map(|text| {
                let mut target = T::empty();
                target.set_text(text, layout)?;
                Ok(target)
            })
            .collect::<Result<_, Error>>()?;
        Ok(())
    }
}

impl FieldValue for HashSet<String> {
    fn shape() -> Shape {
        Shape::StringSet
    }

    fn empty() -> Self {
        HashSet::new()
    }

    fn string_set(&self, _layout: &TimeLayout) -> Result<BTreeSet<String>, Error> {
        Ok(self.iter().cloned().collect())
    }

    fn set_string_set(
        &mut self,
        values: &BTreeSet<String>,
        _layout: &TimeLayout,
    ) -> Result<(), Error> {
        *self = values.iter().cloned().collect();
        Ok(())
    }
}

impl FieldValue for BTreeSet<String> {
    fn shape() -> Shape {
        Shape::StringSet
    }

    fn empty() -> Self {
        BTreeSet::new()
    }

    fn string_set(&self, _layout: &TimeLayout) -> Result<BTreeSet<String>, Error> {
        Ok(self.clone())
    }

    fn set_string_set(
        &mut self,
        values: &BTreeSet<String>,
        _layout: &TimeLayout,
    ) -> Result<(), Error> {
        self.clone_from(values);
        Ok(())
    }
}

// ============================================================================
// Wrappers
// ============================================================================

/// `None` is never written. Setting any kind on `None` allocates the inner value first.
impl<T: FieldValue> FieldValue for Option<T> {
    fn shape() -> Shape {
        Shape::Optional(Box::new(T::shape()))
    }

    fn empty() -> Self {
        None
    }

    fn is_null(&self) -> bool {
        self.as_ref().map_or(true, T::is_null)
    }

    fn text(&self, layout: &TimeLayout) -> Result<String, Error> {
        present(self)?.text(layout)
    }

    fn set_text(&mut self, text: &str, layout: &TimeLayout) -> Result<(), Error> {
        self.get_or_insert_with(T::empty).set_text(text, layout)
    }

    fn number(&self, precision: Option<usize>) -> Result<String, Error> {
        present(self)?.number(precision)
    }

    fn set_number(&mut self, text: &str) -> Result<(), Error> {
        self.get_or_insert_with(T::empty).set_number(text)
    }

    fn blob(&self) -> Result<Blob, Error> {
        present(self)?.blob()
    }

    fn set_blob(&mut self, value: &Blob) -> Result<(), Error> {
        self.get_or_insert_with(T::empty).set_blob(value)
    }

    fn boolean(&self) -> Result<bool, Error> {
        present(self)?.boolean()
    }

    fn set_boolean(&mut self, value: bool) -> Result<(), Error> {
        self.get_or_insert_with(T::empty).set_boolean(value)
    }

    fn list(&self, mapper: &Mapper, element: &ValueSpec) -> Result<Vec<AttrValue>, Error> {
        present(self)?.list(mapper, element)
    }

    fn set_list(
        &mut self,
        mapper: &Mapper,
        values: &[AttrValue],
        element: &ValueSpec,
    ) -> Result<(), Error> {
        self.get_or_insert_with(T::empty)
            .set_list(mapper, values, element)
    }

    fn map(&self, mapper: &Mapper) -> Result<Item, Error> {
        present(self)?.map(mapper)
    }

    fn set_map(&mut self, mapper: &Mapper, item: &Item) -> Result<(), Error> {
        self.get_or_insert_with(T::empty).set_map(mapper, item)
    }

    fn string_set(&self, layout: &TimeLayout) -> Result<BTreeSet<String>, Error> {
        present(self)?.string_set(layout)
    }

    fn set_string_set(
        &mut self,
        values: &BTreeSet<String>,
        layout: &TimeLayout,
    ) -> Result<(), Error> {
        self.get_or_insert_with(T::empty)
            .set_string_set(values, layout)
    }
}

fn present<T>(value: &Option<T>) -> Result<&T, Error> {
    value.as_ref().ok_or_else(Error::null_value)
}

impl<T: FieldValue> FieldValue for Box<T> {
    fn shape() -> Shape {
        T::shape()
    }

    fn empty() -> Self {
        Box::new(T::empty())
    }

    fn is_null(&self) -> bool {
        (**self).is_null()
    }

    fn text(&self, layout: &TimeLayout) -> Result<String, Error> {
        (**self).text(layout)
    }

    fn set_text(&mut self, text: &str, layout: &TimeLayout) -> Result<(), Error> {
        (**self).set_text(text, layout)
    }

    fn number(&self, precision: Option<usize>) -> Result<String, Error> {
        (**self).number(precision)
    }

    fn set_number(&mut self, text: &str) -> Result<(), Error> {
        (**self).set_number(text)
    }

    fn blob(&self) -> Result<Blob, Error> {
        (**self).blob()
    }

    fn set_blob(&mut self, value: &Blob) -> Result<(), Error> {
        (**self).set_blob(value)
    }

    fn boolean(&self) -> Result<bool, Error> {
        (**self).boolean()
    }

    fn set_boolean(&mut self, value: bool) -> Result<(), Error> {
        (**self).set_boolean(value)
    }

    fn list(&self, mapper: &Mapper, element: &ValueSpec) -> Result<Vec<AttrValue>, Error> {
        (**self).list(mapper, element)
    }

    fn set_list(
        &mut self,
        mapper: &Mapper,
        values: &[AttrValue],
        element: &ValueSpec,
    ) -> Result<(), Error> {
        (**self).set_list(mapper, values, element)
    }

    fn map(&self, mapper: &Mapper) -> Result<Item, Error> {
        (**self).map(mapper)
    }

    fn set_map(&mut self, mapper: &Mapper, item: &Item) -> Result<(), Error> {
        (**self).set_map(mapper, item)
    }

    fn string_set(&self, layout: &TimeLayout) -> Result<BTreeSet<String>, Error> {
        (**self).string_set(layout)
    }

    fn set_string_set(
        &mut self,
        values: &BTreeSet<String>,
        layout: &TimeLayout,
    ) -> Result<(), Error> {
        (**self).set_string_set(values, layout)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ErrorKind;
    use time::macros::datetime;

    const RFC3339: TimeLayout = TimeLayout::Rfc3339;

    #[test]
    fn integers_are_bounded_by_width() {
        let mut value = 0u8;
        value.set_number("255").unwrap();
        assert_eq!(255, value);
        let err = value.set_number("256").unwrap_err();
        assert_eq!("invalid value: cannot parse `256` as u8", err.to_string());
        assert_eq!(255, value);

        let mut signed = 0i64;
        signed.set_text("-42", &RFC3339).unwrap();
        assert_eq!("-42", signed.number(None).unwrap());
    }

    #[test]
    fn floats_use_precision_for_numbers_and_shortest_text_for_templates() {
        let value = 0.1f64 + 0.2f64;
        assert_eq!("0.3", value.number(Some(14)).unwrap());
        assert_eq!("0.30000000000000004", value.text(&RFC3339).unwrap());
    }

    #[test]
    fn unsupported_kinds_are_reported() {
        let err = "text".to_string().boolean().unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::UnsupportedKind {
                kind: WireKind::Bool
            }
        ));
        assert!(true.number(None).is_err());
    }

    #[test]
    fn option_allocates_on_set() {
        let mut value: Option<u32> = None;
        assert!(value.is_null());
        assert!(matches!(value.number(None).unwrap_err().kind(), ErrorKind::NullValue));
        value.set_number("7").unwrap();
        assert_eq!(Some(7), value);
        assert!(!value.is_null());
    }

    #[test]
    fn nested_options_are_null_when_inner_is_none() {
        let value: Option<Option<String>> = Some(None);
        assert!(value.is_null());
        assert_eq!(
            Shape::Optional(Box::new(Shape::Optional(Box::new(Shape::String)))),
            <Option<Option<String>>>::shape()
        );
    }

    #[test]
    fn boxed_values_delegate() {
        let mut value = Box::new(String::new());
        value.set_text("inner", &RFC3339).unwrap();
        assert_eq!("inner", value.text(&RFC3339).unwrap());
        assert_eq!(Shape::String, <Box<String>>::shape());
    }

    #[test]
    fn time_as_text_and_epoch_seconds() {
        let mut value = OffsetDateTime::empty();
        value.set_text("2019-12-16T23:48:18Z", &RFC3339).unwrap();
        assert_eq!(datetime!(2019-12-16 23:48:18 UTC), value);
        assert_eq!("1576540098", value.number(None).unwrap());
        value.set_number("0").unwrap();
        assert_eq!(OffsetDateTime::UNIX_EPOCH, value);
    }

    #[test]
    fn string_sets_collect_distinct_values() {
        let values: Vec<String> = vec!["b".into(), "a".into(), "b".into()];
        let set = values.string_set(&RFC3339).unwrap();
        assert_eq!(vec!["a", "b"], set.iter().map(String::as_str).collect::<Vec<_>>());

        let mut hashed = HashSet::<String>::empty();
        hashed.set_string_set(&set, &RFC3339).unwrap();
        assert_eq!(2, hashed.len());
    }

    #[test]
    fn byte_vectors_are_binary() {
        assert_eq!(Shape::Blob, <Vec<u8>>::shape());
        assert_eq!(
            Shape::Optional(Box::new(Shape::Blob)),
            <Option<Vec<u8>>>::shape()
        );
        assert_eq!(Shape::List(Box::new(Shape::Integer)), <Vec<i8>>::shape());

        let bytes = vec![0u8, 1, 255];
        assert_eq!(Blob::new(vec![0, 1, 255]), bytes.blob().unwrap());
        let mut decoded = Vec::<u8>::empty();
        decoded.set_blob(&Blob::new(vec![7, 8])).unwrap();
        assert_eq!(vec![7, 8], decoded);

        let err = vec![1u16].blob().unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::UnsupportedKind { kind: WireKind::B }
        ));
    }

    #[test]
    fn bool_text_round_trip() {
        let mut value = false;
        value.set_text("true", &RFC3339).unwrap();
        assert!(value);
        assert!(value.set_text("yes", &RFC3339).is_err());
    }
}
