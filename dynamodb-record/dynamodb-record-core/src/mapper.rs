/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Marshalling, unmarshalling and key derivation.

use std::any::Any;
use std::sync::Arc;

use crate::cache::DescriptorCache;
use crate::config::Config;
use crate::descriptor::{FieldDescriptor, RecordDescriptor, ValueSpec};
use crate::error::Error;
use crate::field::FieldValue;
use crate::record::Record;
use crate::template::Target;
use crate::value::{AttrValue, Item, WireKind};

/// Converts records to and from DynamoDB items.
///
/// A mapper owns its [`Config`] and the descriptors compiled under it. Cloning is cheap and
/// clones share the compiled descriptors.
///
/// ```ignore
/// #[derive(Record)]
/// pub struct Person {
///     #[dynamo(attr = "PK", fmt = "Person#{}", idx = "primary")]
///     pub name: String,
///     pub age: i64,
/// }
///
/// let mapper = Mapper::default();
/// let item = mapper.marshal(&person)?;
/// let key = mapper.primary_key(&person)?;
/// let back: Person = mapper.from_item(&item)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Mapper {
    config: Arc<Config>,
    cache: Arc<DescriptorCache>,
}

impl Mapper {
    /// Creates a mapper with `config`.
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            cache: Default::default(),
        }
    }

    /// The mapper's configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the compiled descriptors of `R`, compiling them on first use.
    pub fn descriptor<R: Record>(&self) -> Result<Arc<RecordDescriptor>, Error> {
        self.cache.get_or_compile::<R>(self.config.tag_names())
    }

    /// Marshals `record` into an item.
    ///
    /// `None` fields and empty string sets are left out. If the record has an
    /// index-annotated field, the configured additional attributes hook runs on the result.
    pub fn marshal<R: Record>(&self, record: &R) -> Result<Item, Error> {
        let descriptor = self.descriptor::<R>()?;
        let mut item = self.marshal_fields(&descriptor, record)?;
        if descriptor.is_top_level() {
            if let Some(hook) = self.config.additional_attributes() {
                tracing::debug!(record = R::type_name(), "applying additional attributes");
                hook.apply(&mut item, record as &dyn Any);
            }
        }
        Ok(item)
    }

    /// Marshals a record embedded in another record. Additional attributes are never added.
    #[doc(hidden)]
    pub fn marshal_nested<R: Record>(&self, record: &R) -> Result<Item, Error> {
        let descriptor = self.descriptor::<R>()?;
        self.marshal_fields(&descriptor, record)
    }

    /// Unmarshals `item` into `record`.
    ///
    /// Attributes missing from the item leave their fields unchanged. On error `record` may be
    /// partially updated.
    pub fn unmarshal<R: Record>(&self, item: &Item, record: &mut R) -> Result<(), Error> {
        let descriptor = self.descriptor::<R>()?;
        for field in descriptor.fields() {
            let Some(stored) = item.get(field.attribute()) else {
                continue;
            };
            self.unmarshal_field(&descriptor, field, stored, record)
                .map_err(|err| {
                    err.with_attribute(field.attribute())
                        .with_record(descriptor.type_name())
                })?;
        }
        Ok(())
    }

    /// Unmarshals `item` into a new record.
    pub fn from_item<R: Record>(&self, item: &Item) -> Result<R, Error> {
        let mut record = R::empty();
        self.unmarshal(item, &mut record)?;
        Ok(record)
    }

    /// Unmarshals every item of a query or scan page.
    pub fn unmarshal_all<R: Record>(&self, items: &[Item]) -> Result<Vec<R>, Error> {
        items.iter().map(|item| self.from_item(item)).collect()
    }

    /// Derives the key of `record` for the index named `index`.
    ///
    /// The key holds every field annotated with that index. A field that also names a
    /// copy-to-index attribute contributes the value of whichever field writes that attribute,
    /// stored under the attribute's name.
    pub fn key<R: Record>(&self, record: &R, index: &str) -> Result<Item, Error> {
        let descriptor = self.descriptor::<R>()?;
        let mut key = Item::new();
        for field in descriptor.fields() {
            if field.index() != Some(index) {
                continue;
            }
            if let Some(value) = self.field_value(&descriptor, field, record)? {
                key.insert(field.attribute().to_string(), value);
            }
            let Some(target) = field.copy_to_index() else {
                continue;
            };
            let source = descriptor
                .fields()
                .iter()
                .find(|candidate| candidate.writes(target));
            if let Some(source) = source {
                if let Some(value) = self.field_value(&descriptor, source, record)? {
                    key.insert(target.to_string(), value);
                }
            }
        }
        Ok(key)
    }

    /// Derives the key of `record` for the configured primary index.
    pub fn primary_key<R: Record>(&self, record: &R) -> Result<Item, Error> {
        self.key(record, self.config.primary_index())
    }

    /// Encodes a standalone value, e.g. for an expression attribute value.
    ///
    /// The value is encoded the way an unannotated field of its type would be.
    pub fn attribute_value<V: FieldValue>(&self, value: &V) -> Result<AttrValue, Error> {
        let spec = ValueSpec::inferred(&V::shape())?;
        self.encode_value(value, &spec)
    }

    /// Encodes `value` as described by `spec`. Templates are not applied.
    pub fn encode_value(
        &self,
        value: &dyn FieldValue,
        spec: &ValueSpec,
    ) -> Result<AttrValue, Error> {
        if value.is_null() {
            return Err(Error::null_value());
        }
        Ok(match spec.kind() {
            WireKind::S => AttrValue::S(value.text(spec.layout())?),
            WireKind::N => AttrValue::N(value.number(spec.precision())?),
            WireKind::B => AttrValue::B(value.blob()?),
            WireKind::Bool => AttrValue::Bool(value.boolean()?),
            WireKind::L => AttrValue::L(value.list(self, element(spec)?)?),
            WireKind::M => AttrValue::M(value.map(self)?),
            WireKind::Ss => AttrValue::Ss(value.string_set(spec.layout())?),
        })
    }

    /// Decodes `value` into `target` as described by `spec`. Templates are not applied.
    pub fn decode_value(
        &self,
        target: &mut dyn FieldValue,
        value: &AttrValue,
        spec: &ValueSpec,
    ) -> Result<(), Error> {
        match (spec.kind(), value) {
            (WireKind::S, AttrValue::S(text)) => target.set_text(text, spec.layout()),
            (WireKind::N, AttrValue::N(text)) => target.set_number(text),
            (WireKind::B, AttrValue::B(blob)) => target.set_blob(blob),
            (WireKind::Bool, AttrValue::Bool(value)) => target.set_boolean(*value),
            (WireKind::L, AttrValue::L(values)) => target.set_list(self, values, element(spec)?),
            (WireKind::M, AttrValue::M(item)) => target.set_map(self, item),
            (WireKind::Ss, AttrValue::Ss(values)) => target.set_string_set(values, spec.layout()),
            (kind, other) => Err(Error::invalid_type(kind.as_str(), other.type_name())),
        }
    }

    fn marshal_fields<R: Record>(
        &self,
        descriptor: &RecordDescriptor,
        record: &R,
    ) -> Result<Item, Error> {
        let mut item = Item::new();
        for field in descriptor.fields() {
            let Some(value) = self.field_value(descriptor, field, record)? else {
                continue;
            };
            for copy in field.copy_to() {
                item.insert(copy.clone(), value.clone());
            }
            item.insert(field.attribute().to_string(), value);
        }
        Ok(item)
    }

    /// Encodes one field, applying its template. Returns `None` for values that are not written.
    fn field_value<R: Record>(
        &self,
        descriptor: &RecordDescriptor,
        field: &FieldDescriptor,
        record: &R,
    ) -> Result<Option<AttrValue>, Error> {
        let value = accessor(record, field)?;
        if value.is_null() {
            return Ok(None);
        }
        let encoded = match field.spec().kind() {
            WireKind::S => field
                .template()
                .render(|target| match target {
                    Target::Current => value.text(field.spec().layout()),
                    Target::Sibling(index) => {
                        let sibling = sibling(descriptor, index)?;
                        let sibling_value = accessor(record, sibling)?;
                        if sibling_value.is_null() {
                            Ok(String::new())
                        } else {
                            sibling_value.text(sibling.spec().layout())
                        }
                    }
                })
                .map(AttrValue::S),
            _ => self.encode_value(value, field.spec()),
        };
        match encoded {
            Ok(AttrValue::Ss(values)) if values.is_empty() => Ok(None),
            Ok(value) => Ok(Some(value)),
            Err(err) => Err(err
                .with_attribute(field.attribute())
                .with_record(descriptor.type_name())),
        }
    }

    fn unmarshal_field<R: Record>(
        &self,
        descriptor: &RecordDescriptor,
        field: &FieldDescriptor,
        stored: &AttrValue,
        record: &mut R,
    ) -> Result<(), Error> {
        match (field.spec().kind(), stored) {
            (WireKind::S, AttrValue::S(text)) => {
                field
                    .template()
                    .parse(text, self.config.template_match(), |target, captured| {
                        let owner = match target {
                            Target::Current => field,
                            Target::Sibling(index) => sibling(descriptor, index)?,
                        };
                        accessor_mut(record, owner)?.set_text(captured, owner.spec().layout())
                    })
            }
            _ => self.decode_value(accessor_mut(record, field)?, stored, field.spec()),
        }
    }
}

fn element(spec: &ValueSpec) -> Result<&ValueSpec, Error> {
    spec.element().ok_or_else(|| Error::unsupported_kind(WireKind::L))
}

fn sibling(descriptor: &RecordDescriptor, index: usize) -> Result<&FieldDescriptor, Error> {
    descriptor
        .sibling(index)
        .ok_or_else(|| Error::conversion(format!("template refers to unknown field {index}")))
}

fn accessor<'a, R: Record>(
    record: &'a R,
    field: &FieldDescriptor,
) -> Result<&'a dyn FieldValue, Error> {
    record.field(field.position()).ok_or_else(|| missing_accessor(field))
}

fn accessor_mut<'a, R: Record>(
    record: &'a mut R,
    field: &FieldDescriptor,
) -> Result<&'a mut dyn FieldValue, Error> {
    record
        .field_mut(field.position())
        .ok_or_else(|| missing_accessor(field))
}

fn missing_accessor(field: &FieldDescriptor) -> Error {
    Error::conversion(format!(
        "record does not expose field `{}` at position {}",
        field.name(),
        field.position()
    ))
}
