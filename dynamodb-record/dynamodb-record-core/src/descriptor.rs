/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Compiled per-field metadata.

use crate::config::TagNames;
use crate::error::Error;
use crate::layout::TimeLayout;
use crate::number::DEFAULT_FLOAT_PRECISION;
use crate::record::{FieldDecl, Shape};
use crate::template::{Template, IDENTITY_TEMPLATE};
use crate::value::WireKind;

/// Attribute name marking a field that is never stored.
pub const EXCLUDED: &str = "-";

/// How a single value is encoded: its wire kind plus the kind-specific options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueSpec {
    kind: WireKind,
    precision: Option<usize>,
    layout: TimeLayout,
    element: Option<Box<ValueSpec>>,
}

impl ValueSpec {
    /// Creates a spec for `kind` with no precision, the default layout and no element spec.
    pub fn new(kind: WireKind) -> Self {
        Self {
            kind,
            precision: None,
            layout: TimeLayout::default(),
            element: None,
        }
    }

    /// Creates the spec an unannotated field of `shape` would get.
    pub fn inferred(shape: &Shape) -> Result<Self, Error> {
        let shape = shape.unwrap_optional();
        let precision = matches!(shape, Shape::Float).then_some(DEFAULT_FLOAT_PRECISION);
        let layout = TimeLayout::default();
        Ok(Self {
            kind: infer_kind(shape).ok_or_else(no_default_kind)?,
            precision,
            element: element_spec(shape, None, &layout, &no_default_kind)?,
            layout,
        })
    }

    /// Sets the fractional digits written for floats.
    pub fn with_precision(mut self, precision: Option<usize>) -> Self {
        self.precision = precision;
        self
    }

    /// Sets the time layout.
    pub fn with_layout(mut self, layout: TimeLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Sets the spec used for list elements.
    pub fn with_element(mut self, element: ValueSpec) -> Self {
        self.element = Some(Box::new(element));
        self
    }

    /// The wire kind.
    pub fn kind(&self) -> WireKind {
        self.kind
    }

    /// Fractional digits for floats; `None` writes the shortest exact text.
    pub fn precision(&self) -> Option<usize> {
        self.precision
    }

    /// The layout for time values.
    pub fn layout(&self) -> &TimeLayout {
        &self.layout
    }

    /// The spec for list elements, if this is a list of a known element shape.
    pub fn element(&self) -> Option<&ValueSpec> {
        self.element.as_deref()
    }
}

/// A compiled field: where it is stored and how it is encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    name: &'static str,
    position: usize,
    attribute: String,
    spec: ValueSpec,
    template: Template,
    index: Option<String>,
    copy_to: Vec<String>,
    copy_to_index: Option<String>,
}

impl FieldDescriptor {
    /// The field's name in Rust.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The field's declaration position, as passed to [`Record::field`](crate::Record::field).
    pub fn position(&self) -> usize {
        self.position
    }

    /// The attribute the field is stored under.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// How the value is encoded.
    pub fn spec(&self) -> &ValueSpec {
        &self.spec
    }

    /// The format template; `{}` when none was given.
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// The index the field is part of.
    pub fn index(&self) -> Option<&str> {
        self.index.as_deref()
    }

    /// Additional attributes the value is copied to when marshalling.
    pub fn copy_to(&self) -> &[String] {
        &self.copy_to
    }

    /// The attribute whose value stands in for this field in key derivation.
    pub fn copy_to_index(&self) -> Option<&str> {
        self.copy_to_index.as_deref()
    }

    /// Returns true if the value is stored under `attribute`, directly or as a copy.
    pub fn writes(&self, attribute: &str) -> bool {
        self.attribute == attribute || self.copy_to.iter().any(|copy| copy == attribute)
    }
}

/// The compiled descriptors of one record type.
///
/// [`fields`](Self::fields) holds the stored fields. Fields named [`EXCLUDED`] are kept apart:
/// they have no attribute of their own but other fields' templates may refer to them. Hidden
/// fields are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDescriptor {
    type_name: &'static str,
    fields: Vec<FieldDescriptor>,
    excluded: Vec<FieldDescriptor>,
}

impl RecordDescriptor {
    /// Compiles `decls` with the annotation keys in `tags`.
    pub fn compile(
        type_name: &'static str,
        decls: &[FieldDecl],
        tags: &TagNames,
    ) -> Result<Self, Error> {
        let (stored, excluded): (Vec<_>, Vec<_>) = decls
            .iter()
            .enumerate()
            .filter(|(_, decl)| decl.exported())
            .map(|(position, decl)| (position, decl, attribute_name(decl, tags)))
            .partition(|(_, _, attribute)| *attribute != EXCLUDED);
        // Template targets index stored fields first, then excluded ones.
        let names: Vec<&str> = stored
            .iter()
            .chain(&excluded)
            .map(|(_, decl, _)| decl.name())
            .collect();

        let fields = stored
            .iter()
            .map(|(position, decl, attribute)| {
                compile_field(*position, decl, attribute, tags, &names).map_err(|err| {
                    err.with_attribute(attribute.to_string())
                        .with_record(type_name)
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;
        let excluded = excluded
            .iter()
            .map(|(position, decl, _)| {
                compile_excluded(*position, decl, tags).map_err(|err| {
                    err.with_attribute(decl.name()).with_record(type_name)
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;
        Ok(Self {
            type_name,
            fields,
            excluded,
        })
    }

    /// The record's type name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The stored fields, in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Fields named [`EXCLUDED`]. They are never written or read as attributes and only carry
    /// their text in and out of other fields' templates.
    pub fn excluded_fields(&self) -> &[FieldDescriptor] {
        &self.excluded
    }

    /// Resolves a template's [`Target::Sibling`](crate::template::Target::Sibling) index.
    pub fn sibling(&self, index: usize) -> Option<&FieldDescriptor> {
        self.fields
            .get(index)
            .or_else(|| self.excluded.get(index.checked_sub(self.fields.len())?))
    }

    /// Returns the descriptor of the field named `name` in Rust.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Returns true if any field is part of an index, making this a top-level table record.
    pub fn is_top_level(&self) -> bool {
        self.fields.iter().any(|field| field.index.is_some())
    }
}

fn attribute_name<'a>(decl: &'a FieldDecl, tags: &TagNames) -> &'a str {
    decl.tag(tags.attribute())
        .map(str::trim)
        .filter(|attribute| !attribute.is_empty())
        .unwrap_or(decl.name())
}

fn compile_field(
    position: usize,
    decl: &FieldDecl,
    attribute: &str,
    tags: &TagNames,
    names: &[&str],
) -> Result<FieldDescriptor, Error> {
    let shape = decl.shape().unwrap_optional();
    let template_source = decl.tag(tags.template());
    let missing_kind = || {
        Error::invalid_annotation(
            tags.kind(),
            "",
            "this field's type has no default attribute type",
        )
    };

    let mut kind = match decl.tag(tags.kind()) {
        Some(kind) => kind.trim().parse::<WireKind>().map_err(|_| {
            Error::invalid_annotation(
                tags.kind(),
                kind,
                "expected one of S, N, B, BOOL, L, M, SS",
            )
        })?,
        None => infer_kind(shape).ok_or_else(missing_kind)?,
    };
    if template_source.is_some() && kind != WireKind::Ss && *shape != Shape::StringSet {
        kind = WireKind::S;
    }

    let template_source = template_source.unwrap_or(IDENTITY_TEMPLATE);
    let template = Template::compile(template_source, |name| {
        names.iter().position(|candidate| *candidate == name)
    })
    .map_err(|err| {
        Error::invalid_annotation(tags.template(), template_source, err.to_string()).with_source(err)
    })?;

    let explicit_precision = match decl.tag(tags.precision()) {
        Some(precision) => Some(precision.trim().parse::<usize>().map_err(|err| {
            Error::invalid_annotation(
                tags.precision(),
                precision,
                "expected a non-negative integer",
            )
            .with_source(err)
        })?),
        None => None,
    };
    let precision = match explicit_precision {
        Some(precision) => Some(precision),
        None if decl.tag(tags.template()).is_none() && *shape == Shape::Float => {
            Some(DEFAULT_FLOAT_PRECISION)
        }
        None => None,
    };

    let layout = compile_layout(decl, tags)?;

    Ok(FieldDescriptor {
        name: decl.name(),
        position,
        attribute: attribute.to_string(),
        spec: ValueSpec {
            kind,
            precision,
            element: element_spec(shape, explicit_precision, &layout, &missing_kind)?,
            layout,
        },
        template,
        index: non_empty(decl.tag(tags.index())),
        copy_to: decl
            .tag(tags.copy())
            .map(|copies| {
                copies
                    .split(',')
                    .map(str::trim)
                    .filter(|copy| !copy.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        copy_to_index: non_empty(decl.tag(tags.copy_index())),
    })
}

/// An excluded field only needs what templates use: its text, in its time layout.
fn compile_excluded(
    position: usize,
    decl: &FieldDecl,
    tags: &TagNames,
) -> Result<FieldDescriptor, Error> {
    let layout = compile_layout(decl, tags)?;
    Ok(FieldDescriptor {
        name: decl.name(),
        position,
        attribute: EXCLUDED.to_string(),
        spec: ValueSpec::new(WireKind::S).with_layout(layout),
        template: Template::compile(IDENTITY_TEMPLATE, |_| None).map_err(|err| {
            Error::invalid_annotation(tags.template(), IDENTITY_TEMPLATE, err.to_string())
        })?,
        index: None,
        copy_to: Vec::new(),
        copy_to_index: None,
    })
}

fn compile_layout(decl: &FieldDecl, tags: &TagNames) -> Result<TimeLayout, Error> {
    match decl.tag(tags.layout()) {
        Some(layout) => TimeLayout::compile(layout).map_err(|err| {
            Error::invalid_annotation(tags.layout(), layout, err.to_string()).with_source(err)
        }),
        None => Ok(TimeLayout::default()),
    }
}

fn non_empty(tag: Option<&str>) -> Option<String> {
    tag.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn infer_kind(shape: &Shape) -> Option<WireKind> {
    match shape.unwrap_optional() {
        Shape::String | Shape::Time => Some(WireKind::S),
        Shape::Integer | Shape::Float => Some(WireKind::N),
        Shape::Bool => Some(WireKind::Bool),
        Shape::Blob => Some(WireKind::B),
        Shape::List(_) => Some(WireKind::L),
        Shape::StringSet => Some(WireKind::Ss),
        Shape::Record => Some(WireKind::M),
        Shape::Opaque | Shape::Optional(_) => None,
    }
}

fn no_default_kind() -> Error {
    Error::conversion("this type has no default attribute type")
}

fn element_spec(
    shape: &Shape,
    precision: Option<usize>,
    layout: &TimeLayout,
    missing_kind: &impl Fn() -> Error,
) -> Result<Option<Box<ValueSpec>>, Error> {
    let Shape::List(element) = shape.unwrap_optional() else {
        return Ok(None);
    };
    let element = element.unwrap_optional();
    Ok(Some(Box::new(ValueSpec {
        kind: infer_kind(element).ok_or_else(missing_kind)?,
        precision,
        layout: layout.clone(),
        element: element_spec(element, precision, layout, missing_kind)?,
    })))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ErrorKind;
    use pretty_assertions::assert_eq;

    fn compile(decls: &[FieldDecl]) -> Result<RecordDescriptor, Error> {
        RecordDescriptor::compile("Person", decls, &TagNames::default())
    }

    #[test]
    fn attribute_names_default_to_field_names() {
        let descriptor = compile(&[
            FieldDecl::new("name", Shape::String).with_tags(&[("attr", "PK")]),
            FieldDecl::new("age", Shape::Integer),
        ])
        .unwrap();
        let attributes: Vec<_> = descriptor.fields().iter().map(|f| f.attribute()).collect();
        assert_eq!(vec!["PK", "age"], attributes);
    }

    #[test]
    fn excluded_and_hidden_fields_are_dropped() {
        let descriptor = compile(&[
            FieldDecl::new("name", Shape::String),
            FieldDecl::new("scratch", Shape::String).with_tags(&[("attr", "-")]),
            FieldDecl::hidden("secret"),
            FieldDecl::new("age", Shape::Integer),
        ])
        .unwrap();
        let positions: Vec<_> = descriptor.fields().iter().map(|f| f.position()).collect();
        assert_eq!(vec![0, 3], positions);
    }

    #[test]
    fn kinds_are_inferred_from_shape() {
        let descriptor = compile(&[
            FieldDecl::new("a", Shape::Optional(Box::new(Shape::Integer))),
            FieldDecl::new("b", Shape::Time),
            FieldDecl::new("c", Shape::List(Box::new(Shape::Float))),
            FieldDecl::new("d", Shape::StringSet),
            FieldDecl::new("e", Shape::Record),
            FieldDecl::new("f", Shape::Blob),
            FieldDecl::new("g", Shape::Bool),
        ])
        .unwrap();
        let kinds: Vec<_> = descriptor.fields().iter().map(|f| f.spec().kind()).collect();
        assert_eq!(
            vec![
                WireKind::N,
                WireKind::S,
                WireKind::L,
                WireKind::Ss,
                WireKind::M,
                WireKind::B,
                WireKind::Bool
            ],
            kinds
        );
        let element = descriptor.fields()[2].spec().element().unwrap();
        assert_eq!(WireKind::N, element.kind());
        assert_eq!(None, element.precision());
    }

    #[test]
    fn explicit_kind_wins() {
        let descriptor = compile(&[FieldDecl::new("created", Shape::Time).with_tags(&[("type", "N")])])
            .unwrap();
        assert_eq!(WireKind::N, descriptor.fields()[0].spec().kind());
    }

    #[test]
    fn template_forces_string_kind_except_for_sets() {
        let descriptor = compile(&[
            FieldDecl::new("age", Shape::Integer).with_tags(&[("fmt", "Age#{}")]),
            FieldDecl::new("tags", Shape::StringSet).with_tags(&[("fmt", "Tag#{}")]),
        ])
        .unwrap();
        assert_eq!(WireKind::S, descriptor.fields()[0].spec().kind());
        assert_eq!(WireKind::Ss, descriptor.fields()[1].spec().kind());
    }

    #[test]
    fn float_precision_defaults_only_without_template() {
        let descriptor = compile(&[
            FieldDecl::new("score", Shape::Float),
            FieldDecl::new("ratio", Shape::Float).with_tags(&[("prec", "2")]),
            FieldDecl::new("label", Shape::Float).with_tags(&[("fmt", "R#{}")]),
            FieldDecl::new("count", Shape::Integer),
        ])
        .unwrap();
        let precisions: Vec<_> = descriptor
            .fields()
            .iter()
            .map(|f| f.spec().precision())
            .collect();
        assert_eq!(vec![Some(14), Some(2), None, None], precisions);
    }

    #[test]
    fn index_and_copy_annotations() {
        let descriptor = compile(&[
            FieldDecl::new("name", Shape::String).with_tags(&[
                ("idx", "primary"),
                ("copy", "SK, GSI1PK,"),
                ("copyidx", "GSI1PK"),
            ]),
            FieldDecl::new("age", Shape::Integer),
        ])
        .unwrap();
        let name = descriptor.field("name").unwrap();
        assert_eq!(Some("primary"), name.index());
        assert_eq!(&["SK".to_string(), "GSI1PK".to_string()], name.copy_to());
        assert_eq!(Some("GSI1PK"), name.copy_to_index());
        assert!(name.writes("GSI1PK"));
        assert!(descriptor.is_top_level());
        assert_eq!(None, descriptor.field("age").unwrap().index());
    }

    #[test]
    fn sibling_placeholders_resolve_to_stored_fields() {
        let descriptor = compile(&[
            FieldDecl::hidden("secret"),
            FieldDecl::new("team", Shape::String),
            FieldDecl::new("name", Shape::String).with_tags(&[("fmt", "Team#{team}#Person#{}")]),
        ])
        .unwrap();
        let template = descriptor.field("name").unwrap().template();
        assert_eq!(vec!["team", ""], template.placeholders().collect::<Vec<_>>());
        assert!(!descriptor.is_top_level());
    }

    #[test]
    fn excluded_fields_remain_template_targets() {
        let descriptor = compile(&[
            FieldDecl::new("team", Shape::Time).with_tags(&[("attr", "-"), ("layout", "unix")]),
            FieldDecl::new("name", Shape::String)
                .with_tags(&[("attr", "PK"), ("fmt", "Team#{team}#Person#{}")]),
        ])
        .unwrap();
        assert_eq!(1, descriptor.fields().len());
        let team = &descriptor.excluded_fields()[0];
        assert_eq!(("team", 0, "-"), (team.name(), team.position(), team.attribute()));
        assert_eq!(&TimeLayout::UnixSeconds, team.spec().layout());
        assert_eq!("team", descriptor.sibling(1).unwrap().name());
        assert_eq!("name", descriptor.sibling(0).unwrap().name());
        assert!(descriptor.sibling(2).is_none());
        assert!(descriptor.field("team").is_none());
    }

    #[test]
    fn invalid_annotations_are_descriptor_errors() {
        let cases: [(&'static [(&'static str, &'static str)], &str, Shape); 4] = [
            (&[("prec", "two")], "prec", Shape::Float),
            (&[("type", "NS")], "type", Shape::String),
            (&[("fmt", "Org#{secret}")], "fmt", Shape::String),
            (&[("layout", "[year")], "layout", Shape::Time),
        ];
        for (tags, key, shape) in cases {
            let err = compile(&[
                FieldDecl::hidden("secret"),
                FieldDecl::new("field", shape).with_tags(tags),
            ])
            .unwrap_err();
            assert!(err.is_descriptor_error(), "{err}");
            assert_eq!(Some("field"), err.attribute());
            assert_eq!(Some("Person"), err.record());
            match err.kind() {
                ErrorKind::InvalidAnnotation { key: actual, .. } => assert_eq!(key, actual),
                other => panic!("unexpected error kind {other:?}"),
            }
        }
    }

    #[test]
    fn opaque_fields_need_an_explicit_kind() {
        let err = compile(&[FieldDecl::new("custom", Shape::Opaque)]).unwrap_err();
        assert_eq!(
            "invalid `type` annotation: this field's type has no default attribute type (attribute 'custom' of Person)",
            err.to_string()
        );
        let descriptor =
            compile(&[FieldDecl::new("custom", Shape::Opaque).with_tags(&[("type", "S")])]).unwrap();
        assert_eq!(WireKind::S, descriptor.fields()[0].spec().kind());
    }

    #[test]
    fn annotation_keys_are_configurable() {
        let tags = TagNames::default().with_attribute("name").with_template("format");
        let descriptor = RecordDescriptor::compile(
            "Person",
            &[FieldDecl::new("id", Shape::String).with_tags(&[("name", "PK"), ("format", "P#{}")])],
            &tags,
        )
        .unwrap();
        assert_eq!("PK", descriptor.fields()[0].attribute());
        assert_eq!("P#{}", descriptor.fields()[0].template().source());
    }

    #[test]
    fn inferred_spec_for_standalone_values() {
        let spec = ValueSpec::inferred(&Shape::Optional(Box::new(Shape::Float))).unwrap();
        assert_eq!(WireKind::N, spec.kind());
        assert_eq!(Some(DEFAULT_FLOAT_PRECISION), spec.precision());
        assert!(ValueSpec::inferred(&Shape::Opaque).is_err());
    }
}
