/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Errors produced while compiling descriptors and converting values.

use std::error::Error as StdError;
use std::fmt;

use crate::value::WireKind;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Error returned by descriptor compilation, marshalling, unmarshalling and key derivation.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    attribute: Option<String>,
    record: Option<&'static str>,
    source: Option<BoxError>,
}

/// The kind of error that occurred.
#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A field annotation could not be compiled into a descriptor.
    InvalidAnnotation {
        /// The annotation key, e.g. `prec`.
        key: String,
        /// The annotation value as written.
        value: String,
        /// Why the value was rejected.
        message: String,
    },
    /// A value could not be converted between its native and wire forms.
    Conversion {
        /// Description of why the conversion failed.
        message: String,
    },
    /// A stored attribute had a different wire type than the field expects.
    InvalidType {
        /// The expected DynamoDB type.
        expected: &'static str,
        /// The DynamoDB type found.
        actual: &'static str,
    },
    /// The field's native type cannot be encoded as the requested wire kind.
    UnsupportedKind {
        /// The requested wire kind.
        kind: WireKind,
    },
    /// A value was absent where one was required, such as a `None` list element.
    NullValue,
    /// A template placeholder did not match the stored string while strict matching was enabled.
    TemplateMismatch {
        /// The placeholder's name; empty for the field's own `{}` placeholder.
        placeholder: String,
    },
}

impl Error {
    fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            attribute: None,
            record: None,
            source: None,
        }
    }

    /// Creates an error for an annotation that could not be compiled.
    pub fn invalid_annotation(
        key: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::InvalidAnnotation {
            key: key.into(),
            value: value.into(),
            message: message.into(),
        })
    }

    /// Creates a conversion error.
    pub fn conversion(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conversion {
            message: message.into(),
        })
    }

    /// Creates an error for a stored value of the wrong wire type.
    pub fn invalid_type(expected: &'static str, actual: &'static str) -> Self {
        Self::new(ErrorKind::InvalidType { expected, actual })
    }

    /// Creates an error for a wire kind the native type does not support.
    pub fn unsupported_kind(kind: WireKind) -> Self {
        Self::new(ErrorKind::UnsupportedKind { kind })
    }

    /// Creates an error for a missing value.
    pub fn null_value() -> Self {
        Self::new(ErrorKind::NullValue)
    }

    /// Creates an error for a template placeholder that matched nothing.
    pub fn template_mismatch(placeholder: impl Into<String>) -> Self {
        Self::new(ErrorKind::TemplateMismatch {
            placeholder: placeholder.into(),
        })
    }

    /// Attaches the attribute the error relates to.
    ///
    /// If an attribute is already present (an error raised inside a nested record), the new
    /// name is prepended so the attribute reads as a path like `address.city`.
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        let attribute = attribute.into();
        self.attribute = Some(match self.attribute.take() {
            Some(inner) => format!("{attribute}.{inner}"),
            None => attribute,
        });
        self
    }

    /// Attaches the record type the error relates to, unless one is already set.
    pub fn with_record(mut self, record: &'static str) -> Self {
        self.record.get_or_insert(record);
        self
    }

    /// Attaches an underlying cause.
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns the kind of error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns the attribute name (or dotted path for nested records) if available.
    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }

    /// Returns the Rust type name of the record if available.
    pub fn record(&self) -> Option<&'static str> {
        self.record
    }

    /// Returns true if this error was raised while compiling a record's descriptors.
    pub fn is_descriptor_error(&self) -> bool {
        matches!(self.kind, ErrorKind::InvalidAnnotation { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::InvalidAnnotation {
                key,
                value,
                message,
            } if value.is_empty() => write!(f, "invalid `{key}` annotation: {message}")?,
            ErrorKind::InvalidAnnotation {
                key,
                value,
                message,
            } => write!(f, "invalid `{key}` annotation `{value}`: {message}")?,
            ErrorKind::Conversion { message } => write!(f, "invalid value: {message}")?,
            ErrorKind::InvalidType { expected, actual } => {
                write!(f, "invalid type: expected {expected}, got {actual}")?
            }
            ErrorKind::UnsupportedKind { kind } => {
                write!(f, "field type cannot be encoded as {kind}")?
            }
            ErrorKind::NullValue => write!(f, "missing value")?,
            ErrorKind::TemplateMismatch { placeholder } if placeholder.is_empty() => {
                write!(f, "template placeholder `{{}}` did not match the stored value")?
            }
            ErrorKind::TemplateMismatch { placeholder } => write!(
                f,
                "template placeholder `{{{placeholder}}}` did not match the stored value"
            )?,
        }
        if let Some(attribute) = &self.attribute {
            write!(f, " (attribute '{attribute}'")?;
            if let Some(record) = self.record {
                write!(f, " of {record}")?;
            }
            write!(f, ")")?;
        } else if let Some(record) = self.record {
            write!(f, " (record {record})")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_ref().map(|err| err.as_ref() as _)
    }
}
