/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Format templates such as `Team#{team}#Person#{}`.
//!
//! A template is rendered by substituting each placeholder with a field's text. To read a
//! stored string back, every distinct placeholder gets its own anchored pattern in which that
//! placeholder captures and all others match lazily, so each referenced field can be extracted
//! independently from the one string.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error as StdError;
use std::fmt;

use crate::error::Error;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([A-Za-z0-9_]*)\}").unwrap());

/// The template used when a field has none: the field's own text, verbatim.
pub const IDENTITY_TEMPLATE: &str = "{}";

/// What to do when a placeholder's pattern does not match a stored string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemplateMatch {
    /// Leave the placeholder's field unchanged.
    #[default]
    Lenient,
    /// Fail with [`ErrorKind::TemplateMismatch`](crate::ErrorKind::TemplateMismatch).
    Strict,
}

/// The field a placeholder refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// `{}`: the field that owns the template.
    Current,
    /// `{name}`: a sibling field, by its index in the record descriptor.
    Sibling(usize),
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Placeholder(usize),
}

#[derive(Debug, Clone)]
struct Placeholder {
    name: String,
    target: Target,
    pattern: Regex,
}

/// A compiled format template.
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
    placeholders: Vec<Placeholder>,
}

impl PartialEq for Template {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
            && self
                .placeholders
                .iter()
                .map(|p| (&p.name, p.target))
                .eq(other.placeholders.iter().map(|p| (&p.name, p.target)))
    }
}

/// Error compiling a [`Template`].
#[derive(Debug)]
#[non_exhaustive]
pub enum TemplateError {
    /// A named placeholder does not refer to an accessible sibling field.
    UnknownPlaceholder(String),
    /// An extraction pattern could not be built.
    Pattern(regex::Error),
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::UnknownPlaceholder(name) => {
                write!(f, "placeholder `{{{name}}}` does not name an accessible field")
            }
            TemplateError::Pattern(_) => write!(f, "extraction pattern could not be built"),
        }
    }
}

impl StdError for TemplateError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            TemplateError::UnknownPlaceholder(_) => None,
            TemplateError::Pattern(err) => Some(err),
        }
    }
}

impl Template {
    /// Compiles `source`, resolving named placeholders to sibling field indices with `resolve`.
    pub fn compile(
        source: &str,
        resolve: impl Fn(&str) -> Option<usize>,
    ) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut names: Vec<(String, Target)> = Vec::new();
        let mut last = 0;
        for found in PLACEHOLDER.find_iter(source) {
            if found.start() > last {
                segments.push(Segment::Literal(source[last..found.start()].to_string()));
            }
            let name = &found.as_str()[1..found.as_str().len() - 1];
            let index = match names.iter().position(|(known, _)| known == name) {
                Some(index) => index,
                None => {
                    let target = if name.is_empty() {
                        Target::Current
                    } else {
                        resolve(name)
                            .map(Target::Sibling)
                            .ok_or_else(|| TemplateError::UnknownPlaceholder(name.to_string()))?
                    };
                    names.push((name.to_string(), target));
                    names.len() - 1
                }
            };
            segments.push(Segment::Placeholder(index));
            last = found.end();
        }
        if last < source.len() {
            segments.push(Segment::Literal(source[last..].to_string()));
        }

        let placeholders = names
            .into_iter()
            .enumerate()
            .map(|(index, (name, target))| {
                let pattern = extraction_pattern(&segments, index);
                Ok(Placeholder {
                    name,
                    target,
                    pattern: Regex::new(&pattern).map_err(TemplateError::Pattern)?,
                })
            })
            .collect::<Result<Vec<_>, TemplateError>>()?;

        Ok(Self {
            source: source.to_string(),
            segments,
            placeholders,
        })
    }

    /// Returns the template as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the distinct placeholder names in order of first appearance; `""` is `{}`.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.placeholders.iter().map(|p| p.name.as_str())
    }

    /// Returns true if this template renders the owning field verbatim.
    pub fn is_identity(&self) -> bool {
        matches!(self.segments.as_slice(), [Segment::Placeholder(0)])
            && self.placeholders[0].target == Target::Current
    }

    /// Renders the template, asking `text_of` for the text of each referenced field.
    pub fn render(
        &self,
        mut text_of: impl FnMut(Target) -> Result<String, Error>,
    ) -> Result<String, Error> {
        if self.is_identity() {
            return text_of(Target::Current);
        }
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => out.push_str(literal),
                Segment::Placeholder(index) => {
                    out.push_str(&text_of(self.placeholders[*index].target)?)
                }
            }
        }
        Ok(out)
    }

    /// Extracts every placeholder's text from `stored` and hands it to `assign`.
    ///
    /// Placeholders whose pattern does not match are skipped in [`TemplateMatch::Lenient`] mode.
    pub fn parse(
        &self,
        stored: &str,
        mode: TemplateMatch,
        mut assign: impl FnMut(Target, &str) -> Result<(), Error>,
    ) -> Result<(), Error> {
        if self.is_identity() {
            return assign(Target::Current, stored);
        }
        for placeholder in &self.placeholders {
            match placeholder
                .pattern
                .captures(stored)
                .and_then(|captures| captures.get(1))
            {
                Some(found) => assign(placeholder.target, found.as_str())?,
                None if mode == TemplateMatch::Strict => {
                    return Err(Error::template_mismatch(placeholder.name.as_str()))
                }
                None => tracing::trace!(
                    template = %self.source,
                    placeholder = %placeholder.name,
                    "template placeholder did not match the stored value; leaving the field unchanged"
                ),
            }
        }
        Ok(())
    }
}

fn extraction_pattern(segments: &[Segment], capture: usize) -> String {
    let mut pattern = String::from("(?s)^");
    for segment in segments {
        match segment {
            Segment::Literal(literal) => pattern.push_str(&regex::escape(literal)),
            Segment::Placeholder(index) if *index == capture => pattern.push_str("(.*?)"),
            Segment::Placeholder(_) => pattern.push_str(".*?"),
        }
    }
    pattern.push('$');
    pattern
}
