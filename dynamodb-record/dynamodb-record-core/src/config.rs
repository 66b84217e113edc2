/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Configuration for a [`Mapper`](crate::Mapper).

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::template::TemplateMatch;
use crate::value::Item;

/// The index name used by [`Mapper::primary_key`](crate::Mapper::primary_key) when none is configured.
pub const DEFAULT_PRIMARY_INDEX: &str = "primary";

/// The annotation keys read from `#[dynamo(...)]` field attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagNames {
    attribute: String,
    kind: String,
    template: String,
    precision: String,
    layout: String,
    index: String,
    copy: String,
    copy_index: String,
}

impl Default for TagNames {
    fn default() -> Self {
        Self {
            attribute: "attr".to_string(),
            kind: "type".to_string(),
            template: "fmt".to_string(),
            precision: "prec".to_string(),
            layout: "layout".to_string(),
            index: "idx".to_string(),
            copy: "copy".to_string(),
            copy_index: "copyidx".to_string(),
        }
    }
}

impl TagNames {
    /// Key naming the stored attribute. Defaults to `attr`.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Key overriding the inferred wire kind. Defaults to `type`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Key holding a format template. Defaults to `fmt`.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Key holding the fractional digits of a float. Defaults to `prec`.
    pub fn precision(&self) -> &str {
        &self.precision
    }

    /// Key holding a time layout. Defaults to `layout`.
    pub fn layout(&self) -> &str {
        &self.layout
    }

    /// Key naming the index a field belongs to. Defaults to `idx`.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Key listing extra attributes a value is copied to. Defaults to `copy`.
    pub fn copy(&self) -> &str {
        &self.copy
    }

    /// Key naming the attribute that carries a field's value in key derivation. Defaults to `copyidx`.
    pub fn copy_index(&self) -> &str {
        &self.copy_index
    }

    /// Consume a [`TagNames`] to create a new one, setting the attribute name key
    pub fn with_attribute(mut self, key: impl Into<String>) -> Self {
        self.attribute = key.into();
        self
    }

    /// Consume a [`TagNames`] to create a new one, setting the wire kind key
    pub fn with_kind(mut self, key: impl Into<String>) -> Self {
        self.kind = key.into();
        self
    }

    /// Consume a [`TagNames`] to create a new one, setting the template key
    pub fn with_template(mut self, key: impl Into<String>) -> Self {
        self.template = key.into();
        self
    }

    /// Consume a [`TagNames`] to create a new one, setting the precision key
    pub fn with_precision(mut self, key: impl Into<String>) -> Self {
        self.precision = key.into();
        self
    }

    /// Consume a [`TagNames`] to create a new one, setting the time layout key
    pub fn with_layout(mut self, key: impl Into<String>) -> Self {
        self.layout = key.into();
        self
    }

    /// Consume a [`TagNames`] to create a new one, setting the index key
    pub fn with_index(mut self, key: impl Into<String>) -> Self {
        self.index = key.into();
        self
    }

    /// Consume a [`TagNames`] to create a new one, setting the copy key
    pub fn with_copy(mut self, key: impl Into<String>) -> Self {
        self.copy = key.into();
        self
    }

    /// Consume a [`TagNames`] to create a new one, setting the copy-to-index key
    pub fn with_copy_index(mut self, key: impl Into<String>) -> Self {
        self.copy_index = key.into();
        self
    }
}

/// A hook that appends derived attributes to the item of a top-level record.
///
/// The hook runs after marshalling any record with at least one index-annotated field. It
/// receives the finished item and the record, which can be downcast to its concrete type.
#[derive(Clone)]
pub struct AdditionalAttributes(Arc<dyn Fn(&mut Item, &dyn Any) + Send + Sync>);

impl AdditionalAttributes {
    /// Wraps a hook function.
    pub fn new(hook: impl Fn(&mut Item, &dyn Any) + Send + Sync + 'static) -> Self {
        Self(Arc::new(hook))
    }

    pub(crate) fn apply(&self, item: &mut Item, record: &dyn Any) {
        (self.0)(item, record)
    }
}

impl fmt::Debug for AdditionalAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AdditionalAttributes(..)")
    }
}

/// Configuration for a [`Mapper`](crate::Mapper).
#[derive(Debug, Clone)]
pub struct Config {
    tag_names: TagNames,
    template_match: TemplateMatch,
    primary_index: String,
    additional_attributes: Option<AdditionalAttributes>,
}

impl Default for Config {
    fn default() -> Self {
        ConfigBuilder::new().build()
    }
}

impl Config {
    /// Create a new [`ConfigBuilder`]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// The annotation keys.
    pub fn tag_names(&self) -> &TagNames {
        &self.tag_names
    }

    /// How stored strings that do not match a field's template are handled.
    pub fn template_match(&self) -> TemplateMatch {
        self.template_match
    }

    /// The index name used by [`Mapper::primary_key`](crate::Mapper::primary_key).
    pub fn primary_index(&self) -> &str {
        &self.primary_index
    }

    /// The additional attributes hook, if one is set.
    pub fn additional_attributes(&self) -> Option<&AdditionalAttributes> {
        self.additional_attributes.as_ref()
    }
}

/// A builder for [`Config`]s
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    tag_names: Option<TagNames>,
    template_match: Option<TemplateMatch>,
    primary_index: Option<String>,
    additional_attributes: Option<AdditionalAttributes>,
}

impl ConfigBuilder {
    /// Create a new `ConfigBuilder`
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the annotation keys. Unsets them (restoring the defaults) when `None` is passed.
    pub fn set_tag_names(&mut self, tag_names: Option<TagNames>) -> &mut Self {
        self.tag_names = tag_names;
        self
    }

    /// Sets the annotation keys.
    pub fn tag_names(mut self, tag_names: TagNames) -> Self {
        self.set_tag_names(Some(tag_names));
        self
    }

    /// Sets how template mismatches are handled. Defaults to [`TemplateMatch::Lenient`].
    pub fn set_template_match(&mut self, template_match: Option<TemplateMatch>) -> &mut Self {
        self.template_match = template_match;
        self
    }

    /// Sets how template mismatches are handled.
    pub fn template_match(mut self, template_match: TemplateMatch) -> Self {
        self.set_template_match(Some(template_match));
        self
    }

    /// Sets the primary index name. Defaults to `primary`.
    pub fn set_primary_index(&mut self, primary_index: Option<String>) -> &mut Self {
        self.primary_index = primary_index;
        self
    }

    /// Sets the primary index name.
    pub fn primary_index(mut self, primary_index: impl Into<String>) -> Self {
        self.set_primary_index(Some(primary_index.into()));
        self
    }

    /// Sets the additional attributes hook. Unsets it when `None` is passed.
    pub fn set_additional_attributes(
        &mut self,
        additional_attributes: Option<AdditionalAttributes>,
    ) -> &mut Self {
        self.additional_attributes = additional_attributes;
        self
    }

    /// Sets a hook that appends derived attributes to marshalled top-level records.
    pub fn additional_attributes(
        mut self,
        hook: impl Fn(&mut Item, &dyn Any) + Send + Sync + 'static,
    ) -> Self {
        self.set_additional_attributes(Some(AdditionalAttributes::new(hook)));
        self
    }

    /// Builds a [`Config`], filling unset values with their defaults.
    pub fn build(self) -> Config {
        Config {
            tag_names: self.tag_names.unwrap_or_default(),
            template_match: self.template_match.unwrap_or_default(),
            primary_index: self
                .primary_index
                .unwrap_or_else(|| DEFAULT_PRIMARY_INDEX.to_string()),
            additional_attributes: self.additional_attributes,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::value::AttrValue;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!("attr", config.tag_names().attribute());
        assert_eq!("copyidx", config.tag_names().copy_index());
        assert_eq!(TemplateMatch::Lenient, config.template_match());
        assert_eq!("primary", config.primary_index());
        assert!(config.additional_attributes().is_none());
    }

    #[test]
    fn builder_overrides() {
        let mut builder = Config::builder()
            .tag_names(TagNames::default().with_template("format"))
            .template_match(TemplateMatch::Strict);
        builder.set_primary_index(Some("main".to_string()));
        let config = builder.build();
        assert_eq!("format", config.tag_names().template());
        assert_eq!("type", config.tag_names().kind());
        assert_eq!(TemplateMatch::Strict, config.template_match());
        assert_eq!("main", config.primary_index());
    }

    #[test]
    fn hook_receives_item() {
        let config = Config::builder()
            .additional_attributes(|item, _record| {
                item.insert("Type".to_string(), AttrValue::S("Person".to_string()));
            })
            .build();
        let mut item = Item::new();
        config.additional_attributes().unwrap().apply(&mut item, &());
        assert_eq!(Some("Person"), item["Type"].as_s());
        assert_eq!(
            "AdditionalAttributes(..)",
            format!("{:?}", config.additional_attributes().unwrap())
        );
    }
}
