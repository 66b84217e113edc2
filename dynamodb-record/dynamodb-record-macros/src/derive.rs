/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use proc_macro2::{Literal, TokenStream as TokenStream2};
use quote::quote;
use syn::ext::IdentExt;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Attribute, Data, DeriveInput, Fields, Ident, Lit, Token, Type, Visibility};

/// One `key = value` or `skip` entry inside `#[dynamo(...)]`.
enum DynamoArg {
    Tag { key: Ident, value: String },
    Skip(Ident),
}

impl Parse for DynamoArg {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        // `type` is a keyword, so keys are parsed as any identifier.
        let key = input.call(Ident::parse_any)?;
        if !input.peek(Token![=]) {
            if key == "skip" {
                return Ok(DynamoArg::Skip(key));
            }
            return Err(syn::Error::new_spanned(
                key,
                "expected `key = value` or `skip`",
            ));
        }
        input.parse::<Token![=]>()?;
        let value = match input.parse::<Lit>()? {
            Lit::Str(lit) => lit.value(),
            Lit::Int(lit) => lit.base10_digits().to_string(),
            Lit::Bool(lit) => lit.value.to_string(),
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "expected a string, integer or boolean literal",
                ))
            }
        };
        Ok(DynamoArg::Tag { key, value })
    }
}

/// A named field and what the derive needs to know about it.
struct RecordField {
    name: Ident,
    ty: Type,
    stored: bool,
    tags: Vec<(String, String)>,
}

/// Implementation of `#[derive(Record)]`.
pub(crate) fn record_impl(input: DeriveInput) -> TokenStream2 {
    let ident = &input.ident;
    if !input.generics.params.is_empty() {
        return syn::Error::new_spanned(&input.generics, "generic records are not supported")
            .to_compile_error();
    }
    let Data::Struct(data) = &input.data else {
        return syn::Error::new_spanned(ident, "`Record` can only be derived for structs")
            .to_compile_error();
    };
    let Fields::Named(fields) = &data.fields else {
        return syn::Error::new_spanned(&data.fields, "only named fields are supported")
            .to_compile_error();
    };
    let fields = match fields
        .named
        .iter()
        .map(|field| {
            let name = field.ident.clone().ok_or_else(|| {
                syn::Error::new_spanned(field, "record fields must have a name")
            })?;
            let (skip, tags) = parse_dynamo_attrs(&field.attrs)?;
            Ok(RecordField {
                name,
                ty: field.ty.clone(),
                stored: !skip && matches!(field.vis, Visibility::Public(_)),
                tags,
            })
        })
        .collect::<syn::Result<Vec<_>>>()
    {
        Ok(fields) => fields,
        Err(e) => return e.to_compile_error(),
    };

    let record_name = ident.to_string();
    let decls = fields.iter().map(field_decl);
    let accessors = accessor_arms(&fields, false);
    let mut_accessors = accessor_arms(&fields, true);
    let empty_fields = fields.iter().map(|field| {
        let name = &field.name;
        let ty = &field.ty;
        if field.stored {
            quote! { #name: <#ty as ::dynamodb_record::FieldValue>::empty() }
        } else {
            quote! { #name: ::core::default::Default::default() }
        }
    });

    quote! {
        #[automatically_derived]
        impl ::dynamodb_record::FieldValue for #ident {
            fn shape() -> ::dynamodb_record::Shape {
                ::dynamodb_record::Shape::Record
            }

            fn empty() -> Self {
                Self {
                    #(#empty_fields,)*
                }
            }

            fn map(
                &self,
                mapper: &::dynamodb_record::Mapper,
            ) -> ::core::result::Result<::dynamodb_record::Item, ::dynamodb_record::Error> {
                mapper.marshal_nested(self)
            }

            fn set_map(
                &mut self,
                mapper: &::dynamodb_record::Mapper,
                item: &::dynamodb_record::Item,
            ) -> ::core::result::Result<(), ::dynamodb_record::Error> {
                mapper.unmarshal(item, self)
            }
        }

        #[automatically_derived]
        impl ::dynamodb_record::Record for #ident {
            fn fields() -> ::std::vec::Vec<::dynamodb_record::FieldDecl> {
                ::std::vec![#(#decls),*]
            }

            fn field(
                &self,
                index: usize,
            ) -> ::core::option::Option<&dyn ::dynamodb_record::FieldValue> {
                match index {
                    #(#accessors)*
                    _ => ::core::option::Option::None,
                }
            }

            fn field_mut(
                &mut self,
                index: usize,
            ) -> ::core::option::Option<&mut dyn ::dynamodb_record::FieldValue> {
                match index {
                    #(#mut_accessors)*
                    _ => ::core::option::Option::None,
                }
            }

            fn type_name() -> &'static str {
                #record_name
            }
        }
    }
}

fn parse_dynamo_attrs(attrs: &[Attribute]) -> syn::Result<(bool, Vec<(String, String)>)> {
    let mut skip = false;
    let mut tags: Vec<(String, String)> = Vec::new();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("dynamo")) {
        let args = attr.parse_args_with(Punctuated::<DynamoArg, Token![,]>::parse_terminated)?;
        for arg in args {
            match arg {
                DynamoArg::Skip(_) => skip = true,
                DynamoArg::Tag { key, value } => {
                    let key_name = key.unraw().to_string();
                    if tags.iter().any(|(existing, _)| *existing == key_name) {
                        return Err(syn::Error::new_spanned(
                            key,
                            format!("duplicate `{key_name}` annotation"),
                        ));
                    }
                    tags.push((key_name, value));
                }
            }
        }
    }
    Ok((skip, tags))
}

fn field_decl(field: &RecordField) -> TokenStream2 {
    let name = field.name.unraw().to_string();
    if !field.stored {
        return quote! { ::dynamodb_record::FieldDecl::hidden(#name) };
    }
    let ty = &field.ty;
    let tags = field.tags.iter().map(|(key, value)| quote! { (#key, #value) });
    quote! {
        ::dynamodb_record::FieldDecl::new(
            #name,
            <#ty as ::dynamodb_record::FieldValue>::shape(),
        )
        .with_tags(&[#(#tags),*])
    }
}

fn accessor_arms(fields: &[RecordField], mutable: bool) -> Vec<TokenStream2> {
    fields
        .iter()
        .enumerate()
        .filter(|(_, field)| field.stored)
        .map(|(index, field)| {
            let index = Literal::usize_unsuffixed(index);
            let name = &field.name;
            if mutable {
                quote! {
                    #index => ::core::option::Option::Some(
                        &mut self.#name as &mut dyn ::dynamodb_record::FieldValue
                    ),
                }
            } else {
                quote! {
                    #index => ::core::option::Option::Some(
                        &self.#name as &dyn ::dynamodb_record::FieldValue
                    ),
                }
            }
        })
        .collect()
}
