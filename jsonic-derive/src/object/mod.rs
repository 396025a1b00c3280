// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_quote, Data, DeriveInput, Fields, GenericParam};

pub mod field_meta;

use field_meta::{field_name, parse_field_meta};

/// Container attributes from `#[jsonic(...)]` on the struct itself.
#[derive(Debug, Default)]
struct ContainerAttrs {
    marshaler: bool,
    text_marshaler: bool,
}

fn parse_container_attrs(ast: &DeriveInput) -> syn::Result<ContainerAttrs> {
    let mut attrs = ContainerAttrs::default();
    for attr in &ast.attrs {
        if !attr.path().is_ident("jsonic") {
            continue;
        }
        attr.parse_nested_meta(|nested| {
            if nested.path.is_ident("marshaler") {
                attrs.marshaler = true;
            } else if nested.path.is_ident("text_marshaler") {
                attrs.text_marshaler = true;
            } else {
                return Err(nested.error(
                    "unknown jsonic container attribute, expected `marshaler` or `text_marshaler`",
                ));
            }
            Ok(())
        })?;
    }
    Ok(attrs)
}

pub fn derive_reflect(ast: &DeriveInput) -> TokenStream {
    match expand(ast) {
        Ok(ts) => ts,
        Err(err) => err.to_compile_error(),
    }
}

fn expand(ast: &DeriveInput) -> syn::Result<TokenStream> {
    let name = &ast.ident;
    let fields = match &ast.data {
        Data::Struct(s) => match &s.fields {
            Fields::Named(named) => &named.named,
            Fields::Unit => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Reflect cannot be derived for unit structs, they have no JSON fields",
                ))
            }
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Reflect can only be derived for structs with named fields",
                ))
            }
        },
        Data::Enum(_) => {
            return Err(syn::Error::new_spanned(
                name,
                "Reflect cannot be derived for enums, implement it by hand as an opaque type",
            ))
        }
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                name,
                "Reflect cannot be derived for unions",
            ))
        }
    };
    let container = parse_container_attrs(ast)?;

    let mut generics = ast.generics.clone();
    for param in generics.params.iter_mut() {
        if let GenericParam::Type(tp) = param {
            tp.bounds.push(parse_quote!(jsonic_core::reflect::Reflect));
        }
    }
    if !ast.generics.params.is_empty() {
        let where_clause = generics.make_where_clause();
        for field in fields {
            if parse_field_meta(field)?.skip {
                continue;
            }
            let ty = &field.ty;
            where_clause
                .predicates
                .push(parse_quote!(#ty: jsonic_core::reflect::Reflect));
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let mut getters = Vec::new();
    let mut shapes = Vec::new();
    for field in fields {
        let meta = parse_field_meta(field)?;
        if meta.skip {
            continue;
        }
        let (Some(ident), Some(json_name)) = (field.ident.as_ref(), field_name(field)) else {
            continue;
        };
        let ty = &field.ty;
        let get = format_ident!("__jsonic_get_{}", json_name);
        let get_mut = format_ident!("__jsonic_get_mut_{}", json_name);
        getters.push(quote! {
            #[doc(hidden)]
            fn #get(
                v: &dyn ::std::any::Any,
            ) -> ::std::result::Result<&dyn ::std::any::Any, jsonic_core::error::Error> {
                ::std::result::Result::Ok(
                    &jsonic_core::reflect::downcast::<Self>(v)?.#ident as &dyn ::std::any::Any,
                )
            }

            #[doc(hidden)]
            fn #get_mut(
                v: &mut dyn ::std::any::Any,
            ) -> ::std::result::Result<&mut dyn ::std::any::Any, jsonic_core::error::Error> {
                ::std::result::Result::Ok(
                    &mut jsonic_core::reflect::downcast_mut::<Self>(v)?.#ident
                        as &mut dyn ::std::any::Any,
                )
            }
        });
        let tag_keys = meta.tags.iter().map(|(k, _)| k);
        let tag_values = meta.tags.iter().map(|(_, v)| v);
        shapes.push(quote! {
            jsonic_core::reflect::FieldShape {
                name: #json_name,
                tags: vec![#((#tag_keys, #tag_values)),*],
                descriptor: <#ty as jsonic_core::reflect::Reflect>::type_descriptor,
                get: Self::#get,
                get_mut: Self::#get_mut,
            }
        });
    }

    let marshaler = container.marshaler.then(|| {
        quote! { .with_marshaler(jsonic_core::reflect::marshaler_hooks::<Self>()) }
    });
    let text_marshaler = container.text_marshaler.then(|| {
        quote! { .with_text_marshaler(jsonic_core::reflect::text_marshaler_hooks::<Self>()) }
    });

    Ok(quote! {
        const _: () = {
            impl #impl_generics #name #ty_generics #where_clause {
                #(#getters)*
            }

            impl #impl_generics jsonic_core::reflect::Reflect for #name #ty_generics #where_clause {
                fn type_descriptor() -> jsonic_core::reflect::TypeDescriptor {
                    jsonic_core::reflect::TypeDescriptor::new::<Self>(
                        jsonic_core::reflect::Kind::Struct(jsonic_core::reflect::StructShape {
                            fields: vec![#(#shapes),*],
                        }),
                    )
                    #marshaler
                    #text_marshaler
                }
            }
        };
    })
}
