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

//! Field-level metadata parsing for `#[jsonic(...)]` and `#[tag(...)]` attributes.
//!
//! - `#[jsonic(skip)]`: leave the field out of the descriptor entirely
//! - `#[tag(json = "name,omitempty", yaml = "...")]`: free-form annotations,
//!   read at compile time by whichever tag key the config selects

use syn::{Field, LitStr};

/// Represents parsed field attributes.
#[derive(Debug, Clone, Default)]
pub struct JsonicFieldMeta {
    /// Whether to skip this field entirely
    pub skip: bool,
    /// `(key, value)` pairs in declaration order
    pub tags: Vec<(String, String)>,
}

/// Parse `#[jsonic(...)]` and `#[tag(...)]` attributes from a field
pub fn parse_field_meta(field: &Field) -> syn::Result<JsonicFieldMeta> {
    let mut meta = JsonicFieldMeta::default();

    for attr in &field.attrs {
        if attr.path().is_ident("jsonic") {
            attr.parse_nested_meta(|nested| {
                if nested.path.is_ident("skip") {
                    meta.skip = true;
                    Ok(())
                } else {
                    Err(nested.error("unknown jsonic field attribute, expected `skip`"))
                }
            })?;
        } else if attr.path().is_ident("tag") {
            attr.parse_nested_meta(|nested| {
                let key = nested
                    .path
                    .get_ident()
                    .map(|ident| ident.to_string())
                    .ok_or_else(|| nested.error("tag key must be a plain identifier"))?;
                let value: LitStr = nested.value()?.parse()?;
                if meta.tags.iter().any(|(k, _)| *k == key) {
                    return Err(syn::Error::new(
                        value.span(),
                        format!("duplicate tag key `{}`", key),
                    ));
                }
                meta.tags.push((key, value.value()));
                Ok(())
            })?;
        }
    }

    Ok(meta)
}

/// The field name as written, without a raw identifier prefix.
pub fn field_name(field: &Field) -> Option<String> {
    field.ident.as_ref().map(|ident| {
        let name = ident.to_string();
        name.strip_prefix("r#").map(str::to_string).unwrap_or(name)
    })
}
