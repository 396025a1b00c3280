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

use std::sync::Arc;

use crate::api::FrozenConfig;
use crate::registry::Registry;

const DEFAULT_TAG_KEY: &str = "json";

/// Conversion options.
///
/// A `Config` is inert until frozen: [`Config::freeze`] turns it into a
/// [`FrozenConfig`] that owns the codec caches. Freezing equal configs on
/// the same registry returns the same instance.
///
/// ```rust
/// use jsonic_core::config::Config;
///
/// let api = Config::default().sort_map_keys(true).indention_step(2).freeze();
/// assert!(api.config().sort_map_keys);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Config {
    /// Spaces per nesting level. Zero writes compact output.
    pub indention_step: usize,
    /// Writes floats with at most six fractional digits.
    pub marshal_float_with_6_digits: bool,
    /// Escapes `<`, `>` and `&` inside strings.
    pub escape_html: bool,
    pub sort_map_keys: bool,
    /// Decodes numbers into untyped destinations as [`Number`](crate::value::Number).
    pub use_number: bool,
    /// Turns object members without a matching field into a decode error.
    pub disallow_unknown_fields: bool,
    /// Field tag key. Empty means `json`.
    pub tag_key: String,
    /// Ignores fields without a tag under the tag key.
    pub only_tagged_field: bool,
    /// Encodes malformed [`RawMessage`](crate::value::RawMessage) content as `null`.
    pub validate_raw_message: bool,
    /// Reads member names verbatim, without unescaping.
    pub object_field_must_be_simple_string: bool,
    /// Matches member names to fields exactly instead of case-insensitively.
    pub case_sensitive: bool,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Escapes HTML in strings, like the standard encoder.
    pub fn standard() -> Self {
        Config::default().escape_html(true)
    }

    /// Behaves like the standard library: HTML escaping, sorted map keys and
    /// validated raw messages.
    pub fn compatible_with_standard_library() -> Self {
        Config::default()
            .escape_html(true)
            .sort_map_keys(true)
            .validate_raw_message(true)
    }

    /// Trades exactness for speed: six-digit floats, verbatim member names,
    /// no HTML escaping.
    pub fn fastest() -> Self {
        Config::default()
            .escape_html(false)
            .marshal_float_with_6_digits(true)
            .object_field_must_be_simple_string(true)
    }

    pub fn indention_step(mut self, step: usize) -> Self {
        self.indention_step = step;
        self
    }

    pub fn marshal_float_with_6_digits(mut self, enabled: bool) -> Self {
        self.marshal_float_with_6_digits = enabled;
        self
    }

    pub fn escape_html(mut self, enabled: bool) -> Self {
        self.escape_html = enabled;
        self
    }

    pub fn sort_map_keys(mut self, enabled: bool) -> Self {
        self.sort_map_keys = enabled;
        self
    }

    pub fn use_number(mut self, enabled: bool) -> Self {
        self.use_number = enabled;
        self
    }

    pub fn disallow_unknown_fields(mut self, enabled: bool) -> Self {
        self.disallow_unknown_fields = enabled;
        self
    }

    pub fn tag_key(mut self, key: impl Into<String>) -> Self {
        self.tag_key = key.into();
        self
    }

    pub fn only_tagged_field(mut self, enabled: bool) -> Self {
        self.only_tagged_field = enabled;
        self
    }

    pub fn validate_raw_message(mut self, enabled: bool) -> Self {
        self.validate_raw_message = enabled;
        self
    }

    pub fn object_field_must_be_simple_string(mut self, enabled: bool) -> Self {
        self.object_field_must_be_simple_string = enabled;
        self
    }

    pub fn case_sensitive(mut self, enabled: bool) -> Self {
        self.case_sensitive = enabled;
        self
    }

    #[inline(always)]
    pub fn effective_tag_key(&self) -> &str {
        if self.tag_key.is_empty() {
            DEFAULT_TAG_KEY
        } else {
            &self.tag_key
        }
    }

    /// Freezes on the global registry.
    pub fn freeze(&self) -> Arc<FrozenConfig> {
        self.freeze_in(Registry::global())
    }

    /// Freezes on `registry`, sharing its global extensions and overrides.
    pub fn freeze_in(&self, registry: &Arc<Registry>) -> Arc<FrozenConfig> {
        registry.freeze(self, Vec::new())
    }
}
