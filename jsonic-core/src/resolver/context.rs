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

use std::collections::HashMap;
use std::sync::Arc;

use crate::api::FrozenConfig;
use crate::buffer::{Reader, Writer};
use crate::codec::{PlaceholderDecoder, PlaceholderEncoder};
use crate::config::Config;
use crate::error::Error;
use crate::extension::Extension;
use crate::reflect::TypeIdentity;

/// One encode call: the output writer, the configuration it runs under and
/// the sticky error.
pub struct WriteContext<'se> {
    pub writer: &'se mut Writer,
    api: &'se FrozenConfig,
    error: Option<Error>,
}

impl<'se> WriteContext<'se> {
    pub fn new(api: &'se FrozenConfig, writer: &'se mut Writer) -> WriteContext<'se> {
        WriteContext {
            writer,
            api,
            error: None,
        }
    }

    #[inline(always)]
    pub fn api(&self) -> &'se FrozenConfig {
        self.api
    }

    #[inline(always)]
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Records `err` unless an earlier error is already recorded.
    pub fn report_error(&mut self, err: Error) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    /// Unwraps `result`, recording its error.
    #[inline(always)]
    pub fn track<T>(&mut self, result: Result<T, Error>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.report_error(e);
                None
            }
        }
    }

    /// Prefixes the recorded error with `context`.
    pub fn wrap_error(&mut self, context: &str) {
        if let Some(err) = self.error.take() {
            self.error = Some(err.with_context(context));
        }
    }

    pub fn take_error(&mut self) -> Option<Error> {
        self.error.take()
    }

    /// Runs `f` against a fresh writer that shares this writer's layout and
    /// returns what it wrote. Errors are carried over.
    pub fn encode_detached(&mut self, f: impl FnOnce(&mut WriteContext<'_>)) -> Vec<u8> {
        let mut child = self.writer.child();
        let err = {
            let mut ctx = WriteContext::new(self.api, &mut child);
            f(&mut ctx);
            ctx.take_error()
        };
        if let Some(err) = err {
            self.report_error(err);
        }
        child.bf
    }
}

/// Nesting limit for container codecs on the decode path.
pub const MAX_DECODE_DEPTH: usize = 1000;

/// One decode call: the input reader, the configuration it runs under and
/// the sticky error.
pub struct ReadContext<'de> {
    pub reader: Reader<'de>,
    api: &'de FrozenConfig,
    error: Option<Error>,
    depth: usize,
}

impl<'de> ReadContext<'de> {
    pub fn new(api: &'de FrozenConfig, reader: Reader<'de>) -> ReadContext<'de> {
        ReadContext {
            reader,
            api,
            error: None,
            depth: 0,
        }
    }

    #[inline(always)]
    pub fn api(&self) -> &'de FrozenConfig {
        self.api
    }

    #[inline(always)]
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Records `err` unless an earlier error is already recorded.
    pub fn report_error(&mut self, err: Error) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    /// Runs one scanner operation. Once an error is recorded this is a no-op
    /// returning `None`.
    #[inline(always)]
    pub fn read<T>(&mut self, op: impl FnOnce(&mut Reader<'de>) -> Result<T, Error>) -> Option<T> {
        if self.error.is_some() {
            return None;
        }
        match op(&mut self.reader) {
            Ok(v) => Some(v),
            Err(e) => {
                self.error = Some(e);
                None
            }
        }
    }

    /// Unwraps `result`, recording its error.
    #[inline(always)]
    pub fn track<T>(&mut self, result: Result<T, Error>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.report_error(e);
                None
            }
        }
    }

    /// Enters one level of container nesting. Past [`MAX_DECODE_DEPTH`] this
    /// records an error and returns `false`. Every `true` must be paired with
    /// [`leave`](Self::leave).
    #[inline]
    pub fn enter(&mut self, op: &str) -> bool {
        if self.error.is_some() {
            return false;
        }
        if self.depth >= MAX_DECODE_DEPTH {
            let err = self.reader.error(op, "exceeded max depth");
            self.error = Some(err);
            return false;
        }
        self.depth += 1;
        true
    }

    #[inline]
    pub fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Prefixes the recorded error with `context`.
    pub fn wrap_error(&mut self, context: &str) {
        if let Some(err) = self.error.take() {
            self.error = Some(err.with_context(context));
        }
    }

    pub fn take_error(&mut self) -> Option<Error> {
        self.error.take()
    }

    /// Decodes from a separate input, such as the text inside a quoted
    /// literal. The input must be consumed completely.
    pub fn decode_detached(&mut self, input: &[u8], op: &str, f: impl FnOnce(&mut ReadContext<'_>)) {
        if self.error.is_some() {
            return;
        }
        let mut child = ReadContext::new(self.api, Reader::new(input));
        f(&mut child);
        let err = match child.take_error() {
            Some(err) => Some(err),
            None if !child.reader.is_at_end() => {
                Some(child.reader.error(op, "unexpected trailing characters"))
            }
            None => None,
        };
        if let Some(err) = err {
            self.report_error(err);
        }
    }
}

/// State of one top-level compilation.
///
/// Holds the placeholders of every type whose codec is being built, so a
/// type reached again through its own fields gets the placeholder instead of
/// being compiled a second time. Dropped once the top-level codec is built.
pub struct CompileContext<'a> {
    api: &'a FrozenConfig,
    global: &'a [Arc<dyn Extension>],
    config_extension: &'a dyn Extension,
    extras: &'a [Arc<dyn Extension>],
    prefix: String,
    pub(crate) decoders: HashMap<TypeIdentity, Arc<PlaceholderDecoder>>,
    pub(crate) encoders: HashMap<TypeIdentity, Arc<PlaceholderEncoder>>,
}

impl<'a> CompileContext<'a> {
    pub fn new(
        api: &'a FrozenConfig,
        global: &'a [Arc<dyn Extension>],
        config_extension: &'a dyn Extension,
        extras: &'a [Arc<dyn Extension>],
    ) -> CompileContext<'a> {
        CompileContext {
            api,
            global,
            config_extension,
            extras,
            prefix: String::new(),
            decoders: HashMap::new(),
            encoders: HashMap::new(),
        }
    }

    pub fn api(&self) -> &'a FrozenConfig {
        self.api
    }

    pub fn config(&self) -> &'a Config {
        self.api.config()
    }

    /// Every extension in application order: global, configuration-level, extra.
    pub fn extensions(&self) -> impl Iterator<Item = &'a dyn Extension> + 'a {
        let (global, config_extension, extras) = (self.global, self.config_extension, self.extras);
        global
            .iter()
            .map(|e| &**e as &dyn Extension)
            .chain(std::iter::once(config_extension))
            .chain(extras.iter().map(|e| &**e as &dyn Extension))
    }

    /// Path of field names leading to the type being compiled, for messages.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Runs `f` with `segment` appended to the prefix.
    pub fn with_prefix<R>(&mut self, segment: &str, f: impl FnOnce(&mut Self) -> R) -> R {
        let len = self.prefix.len();
        if !self.prefix.is_empty() {
            self.prefix.push('.');
        }
        self.prefix.push_str(segment);
        let result = f(self);
        self.prefix.truncate(len);
        result
    }
}
