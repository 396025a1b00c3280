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

//! Codecs for associative maps.
//!
//! Keys travel as JSON object member names. String keys go through the
//! compiled `String` codec, integer and bool keys are quoted, and types with
//! a text form use it. Every other key type yields a map codec that fails on
//! the first entry it meets.

use std::any::Any;
use std::borrow::Cow;

use super::{Decoder, DecoderRef, Encoder, EncoderRef};
use crate::buffer::Reader;
use crate::error::Error;
use crate::reflect::{MapShape, TypeIdentity};
use crate::resolver::context::{ReadContext, WriteContext};

pub enum MapKeyDecoder {
    /// The key decoder reads a quoted member name itself.
    Direct(DecoderRef),
    /// The key decoder reads a bare literal from inside the quotes.
    Quoted(DecoderRef),
    Unsupported(Cow<'static, str>),
}

impl MapKeyDecoder {
    fn decode(&self, key: &mut dyn Any, ctx: &mut ReadContext<'_>) {
        match self {
            MapKeyDecoder::Direct(decoder) => decoder.decode(key, ctx),
            MapKeyDecoder::Quoted(decoder) => {
                let Some(text) = ctx.read(|r| r.read_str()) else {
                    return;
                };
                ctx.decode_detached(text.as_bytes(), "numericMapKeyDecoder", |inner| {
                    decoder.decode(key, inner)
                });
            }
            MapKeyDecoder::Unsupported(message) => {
                ctx.report_error(Error::unsupported(message.clone()));
            }
        }
    }
}

pub enum MapKeyEncoder {
    Direct(EncoderRef),
    Quoted(EncoderRef),
    Unsupported(Cow<'static, str>),
}

impl MapKeyEncoder {
    fn encode(&self, key: &dyn Any, ctx: &mut WriteContext<'_>) {
        match self {
            MapKeyEncoder::Direct(encoder) => encoder.encode(key, ctx),
            MapKeyEncoder::Quoted(encoder) => {
                ctx.writer.write_byte(b'"');
                encoder.encode(key, ctx);
                ctx.writer.write_byte(b'"');
            }
            MapKeyEncoder::Unsupported(message) => {
                ctx.report_error(Error::unsupported(message.clone()));
            }
        }
    }
}

/// `null` clears the map. Members of an object are merged into it.
pub struct MapDecoder {
    identity: TypeIdentity,
    shape: MapShape,
    key: MapKeyDecoder,
    value: DecoderRef,
}

impl MapDecoder {
    pub fn new(
        identity: TypeIdentity,
        shape: MapShape,
        key: MapKeyDecoder,
        value: DecoderRef,
    ) -> MapDecoder {
        MapDecoder {
            identity,
            shape,
            key,
            value,
        }
    }

    fn decode_entries(&self, target: &mut dyn Any, ctx: &mut ReadContext<'_>) {
        let Some(is_null) = ctx.read(|r| r.read_null()) else {
            return;
        };
        if is_null {
            ctx.track((self.shape.clear)(target));
            return;
        }
        if ctx.read(|r| r.read_object_begin()) != Some(true) {
            return;
        }
        loop {
            let mut key = (self.shape.new_key)();
            self.key.decode(key.as_mut(), ctx);
            if ctx.read(|r| r.read_colon()).is_none() {
                return;
            }
            let mut value = (self.shape.new_value)();
            self.value.decode(value.as_mut(), ctx);
            if ctx.has_error() || ctx.track((self.shape.insert)(target, key, value)).is_none() {
                return;
            }
            if ctx.read(|r| r.read_object_next()) != Some(true) {
                return;
            }
        }
    }
}

impl Decoder for MapDecoder {
    fn decode(&self, target: &mut dyn Any, ctx: &mut ReadContext<'_>) {
        if !ctx.enter("ReadMap") {
            return;
        }
        self.decode_entries(target, ctx);
        ctx.leave();
        ctx.wrap_error(self.identity.name());
    }
}

pub struct MapEncoder {
    identity: TypeIdentity,
    shape: MapShape,
    key: MapKeyEncoder,
    value: EncoderRef,
}

impl MapEncoder {
    pub fn new(
        identity: TypeIdentity,
        shape: MapShape,
        key: MapKeyEncoder,
        value: EncoderRef,
    ) -> MapEncoder {
        MapEncoder {
            identity,
            shape,
            key,
            value,
        }
    }
}

impl Encoder for MapEncoder {
    fn encode(&self, source: &dyn Any, ctx: &mut WriteContext<'_>) {
        if ctx.has_error() {
            return;
        }
        let Some(entries) = ctx.track((self.shape.entries)(source)) else {
            return;
        };
        ctx.writer.begin_object();
        for (index, (key, value)) in entries.iter().enumerate() {
            ctx.writer.object_member(index == 0);
            self.key.encode(*key, ctx);
            ctx.writer.object_colon();
            self.value.encode(*value, ctx);
            if ctx.has_error() {
                ctx.wrap_error(self.identity.name());
                return;
            }
        }
        ctx.writer.end_object(entries.is_empty());
    }

    fn is_empty(&self, source: &dyn Any) -> bool {
        (self.shape.len)(source).is_ok_and(|len| len == 0)
    }
}

/// Map encoder installed by `sort_map_keys`: members are written in
/// ascending order of their decoded key text.
pub struct SortedMapEncoder {
    identity: TypeIdentity,
    shape: MapShape,
    key: MapKeyEncoder,
    value: EncoderRef,
}

impl SortedMapEncoder {
    pub fn new(
        identity: TypeIdentity,
        shape: MapShape,
        key: MapKeyEncoder,
        value: EncoderRef,
    ) -> SortedMapEncoder {
        SortedMapEncoder {
            identity,
            shape,
            key,
            value,
        }
    }

    fn encode_members(&self, source: &dyn Any, ctx: &mut WriteContext<'_>) {
        let Some(entries) = ctx.track((self.shape.entries)(source)) else {
            return;
        };
        ctx.writer.begin_object();
        let mut members = Vec::with_capacity(entries.len());
        for (key, value) in &entries {
            let encoded_key = ctx.encode_detached(|inner| self.key.encode(*key, inner));
            let encoded_value = ctx.encode_detached(|inner| self.value.encode(*value, inner));
            if ctx.has_error() {
                return;
            }
            let sort_key = match Reader::new(&encoded_key).read_string() {
                Ok(text) => text,
                Err(err) => {
                    ctx.report_error(err);
                    return;
                }
            };
            members.push((sort_key, encoded_key, encoded_value));
        }
        members.sort_by(|a, b| a.0.cmp(&b.0));
        for (index, (_, key, value)) in members.iter().enumerate() {
            ctx.writer.object_member(index == 0);
            ctx.writer.write_raw(key);
            ctx.writer.object_colon();
            ctx.writer.write_raw(value);
        }
        ctx.writer.end_object(members.is_empty());
    }
}

impl Encoder for SortedMapEncoder {
    fn encode(&self, source: &dyn Any, ctx: &mut WriteContext<'_>) {
        if ctx.has_error() {
            return;
        }
        self.encode_members(source, ctx);
        ctx.wrap_error(self.identity.name());
    }

    fn is_empty(&self, source: &dyn Any) -> bool {
        (self.shape.len)(source).is_ok_and(|len| len == 0)
    }
}
