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

use std::any::Any;

use super::{Decoder, Encoder};
use crate::buffer::{Reader, ValueType};
use crate::reflect::{downcast, downcast_mut};
use crate::resolver::context::{ReadContext, WriteContext};
use crate::value::{Number, RawMessage};

pub struct RawMessageCodec;

impl Decoder for RawMessageCodec {
    fn decode(&self, target: &mut dyn Any, ctx: &mut ReadContext<'_>) {
        let Some(bytes) = ctx.read(|r| r.skip_and_return_bytes()) else {
            return;
        };
        if let Some(slot) = ctx.track(downcast_mut::<RawMessage>(target)) {
            slot.0.clear();
            slot.0.extend_from_slice(bytes);
        }
    }
}

impl Encoder for RawMessageCodec {
    fn encode(&self, source: &dyn Any, ctx: &mut WriteContext<'_>) {
        if let Some(raw) = ctx.track(downcast::<RawMessage>(source)) {
            if raw.0.is_empty() {
                ctx.writer.write_null();
            } else {
                ctx.writer.write_raw(&raw.0);
            }
        }
    }

    fn is_empty(&self, source: &dyn Any) -> bool {
        downcast::<RawMessage>(source).is_ok_and(|raw| raw.0.is_empty())
    }
}

/// Checks that `bytes` hold exactly one well-formed JSON value.
pub(crate) fn is_valid_json(bytes: &[u8]) -> bool {
    let mut reader = Reader::new(bytes);
    reader.skip().is_ok() && reader.is_at_end()
}

/// Raw message encoder installed by `validate_raw_message`: malformed
/// content is replaced by `null`.
pub struct ValidatingRawMessageEncoder;

impl Encoder for ValidatingRawMessageEncoder {
    fn encode(&self, source: &dyn Any, ctx: &mut WriteContext<'_>) {
        if let Some(raw) = ctx.track(downcast::<RawMessage>(source)) {
            if raw.0.is_empty() || !is_valid_json(&raw.0) {
                ctx.writer.write_null();
            } else {
                ctx.writer.write_raw(&raw.0);
            }
        }
    }

    fn is_empty(&self, source: &dyn Any) -> bool {
        RawMessageCodec.is_empty(source)
    }
}

/// Number literals kept as text. Accepts a bare number, a string or null.
pub struct NumberCodec;

impl Decoder for NumberCodec {
    fn decode(&self, target: &mut dyn Any, ctx: &mut ReadContext<'_>) {
        if ctx.has_error() {
            return;
        }
        let literal = match ctx.reader.what_is_next() {
            ValueType::String => ctx.read(|r| r.read_string()),
            ValueType::Null => ctx.read(|r| r.read_null()).map(|_| String::new()),
            _ => ctx.read(|r| r.read_number_literal()).map(str::to_string),
        };
        let Some(literal) = literal else {
            return;
        };
        if let Some(slot) = ctx.track(downcast_mut::<Number>(target)) {
            *slot = Number::new(literal);
        }
    }
}

impl Encoder for NumberCodec {
    fn encode(&self, source: &dyn Any, ctx: &mut WriteContext<'_>) {
        if let Some(n) = ctx.track(downcast::<Number>(source)) {
            if n.is_empty() {
                ctx.writer.write_byte(b'0');
            } else {
                ctx.writer.write_raw(n.as_str().as_bytes());
            }
        }
    }

    fn is_empty(&self, source: &dyn Any) -> bool {
        downcast::<Number>(source).is_ok_and(Number::is_empty)
    }
}
