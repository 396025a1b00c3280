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

//! Codecs for values whose type is only known at runtime.

use std::any::Any;
use std::collections::BTreeMap;

use super::{Decoder, Encoder};
use crate::buffer::ValueType;
use crate::reflect::{downcast, downcast_mut, DynamicShape};
use crate::resolver::context::{ReadContext, WriteContext};
use crate::value::{Number, Value};

const MAX_VALUE_DEPTH: usize = 1000;

/// Resolves the codec of the held value on every call.
pub struct DynamicDecoder {
    shape: DynamicShape,
}

impl DynamicDecoder {
    pub fn new(shape: DynamicShape) -> DynamicDecoder {
        DynamicDecoder { shape }
    }
}

impl Decoder for DynamicDecoder {
    fn decode(&self, target: &mut dyn Any, ctx: &mut ReadContext<'_>) {
        if ctx.has_error() {
            return;
        }
        let Some(held) = ctx.track((self.shape.held_mut)(target)) else {
            return;
        };
        let decoder = ctx.api().decoder_for(&held.reflect_descriptor());
        decoder.decode(held.as_any_mut(), ctx);
    }
}

pub struct DynamicEncoder {
    shape: DynamicShape,
}

impl DynamicEncoder {
    pub fn new(shape: DynamicShape) -> DynamicEncoder {
        DynamicEncoder { shape }
    }
}

impl Encoder for DynamicEncoder {
    fn encode(&self, source: &dyn Any, ctx: &mut WriteContext<'_>) {
        if ctx.has_error() {
            return;
        }
        let Some(held) = ctx.track((self.shape.held)(source)) else {
            return;
        };
        let encoder = ctx.api().encoder_for(&held.reflect_descriptor());
        encoder.encode(held.as_any(), ctx);
    }

    fn is_empty(&self, source: &dyn Any) -> bool {
        (self.shape.held)(source)
            .is_ok_and(|held| held.as_any().downcast_ref::<Value>().is_some_and(Value::is_null))
    }
}

/// Builds a [`Value`] tree. With `use_number` set, numbers keep their
/// literal text.
pub struct ValueDecoder {
    use_number: bool,
}

impl ValueDecoder {
    pub fn new(use_number: bool) -> ValueDecoder {
        ValueDecoder { use_number }
    }

    fn read_value(&self, ctx: &mut ReadContext<'_>, depth: usize) -> Option<Value> {
        if depth > MAX_VALUE_DEPTH {
            let err = ctx.reader.error("readValue", "exceeded max depth");
            ctx.report_error(err);
            return None;
        }
        match ctx.reader.what_is_next() {
            ValueType::String => ctx.read(|r| r.read_string()).map(Value::String),
            ValueType::Number if self.use_number => ctx
                .read(|r| r.read_number_literal())
                .map(|literal| Value::Number(Number::new(literal))),
            ValueType::Number => ctx.read(|r| r.read_f64()).map(Value::Float),
            ValueType::Null => ctx.read(|r| r.read_null()).map(|_| Value::Null),
            ValueType::Bool => ctx.read(|r| r.read_bool()).map(Value::Bool),
            ValueType::Array => {
                let mut items = Vec::new();
                if ctx.read(|r| r.read_array_begin())? {
                    loop {
                        items.push(self.read_value(ctx, depth + 1)?);
                        if !ctx.read(|r| r.read_array_next())? {
                            break;
                        }
                    }
                }
                Some(Value::Array(items))
            }
            ValueType::Object => {
                let mut members = BTreeMap::new();
                if ctx.read(|r| r.read_object_begin())? {
                    loop {
                        let name = ctx.read(|r| r.read_field_name(false))?.into_owned();
                        let value = self.read_value(ctx, depth + 1)?;
                        members.insert(name, value);
                        if !ctx.read(|r| r.read_object_next())? {
                            break;
                        }
                    }
                }
                Some(Value::Object(members))
            }
            ValueType::Invalid => {
                ctx.read(|r| r.skip());
                None
            }
        }
    }
}

impl Decoder for ValueDecoder {
    fn decode(&self, target: &mut dyn Any, ctx: &mut ReadContext<'_>) {
        let Some(value) = self.read_value(ctx, 0) else {
            return;
        };
        if let Some(slot) = ctx.track(downcast_mut::<Value>(target)) {
            *slot = value;
        }
    }
}

/// Writes a [`Value`] tree, honouring the string and float flags of the
/// configuration it runs under.
pub struct ValueEncoder;

impl ValueEncoder {
    fn write_value(value: &Value, ctx: &mut WriteContext<'_>) {
        match value {
            Value::Null => ctx.writer.write_null(),
            Value::Bool(b) => ctx.writer.write_bool(*b),
            Value::Float(f) => {
                let written = if ctx.api().config().marshal_float_with_6_digits {
                    ctx.writer.write_f64_lossy(*f)
                } else {
                    ctx.writer.write_f64(*f)
                };
                ctx.track(written);
            }
            Value::Number(n) if n.is_empty() => ctx.writer.write_byte(b'0'),
            Value::Number(n) => ctx.writer.write_raw(n.as_str().as_bytes()),
            Value::String(s) => {
                if ctx.api().config().escape_html {
                    ctx.writer.write_string_html(s);
                } else {
                    ctx.writer.write_string(s);
                }
            }
            Value::Array(items) => {
                ctx.writer.begin_array();
                for (index, item) in items.iter().enumerate() {
                    ctx.writer.array_element(index == 0);
                    Self::write_value(item, ctx);
                }
                ctx.writer.end_array(items.is_empty());
            }
            Value::Object(members) => {
                ctx.writer.begin_object();
                for (index, (name, member)) in members.iter().enumerate() {
                    ctx.writer.object_field(name, index == 0);
                    Self::write_value(member, ctx);
                }
                ctx.writer.end_object(members.is_empty());
            }
        }
    }
}

impl Encoder for ValueEncoder {
    fn encode(&self, source: &dyn Any, ctx: &mut WriteContext<'_>) {
        if let Some(value) = ctx.track(downcast::<Value>(source)) {
            Self::write_value(value, ctx);
        }
    }

    fn is_empty(&self, source: &dyn Any) -> bool {
        downcast::<Value>(source).is_ok_and(Value::is_null)
    }
}
