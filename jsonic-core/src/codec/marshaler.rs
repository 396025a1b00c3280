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

//! Types that convert themselves.
//!
//! A type implementing [`Marshaler`] and [`Unmarshaler`] emits and consumes
//! its own JSON text. A type implementing [`TextMarshaler`] and
//! [`TextUnmarshaler`] has a plain-text form that is written as a JSON
//! string. Descriptors expose either pair through
//! [`marshaler_hooks`](crate::reflect::marshaler_hooks) or
//! [`text_marshaler_hooks`](crate::reflect::text_marshaler_hooks).

use std::any::Any;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

use super::{Decoder, Encoder, EncoderRef};
use crate::error::Error;
use crate::reflect::{Kind, MarshalerHooks, TextMarshalerHooks, TypeDescriptor};
use crate::resolver::context::{ReadContext, WriteContext};

pub trait Marshaler {
    fn marshal_json(&self) -> Result<Vec<u8>, Error>;
}

pub trait Unmarshaler {
    /// Receives the complete JSON text of one value, `null` included.
    fn unmarshal_json(&mut self, data: &[u8]) -> Result<(), Error>;
}

pub trait TextMarshaler {
    fn marshal_text(&self) -> Result<String, Error>;
}

pub trait TextUnmarshaler {
    fn unmarshal_text(&mut self, text: &str) -> Result<(), Error>;
}

/// Emptiness test for a type whose encoder is a marshaler, derived from
/// its structural kind.
#[derive(Clone)]
pub enum EmptyCheck {
    Never,
    Encoder(EncoderRef),
    Len(fn(&dyn Any) -> Result<usize, Error>),
    Optional(fn(&dyn Any) -> Result<Option<&dyn Any>, Error>),
}

impl EmptyCheck {
    pub fn check(&self, source: &dyn Any) -> bool {
        match self {
            EmptyCheck::Never => false,
            EmptyCheck::Encoder(encoder) => encoder.is_empty(source),
            EmptyCheck::Len(len) => len(source).is_ok_and(|n| n == 0),
            EmptyCheck::Optional(get) => get(source).is_ok_and(|held| held.is_none()),
        }
    }

    pub(crate) fn of(ty: &TypeDescriptor) -> EmptyCheck {
        match &ty.kind {
            Kind::Primitive(p) => EmptyCheck::Encoder(super::primitive::native_encoder(*p)),
            Kind::Sequence(shape) => EmptyCheck::Len(shape.len),
            Kind::Map(shape) => EmptyCheck::Len(shape.len),
            Kind::Optional(shape) => EmptyCheck::Optional(shape.get),
            _ => EmptyCheck::Never,
        }
    }
}

pub struct MarshalerEncoder {
    hooks: MarshalerHooks,
    empty: EmptyCheck,
}

impl MarshalerEncoder {
    pub fn new(hooks: MarshalerHooks, empty: EmptyCheck) -> MarshalerEncoder {
        MarshalerEncoder { hooks, empty }
    }
}

impl Encoder for MarshalerEncoder {
    fn encode(&self, source: &dyn Any, ctx: &mut WriteContext<'_>) {
        let Some(mut bytes) = ctx.track((self.hooks.marshal)(source)) else {
            return;
        };
        if bytes.last() == Some(&b'\n') {
            bytes.pop();
        }
        ctx.writer.write_raw(&bytes);
    }

    fn is_empty(&self, source: &dyn Any) -> bool {
        self.empty.check(source)
    }
}

pub struct UnmarshalerDecoder {
    hooks: MarshalerHooks,
}

impl UnmarshalerDecoder {
    pub fn new(hooks: MarshalerHooks) -> UnmarshalerDecoder {
        UnmarshalerDecoder { hooks }
    }
}

impl Decoder for UnmarshalerDecoder {
    fn decode(&self, target: &mut dyn Any, ctx: &mut ReadContext<'_>) {
        let Some(bytes) = ctx.read(|r| r.skip_and_return_bytes()) else {
            return;
        };
        if let Err(err) = (self.hooks.unmarshal)(target, bytes) {
            let err = ctx.reader.error("unmarshalerDecoder", &err.to_string());
            ctx.report_error(err);
        }
    }
}

/// Writes the text form through the compiled `String` encoder, so string
/// escaping options apply to it.
pub struct TextMarshalerEncoder {
    hooks: TextMarshalerHooks,
    string_encoder: EncoderRef,
    empty: EmptyCheck,
}

impl TextMarshalerEncoder {
    pub fn new(
        hooks: TextMarshalerHooks,
        string_encoder: EncoderRef,
        empty: EmptyCheck,
    ) -> TextMarshalerEncoder {
        TextMarshalerEncoder {
            hooks,
            string_encoder,
            empty,
        }
    }
}

impl Encoder for TextMarshalerEncoder {
    fn encode(&self, source: &dyn Any, ctx: &mut WriteContext<'_>) {
        if let Some(text) = ctx.track((self.hooks.marshal_text)(source)) {
            self.string_encoder.encode(&text, ctx);
        }
    }

    fn is_empty(&self, source: &dyn Any) -> bool {
        self.empty.check(source)
    }
}

pub struct TextUnmarshalerDecoder {
    hooks: TextMarshalerHooks,
}

impl TextUnmarshalerDecoder {
    pub fn new(hooks: TextMarshalerHooks) -> TextUnmarshalerDecoder {
        TextUnmarshalerDecoder { hooks }
    }
}

impl Decoder for TextUnmarshalerDecoder {
    fn decode(&self, target: &mut dyn Any, ctx: &mut ReadContext<'_>) {
        if ctx.read(|r| r.read_null()) != Some(false) {
            return;
        }
        let Some(text) = ctx.read(|r| r.read_str()) else {
            return;
        };
        if let Err(err) = (self.hooks.unmarshal_text)(target, &text) {
            let err = ctx.reader.error("textUnmarshalerDecoder", &err.to_string());
            ctx.report_error(err);
        }
    }
}

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

impl TextMarshaler for NaiveDate {
    fn marshal_text(&self) -> Result<String, Error> {
        Ok(self.format(DATE_FORMAT).to_string())
    }
}

impl TextUnmarshaler for NaiveDate {
    fn unmarshal_text(&mut self, text: &str) -> Result<(), Error> {
        *self = NaiveDate::parse_from_str(text, DATE_FORMAT)
            .map_err(|e| Error::decode(format!("invalid date {text:?}: {e}")))?;
        Ok(())
    }
}

impl TextMarshaler for NaiveDateTime {
    fn marshal_text(&self) -> Result<String, Error> {
        Ok(self.format(DATE_TIME_FORMAT).to_string())
    }
}

impl TextUnmarshaler for NaiveDateTime {
    fn unmarshal_text(&mut self, text: &str) -> Result<(), Error> {
        *self = NaiveDateTime::parse_from_str(text, DATE_TIME_FORMAT)
            .map_err(|e| Error::decode(format!("invalid date-time {text:?}: {e}")))?;
        Ok(())
    }
}

impl TextMarshaler for DateTime<Utc> {
    fn marshal_text(&self) -> Result<String, Error> {
        Ok(self.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

impl TextUnmarshaler for DateTime<Utc> {
    fn unmarshal_text(&mut self, text: &str) -> Result<(), Error> {
        *self = DateTime::parse_from_rfc3339(text)
            .map_err(|e| Error::decode(format!("invalid RFC 3339 timestamp {text:?}: {e}")))?
            .with_timezone(&Utc);
        Ok(())
    }
}
