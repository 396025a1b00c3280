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

//! Fixed codecs for bool, integers, floats, strings and byte blobs, plus
//! the quoted forms selected by the `,string` tag option.

use std::any::Any;
use std::sync::Arc;

use paste::paste;

use super::{Decoder, DecoderRef, Encoder, EncoderRef};
use crate::buffer::ValueType;
use crate::error::Error;
use crate::reflect::{downcast, downcast_mut, Primitive};
use crate::resolver::context::{ReadContext, WriteContext};
use crate::util::{decode_base64, encode_base64};
use crate::value::Bytes;

macro_rules! impl_int_codec {
    ($($ty:ident => $read:ident, $write:ident as $wide:ty);* $(;)?) => {
        paste! {
            $(
                pub struct [<$ty:camel Codec>];

                impl Decoder for [<$ty:camel Codec>] {
                    fn decode(&self, target: &mut dyn Any, ctx: &mut ReadContext<'_>) {
                        if ctx.read(|r| r.read_null()) != Some(false) {
                            return;
                        }
                        let Some(wide) = ctx.read(|r| r.$read()) else {
                            return;
                        };
                        let Some(slot) = ctx.track(downcast_mut::<$ty>(target)) else {
                            return;
                        };
                        match $ty::try_from(wide) {
                            Ok(v) => *slot = v,
                            Err(_) => {
                                let err = ctx.reader.error(
                                    concat!("read_", stringify!($ty)),
                                    &format!("{wide} overflows {}", stringify!($ty)),
                                );
                                ctx.report_error(err);
                            }
                        }
                    }
                }

                impl Encoder for [<$ty:camel Codec>] {
                    fn encode(&self, source: &dyn Any, ctx: &mut WriteContext<'_>) {
                        if let Some(v) = ctx.track(downcast::<$ty>(source)) {
                            ctx.writer.$write(*v as $wide);
                        }
                    }

                    fn is_empty(&self, source: &dyn Any) -> bool {
                        downcast::<$ty>(source).is_ok_and(|v| *v == 0)
                    }
                }
            )*
        }
    };
}

impl_int_codec!(
    i8 => read_i64, write_i64 as i64;
    i16 => read_i64, write_i64 as i64;
    i32 => read_i64, write_i64 as i64;
    i64 => read_i64, write_i64 as i64;
    isize => read_i64, write_i64 as i64;
    u8 => read_u64, write_u64 as u64;
    u16 => read_u64, write_u64 as u64;
    u32 => read_u64, write_u64 as u64;
    u64 => read_u64, write_u64 as u64;
    usize => read_u64, write_u64 as u64;
);

pub struct BoolCodec;

impl Decoder for BoolCodec {
    fn decode(&self, target: &mut dyn Any, ctx: &mut ReadContext<'_>) {
        if ctx.read(|r| r.read_null()) != Some(false) {
            return;
        }
        if let Some(v) = ctx.read(|r| r.read_bool()) {
            if let Some(slot) = ctx.track(downcast_mut::<bool>(target)) {
                *slot = v;
            }
        }
    }
}

impl Encoder for BoolCodec {
    fn encode(&self, source: &dyn Any, ctx: &mut WriteContext<'_>) {
        if let Some(v) = ctx.track(downcast::<bool>(source)) {
            ctx.writer.write_bool(*v);
        }
    }

    fn is_empty(&self, source: &dyn Any) -> bool {
        downcast::<bool>(source).is_ok_and(|v| !*v)
    }
}

pub struct F32Codec;

impl Decoder for F32Codec {
    fn decode(&self, target: &mut dyn Any, ctx: &mut ReadContext<'_>) {
        if ctx.read(|r| r.read_null()) != Some(false) {
            return;
        }
        let Some(v) = ctx.read(|r| r.read_f64()) else {
            return;
        };
        let Some(slot) = ctx.track(downcast_mut::<f32>(target)) else {
            return;
        };
        let narrow = v as f32;
        if v.is_finite() && !narrow.is_finite() {
            let err = ctx.reader.error("read_f32", &format!("{v} overflows f32"));
            ctx.report_error(err);
            return;
        }
        *slot = narrow;
    }
}

impl Encoder for F32Codec {
    fn encode(&self, source: &dyn Any, ctx: &mut WriteContext<'_>) {
        if let Some(v) = ctx.track(downcast::<f32>(source)) {
            let written = ctx.writer.write_f32(*v);
            ctx.track(written);
        }
    }

    fn is_empty(&self, source: &dyn Any) -> bool {
        downcast::<f32>(source).is_ok_and(|v| *v == 0.0)
    }
}

pub struct F64Codec;

impl Decoder for F64Codec {
    fn decode(&self, target: &mut dyn Any, ctx: &mut ReadContext<'_>) {
        if ctx.read(|r| r.read_null()) != Some(false) {
            return;
        }
        if let Some(v) = ctx.read(|r| r.read_f64()) {
            if let Some(slot) = ctx.track(downcast_mut::<f64>(target)) {
                *slot = v;
            }
        }
    }
}

impl Encoder for F64Codec {
    fn encode(&self, source: &dyn Any, ctx: &mut WriteContext<'_>) {
        if let Some(v) = ctx.track(downcast::<f64>(source)) {
            let written = ctx.writer.write_f64(*v);
            ctx.track(written);
        }
    }

    fn is_empty(&self, source: &dyn Any) -> bool {
        downcast::<f64>(source).is_ok_and(|v| *v == 0.0)
    }
}

/// Six-digit `f32` encoder installed by `marshal_float_with_6_digits`.
pub struct LossyF32Encoder;

impl Encoder for LossyF32Encoder {
    fn encode(&self, source: &dyn Any, ctx: &mut WriteContext<'_>) {
        if let Some(v) = ctx.track(downcast::<f32>(source)) {
            let written = ctx.writer.write_f32_lossy(*v);
            ctx.track(written);
        }
    }

    fn is_empty(&self, source: &dyn Any) -> bool {
        F32Codec.is_empty(source)
    }
}

/// Six-digit `f64` encoder installed by `marshal_float_with_6_digits`.
pub struct LossyF64Encoder;

impl Encoder for LossyF64Encoder {
    fn encode(&self, source: &dyn Any, ctx: &mut WriteContext<'_>) {
        if let Some(v) = ctx.track(downcast::<f64>(source)) {
            let written = ctx.writer.write_f64_lossy(*v);
            ctx.track(written);
        }
    }

    fn is_empty(&self, source: &dyn Any) -> bool {
        F64Codec.is_empty(source)
    }
}

pub struct StringCodec;

impl Decoder for StringCodec {
    fn decode(&self, target: &mut dyn Any, ctx: &mut ReadContext<'_>) {
        if ctx.read(|r| r.read_null()) != Some(false) {
            return;
        }
        if let Some(v) = ctx.read(|r| r.read_str()) {
            if let Some(slot) = ctx.track(downcast_mut::<String>(target)) {
                slot.clear();
                slot.push_str(&v);
            }
        }
    }
}

impl Encoder for StringCodec {
    fn encode(&self, source: &dyn Any, ctx: &mut WriteContext<'_>) {
        if let Some(v) = ctx.track(downcast::<String>(source)) {
            ctx.writer.write_string(v);
        }
    }

    fn is_empty(&self, source: &dyn Any) -> bool {
        downcast::<String>(source).is_ok_and(|v| v.is_empty())
    }
}

/// String encoder installed by `escape_html`.
pub struct HtmlEscapedStringEncoder;

impl Encoder for HtmlEscapedStringEncoder {
    fn encode(&self, source: &dyn Any, ctx: &mut WriteContext<'_>) {
        if let Some(v) = ctx.track(downcast::<String>(source)) {
            ctx.writer.write_string_html(v);
        }
    }

    fn is_empty(&self, source: &dyn Any) -> bool {
        StringCodec.is_empty(source)
    }
}

/// Byte blobs travel as standard base64 text.
pub struct BytesCodec;

impl Decoder for BytesCodec {
    fn decode(&self, target: &mut dyn Any, ctx: &mut ReadContext<'_>) {
        if ctx.read(|r| r.read_null()) != Some(false) {
            return;
        }
        let Some(text) = ctx.read(|r| r.read_str()) else {
            return;
        };
        let Some(bytes) = ctx.track(decode_base64(&text)) else {
            return;
        };
        if let Some(slot) = ctx.track(downcast_mut::<Bytes>(target)) {
            slot.0 = bytes;
        }
    }
}

impl Encoder for BytesCodec {
    fn encode(&self, source: &dyn Any, ctx: &mut WriteContext<'_>) {
        if let Some(v) = ctx.track(downcast::<Bytes>(source)) {
            ctx.writer.write_string(&encode_base64(&v.0));
        }
    }

    fn is_empty(&self, source: &dyn Any) -> bool {
        downcast::<Bytes>(source).is_ok_and(|v| v.0.is_empty())
    }
}

pub fn native_decoder(primitive: Primitive) -> DecoderRef {
    match primitive {
        Primitive::Bool => Arc::new(BoolCodec),
        Primitive::I8 => Arc::new(I8Codec),
        Primitive::I16 => Arc::new(I16Codec),
        Primitive::I32 => Arc::new(I32Codec),
        Primitive::I64 => Arc::new(I64Codec),
        Primitive::Isize => Arc::new(IsizeCodec),
        Primitive::U8 => Arc::new(U8Codec),
        Primitive::U16 => Arc::new(U16Codec),
        Primitive::U32 => Arc::new(U32Codec),
        Primitive::U64 => Arc::new(U64Codec),
        Primitive::Usize => Arc::new(UsizeCodec),
        Primitive::F32 => Arc::new(F32Codec),
        Primitive::F64 => Arc::new(F64Codec),
        Primitive::String => Arc::new(StringCodec),
        Primitive::Bytes => Arc::new(BytesCodec),
    }
}

pub fn native_encoder(primitive: Primitive) -> EncoderRef {
    match primitive {
        Primitive::Bool => Arc::new(BoolCodec),
        Primitive::I8 => Arc::new(I8Codec),
        Primitive::I16 => Arc::new(I16Codec),
        Primitive::I32 => Arc::new(I32Codec),
        Primitive::I64 => Arc::new(I64Codec),
        Primitive::Isize => Arc::new(IsizeCodec),
        Primitive::U8 => Arc::new(U8Codec),
        Primitive::U16 => Arc::new(U16Codec),
        Primitive::U32 => Arc::new(U32Codec),
        Primitive::U64 => Arc::new(U64Codec),
        Primitive::Usize => Arc::new(UsizeCodec),
        Primitive::F32 => Arc::new(F32Codec),
        Primitive::F64 => Arc::new(F64Codec),
        Primitive::String => Arc::new(StringCodec),
        Primitive::Bytes => Arc::new(BytesCodec),
    }
}

/// Reads a number or bool from inside a quoted literal.
pub struct QuotedDecoder {
    inner: DecoderRef,
}

impl QuotedDecoder {
    pub fn new(inner: DecoderRef) -> QuotedDecoder {
        QuotedDecoder { inner }
    }
}

impl Decoder for QuotedDecoder {
    fn decode(&self, target: &mut dyn Any, ctx: &mut ReadContext<'_>) {
        if ctx.has_error() {
            return;
        }
        if ctx.reader.what_is_next() == ValueType::Null {
            self.inner.decode(target, ctx);
            return;
        }
        let Some(text) = ctx.read(|r| r.read_str()) else {
            return;
        };
        ctx.decode_detached(text.as_bytes(), "stringModeNumberDecoder", |inner_ctx| {
            self.inner.decode(target, inner_ctx)
        });
    }
}

/// Writes a number or bool inside quotes.
pub struct QuotedEncoder {
    inner: EncoderRef,
}

impl QuotedEncoder {
    pub fn new(inner: EncoderRef) -> QuotedEncoder {
        QuotedEncoder { inner }
    }
}

impl Encoder for QuotedEncoder {
    fn encode(&self, source: &dyn Any, ctx: &mut WriteContext<'_>) {
        ctx.writer.write_byte(b'"');
        self.inner.encode(source, ctx);
        ctx.writer.write_byte(b'"');
    }

    fn is_empty(&self, source: &dyn Any) -> bool {
        self.inner.is_empty(source)
    }
}

/// A string field tagged `,string`: its JSON text is itself a JSON string.
pub struct QuotedStringDecoder {
    inner: DecoderRef,
}

impl QuotedStringDecoder {
    pub fn new(inner: DecoderRef) -> QuotedStringDecoder {
        QuotedStringDecoder { inner }
    }
}

impl Decoder for QuotedStringDecoder {
    fn decode(&self, target: &mut dyn Any, ctx: &mut ReadContext<'_>) {
        if ctx.has_error() {
            return;
        }
        if ctx.reader.what_is_next() == ValueType::Null {
            self.inner.decode(target, ctx);
            return;
        }
        let Some(text) = ctx.read(|r| r.read_str()) else {
            return;
        };
        ctx.decode_detached(text.as_bytes(), "stringModeStringDecoder", |inner_ctx| {
            self.inner.decode(target, inner_ctx)
        });
    }
}

pub struct QuotedStringEncoder {
    inner: EncoderRef,
}

impl QuotedStringEncoder {
    pub fn new(inner: EncoderRef) -> QuotedStringEncoder {
        QuotedStringEncoder { inner }
    }
}

impl Encoder for QuotedStringEncoder {
    fn encode(&self, source: &dyn Any, ctx: &mut WriteContext<'_>) {
        let encoded = ctx.encode_detached(|inner_ctx| self.inner.encode(source, inner_ctx));
        match String::from_utf8(encoded) {
            Ok(text) => ctx.writer.write_string(&text),
            Err(_) => ctx.report_error(Error::encode("string field encoded to invalid utf-8")),
        }
    }

    fn is_empty(&self, source: &dyn Any) -> bool {
        self.inner.is_empty(source)
    }
}
