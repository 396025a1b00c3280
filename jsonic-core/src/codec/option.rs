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

//! Codecs for `Option<T>` and for owning pointers such as `Box<T>`.

use std::any::Any;

use super::{Decoder, DecoderRef, Encoder, EncoderRef};
use crate::reflect::{IndirectShape, OptionalShape};
use crate::resolver::context::{ReadContext, WriteContext};

/// `null` clears the option. Anything else fills it, reusing a present value.
pub struct OptionalDecoder {
    shape: OptionalShape,
    inner: DecoderRef,
}

impl OptionalDecoder {
    pub fn new(shape: OptionalShape, inner: DecoderRef) -> OptionalDecoder {
        OptionalDecoder { shape, inner }
    }
}

impl Decoder for OptionalDecoder {
    fn decode(&self, target: &mut dyn Any, ctx: &mut ReadContext<'_>) {
        match ctx.read(|r| r.read_null()) {
            Some(true) => {
                ctx.track((self.shape.set_none)(target));
            }
            Some(false) => {
                if !ctx.enter("ReadOptional") {
                    return;
                }
                if let Some(held) = ctx.track((self.shape.get_or_insert)(target)) {
                    self.inner.decode(held, ctx);
                }
                ctx.leave();
            }
            None => {}
        }
    }
}

pub struct OptionalEncoder {
    shape: OptionalShape,
    inner: EncoderRef,
}

impl OptionalEncoder {
    pub fn new(shape: OptionalShape, inner: EncoderRef) -> OptionalEncoder {
        OptionalEncoder { shape, inner }
    }
}

impl Encoder for OptionalEncoder {
    fn encode(&self, source: &dyn Any, ctx: &mut WriteContext<'_>) {
        match ctx.track((self.shape.get)(source)) {
            Some(Some(held)) => self.inner.encode(held, ctx),
            Some(None) => ctx.writer.write_null(),
            None => {}
        }
    }

    fn is_empty(&self, source: &dyn Any) -> bool {
        (self.shape.get)(source).is_ok_and(|held| held.is_none())
    }
}

/// Forwards through an owning pointer to the pointee's codec.
pub struct IndirectDecoder {
    shape: IndirectShape,
    inner: DecoderRef,
}

impl IndirectDecoder {
    pub fn new(shape: IndirectShape, inner: DecoderRef) -> IndirectDecoder {
        IndirectDecoder { shape, inner }
    }
}

impl Decoder for IndirectDecoder {
    fn decode(&self, target: &mut dyn Any, ctx: &mut ReadContext<'_>) {
        if !ctx.enter("ReadPointer") {
            return;
        }
        if let Some(pointee) = ctx.track((self.shape.get_mut)(target)) {
            self.inner.decode(pointee, ctx);
        }
        ctx.leave();
    }
}

pub struct IndirectEncoder {
    shape: IndirectShape,
    inner: EncoderRef,
}

impl IndirectEncoder {
    pub fn new(shape: IndirectShape, inner: EncoderRef) -> IndirectEncoder {
        IndirectEncoder { shape, inner }
    }
}

impl Encoder for IndirectEncoder {
    fn encode(&self, source: &dyn Any, ctx: &mut WriteContext<'_>) {
        if let Some(pointee) = ctx.track((self.shape.get)(source)) {
            self.inner.encode(pointee, ctx);
        }
    }

    fn is_empty(&self, source: &dyn Any) -> bool {
        (self.shape.get)(source).is_ok_and(|pointee| self.inner.is_empty(pointee))
    }
}
