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

//! Codecs for growable sequences (`Vec<T>`) and fixed arrays (`[T; N]`).

use std::any::Any;

use super::{Decoder, DecoderRef, Encoder, EncoderRef};
use crate::reflect::{ArrayShape, SequenceShape, TypeIdentity};
use crate::resolver::context::{ReadContext, WriteContext};

pub struct SequenceDecoder {
    identity: TypeIdentity,
    shape: SequenceShape,
    element: DecoderRef,
}

impl SequenceDecoder {
    pub fn new(identity: TypeIdentity, shape: SequenceShape, element: DecoderRef) -> SequenceDecoder {
        SequenceDecoder {
            identity,
            shape,
            element,
        }
    }

    fn decode_elements(&self, target: &mut dyn Any, ctx: &mut ReadContext<'_>) {
        let Some(is_null) = ctx.read(|r| r.read_null()) else {
            return;
        };
        if ctx.track((self.shape.clear)(target)).is_none() || is_null {
            return;
        }
        if ctx.read(|r| r.read_array_begin()) != Some(true) {
            return;
        }
        loop {
            let Some(element) = ctx.track((self.shape.push_default)(target)) else {
                return;
            };
            self.element.decode(element, ctx);
            if ctx.read(|r| r.read_array_next()) != Some(true) {
                return;
            }
        }
    }
}

impl Decoder for SequenceDecoder {
    fn decode(&self, target: &mut dyn Any, ctx: &mut ReadContext<'_>) {
        if !ctx.enter("ReadArray") {
            return;
        }
        self.decode_elements(target, ctx);
        ctx.leave();
        ctx.wrap_error(self.identity.name());
    }
}

pub struct SequenceEncoder {
    shape: SequenceShape,
    element: EncoderRef,
}

impl SequenceEncoder {
    pub fn new(shape: SequenceShape, element: EncoderRef) -> SequenceEncoder {
        SequenceEncoder { shape, element }
    }
}

impl Encoder for SequenceEncoder {
    fn encode(&self, source: &dyn Any, ctx: &mut WriteContext<'_>) {
        let Some(len) = ctx.track((self.shape.len)(source)) else {
            return;
        };
        ctx.writer.begin_array();
        for index in 0..len {
            let Some(element) = ctx.track((self.shape.get)(source, index)) else {
                return;
            };
            ctx.writer.array_element(index == 0);
            self.element.encode(element, ctx);
        }
        ctx.writer.end_array(len == 0);
    }

    fn is_empty(&self, source: &dyn Any) -> bool {
        (self.shape.len)(source).is_ok_and(|len| len == 0)
    }
}

/// Fills positions in order. Surplus input elements are skipped and
/// positions the input does not reach are reset to their default.
pub struct ArrayDecoder {
    identity: TypeIdentity,
    shape: ArrayShape,
    element: DecoderRef,
}

impl ArrayDecoder {
    pub fn new(identity: TypeIdentity, shape: ArrayShape, element: DecoderRef) -> ArrayDecoder {
        ArrayDecoder {
            identity,
            shape,
            element,
        }
    }

    fn decode_elements(&self, target: &mut dyn Any, ctx: &mut ReadContext<'_>) {
        if ctx.read(|r| r.read_null()) != Some(false) {
            return;
        }
        let Some(non_empty) = ctx.read(|r| r.read_array_begin()) else {
            return;
        };
        let mut filled = 0;
        if non_empty {
            loop {
                if filled < self.shape.len {
                    let Some(element) = ctx.track((self.shape.get_mut)(target, filled)) else {
                        return;
                    };
                    self.element.decode(element, ctx);
                    filled += 1;
                } else if ctx.read(|r| r.skip()).is_none() {
                    return;
                }
                if ctx.read(|r| r.read_array_next()) != Some(true) {
                    break;
                }
            }
        }
        if ctx.has_error() {
            return;
        }
        for index in filled..self.shape.len {
            if ctx.track((self.shape.reset)(target, index)).is_none() {
                return;
            }
        }
    }
}

impl Decoder for ArrayDecoder {
    fn decode(&self, target: &mut dyn Any, ctx: &mut ReadContext<'_>) {
        if !ctx.enter("ReadArray") {
            return;
        }
        self.decode_elements(target, ctx);
        ctx.leave();
        ctx.wrap_error(self.identity.name());
    }
}

pub struct ArrayEncoder {
    shape: ArrayShape,
    element: EncoderRef,
}

impl ArrayEncoder {
    pub fn new(shape: ArrayShape, element: EncoderRef) -> ArrayEncoder {
        ArrayEncoder { shape, element }
    }
}

impl Encoder for ArrayEncoder {
    fn encode(&self, source: &dyn Any, ctx: &mut WriteContext<'_>) {
        ctx.writer.begin_array();
        for index in 0..self.shape.len {
            let Some(element) = ctx.track((self.shape.get)(source, index)) else {
                return;
            };
            ctx.writer.array_element(index == 0);
            self.element.encode(element, ctx);
        }
        ctx.writer.end_array(self.shape.len == 0);
    }

    fn is_empty(&self, _source: &dyn Any) -> bool {
        self.shape.len == 0
    }
}
