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

//! Codec contracts and the codecs shared by every type family.
//!
//! A [`Decoder`] fills the value behind a `&mut dyn Any` from a
//! [`ReadContext`]; an [`Encoder`] writes the value behind a `&dyn Any` to a
//! [`WriteContext`]. Neither returns an error: failures are recorded on the
//! context and the first one wins.

pub mod dynamic;
pub mod map;
pub mod marshaler;
pub mod option;
pub mod primitive;
pub mod raw;
pub mod sequence;
pub mod struct_;

use std::any::Any;
use std::borrow::Cow;
use std::sync::{Arc, OnceLock};

use crate::error::Error;
use crate::reflect::TypeIdentity;
use crate::resolver::context::{ReadContext, WriteContext};

pub trait Decoder: Send + Sync {
    fn decode(&self, target: &mut dyn Any, ctx: &mut ReadContext<'_>);
}

pub trait Encoder: Send + Sync {
    fn encode(&self, source: &dyn Any, ctx: &mut WriteContext<'_>);

    /// Whether the value counts as empty for `omitempty`.
    fn is_empty(&self, source: &dyn Any) -> bool;
}

pub type DecoderRef = Arc<dyn Decoder>;
pub type EncoderRef = Arc<dyn Encoder>;

type DecodeFn = dyn Fn(&mut dyn Any, &mut ReadContext<'_>) + Send + Sync;
type EncodeFn = dyn Fn(&dyn Any, &mut WriteContext<'_>) + Send + Sync;
type IsEmptyFn = dyn Fn(&dyn Any) -> bool + Send + Sync;

/// Decoder backed by a closure.
pub struct FnDecoder {
    decode: Box<DecodeFn>,
}

impl FnDecoder {
    pub fn new<F>(decode: F) -> FnDecoder
    where
        F: Fn(&mut dyn Any, &mut ReadContext<'_>) + Send + Sync + 'static,
    {
        FnDecoder {
            decode: Box::new(decode),
        }
    }
}

impl Decoder for FnDecoder {
    fn decode(&self, target: &mut dyn Any, ctx: &mut ReadContext<'_>) {
        (self.decode)(target, ctx)
    }
}

/// Encoder backed by closures. Without an `is_empty` closure nothing is empty.
pub struct FnEncoder {
    encode: Box<EncodeFn>,
    is_empty: Option<Box<IsEmptyFn>>,
}

impl FnEncoder {
    pub fn new<F>(encode: F) -> FnEncoder
    where
        F: Fn(&dyn Any, &mut WriteContext<'_>) + Send + Sync + 'static,
    {
        FnEncoder {
            encode: Box::new(encode),
            is_empty: None,
        }
    }

    pub fn with_is_empty<F>(mut self, is_empty: F) -> FnEncoder
    where
        F: Fn(&dyn Any) -> bool + Send + Sync + 'static,
    {
        self.is_empty = Some(Box::new(is_empty));
        self
    }
}

impl Encoder for FnEncoder {
    fn encode(&self, source: &dyn Any, ctx: &mut WriteContext<'_>) {
        (self.encode)(source, ctx)
    }

    fn is_empty(&self, source: &dyn Any) -> bool {
        self.is_empty.as_ref().is_some_and(|f| f(source))
    }
}

/// Stands in for a type with no codec. `null` is accepted and skipped; any
/// other input records the deferred error.
pub struct ErrorDecoder {
    message: Cow<'static, str>,
}

impl ErrorDecoder {
    pub fn new<S: Into<Cow<'static, str>>>(message: S) -> ErrorDecoder {
        ErrorDecoder {
            message: message.into(),
        }
    }
}

impl Decoder for ErrorDecoder {
    fn decode(&self, _target: &mut dyn Any, ctx: &mut ReadContext<'_>) {
        if let Some(false) = ctx.read(|r| r.read_null()) {
            ctx.report_error(Error::unsupported(self.message.clone()));
        }
    }
}

/// Encoder for a type with no codec. Absent values never reach it: the
/// enclosing optional writes `null` for them.
pub struct ErrorEncoder {
    message: Cow<'static, str>,
}

impl ErrorEncoder {
    pub fn new<S: Into<Cow<'static, str>>>(message: S) -> ErrorEncoder {
        ErrorEncoder {
            message: message.into(),
        }
    }
}

impl Encoder for ErrorEncoder {
    fn encode(&self, _source: &dyn Any, ctx: &mut WriteContext<'_>) {
        ctx.report_error(Error::unsupported(self.message.clone()));
    }

    fn is_empty(&self, _source: &dyn Any) -> bool {
        false
    }
}

/// Forwarding node for a type whose decoder is still being built.
///
/// Bound exactly once, when compilation of the type finishes.
pub struct PlaceholderDecoder {
    identity: TypeIdentity,
    target: OnceLock<DecoderRef>,
}

impl PlaceholderDecoder {
    pub fn new(identity: TypeIdentity) -> PlaceholderDecoder {
        PlaceholderDecoder {
            identity,
            target: OnceLock::new(),
        }
    }

    pub fn bind(&self, decoder: DecoderRef) {
        let _ = self.target.set(decoder);
    }
}

impl Decoder for PlaceholderDecoder {
    fn decode(&self, target: &mut dyn Any, ctx: &mut ReadContext<'_>) {
        match self.target.get() {
            Some(decoder) => decoder.decode(target, ctx),
            None => ctx.report_error(Error::unknown(format!(
                "decoder of {} used before it was compiled",
                self.identity
            ))),
        }
    }
}

/// Forwarding node for a type whose encoder is still being built.
pub struct PlaceholderEncoder {
    identity: TypeIdentity,
    target: OnceLock<EncoderRef>,
}

impl PlaceholderEncoder {
    pub fn new(identity: TypeIdentity) -> PlaceholderEncoder {
        PlaceholderEncoder {
            identity,
            target: OnceLock::new(),
        }
    }

    pub fn bind(&self, encoder: EncoderRef) {
        let _ = self.target.set(encoder);
    }
}

impl Encoder for PlaceholderEncoder {
    fn encode(&self, source: &dyn Any, ctx: &mut WriteContext<'_>) {
        match self.target.get() {
            Some(encoder) => encoder.encode(source, ctx),
            None => ctx.report_error(Error::unknown(format!(
                "encoder of {} used before it was compiled",
                self.identity
            ))),
        }
    }

    fn is_empty(&self, source: &dyn Any) -> bool {
        self.target.get().is_some_and(|e| e.is_empty(source))
    }
}
