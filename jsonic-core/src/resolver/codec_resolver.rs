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

//! The compilation pipeline: from a [`TypeDescriptor`] to a codec.
//!
//! For every type reached during one top-level compilation:
//!
//! 1. Extensions may create the codec outright (global, configuration-level,
//!    extra, in that order), then the registry's per-type overrides are
//!    consulted. A codec obtained this way is decorated and returned.
//! 2. Otherwise the type gets a placeholder, so a type reached again through
//!    its own fields resolves to the placeholder instead of recursing.
//! 3. The recognizers are tried in order, then the structural kind decides.
//!    Kinds with no codec yield an error codec whose failure is deferred to
//!    the first value actually converted.
//! 4. The placeholder is bound to the result and every extension decorates it.

use std::sync::Arc;

use tracing::{debug, trace};

use super::context::CompileContext;
use crate::codec::dynamic::{DynamicDecoder, DynamicEncoder, ValueDecoder, ValueEncoder};
use crate::codec::map::{
    MapDecoder, MapEncoder, MapKeyDecoder, MapKeyEncoder, SortedMapEncoder,
};
use crate::codec::marshaler::{
    EmptyCheck, MarshalerEncoder, TextMarshalerEncoder, TextUnmarshalerDecoder,
    UnmarshalerDecoder,
};
use crate::codec::option::{IndirectDecoder, IndirectEncoder, OptionalDecoder, OptionalEncoder};
use crate::codec::primitive::{native_decoder, native_encoder};
use crate::codec::raw::{NumberCodec, RawMessageCodec};
use crate::codec::sequence::{ArrayDecoder, ArrayEncoder, SequenceDecoder, SequenceEncoder};
use crate::codec::struct_::{decoder_of_struct, encoder_of_struct};
use crate::codec::{
    DecoderRef, EncoderRef, ErrorDecoder, ErrorEncoder, PlaceholderDecoder, PlaceholderEncoder,
};
use crate::reflect::{Kind, MapShape, Primitive, Reflect, TypeDescriptor};
use crate::value::{Number, RawMessage, Value};

/// A type with a fixed codec, tried before the structural kind.
struct Recognizer {
    name: &'static str,
    applies: fn(&TypeDescriptor) -> bool,
    decoder: fn(&mut CompileContext<'_>, &TypeDescriptor) -> DecoderRef,
    encoder: fn(&mut CompileContext<'_>, &TypeDescriptor) -> EncoderRef,
}

const RECOGNIZERS: [Recognizer; 6] = [
    Recognizer {
        name: "raw message",
        applies: |ty| ty.is::<RawMessage>(),
        decoder: |_, _| Arc::new(RawMessageCodec),
        encoder: |_, _| Arc::new(RawMessageCodec),
    },
    Recognizer {
        name: "number",
        applies: |ty| ty.is::<Number>(),
        decoder: |_, _| Arc::new(NumberCodec),
        encoder: |_, _| Arc::new(NumberCodec),
    },
    Recognizer {
        name: "marshaler",
        applies: |ty| ty.marshaler.is_some(),
        decoder: marshaler_decoder,
        encoder: marshaler_encoder,
    },
    Recognizer {
        name: "text marshaler",
        applies: |ty| ty.text_marshaler.is_some(),
        decoder: text_marshaler_decoder,
        encoder: text_marshaler_encoder,
    },
    Recognizer {
        name: "value",
        applies: |ty| ty.is::<Value>(),
        decoder: |_, _| Arc::new(ValueDecoder::new(false)),
        encoder: |_, _| Arc::new(ValueEncoder),
    },
    Recognizer {
        name: "native",
        applies: |ty| matches!(ty.kind, Kind::Primitive(_)),
        decoder: |ctx, ty| match ty.kind {
            Kind::Primitive(p) => native_decoder(p),
            _ => ctx.unsupported_decoder(ty),
        },
        encoder: |ctx, ty| match ty.kind {
            Kind::Primitive(p) => native_encoder(p),
            _ => ctx.unsupported_encoder(ty),
        },
    },
];

fn marshaler_decoder(ctx: &mut CompileContext<'_>, ty: &TypeDescriptor) -> DecoderRef {
    match ty.marshaler {
        Some(hooks) => Arc::new(UnmarshalerDecoder::new(hooks)),
        None => ctx.unsupported_decoder(ty),
    }
}

fn marshaler_encoder(ctx: &mut CompileContext<'_>, ty: &TypeDescriptor) -> EncoderRef {
    match ty.marshaler {
        Some(hooks) => Arc::new(MarshalerEncoder::new(hooks, EmptyCheck::of(ty))),
        None => ctx.unsupported_encoder(ty),
    }
}

fn text_marshaler_decoder(ctx: &mut CompileContext<'_>, ty: &TypeDescriptor) -> DecoderRef {
    match ty.text_marshaler {
        Some(hooks) => Arc::new(TextUnmarshalerDecoder::new(hooks)),
        None => ctx.unsupported_decoder(ty),
    }
}

fn text_marshaler_encoder(ctx: &mut CompileContext<'_>, ty: &TypeDescriptor) -> EncoderRef {
    match ty.text_marshaler {
        Some(hooks) => {
            let string_encoder = ctx.encoder_of(&String::type_descriptor());
            Arc::new(TextMarshalerEncoder::new(
                hooks,
                string_encoder,
                EmptyCheck::of(ty),
            ))
        }
        None => ctx.unsupported_encoder(ty),
    }
}

impl CompileContext<'_> {
    /// Compiles the decoder of `ty`, reusing placeholders of types already
    /// being compiled in this context.
    pub fn decoder_of(&mut self, ty: &TypeDescriptor) -> DecoderRef {
        if let Some(decoder) = self.decoder_from_extensions(ty) {
            return self.decorate_decoder(ty, decoder);
        }
        let decoder = self.create_decoder_of_type(ty);
        self.decorate_decoder(ty, decoder)
    }

    pub fn encoder_of(&mut self, ty: &TypeDescriptor) -> EncoderRef {
        if let Some(encoder) = self.encoder_from_extensions(ty) {
            return self.decorate_encoder(ty, encoder);
        }
        let encoder = self.create_encoder_of_type(ty);
        self.decorate_encoder(ty, encoder)
    }

    fn decoder_from_extensions(&self, ty: &TypeDescriptor) -> Option<DecoderRef> {
        if let Some(decoder) = self.extensions().find_map(|e| e.create_decoder(ty)) {
            return Some(decoder);
        }
        let registry = self.api().registry();
        if let Some(decoder) = registry.type_decoder(ty.name()) {
            return Some(decoder);
        }
        if let Kind::Optional(shape) = &ty.kind {
            let inner = (shape.inner)();
            if let Some(decoder) = registry.type_decoder(inner.name()) {
                return Some(Arc::new(OptionalDecoder::new(shape.clone(), decoder)));
            }
        }
        None
    }

    fn encoder_from_extensions(&self, ty: &TypeDescriptor) -> Option<EncoderRef> {
        if let Some(encoder) = self.extensions().find_map(|e| e.create_encoder(ty)) {
            return Some(encoder);
        }
        let registry = self.api().registry();
        if let Some(encoder) = registry.type_encoder(ty.name()) {
            return Some(encoder);
        }
        if let Kind::Optional(shape) = &ty.kind {
            let inner = (shape.inner)();
            if let Some(encoder) = registry.type_encoder(inner.name()) {
                return Some(Arc::new(OptionalEncoder::new(shape.clone(), encoder)));
            }
        }
        None
    }

    fn decorate_decoder(&self, ty: &TypeDescriptor, decoder: DecoderRef) -> DecoderRef {
        self.extensions()
            .fold(decoder, |decoder, e| e.decorate_decoder(ty, decoder))
    }

    fn decorate_encoder(&self, ty: &TypeDescriptor, encoder: EncoderRef) -> EncoderRef {
        self.extensions()
            .fold(encoder, |encoder, e| e.decorate_encoder(ty, encoder))
    }

    fn create_decoder_of_type(&mut self, ty: &TypeDescriptor) -> DecoderRef {
        if let Some(placeholder) = self.decoders.get(&ty.identity) {
            return placeholder.clone();
        }
        let placeholder = Arc::new(PlaceholderDecoder::new(ty.identity));
        self.decoders.insert(ty.identity, placeholder.clone());
        let decoder = self.synthesize_decoder(ty);
        placeholder.bind(decoder.clone());
        decoder
    }

    fn create_encoder_of_type(&mut self, ty: &TypeDescriptor) -> EncoderRef {
        if let Some(placeholder) = self.encoders.get(&ty.identity) {
            return placeholder.clone();
        }
        let placeholder = Arc::new(PlaceholderEncoder::new(ty.identity));
        self.encoders.insert(ty.identity, placeholder.clone());
        let encoder = self.synthesize_encoder(ty);
        placeholder.bind(encoder.clone());
        encoder
    }

    fn synthesize_decoder(&mut self, ty: &TypeDescriptor) -> DecoderRef {
        if let Some(recognizer) = RECOGNIZERS.iter().find(|r| (r.applies)(ty)) {
            trace!("{} recognized as {}", ty.name(), recognizer.name);
            return (recognizer.decoder)(self, ty);
        }
        match &ty.kind {
            Kind::Struct(shape) => decoder_of_struct(self, ty, shape),
            Kind::Array(shape) => {
                let element = self.with_prefix("[arrayElem]", |ctx| {
                    ctx.decoder_of(&(shape.element)())
                });
                Arc::new(ArrayDecoder::new(ty.identity, shape.clone(), element))
            }
            Kind::Sequence(shape) => {
                let element = self.with_prefix("[sliceElem]", |ctx| {
                    ctx.decoder_of(&(shape.element)())
                });
                Arc::new(SequenceDecoder::new(ty.identity, shape.clone(), element))
            }
            Kind::Map(shape) => {
                let key = self.map_key_decoder(shape);
                let value =
                    self.with_prefix("[mapElem]", |ctx| ctx.decoder_of(&(shape.value)()));
                Arc::new(MapDecoder::new(ty.identity, shape.clone(), key, value))
            }
            Kind::Optional(shape) => {
                let inner = self.decoder_of(&(shape.inner)());
                Arc::new(OptionalDecoder::new(shape.clone(), inner))
            }
            Kind::Indirect(shape) => {
                let inner = self.decoder_of(&(shape.inner)());
                Arc::new(IndirectDecoder::new(shape.clone(), inner))
            }
            Kind::Dynamic(shape) => Arc::new(DynamicDecoder::new(shape.clone())),
            Kind::Primitive(_) | Kind::Opaque => self.unsupported_decoder(ty),
        }
    }

    fn synthesize_encoder(&mut self, ty: &TypeDescriptor) -> EncoderRef {
        if let Some(recognizer) = RECOGNIZERS.iter().find(|r| (r.applies)(ty)) {
            trace!("{} recognized as {}", ty.name(), recognizer.name);
            return (recognizer.encoder)(self, ty);
        }
        match &ty.kind {
            Kind::Struct(shape) => encoder_of_struct(self, ty, shape),
            Kind::Array(shape) => {
                let element = self.with_prefix("[arrayElem]", |ctx| {
                    ctx.encoder_of(&(shape.element)())
                });
                Arc::new(ArrayEncoder::new(shape.clone(), element))
            }
            Kind::Sequence(shape) => {
                let element = self.with_prefix("[sliceElem]", |ctx| {
                    ctx.encoder_of(&(shape.element)())
                });
                Arc::new(SequenceEncoder::new(shape.clone(), element))
            }
            Kind::Map(shape) => {
                let key = self.map_key_encoder(shape);
                let value =
                    self.with_prefix("[mapElem]", |ctx| ctx.encoder_of(&(shape.value)()));
                if self.config().sort_map_keys {
                    Arc::new(SortedMapEncoder::new(ty.identity, shape.clone(), key, value))
                } else {
                    Arc::new(MapEncoder::new(ty.identity, shape.clone(), key, value))
                }
            }
            Kind::Optional(shape) => {
                let inner = self.encoder_of(&(shape.inner)());
                Arc::new(OptionalEncoder::new(shape.clone(), inner))
            }
            Kind::Indirect(shape) => {
                let inner = self.encoder_of(&(shape.inner)());
                Arc::new(IndirectEncoder::new(shape.clone(), inner))
            }
            Kind::Dynamic(shape) => Arc::new(DynamicEncoder::new(shape.clone())),
            Kind::Primitive(_) | Kind::Opaque => self.unsupported_encoder(ty),
        }
    }

    fn map_key_decoder(&mut self, shape: &MapShape) -> MapKeyDecoder {
        let key = (shape.key)();
        match key.kind {
            Kind::Primitive(Primitive::String) => {
                MapKeyDecoder::Direct(self.with_prefix("[mapKey]", |ctx| ctx.decoder_of(&key)))
            }
            Kind::Primitive(p) if p.is_integer() => {
                MapKeyDecoder::Quoted(self.with_prefix("[mapKey]", |ctx| ctx.decoder_of(&key)))
            }
            _ => match key.text_marshaler {
                Some(hooks) => MapKeyDecoder::Direct(Arc::new(TextUnmarshalerDecoder::new(hooks))),
                None => {
                    debug!("map key type {} has no key codec", key.name());
                    MapKeyDecoder::Unsupported(
                        format!("unsupported map key type: {}", key.name()).into(),
                    )
                }
            },
        }
    }

    fn map_key_encoder(&mut self, shape: &MapShape) -> MapKeyEncoder {
        let key = (shape.key)();
        match key.kind {
            Kind::Primitive(Primitive::String) => {
                MapKeyEncoder::Direct(self.with_prefix("[mapKey]", |ctx| ctx.encoder_of(&key)))
            }
            Kind::Primitive(p) if p.is_integer() => {
                MapKeyEncoder::Quoted(self.with_prefix("[mapKey]", |ctx| ctx.encoder_of(&key)))
            }
            _ => match key.text_marshaler {
                Some(hooks) => {
                    let string_encoder = self.encoder_of(&String::type_descriptor());
                    MapKeyEncoder::Direct(Arc::new(TextMarshalerEncoder::new(
                        hooks,
                        string_encoder,
                        EmptyCheck::Never,
                    )))
                }
                None => {
                    debug!("map key type {} has no key codec", key.name());
                    MapKeyEncoder::Unsupported(
                        format!("unsupported map key type: {}", key.name()).into(),
                    )
                }
            },
        }
    }

    fn unsupported_message(&self, ty: &TypeDescriptor) -> String {
        if self.prefix().is_empty() {
            format!("{} is unsupported type", ty.name())
        } else {
            format!("{}: {} is unsupported type", self.prefix(), ty.name())
        }
    }

    pub(crate) fn unsupported_decoder(&self, ty: &TypeDescriptor) -> DecoderRef {
        let message = self.unsupported_message(ty);
        debug!("deferred decode error: {message}");
        Arc::new(ErrorDecoder::new(message))
    }

    pub(crate) fn unsupported_encoder(&self, ty: &TypeDescriptor) -> EncoderRef {
        let message = self.unsupported_message(ty);
        debug!("deferred encode error: {message}");
        Arc::new(ErrorEncoder::new(message))
    }
}
