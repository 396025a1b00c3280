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

//! Hooks that substitute, wrap or reshape the codecs the compiler produces.
//!
//! Extensions live in three tiers consulted in a fixed order: the global
//! ones registered on the [`Registry`](crate::registry::Registry), the
//! configuration-level one derived from the frozen flags, and the extra
//! ones registered on a single frozen configuration.

use std::collections::HashMap;
use std::sync::Arc;

use crate::codec::dynamic::ValueDecoder;
use crate::codec::primitive::{HtmlEscapedStringEncoder, LossyF32Encoder, LossyF64Encoder};
use crate::codec::raw::ValidatingRawMessageEncoder;
use crate::codec::struct_::StructDescriptor;
use crate::codec::{DecoderRef, EncoderRef};
use crate::config::Config;
use crate::reflect::{TypeDescriptor, TypeIdentity};
use crate::value::{RawMessage, Value};

/// Every method defaults to leaving the compiler's choice untouched.
pub trait Extension: Send + Sync {
    /// Supplies a decoder instead of building one. The first extension to
    /// answer wins and its decoder still goes through decoration.
    fn create_decoder(&self, _ty: &TypeDescriptor) -> Option<DecoderRef> {
        None
    }

    fn create_encoder(&self, _ty: &TypeDescriptor) -> Option<EncoderRef> {
        None
    }

    /// Edits the field bindings of a struct before its codec is assembled.
    fn update_struct_descriptor(&self, _descriptor: &mut StructDescriptor) {}

    fn decorate_decoder(&self, _ty: &TypeDescriptor, decoder: DecoderRef) -> DecoderRef {
        decoder
    }

    fn decorate_encoder(&self, _ty: &TypeDescriptor, encoder: EncoderRef) -> EncoderRef {
        encoder
    }
}

/// Fixed codecs keyed by type.
///
/// The configuration-level extension is one of these, filled from the
/// frozen flags. It is also a convenient way to register a handful of
/// hand-written codecs as an extra extension.
#[derive(Default)]
pub struct TypeCodecExtension {
    decoders: HashMap<TypeIdentity, DecoderRef>,
    encoders: HashMap<TypeIdentity, EncoderRef>,
}

impl TypeCodecExtension {
    pub fn new() -> TypeCodecExtension {
        TypeCodecExtension::default()
    }

    pub fn with_decoder<T: 'static>(mut self, decoder: DecoderRef) -> TypeCodecExtension {
        self.decoders.insert(TypeIdentity::of::<T>(), decoder);
        self
    }

    pub fn with_encoder<T: 'static>(mut self, encoder: EncoderRef) -> TypeCodecExtension {
        self.encoders.insert(TypeIdentity::of::<T>(), encoder);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty() && self.encoders.is_empty()
    }

    pub(crate) fn from_config(config: &Config) -> TypeCodecExtension {
        let mut extension = TypeCodecExtension::new();
        if config.escape_html {
            extension = extension.with_encoder::<String>(Arc::new(HtmlEscapedStringEncoder));
        }
        if config.marshal_float_with_6_digits {
            extension = extension
                .with_encoder::<f32>(Arc::new(LossyF32Encoder))
                .with_encoder::<f64>(Arc::new(LossyF64Encoder));
        }
        if config.validate_raw_message {
            extension = extension.with_encoder::<RawMessage>(Arc::new(ValidatingRawMessageEncoder));
        }
        if config.use_number {
            extension = extension.with_decoder::<Value>(Arc::new(ValueDecoder::new(true)));
        }
        extension
    }
}

impl Extension for TypeCodecExtension {
    fn create_decoder(&self, ty: &TypeDescriptor) -> Option<DecoderRef> {
        self.decoders.get(&ty.identity).cloned()
    }

    fn create_encoder(&self, ty: &TypeDescriptor) -> Option<EncoderRef> {
        self.encoders.get(&ty.identity).cloned()
    }
}
