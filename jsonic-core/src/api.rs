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

//! The frozen configuration: codec caches plus the conversion entry points.

use std::any::Any;
use std::io::{Read, Write};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::adapter::{StreamDecoder, StreamEncoder};
use crate::buffer::{Reader, Writer};
use crate::codec::raw::is_valid_json;
use crate::codec::{Decoder, DecoderRef, Encoder, EncoderRef};
use crate::config::Config;
use crate::error::Error;
use crate::extension::{Extension, TypeCodecExtension};
use crate::reflect::{AnyReflect, Reflect, TypeDescriptor, TypeIdentity};
use crate::registry::{FrozenKey, Registry};
use crate::resolver::context::{CompileContext, ReadContext, WriteContext};
use crate::resolver::pool::Pool;
use crate::util::is_all_spaces;

/// A [`Config`] turned into a converter.
///
/// Codecs are compiled on first use of a type and cached for the lifetime of
/// the instance. All methods take `&self` and are safe to call from many
/// threads at once.
///
/// ```rust
/// use jsonic_core::config::Config;
///
/// let api = Config::standard().freeze();
/// let bytes = api.marshal(&vec![1u8, 2, 3]).unwrap();
/// assert_eq!(bytes, b"[1,2,3]");
/// let back: Vec<u8> = api.unmarshal(&bytes).unwrap();
/// assert_eq!(back, vec![1, 2, 3]);
/// ```
pub struct FrozenConfig {
    config: Config,
    registry: Arc<Registry>,
    config_extension: TypeCodecExtension,
    extra_extensions: RwLock<Vec<Arc<dyn Extension>>>,
    decoder_cache: DashMap<TypeIdentity, DecoderRef>,
    encoder_cache: DashMap<TypeIdentity, EncoderRef>,
    writer_pool: Pool<Writer>,
}

impl FrozenConfig {
    pub(crate) fn new(
        config: Config,
        registry: Arc<Registry>,
        extras: Vec<Arc<dyn Extension>>,
    ) -> FrozenConfig {
        let step = config.indention_step;
        FrozenConfig {
            config_extension: TypeCodecExtension::from_config(&config),
            config,
            registry,
            extra_extensions: RwLock::new(extras),
            decoder_cache: DashMap::new(),
            encoder_cache: DashMap::new(),
            writer_pool: Pool::new(
                move || Writer::new(step),
                move |writer: &mut Writer| {
                    writer.reset();
                    writer.set_indention_step(step);
                },
            ),
        }
    }

    #[inline(always)]
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Decoder for `ty`, compiled on first request.
    pub fn decoder_for(&self, ty: &TypeDescriptor) -> DecoderRef {
        if let Some(decoder) = self.decoder_cache.get(&ty.identity) {
            return decoder.value().clone();
        }
        let extras = self.extra_extensions.read_recursive();
        let global = self.registry.extensions();
        let mut ctx = CompileContext::new(self, &global, &self.config_extension, &extras);
        let decoder = ctx.decoder_of(ty);
        trace!(ty = ty.name(), "decoder compiled");
        self.decoder_cache
            .entry(ty.identity)
            .or_insert(decoder)
            .value()
            .clone()
    }

    /// Encoder for `ty`, compiled on first request.
    pub fn encoder_for(&self, ty: &TypeDescriptor) -> EncoderRef {
        if let Some(encoder) = self.encoder_cache.get(&ty.identity) {
            return encoder.value().clone();
        }
        let extras = self.extra_extensions.read_recursive();
        let global = self.registry.extensions();
        let mut ctx = CompileContext::new(self, &global, &self.config_extension, &extras);
        let encoder = ctx.encoder_of(ty);
        trace!(ty = ty.name(), "encoder compiled");
        self.encoder_cache
            .entry(ty.identity)
            .or_insert(encoder)
            .value()
            .clone()
    }

    /// Like [`decoder_for`](Self::decoder_for), skipping descriptor
    /// construction on a cache hit.
    pub fn decoder_of<T: Reflect>(&self) -> DecoderRef {
        match self.decoder_cache.get(&TypeIdentity::of::<T>()) {
            Some(decoder) => decoder.value().clone(),
            None => self.decoder_for(&T::type_descriptor()),
        }
    }

    pub fn encoder_of<T: Reflect>(&self) -> EncoderRef {
        match self.encoder_cache.get(&TypeIdentity::of::<T>()) {
            Some(encoder) => encoder.value().clone(),
            None => self.encoder_for(&T::type_descriptor()),
        }
    }

    /// Adds an extension consulted after the global and configuration-level
    /// ones.
    ///
    /// Codecs compiled so far are discarded, so every type is compiled again
    /// with the new extension in place. This instance then stops being the
    /// one [`Config::freeze`] hands out for its flags.
    pub fn register_extension(self: &Arc<Self>, extension: Arc<dyn Extension>) {
        let mut extras = self.extra_extensions.write();
        let old = FrozenKey::new(&self.config, &extras);
        extras.push(extension);
        let new = FrozenKey::new(&self.config, &extras);
        self.decoder_cache.clear();
        self.encoder_cache.clear();
        // Re-key under the write lock so concurrent registrations re-key in order.
        self.registry.rekey(&old, new, self);
        drop(extras);
        debug!(config = ?self.config, "extra extension registered");
    }

    /// A sibling frozen configuration with edited flags and the same extra
    /// extensions.
    pub fn derive(&self, edit: impl FnOnce(Config) -> Config) -> Arc<FrozenConfig> {
        let config = edit(self.config.clone());
        let extras = self.extra_extensions.read().clone();
        debug!(?config, "deriving frozen configuration");
        self.registry.freeze(&config, extras)
    }

    pub fn marshal<T: Reflect>(&self, value: &T) -> Result<Vec<u8>, Error> {
        let encoder = self.encoder_of::<T>();
        self.encode_with(&*encoder, value)
    }

    /// Encodes a value whose type is only known at runtime.
    pub fn marshal_dyn(&self, value: &dyn AnyReflect) -> Result<Vec<u8>, Error> {
        let encoder = self.encoder_for(&value.reflect_descriptor());
        self.encode_with(&*encoder, value.as_any())
    }

    pub fn marshal_to_string<T: Reflect>(&self, value: &T) -> Result<String, Error> {
        let bytes = self.marshal(value)?;
        String::from_utf8(bytes).map_err(|e| Error::encode(format!("output is not utf-8: {e}")))
    }

    /// Encodes with `indent` as the per-level indentation.
    ///
    /// # Panics
    ///
    /// When `prefix` is not empty or `indent` contains anything but spaces.
    pub fn marshal_indent<T: Reflect>(
        &self,
        value: &T,
        prefix: &str,
        indent: &str,
    ) -> Result<Vec<u8>, Error> {
        check_indent(prefix, indent);
        let step = indent.len();
        self.derive(|config| config.indention_step(step)).marshal(value)
    }

    fn encode_with(&self, encoder: &dyn Encoder, value: &dyn Any) -> Result<Vec<u8>, Error> {
        self.writer_pool.borrow_mut(|writer| {
            let mut ctx = WriteContext::new(self, writer);
            encoder.encode(value, &mut ctx);
            match ctx.take_error() {
                Some(err) => Err(err),
                None => Ok(writer.dump()),
            }
        })
    }

    /// Decodes `data` into a fresh `T::default()`.
    pub fn unmarshal<T: Reflect + Default>(&self, data: &[u8]) -> Result<T, Error> {
        let mut value = T::default();
        self.unmarshal_into(data, &mut value)?;
        Ok(value)
    }

    pub fn unmarshal_from_str<T: Reflect + Default>(&self, data: &str) -> Result<T, Error> {
        self.unmarshal(data.as_bytes())
    }

    /// Decodes `data` into an existing value. Fields absent from the input
    /// keep their current contents. Input holding only whitespace leaves the
    /// value untouched.
    pub fn unmarshal_into<T: Reflect>(&self, data: &[u8], target: &mut T) -> Result<(), Error> {
        let decoder = self.decoder_of::<T>();
        self.decode_with(&*decoder, data, target)
    }

    /// Decodes into a value whose type is only known at runtime.
    pub fn unmarshal_dyn(&self, data: &[u8], target: &mut dyn AnyReflect) -> Result<(), Error> {
        let decoder = self.decoder_for(&target.reflect_descriptor());
        self.decode_with(&*decoder, data, target.as_any_mut())
    }

    fn decode_with(
        &self,
        decoder: &dyn Decoder,
        data: &[u8],
        target: &mut dyn Any,
    ) -> Result<(), Error> {
        let mut ctx = ReadContext::new(self, Reader::new(data));
        if ctx.reader.is_at_end() {
            return Ok(());
        }
        decoder.decode(target, &mut ctx);
        if let Some(err) = ctx.take_error() {
            return Err(err);
        }
        if !ctx.reader.is_at_end() {
            return Err(Error::trailing_data(format!(
                "Unmarshal: there are bytes left after unmarshal, error found in #{} byte",
                ctx.reader.get_cursor()
            )));
        }
        Ok(())
    }

    /// Whether `data` holds exactly one well-formed JSON value.
    pub fn valid(&self, data: &[u8]) -> bool {
        is_valid_json(data)
    }

    pub fn new_encoder<W: Write>(self: &Arc<Self>, output: W) -> StreamEncoder<W> {
        StreamEncoder::new(self.clone(), output)
    }

    pub fn new_decoder<R: Read>(self: &Arc<Self>, input: R) -> StreamDecoder<R> {
        StreamDecoder::new(self.clone(), input)
    }
}

/// Rejects pretty-print arguments the writer cannot honour.
pub(crate) fn check_indent(prefix: &str, indent: &str) {
    assert!(prefix.is_empty(), "prefix is not supported");
    assert!(is_all_spaces(indent), "indent can only be space");
}
