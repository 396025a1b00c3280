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

//! Process-wide state shared by frozen configurations: global extensions,
//! per-type and per-field codec overrides, and the table of frozen
//! configurations keyed by their flags and extra extensions.

use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::debug;

use crate::api::FrozenConfig;
use crate::codec::{DecoderRef, EncoderRef};
use crate::config::Config;
use crate::extension::Extension;

/// Identity of a frozen configuration: its flags plus the addresses of its
/// extra extensions, in registration order.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub(crate) struct FrozenKey {
    config: Config,
    extensions: Vec<usize>,
}

impl FrozenKey {
    pub(crate) fn new(config: &Config, extensions: &[Arc<dyn Extension>]) -> FrozenKey {
        FrozenKey {
            config: config.clone(),
            extensions: extensions
                .iter()
                .map(|e| Arc::as_ptr(e) as *const () as usize)
                .collect(),
        }
    }
}

#[derive(Default)]
pub struct Registry {
    extensions: RwLock<Vec<Arc<dyn Extension>>>,
    type_decoders: DashMap<String, DecoderRef>,
    type_encoders: DashMap<String, EncoderRef>,
    field_decoders: DashMap<(String, String), DecoderRef>,
    field_encoders: DashMap<(String, String), EncoderRef>,
    frozen: DashMap<FrozenKey, Arc<FrozenConfig>>,
}

impl Registry {
    pub fn new() -> Arc<Registry> {
        Arc::new(Registry::default())
    }

    /// The registry behind [`Config::freeze`].
    pub fn global() -> &'static Arc<Registry> {
        static GLOBAL: OnceLock<Arc<Registry>> = OnceLock::new();
        GLOBAL.get_or_init(Registry::new)
    }

    /// Adds a global extension. Only codecs compiled afterwards see it.
    pub fn register_extension(&self, extension: Arc<dyn Extension>) {
        self.extensions.write().push(extension);
        debug!("global extension registered");
    }

    /// Snapshot of the global extensions in registration order.
    pub fn extensions(&self) -> Vec<Arc<dyn Extension>> {
        self.extensions.read().clone()
    }

    /// Replaces the decoder of the type named `type_name`, as reported by
    /// `std::any::type_name`.
    pub fn register_type_decoder(&self, type_name: impl Into<String>, decoder: DecoderRef) {
        self.type_decoders.insert(type_name.into(), decoder);
    }

    pub fn register_type_encoder(&self, type_name: impl Into<String>, encoder: EncoderRef) {
        self.type_encoders.insert(type_name.into(), encoder);
    }

    /// Replaces the decoder of one field of the struct named `type_name`.
    pub fn register_field_decoder(
        &self,
        type_name: impl Into<String>,
        field_name: impl Into<String>,
        decoder: DecoderRef,
    ) {
        self.field_decoders
            .insert((type_name.into(), field_name.into()), decoder);
    }

    pub fn register_field_encoder(
        &self,
        type_name: impl Into<String>,
        field_name: impl Into<String>,
        encoder: EncoderRef,
    ) {
        self.field_encoders
            .insert((type_name.into(), field_name.into()), encoder);
    }

    pub(crate) fn type_decoder(&self, type_name: &str) -> Option<DecoderRef> {
        self.type_decoders.get(type_name).map(|e| e.value().clone())
    }

    pub(crate) fn type_encoder(&self, type_name: &str) -> Option<EncoderRef> {
        self.type_encoders.get(type_name).map(|e| e.value().clone())
    }

    pub(crate) fn field_decoder(&self, type_name: &str, field_name: &str) -> Option<DecoderRef> {
        self.field_decoders
            .get(&(type_name.to_string(), field_name.to_string()))
            .map(|e| e.value().clone())
    }

    pub(crate) fn field_encoder(&self, type_name: &str, field_name: &str) -> Option<EncoderRef> {
        self.field_encoders
            .get(&(type_name.to_string(), field_name.to_string()))
            .map(|e| e.value().clone())
    }

    /// Returns the frozen configuration for `config` with `extras` as its
    /// extra extensions, creating it on first use.
    pub(crate) fn freeze(
        self: &Arc<Self>,
        config: &Config,
        extras: Vec<Arc<dyn Extension>>,
    ) -> Arc<FrozenConfig> {
        let key = FrozenKey::new(config, &extras);
        if let Some(existing) = self.frozen.get(&key) {
            debug!(?config, "reusing frozen configuration");
            return existing.value().clone();
        }
        self.frozen
            .entry(key)
            .or_insert_with(|| {
                debug!(?config, "freezing configuration");
                Arc::new(FrozenConfig::new(config.clone(), self.clone(), extras))
            })
            .value()
            .clone()
    }

    /// Moves `frozen` from `old` to `new` once its extra extensions changed.
    /// An instance already frozen under `new` keeps that slot.
    pub(crate) fn rekey(&self, old: &FrozenKey, new: FrozenKey, frozen: &Arc<FrozenConfig>) {
        self.frozen.remove_if(old, |_, v| Arc::ptr_eq(v, frozen));
        self.frozen.entry(new).or_insert_with(|| frozen.clone());
        debug!("frozen configuration re-keyed after extension registration");
    }

    /// Number of distinct frozen configurations.
    pub fn frozen_count(&self) -> usize {
        self.frozen.len()
    }
}
