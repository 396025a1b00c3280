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

//! # Jsonic Core
//!
//! A type-driven JSON codec engine. For each Rust type it compiles, once, a
//! decoder and an encoder specialised to that type's shape, caches them per
//! frozen configuration and reuses them for every later conversion.
//!
//! ## Architecture
//!
//! - **`reflect`**: type descriptors, the introspection the compiler dispatches on
//! - **`resolver`**: the compilation pipeline plus per-call contexts and the writer pool
//! - **`codec`**: the codec contracts and one codec family per structural kind
//! - **`extension`**: hooks that create, reshape or decorate compiled codecs
//! - **`registry`**: global extensions, type and field overrides, frozen configurations
//! - **`config`** / **`api`**: conversion options and the frozen converter built from them
//! - **`adapter`**: stream encoder and decoder over `io::Write` / `io::Read`
//! - **`buffer`**: the JSON scanner and writer
//! - **`value`**: `Value`, `Dynamic`, `RawMessage`, `Number` and `Bytes`
//! - **`error`**: the shared error type
//!
//! ## Compilation
//!
//! A codec is compiled the first time its type is converted. Contained
//! types are compiled along the way, and a type that contains itself is
//! wired to a placeholder that forwards to the finished codec. Types with
//! no JSON mapping compile to a codec that fails when a value actually
//! reaches it, so `Option<Unsupported>` still encodes `None` as `null`.
//!
//! ## Usage
//!
//! Most users go through the `jsonic` crate and `#[derive(Reflect)]`. The
//! engine itself works on any [`Reflect`](reflect::Reflect) type:
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use jsonic_core::config::Config;
//!
//! let api = Config::compatible_with_standard_library().freeze();
//! let mut scores = BTreeMap::new();
//! scores.insert("b".to_string(), 2u32);
//! scores.insert("a".to_string(), 1u32);
//! assert_eq!(api.marshal_to_string(&scores).unwrap(), r#"{"a":1,"b":2}"#);
//! ```

pub mod adapter;
pub mod api;
pub mod buffer;
pub mod codec;
pub mod config;
pub mod error;
pub mod extension;
pub mod reflect;
pub mod registry;
pub mod resolver;
pub mod util;
pub mod value;

pub use adapter::{StreamDecoder, StreamEncoder};
pub use api::FrozenConfig;
pub use codec::marshaler::{Marshaler, TextMarshaler, TextUnmarshaler, Unmarshaler};
pub use codec::{Decoder, DecoderRef, Encoder, EncoderRef, FnDecoder, FnEncoder};
pub use config::Config;
pub use error::Error;
pub use extension::{Extension, TypeCodecExtension};
pub use reflect::{AnyReflect, Kind, Reflect, TypeDescriptor, TypeIdentity};
pub use registry::Registry;
pub use value::{Bytes, Dynamic, Number, RawMessage, Value};
pub use paste;
