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

//! # Jsonic
//!
//! Jsonic converts Rust values to and from JSON with codecs compiled per
//! type. The first conversion of a type walks its shape once and builds a
//! decoder and an encoder for exactly that shape; both are cached on the
//! frozen configuration and shared by every later call and every thread.
//!
//! ## Key Features
//!
//! - **Compiled codecs**: one reflective walk per type and configuration
//! - **Configurable**: HTML escaping, sorted map keys, lossy floats, strict
//!   unknown-field handling, custom tag keys, case-insensitive field matching
//! - **Extensible**: extensions create, reshape or decorate codecs, and
//!   single types or struct fields can be overridden in a registry
//! - **Self-converting types**: `Marshaler` / `TextMarshaler` implementations
//!   are picked up automatically
//! - **Streams**: newline-delimited encoding and incremental decoding over
//!   `io::Write` and `io::Read`
//!
//! ## Quick Start
//!
//! ```rust
//! use jsonic::{Config, Error, Reflect};
//!
//! #[derive(Reflect, Debug, Default, PartialEq)]
//! struct Person {
//!     #[tag(json = "name")]
//!     name: String,
//!     #[tag(json = "age,omitempty")]
//!     age: u32,
//!     #[tag(json = "friends")]
//!     friends: Vec<String>,
//! }
//!
//! fn main() -> Result<(), Error> {
//!     let api = Config::compatible_with_standard_library().freeze();
//!     let person = Person {
//!         name: "Grace".to_string(),
//!         age: 85,
//!         friends: vec!["Ada".to_string()],
//!     };
//!     let json = api.marshal_to_string(&person)?;
//!     assert_eq!(json, r#"{"name":"Grace","age":85,"friends":["Ada"]}"#);
//!
//!     let back: Person = api.unmarshal(json.as_bytes())?;
//!     assert_eq!(back, person);
//!     Ok(())
//! }
//! ```
//!
//! ## Configurations
//!
//! A [`Config`] is a plain value. Freezing it yields an `Arc<FrozenConfig>`
//! that owns the codec caches; freezing an equal config again returns the
//! same instance, so caches are shared.
//!
//! - [`Config::standard`]: HTML escaping on
//! - [`Config::compatible_with_standard_library`]: HTML escaping and sorted map keys
//! - [`Config::fastest`]: floats with six significant digits, no escaping
//!
//! ## Dynamic Values
//!
//! [`Value`] holds any JSON document. [`Dynamic`] holds any `Reflect` value
//! whose type is only known at runtime and converts it through that type's
//! own codec.
//!
//! ```rust
//! use jsonic::{Config, Value};
//!
//! let api = Config::standard().freeze();
//! let doc: Value = api.unmarshal(br#"{"a":[1,true,null]}"#).unwrap();
//! assert_eq!(doc.get("a").and_then(Value::as_array).map(Vec::len), Some(3));
//! ```

pub use jsonic_core::{
    config::Config, error::Error, AnyReflect, Bytes, Decoder, DecoderRef, Dynamic, Encoder,
    EncoderRef, Extension, FnDecoder, FnEncoder, FrozenConfig, Marshaler, Number, RawMessage,
    Reflect, Registry, StreamDecoder, StreamEncoder, TextMarshaler, TextUnmarshaler,
    TypeCodecExtension, TypeDescriptor, Unmarshaler, Value,
};
pub use jsonic_derive::Reflect;
