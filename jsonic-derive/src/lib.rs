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

//! # Jsonic Derive Macros
//!
//! This crate provides `#[derive(Reflect)]`, which describes a struct to the
//! jsonic codec compiler. The generated descriptor lists every field with its
//! annotations and typed accessors; codecs themselves are compiled lazily, at
//! first use, by a `FrozenConfig`.
//!
//! **Supported Types:**
//! - Structs with named fields, including generic ones
//! - Every field type must implement `Reflect`
//!
//! Enums, unions, tuple structs and unit structs are rejected with a compile
//! error. Types without a structural form implement `Reflect` by hand with an
//! opaque kind and, usually, marshaler hooks.
//!
//! ## Attributes
//!
//! - `#[tag(json = "name,omitempty,string")]` on a field: annotations read by
//!   whichever tag key the config selects (`json` unless changed)
//! - `#[jsonic(skip)]` on a field: the field is invisible to every codec
//! - `#[jsonic(marshaler)]` on the struct: the type implements `Marshaler`
//!   and `Unmarshaler` and converts itself
//! - `#[jsonic(text_marshaler)]` on the struct: the type implements
//!   `TextMarshaler` and `TextUnmarshaler` and is written as a JSON string
//!
//! **Example:**
//! ```rust
//! use jsonic_core::config::Config;
//! use jsonic_derive::Reflect;
//!
//! #[derive(Reflect, Debug, Default, PartialEq)]
//! struct Person {
//!     #[tag(json = "name")]
//!     name: String,
//!     #[tag(json = "age,omitempty")]
//!     age: i32,
//!     hobbies: Vec<String>,
//!     #[jsonic(skip)]
//!     cached_len: usize,
//! }
//!
//! let api = Config::standard().freeze();
//! let person = Person {
//!     name: "Ada".to_string(),
//!     age: 0,
//!     hobbies: vec!["chess".to_string()],
//!     cached_len: 3,
//! };
//! let json = api.marshal_to_string(&person).unwrap();
//! assert_eq!(json, r#"{"name":"Ada","hobbies":["chess"]}"#);
//! ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod object;

/// Derive macro producing a `jsonic_core::reflect::Reflect` implementation.
///
/// # Example
///
/// ```rust
/// use jsonic_derive::Reflect;
///
/// #[derive(Reflect, Default)]
/// struct Address {
///     street: String,
///     city: String,
/// }
///
/// #[derive(Reflect, Default)]
/// struct Person {
///     name: String,
///     #[tag(json = "addr,omitempty")]
///     address: Option<Box<Address>>,
/// }
/// ```
#[proc_macro_derive(Reflect, attributes(jsonic, tag))]
pub fn proc_macro_derive_reflect(input: proc_macro::TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    object::derive_reflect(&input).into()
}
