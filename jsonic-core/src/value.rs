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

//! Value types with a fixed JSON mapping: the generic [`Value`] tree, the
//! [`Dynamic`] holder, [`RawMessage`], [`Number`] and [`Bytes`].

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::Error;
use crate::reflect::{
    downcast, downcast_mut, AnyReflect, DynamicShape, Kind, Primitive, Reflect, TypeDescriptor,
};

/// A JSON document of unknown shape.
///
/// Numbers decode to [`Value::Float`], or to [`Value::Number`] when the
/// configuration has `use_number` set.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Float(f64),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Number(n) => n.as_f64().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(members) => Some(members),
            _ => None,
        }
    }

    /// Member lookup on an object; `None` for every other variant.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|members| members.get(key))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl Reflect for Value {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<Value>(Kind::Opaque)
    }
}

/// A number kept as its literal text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Number(String);

impl Number {
    pub fn new(literal: impl Into<String>) -> Number {
        Number(literal.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_f64(&self) -> Result<f64, Error> {
        self.0
            .parse()
            .map_err(|_| Error::decode(format!("invalid number literal {:?}", self.0)))
    }

    pub fn as_i64(&self) -> Result<i64, Error> {
        self.0
            .parse()
            .map_err(|_| Error::decode(format!("invalid integer literal {:?}", self.0)))
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Reflect for Number {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<Number>(Kind::Opaque)
    }
}

/// Pre-encoded JSON, copied verbatim in both directions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawMessage(pub Vec<u8>);

impl RawMessage {
    pub fn new(bytes: impl Into<Vec<u8>>) -> RawMessage {
        RawMessage(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Reflect for RawMessage {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<RawMessage>(Kind::Opaque)
    }
}

/// Binary data, encoded as a base64 string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bytes(pub Vec<u8>);

impl Reflect for Bytes {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<Bytes>(Kind::Primitive(Primitive::Bytes))
    }
}

/// Holds a value whose concrete type is chosen at runtime.
///
/// Encoding resolves the codec of the held value on every call. Decoding
/// fills the held value in place, so pre-seeding a `Dynamic` with a typed
/// value selects the target type. An unseeded holder decodes to a [`Value`].
pub struct Dynamic(Box<dyn AnyReflect>);

impl Dynamic {
    pub fn new<T: Reflect>(value: T) -> Dynamic {
        Dynamic(Box::new(value))
    }

    pub fn get(&self) -> &dyn AnyReflect {
        &*self.0
    }

    pub fn get_mut(&mut self) -> &mut dyn AnyReflect {
        &mut *self.0
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    pub fn set<T: Reflect>(&mut self, value: T) {
        self.0 = Box::new(value);
    }
}

impl Default for Dynamic {
    fn default() -> Self {
        Dynamic(Box::new(Value::Null))
    }
}

impl fmt::Debug for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Dynamic")
            .field(&self.0.reflect_descriptor().name())
            .finish()
    }
}

fn dynamic_held(v: &dyn Any) -> Result<&dyn AnyReflect, Error> {
    Ok(downcast::<Dynamic>(v)?.get())
}

fn dynamic_held_mut(v: &mut dyn Any) -> Result<&mut dyn AnyReflect, Error> {
    Ok(downcast_mut::<Dynamic>(v)?.get_mut())
}

impl Reflect for Dynamic {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<Dynamic>(Kind::Dynamic(DynamicShape {
            held: dynamic_held,
            held_mut: dynamic_held_mut,
        }))
    }
}
