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

//! Type descriptors: the introspection the compilation pipeline dispatches on.
//!
//! A descriptor reports a type's [`Kind`] plus typed accessors that let a
//! codec reach into a value it only sees as `&dyn Any`. Every accessor
//! downcasts first, so handing a codec a value of the wrong type produces a
//! [`Error::TypeMismatch`] instead of undefined behaviour.
//!
//! Contained types are reported through `fn() -> TypeDescriptor` so building a
//! descriptor never recurses, even for self-referential types.

mod impls;

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::Error;

/// Types that can describe themselves to the codec compiler.
///
/// Implemented for the primitives, the std containers and, through
/// `#[derive(Reflect)]`, for user structs.
pub trait Reflect: Any + Send + Sync {
    fn type_descriptor() -> TypeDescriptor
    where
        Self: Sized;
}

/// Object-safe view of a [`Reflect`] value.
pub trait AnyReflect: Any + Send + Sync {
    fn reflect_descriptor(&self) -> TypeDescriptor;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Reflect> AnyReflect for T {
    fn reflect_descriptor(&self) -> TypeDescriptor {
        T::type_descriptor()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Cache key for a runtime type. Equality and hashing use the `TypeId` only.
#[derive(Clone, Copy)]
pub struct TypeIdentity {
    id: TypeId,
    name: &'static str,
}

impl TypeIdentity {
    pub fn of<T: 'static + ?Sized>() -> TypeIdentity {
        TypeIdentity {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The type name without its module path, e.g. `Node` for `my_crate::Node`.
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        match base.rfind("::") {
            Some(pos) => &self.name[pos + 2..],
            None => self.name,
        }
    }
}

impl PartialEq for TypeIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeIdentity {}

impl Hash for TypeIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[derive(Clone)]
pub struct TypeDescriptor {
    pub identity: TypeIdentity,
    pub kind: Kind,
    pub marshaler: Option<MarshalerHooks>,
    pub text_marshaler: Option<TextMarshalerHooks>,
}

impl TypeDescriptor {
    pub fn new<T: 'static>(kind: Kind) -> TypeDescriptor {
        TypeDescriptor {
            identity: TypeIdentity::of::<T>(),
            kind,
            marshaler: None,
            text_marshaler: None,
        }
    }

    pub fn of<T: Reflect>() -> TypeDescriptor {
        T::type_descriptor()
    }

    pub fn with_marshaler(mut self, hooks: MarshalerHooks) -> TypeDescriptor {
        self.marshaler = Some(hooks);
        self
    }

    pub fn with_text_marshaler(mut self, hooks: TextMarshalerHooks) -> TypeDescriptor {
        self.text_marshaler = Some(hooks);
        self
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.identity.id == TypeId::of::<T>()
    }

    pub fn name(&self) -> &'static str {
        self.identity.name
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("identity", &self.identity)
            .field("kind", &self.kind.label())
            .finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Primitive {
    Bool,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    String,
    Bytes,
}

impl Primitive {
    pub fn is_integer(self) -> bool {
        !matches!(
            self,
            Primitive::Bool | Primitive::F32 | Primitive::F64 | Primitive::String | Primitive::Bytes
        )
    }
}

/// Structural shape of a type.
#[derive(Clone)]
pub enum Kind {
    Primitive(Primitive),
    Struct(StructShape),
    Array(ArrayShape),
    Sequence(SequenceShape),
    Map(MapShape),
    Optional(OptionalShape),
    /// Owning pointer such as `Box<T>` or `Arc<T>`; always present.
    Indirect(IndirectShape),
    /// Holds a value whose type is only known at runtime.
    Dynamic(DynamicShape),
    /// No structural codec exists for this type.
    Opaque,
}

impl Kind {
    pub fn label(&self) -> &'static str {
        match self {
            Kind::Primitive(_) => "primitive",
            Kind::Struct(_) => "struct",
            Kind::Array(_) => "array",
            Kind::Sequence(_) => "sequence",
            Kind::Map(_) => "map",
            Kind::Optional(_) => "optional",
            Kind::Indirect(_) => "indirect",
            Kind::Dynamic(_) => "dynamic",
            Kind::Opaque => "opaque",
        }
    }
}

pub type Getter = fn(&dyn Any) -> Result<&dyn Any, Error>;
pub type GetterMut = fn(&mut dyn Any) -> Result<&mut dyn Any, Error>;

#[derive(Clone)]
pub struct StructShape {
    pub fields: Vec<FieldShape>,
}

#[derive(Clone)]
pub struct FieldShape {
    /// Rust field name.
    pub name: &'static str,
    /// `(key, value)` annotations, e.g. `("json", "id,omitempty")`.
    pub tags: Vec<(&'static str, &'static str)>,
    pub descriptor: fn() -> TypeDescriptor,
    pub get: Getter,
    pub get_mut: GetterMut,
}

impl FieldShape {
    pub fn tag(&self, key: &str) -> Option<&'static str> {
        self.tags.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }
}

#[derive(Clone)]
pub struct ArrayShape {
    pub element: fn() -> TypeDescriptor,
    pub len: usize,
    pub get: fn(&dyn Any, usize) -> Result<&dyn Any, Error>,
    pub get_mut: fn(&mut dyn Any, usize) -> Result<&mut dyn Any, Error>,
    /// Resets the element at an index to its default.
    pub reset: fn(&mut dyn Any, usize) -> Result<(), Error>,
}

#[derive(Clone)]
pub struct SequenceShape {
    pub element: fn() -> TypeDescriptor,
    pub len: fn(&dyn Any) -> Result<usize, Error>,
    pub get: fn(&dyn Any, usize) -> Result<&dyn Any, Error>,
    pub clear: fn(&mut dyn Any) -> Result<(), Error>,
    /// Appends a default element and returns it for decoding in place.
    pub push_default: fn(&mut dyn Any) -> Result<&mut dyn Any, Error>,
}

pub type MapEntries<'a> = Vec<(&'a dyn Any, &'a dyn Any)>;

#[derive(Clone)]
pub struct MapShape {
    pub key: fn() -> TypeDescriptor,
    pub value: fn() -> TypeDescriptor,
    pub entries: for<'a> fn(&'a dyn Any) -> Result<MapEntries<'a>, Error>,
    pub len: fn(&dyn Any) -> Result<usize, Error>,
    pub new_key: fn() -> Box<dyn Any>,
    pub new_value: fn() -> Box<dyn Any>,
    pub insert: fn(&mut dyn Any, Box<dyn Any>, Box<dyn Any>) -> Result<(), Error>,
    pub clear: fn(&mut dyn Any) -> Result<(), Error>,
}

#[derive(Clone)]
pub struct OptionalShape {
    pub inner: fn() -> TypeDescriptor,
    pub get: fn(&dyn Any) -> Result<Option<&dyn Any>, Error>,
    /// Returns the held value, inserting a default first when absent.
    pub get_or_insert: GetterMut,
    pub set_none: fn(&mut dyn Any) -> Result<(), Error>,
}

#[derive(Clone)]
pub struct IndirectShape {
    pub inner: fn() -> TypeDescriptor,
    pub get: Getter,
    pub get_mut: GetterMut,
}

#[derive(Clone)]
pub struct DynamicShape {
    pub held: fn(&dyn Any) -> Result<&dyn AnyReflect, Error>,
    pub held_mut: fn(&mut dyn Any) -> Result<&mut dyn AnyReflect, Error>,
}

/// Hooks for types that produce and consume their own JSON text.
#[derive(Clone, Copy)]
pub struct MarshalerHooks {
    pub marshal: fn(&dyn Any) -> Result<Vec<u8>, Error>,
    pub unmarshal: fn(&mut dyn Any, &[u8]) -> Result<(), Error>,
}

/// Hooks for types with a plain-text form, written as a JSON string.
#[derive(Clone, Copy)]
pub struct TextMarshalerHooks {
    pub marshal_text: fn(&dyn Any) -> Result<String, Error>,
    pub unmarshal_text: fn(&mut dyn Any, &str) -> Result<(), Error>,
}

/// Downcasts a location to its concrete type.
#[inline]
pub fn downcast<T: 'static>(value: &dyn Any) -> Result<&T, Error> {
    value
        .downcast_ref::<T>()
        .ok_or_else(|| Error::type_mismatch(type_name::<T>(), "a value of another type"))
}

/// Mutable counterpart of [`downcast`].
#[inline]
pub fn downcast_mut<T: 'static>(value: &mut dyn Any) -> Result<&mut T, Error> {
    value
        .downcast_mut::<T>()
        .ok_or_else(|| Error::type_mismatch(type_name::<T>(), "a value of another type"))
}

/// Moves a boxed value out, checking its type.
pub fn unbox<T: 'static>(value: Box<dyn Any>) -> Result<T, Error> {
    value
        .downcast::<T>()
        .map(|b| *b)
        .map_err(|_| Error::type_mismatch(type_name::<T>(), "a value of another type"))
}

pub use impls::{marshaler_hooks, text_marshaler_hooks};
