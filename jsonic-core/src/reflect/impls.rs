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

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::{
    downcast, downcast_mut, unbox, ArrayShape, Kind, MapEntries, MapShape, MarshalerHooks,
    OptionalShape, IndirectShape, Primitive, Reflect, SequenceShape, TextMarshalerHooks,
    TypeDescriptor,
};
use crate::codec::marshaler::{Marshaler, TextMarshaler, TextUnmarshaler, Unmarshaler};
use crate::error::Error;

macro_rules! impl_primitive_reflect {
    ($($ty:ty => $prim:ident),* $(,)?) => {
        $(
            impl Reflect for $ty {
                #[inline(always)]
                fn type_descriptor() -> TypeDescriptor {
                    TypeDescriptor::new::<$ty>(Kind::Primitive(Primitive::$prim))
                }
            }
        )*
    };
}

impl_primitive_reflect!(
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    String => String,
);

fn vec_len<T: 'static>(v: &dyn Any) -> Result<usize, Error> {
    Ok(downcast::<Vec<T>>(v)?.len())
}

fn vec_get<T: 'static>(v: &dyn Any, index: usize) -> Result<&dyn Any, Error> {
    downcast::<Vec<T>>(v)?
        .get(index)
        .map(|e| e as &dyn Any)
        .ok_or_else(|| Error::unknown(format!("index {index} out of bounds")))
}

fn vec_clear<T: 'static>(v: &mut dyn Any) -> Result<(), Error> {
    downcast_mut::<Vec<T>>(v)?.clear();
    Ok(())
}

fn vec_push_default<T: Default + 'static>(v: &mut dyn Any) -> Result<&mut dyn Any, Error> {
    let vec = downcast_mut::<Vec<T>>(v)?;
    vec.push(T::default());
    let last = vec.len() - 1;
    Ok(&mut vec[last] as &mut dyn Any)
}

impl<T: Reflect + Default> Reflect for Vec<T> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<Vec<T>>(Kind::Sequence(SequenceShape {
            element: T::type_descriptor,
            len: vec_len::<T>,
            get: vec_get::<T>,
            clear: vec_clear::<T>,
            push_default: vec_push_default::<T>,
        }))
    }
}

fn array_get<T: 'static, const N: usize>(v: &dyn Any, index: usize) -> Result<&dyn Any, Error> {
    downcast::<[T; N]>(v)?
        .get(index)
        .map(|e| e as &dyn Any)
        .ok_or_else(|| Error::unknown(format!("index {index} out of bounds for array of {N}")))
}

fn array_get_mut<T: 'static, const N: usize>(
    v: &mut dyn Any,
    index: usize,
) -> Result<&mut dyn Any, Error> {
    downcast_mut::<[T; N]>(v)?
        .get_mut(index)
        .map(|e| e as &mut dyn Any)
        .ok_or_else(|| Error::unknown(format!("index {index} out of bounds for array of {N}")))
}

fn array_reset<T: Default + 'static, const N: usize>(
    v: &mut dyn Any,
    index: usize,
) -> Result<(), Error> {
    if let Some(slot) = downcast_mut::<[T; N]>(v)?.get_mut(index) {
        *slot = T::default();
    }
    Ok(())
}

impl<T: Reflect + Default, const N: usize> Reflect for [T; N] {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<[T; N]>(Kind::Array(ArrayShape {
            element: T::type_descriptor,
            len: N,
            get: array_get::<T, N>,
            get_mut: array_get_mut::<T, N>,
            reset: array_reset::<T, N>,
        }))
    }
}

fn new_boxed<T: Default + 'static>() -> Box<dyn Any> {
    Box::new(T::default())
}

fn hash_map_entries<K: 'static, V: 'static>(v: &dyn Any) -> Result<MapEntries<'_>, Error> {
    Ok(downcast::<HashMap<K, V>>(v)?
        .iter()
        .map(|(k, v)| (k as &dyn Any, v as &dyn Any))
        .collect())
}

fn hash_map_len<K: 'static, V: 'static>(v: &dyn Any) -> Result<usize, Error> {
    Ok(downcast::<HashMap<K, V>>(v)?.len())
}

fn hash_map_insert<K: Eq + Hash + 'static, V: 'static>(
    v: &mut dyn Any,
    key: Box<dyn Any>,
    value: Box<dyn Any>,
) -> Result<(), Error> {
    let map = downcast_mut::<HashMap<K, V>>(v)?;
    map.insert(unbox::<K>(key)?, unbox::<V>(value)?);
    Ok(())
}

fn hash_map_clear<K: 'static, V: 'static>(v: &mut dyn Any) -> Result<(), Error> {
    downcast_mut::<HashMap<K, V>>(v)?.clear();
    Ok(())
}

impl<K, V> Reflect for HashMap<K, V>
where
    K: Reflect + Default + Eq + Hash,
    V: Reflect + Default,
{
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<HashMap<K, V>>(Kind::Map(MapShape {
            key: K::type_descriptor,
            value: V::type_descriptor,
            entries: hash_map_entries::<K, V>,
            len: hash_map_len::<K, V>,
            new_key: new_boxed::<K>,
            new_value: new_boxed::<V>,
            insert: hash_map_insert::<K, V>,
            clear: hash_map_clear::<K, V>,
        }))
    }
}

fn btree_map_entries<K: 'static, V: 'static>(v: &dyn Any) -> Result<MapEntries<'_>, Error> {
    Ok(downcast::<BTreeMap<K, V>>(v)?
        .iter()
        .map(|(k, v)| (k as &dyn Any, v as &dyn Any))
        .collect())
}

fn btree_map_len<K: 'static, V: 'static>(v: &dyn Any) -> Result<usize, Error> {
    Ok(downcast::<BTreeMap<K, V>>(v)?.len())
}

fn btree_map_insert<K: Ord + 'static, V: 'static>(
    v: &mut dyn Any,
    key: Box<dyn Any>,
    value: Box<dyn Any>,
) -> Result<(), Error> {
    let map = downcast_mut::<BTreeMap<K, V>>(v)?;
    map.insert(unbox::<K>(key)?, unbox::<V>(value)?);
    Ok(())
}

fn btree_map_clear<K: 'static, V: 'static>(v: &mut dyn Any) -> Result<(), Error> {
    downcast_mut::<BTreeMap<K, V>>(v)?.clear();
    Ok(())
}

impl<K, V> Reflect for BTreeMap<K, V>
where
    K: Reflect + Default + Ord,
    V: Reflect + Default,
{
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<BTreeMap<K, V>>(Kind::Map(MapShape {
            key: K::type_descriptor,
            value: V::type_descriptor,
            entries: btree_map_entries::<K, V>,
            len: btree_map_len::<K, V>,
            new_key: new_boxed::<K>,
            new_value: new_boxed::<V>,
            insert: btree_map_insert::<K, V>,
            clear: btree_map_clear::<K, V>,
        }))
    }
}

fn option_get<T: 'static>(v: &dyn Any) -> Result<Option<&dyn Any>, Error> {
    Ok(downcast::<Option<T>>(v)?.as_ref().map(|t| t as &dyn Any))
}

fn option_get_or_insert<T: Default + 'static>(v: &mut dyn Any) -> Result<&mut dyn Any, Error> {
    Ok(downcast_mut::<Option<T>>(v)?.get_or_insert_with(T::default) as &mut dyn Any)
}

fn option_set_none<T: 'static>(v: &mut dyn Any) -> Result<(), Error> {
    *downcast_mut::<Option<T>>(v)? = None;
    Ok(())
}

impl<T: Reflect + Default> Reflect for Option<T> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<Option<T>>(Kind::Optional(OptionalShape {
            inner: T::type_descriptor,
            get: option_get::<T>,
            get_or_insert: option_get_or_insert::<T>,
            set_none: option_set_none::<T>,
        }))
    }
}

fn box_get<T: 'static>(v: &dyn Any) -> Result<&dyn Any, Error> {
    Ok(&**downcast::<Box<T>>(v)? as &dyn Any)
}

fn box_get_mut<T: 'static>(v: &mut dyn Any) -> Result<&mut dyn Any, Error> {
    Ok(&mut **downcast_mut::<Box<T>>(v)? as &mut dyn Any)
}

impl<T: Reflect> Reflect for Box<T> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<Box<T>>(Kind::Indirect(IndirectShape {
            inner: T::type_descriptor,
            get: box_get::<T>,
            get_mut: box_get_mut::<T>,
        }))
    }
}

fn arc_get<T: 'static>(v: &dyn Any) -> Result<&dyn Any, Error> {
    Ok(&**downcast::<Arc<T>>(v)? as &dyn Any)
}

fn arc_get_mut<T: Clone + 'static>(v: &mut dyn Any) -> Result<&mut dyn Any, Error> {
    Ok(Arc::make_mut(downcast_mut::<Arc<T>>(v)?) as &mut dyn Any)
}

impl<T: Reflect + Clone> Reflect for Arc<T> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<Arc<T>>(Kind::Indirect(IndirectShape {
            inner: T::type_descriptor,
            get: arc_get::<T>,
            get_mut: arc_get_mut::<T>,
        }))
    }
}

fn marshal_json<T: Marshaler + 'static>(v: &dyn Any) -> Result<Vec<u8>, Error> {
    downcast::<T>(v)?.marshal_json()
}

fn unmarshal_json<T: Unmarshaler + 'static>(v: &mut dyn Any, data: &[u8]) -> Result<(), Error> {
    downcast_mut::<T>(v)?.unmarshal_json(data)
}

fn marshal_text<T: TextMarshaler + 'static>(v: &dyn Any) -> Result<String, Error> {
    downcast::<T>(v)?.marshal_text()
}

fn unmarshal_text<T: TextUnmarshaler + 'static>(v: &mut dyn Any, text: &str) -> Result<(), Error> {
    downcast_mut::<T>(v)?.unmarshal_text(text)
}

/// Hooks routing a descriptor to the type's [`Marshaler`] and [`Unmarshaler`] impls.
pub fn marshaler_hooks<T: Marshaler + Unmarshaler + 'static>() -> MarshalerHooks {
    MarshalerHooks {
        marshal: marshal_json::<T>,
        unmarshal: unmarshal_json::<T>,
    }
}

/// Hooks routing a descriptor to the type's [`TextMarshaler`] and [`TextUnmarshaler`] impls.
pub fn text_marshaler_hooks<T: TextMarshaler + TextUnmarshaler + 'static>() -> TextMarshalerHooks
{
    TextMarshalerHooks {
        marshal_text: marshal_text::<T>,
        unmarshal_text: unmarshal_text::<T>,
    }
}

macro_rules! impl_text_reflect {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn type_descriptor() -> TypeDescriptor {
                    TypeDescriptor::new::<$ty>(Kind::Opaque)
                        .with_text_marshaler(text_marshaler_hooks::<$ty>())
                }
            }
        )*
    };
}

impl_text_reflect!(NaiveDate, NaiveDateTime, DateTime<Utc>);
