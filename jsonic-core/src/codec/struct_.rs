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

//! Field-by-field codecs for structs.
//!
//! Compiling a struct first describes it: one [`Binding`] per field, with
//! the names it is read from and written as, its tag options and the codec
//! of its type. Extensions may then edit the description before the
//! bindings are assembled into a [`StructDecoder`] or [`StructEncoder`].

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::primitive::{QuotedDecoder, QuotedEncoder, QuotedStringDecoder, QuotedStringEncoder};
use super::{Decoder, DecoderRef, Encoder, EncoderRef};
use crate::error::Error;
use crate::reflect::{
    FieldShape, Getter, GetterMut, Kind, Primitive, StructShape, TypeDescriptor, TypeIdentity,
};
use crate::resolver::context::{CompileContext, ReadContext, WriteContext};

/// How one struct field takes part in a conversion.
#[derive(Clone)]
pub struct Binding {
    pub field: FieldShape,
    /// Member names accepted when decoding.
    pub from_names: Vec<String>,
    /// Member name written when encoding. Only the first is used.
    pub to_names: Vec<String>,
    /// Present when the description was built for decoding.
    pub decoder: Option<DecoderRef>,
    /// Present when the description was built for encoding.
    pub encoder: Option<EncoderRef>,
    pub omit_empty: bool,
    /// Quote numbers and bools, double-encode strings.
    pub string_mode: bool,
    tagged: bool,
}

impl Binding {
    /// Whether the field carried a tag under the effective tag key.
    pub fn is_tagged(&self) -> bool {
        self.tagged
    }
}

pub struct StructDescriptor {
    pub identity: TypeIdentity,
    pub fields: Vec<Binding>,
}

impl StructDescriptor {
    pub fn field(&self, name: &str) -> Option<&Binding> {
        self.fields.iter().find(|b| b.field.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Binding> {
        self.fields.iter_mut().find(|b| b.field.name == name)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
    Decode,
    Encode,
}

fn describe_struct(
    ctx: &mut CompileContext<'_>,
    ty: &TypeDescriptor,
    shape: &StructShape,
    side: Side,
) -> StructDescriptor {
    let tag_key = ctx.config().effective_tag_key().to_string();
    let only_tagged = ctx.config().only_tagged_field;
    let registry = ctx.api().registry().clone();
    let mut fields = Vec::with_capacity(shape.fields.len());
    for field in &shape.fields {
        let tag = field.tag(&tag_key).unwrap_or("");
        if only_tagged && tag.is_empty() {
            continue;
        }
        if tag == "-" {
            continue;
        }
        let mut parts = tag.split(',');
        let name = match parts.next() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => field.name.to_string(),
        };
        let (mut omit_empty, mut string_mode) = (false, false);
        for option in parts {
            match option {
                "omitempty" => omit_empty = true,
                "string" => string_mode = true,
                _ => {}
            }
        }
        let field_ty = (field.descriptor)();
        let (decoder, encoder) = match side {
            Side::Decode => {
                let decoder = registry
                    .field_decoder(ty.name(), field.name)
                    .unwrap_or_else(|| ctx.with_prefix(field.name, |ctx| ctx.decoder_of(&field_ty)));
                (Some(decoder), None)
            }
            Side::Encode => {
                let encoder = registry
                    .field_encoder(ty.name(), field.name)
                    .unwrap_or_else(|| ctx.with_prefix(field.name, |ctx| ctx.encoder_of(&field_ty)));
                (None, Some(encoder))
            }
        };
        fields.push(Binding {
            field: field.clone(),
            from_names: vec![name.clone()],
            to_names: vec![name],
            decoder,
            encoder,
            omit_empty,
            string_mode,
            tagged: !tag.is_empty(),
        });
    }
    let mut descriptor = StructDescriptor {
        identity: ty.identity,
        fields,
    };
    for extension in ctx.extensions() {
        extension.update_struct_descriptor(&mut descriptor);
    }
    for binding in &mut descriptor.fields {
        if binding.string_mode {
            apply_string_mode(binding);
        }
    }
    descriptor
}

fn apply_string_mode(binding: &mut Binding) {
    match (binding.field.descriptor)().kind {
        Kind::Primitive(Primitive::String) => {
            binding.decoder = binding
                .decoder
                .take()
                .map(|d| Arc::new(QuotedStringDecoder::new(d)) as DecoderRef);
            binding.encoder = binding
                .encoder
                .take()
                .map(|e| Arc::new(QuotedStringEncoder::new(e)) as EncoderRef);
        }
        Kind::Primitive(p) if p != Primitive::Bytes => {
            binding.decoder = binding
                .decoder
                .take()
                .map(|d| Arc::new(QuotedDecoder::new(d)) as DecoderRef);
            binding.encoder = binding
                .encoder
                .take()
                .map(|e| Arc::new(QuotedEncoder::new(e)) as EncoderRef);
        }
        _ => {
            debug!(
                "`,string` ignored on field {} of non-scalar type",
                binding.field.name
            );
        }
    }
}

/// Of two bindings claiming one name the tagged one wins. Ties drop both.
fn resolve_conflict(old_tagged: bool, new_tagged: bool) -> (bool, bool) {
    match (old_tagged, new_tagged) {
        (true, false) => (false, true),
        (false, true) => (true, false),
        _ => (true, true),
    }
}

struct FieldDecoder {
    name: &'static str,
    get_mut: GetterMut,
    decoder: DecoderRef,
    tagged: bool,
}

pub(crate) fn decoder_of_struct(
    ctx: &mut CompileContext<'_>,
    ty: &TypeDescriptor,
    shape: &StructShape,
) -> DecoderRef {
    let descriptor = describe_struct(ctx, ty, shape, Side::Decode);
    let mut fields: HashMap<String, Arc<FieldDecoder>> = HashMap::new();
    for binding in descriptor.fields {
        let Some(decoder) = binding.decoder else {
            continue;
        };
        let field = Arc::new(FieldDecoder {
            name: binding.field.name,
            get_mut: binding.field.get_mut,
            decoder,
            tagged: binding.tagged,
        });
        for from_name in binding.from_names {
            match fields.get(&from_name) {
                None => {
                    fields.insert(from_name, field.clone());
                }
                Some(old) => {
                    let (ignore_old, ignore_new) = resolve_conflict(old.tagged, field.tagged);
                    if ignore_old {
                        fields.remove(&from_name);
                    }
                    if !ignore_new {
                        fields.insert(from_name, field.clone());
                    }
                }
            }
        }
    }
    let config = ctx.config();
    if !config.case_sensitive {
        let lowered: Vec<_> = fields
            .iter()
            .map(|(name, field)| (name.to_lowercase(), field.clone()))
            .collect();
        for (name, field) in lowered {
            fields.entry(name).or_insert(field);
        }
    }
    Arc::new(StructDecoder {
        identity: ty.identity,
        fields,
        case_sensitive: config.case_sensitive,
        disallow_unknown_fields: config.disallow_unknown_fields,
        simple_field_names: config.object_field_must_be_simple_string,
    })
}

/// Matches object members to fields by name. `null` leaves the value
/// untouched and members missing from the input keep their current value.
pub struct StructDecoder {
    identity: TypeIdentity,
    fields: HashMap<String, Arc<FieldDecoder>>,
    case_sensitive: bool,
    disallow_unknown_fields: bool,
    simple_field_names: bool,
}

impl StructDecoder {
    fn lookup(&self, name: &str) -> Option<&FieldDecoder> {
        if let Some(field) = self.fields.get(name) {
            return Some(&**field);
        }
        if self.case_sensitive {
            return None;
        }
        self.fields.get(&name.to_lowercase()).map(|f| &**f)
    }

    fn decode_members(&self, target: &mut dyn Any, ctx: &mut ReadContext<'_>) {
        if ctx.read(|r| r.read_null()) != Some(false) {
            return;
        }
        if ctx.read(|r| r.read_object_begin()) != Some(true) {
            return;
        }
        loop {
            let simple = self.simple_field_names;
            let Some(name) = ctx.read(|r| r.read_field_name(simple)) else {
                return;
            };
            match self.lookup(&name) {
                Some(field) => {
                    let Some(slot) = ctx.track((field.get_mut)(target)) else {
                        return;
                    };
                    field.decoder.decode(slot, ctx);
                    if ctx.has_error() {
                        ctx.wrap_error(&format!("{}.{}", self.identity.short_name(), field.name));
                        return;
                    }
                }
                None if self.disallow_unknown_fields => {
                    ctx.report_error(Error::unknown_field(format!(
                        "ReadObject: found unknown field: {name}"
                    )));
                    return;
                }
                None => {
                    if ctx.read(|r| r.skip()).is_none() {
                        return;
                    }
                }
            }
            if ctx.read(|r| r.read_object_next()) != Some(true) {
                return;
            }
        }
    }
}

impl Decoder for StructDecoder {
    fn decode(&self, target: &mut dyn Any, ctx: &mut ReadContext<'_>) {
        if !ctx.enter("ReadObject") {
            return;
        }
        self.decode_members(target, ctx);
        ctx.leave();
    }
}

struct FieldEncoder {
    name: String,
    field_name: &'static str,
    get: Getter,
    encoder: EncoderRef,
    omit_empty: bool,
}

pub(crate) fn encoder_of_struct(
    ctx: &mut CompileContext<'_>,
    ty: &TypeDescriptor,
    shape: &StructShape,
) -> EncoderRef {
    let descriptor = describe_struct(ctx, ty, shape, Side::Encode);
    let mut claimed: HashMap<String, (usize, bool)> = HashMap::new();
    let mut slots: Vec<Option<FieldEncoder>> = Vec::new();
    for binding in descriptor.fields {
        let (Some(encoder), Some(name)) = (binding.encoder, binding.to_names.into_iter().next())
        else {
            continue;
        };
        let index = slots.len();
        slots.push(Some(FieldEncoder {
            name: name.clone(),
            field_name: binding.field.name,
            get: binding.field.get,
            encoder,
            omit_empty: binding.omit_empty,
        }));
        match claimed.get(&name).copied() {
            None => {
                claimed.insert(name, (index, binding.tagged));
            }
            Some((old_index, old_tagged)) => {
                let (ignore_old, ignore_new) = resolve_conflict(old_tagged, binding.tagged);
                if ignore_old {
                    slots[old_index] = None;
                    claimed.remove(&name);
                }
                if ignore_new {
                    slots[index] = None;
                } else {
                    claimed.insert(name, (index, binding.tagged));
                }
            }
        }
    }
    Arc::new(StructEncoder {
        identity: ty.identity,
        fields: slots.into_iter().flatten().collect(),
    })
}

/// Writes the fields in declaration order, leaving out empty `omitempty` ones.
pub struct StructEncoder {
    identity: TypeIdentity,
    fields: Vec<FieldEncoder>,
}

impl Encoder for StructEncoder {
    fn encode(&self, source: &dyn Any, ctx: &mut WriteContext<'_>) {
        if ctx.has_error() {
            return;
        }
        ctx.writer.begin_object();
        let mut first = true;
        for field in &self.fields {
            let Some(value) = ctx.track((field.get)(source)) else {
                return;
            };
            if field.omit_empty && field.encoder.is_empty(value) {
                continue;
            }
            ctx.writer.object_field(&field.name, first);
            first = false;
            field.encoder.encode(value, ctx);
            if ctx.has_error() {
                ctx.wrap_error(&format!("{}.{}", self.identity.short_name(), field.field_name));
                return;
            }
        }
        ctx.writer.end_object(first);
    }

    fn is_empty(&self, _source: &dyn Any) -> bool {
        false
    }
}
