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

use std::any::{type_name, Any};
use std::sync::Arc;

use jsonic_core::codec::struct_::StructDescriptor;
use jsonic_core::codec::{Decoder, DecoderRef, Encoder, EncoderRef, FnDecoder, FnEncoder};
use jsonic_core::config::Config;
use jsonic_core::extension::{Extension, TypeCodecExtension};
use jsonic_core::reflect::{downcast, downcast_mut, TypeDescriptor};
use jsonic_core::registry::Registry;
use jsonic_core::resolver::context::{ReadContext, WriteContext};
use jsonic_derive::Reflect;

#[derive(Reflect, Debug, Default, PartialEq)]
struct Secret {
    token: String,
}

fn constant(text: &'static str) -> EncoderRef {
    Arc::new(FnEncoder::new(move |_, ctx| {
        ctx.writer.write_raw(text.as_bytes())
    }))
}

struct Constant {
    text: &'static str,
}

impl Extension for Constant {
    fn create_encoder(&self, ty: &TypeDescriptor) -> Option<EncoderRef> {
        ty.is::<Secret>().then(|| constant(self.text))
    }
}

/// Wraps every encoder in `["<label>", ...]`.
struct Label(&'static str);

struct Labelled {
    label: &'static str,
    inner: EncoderRef,
}

impl Encoder for Labelled {
    fn encode(&self, source: &dyn Any, ctx: &mut WriteContext<'_>) {
        ctx.writer.write_byte(b'[');
        ctx.writer.write_string(self.label);
        ctx.writer.write_byte(b',');
        self.inner.encode(source, ctx);
        ctx.writer.write_byte(b']');
    }

    fn is_empty(&self, source: &dyn Any) -> bool {
        self.inner.is_empty(source)
    }
}

impl Extension for Label {
    fn decorate_encoder(&self, _ty: &TypeDescriptor, encoder: EncoderRef) -> EncoderRef {
        Arc::new(Labelled {
            label: self.0,
            inner: encoder,
        })
    }
}

#[test]
fn test_constant_encoder_from_extra_extension() {
    let api = Config::default().freeze_in(&Registry::new());
    let secret = Secret {
        token: "hunter2".to_string(),
    };
    assert_eq!(
        api.marshal_to_string(&secret).unwrap(),
        r#"{"token":"hunter2"}"#
    );

    api.register_extension(Arc::new(Constant { text: r#""***""# }));
    assert_eq!(api.marshal_to_string(&secret).unwrap(), r#""***""#);
    assert_eq!(
        api.marshal_to_string(&vec![Secret::default()]).unwrap(),
        r#"["***"]"#
    );
}

#[test]
fn test_type_codec_extension() {
    let api = Config::default().freeze_in(&Registry::new());
    api.register_extension(Arc::new(
        TypeCodecExtension::new().with_encoder::<Secret>(constant("0")),
    ));
    assert_eq!(api.marshal_to_string(&Secret::default()).unwrap(), "0");
}

#[test]
fn test_create_precedence() {
    let registry = Registry::new();
    registry.register_extension(Arc::new(Constant { text: "1" }));
    let api = Config::default().freeze_in(&registry);
    api.register_extension(Arc::new(Constant { text: "3" }));
    assert_eq!(api.marshal_to_string(&Secret::default()).unwrap(), "1");

    // the html escaping string encoder comes from the configuration tier
    let api = Config::standard().freeze_in(&Registry::new());
    api.register_extension(Arc::new(
        TypeCodecExtension::new().with_encoder::<String>(constant("3")),
    ));
    assert_eq!(
        api.marshal_to_string(&"<".to_string()).unwrap(),
        r#""\u003c""#
    );
}

#[test]
fn test_decoration_order() {
    let registry = Registry::new();
    registry.register_extension(Arc::new(Label("global")));
    let api = Config::default().freeze_in(&registry);
    api.register_extension(Arc::new(Label("extra")));
    assert_eq!(
        api.marshal_to_string(&5i32).unwrap(),
        r#"["extra",["global",5]]"#
    );
}

#[test]
fn test_created_codecs_are_decorated() {
    let registry = Registry::new();
    registry.register_extension(Arc::new(Constant { text: "0" }));
    let api = Config::default().freeze_in(&registry);
    api.register_extension(Arc::new(Label("extra")));
    assert_eq!(
        api.marshal_to_string(&Secret::default()).unwrap(),
        r#"["extra",0]"#
    );
}

struct Rename;

impl Extension for Rename {
    fn update_struct_descriptor(&self, descriptor: &mut StructDescriptor) {
        if let Some(binding) = descriptor.field_mut("token") {
            binding.to_names = vec!["tok".to_string()];
            binding.from_names = vec!["tok".to_string(), "t".to_string()];
        }
    }
}

#[test]
fn test_update_struct_descriptor() {
    let api = Config::default().freeze_in(&Registry::new());
    api.register_extension(Arc::new(Rename));
    let secret = Secret {
        token: "x".to_string(),
    };
    assert_eq!(api.marshal_to_string(&secret).unwrap(), r#"{"tok":"x"}"#);
    assert_eq!(api.unmarshal::<Secret>(br#"{"t":"y"}"#).unwrap().token, "y");
    assert_eq!(api.unmarshal::<Secret>(br#"{"tok":"z"}"#).unwrap().token, "z");
    assert_eq!(api.unmarshal::<Secret>(br#"{"token":"w"}"#).unwrap().token, "");
}

#[test]
fn test_registration_after_freeze_forks_the_instance() {
    let registry = Registry::new();
    let api = Config::default().freeze_in(&registry);
    assert!(Arc::ptr_eq(&api, &Config::default().freeze_in(&registry)));
    assert_eq!(api.marshal_to_string(&Secret::default()).unwrap(), r#"{"token":""}"#);

    api.register_extension(Arc::new(Constant { text: "null" }));
    assert_eq!(api.marshal_to_string(&Secret::default()).unwrap(), "null");

    let fresh = Config::default().freeze_in(&registry);
    assert!(!Arc::ptr_eq(&api, &fresh));
    assert_eq!(
        fresh.marshal_to_string(&Secret::default()).unwrap(),
        r#"{"token":""}"#
    );
}

#[derive(Reflect, Debug, Default, PartialEq)]
struct Celsius {
    degrees: f64,
}

#[derive(Reflect, Debug, Default, PartialEq)]
struct Reading {
    celsius: Celsius,
    backup: Option<Celsius>,
    station: String,
}

fn celsius_encoder() -> EncoderRef {
    Arc::new(FnEncoder::new(|source, ctx| {
        let Some(c) = ctx.track(downcast::<Celsius>(source)) else {
            return;
        };
        let written = ctx.writer.write_f64(c.degrees);
        ctx.track(written);
    }))
}

fn celsius_decoder() -> DecoderRef {
    Arc::new(FnDecoder::new(|target, ctx| {
        let Some(degrees) = ctx.read(|r| r.read_f64()) else {
            return;
        };
        if let Some(c) = ctx.track(downcast_mut::<Celsius>(target)) {
            c.degrees = degrees;
        }
    }))
}

#[test]
fn test_type_overrides() {
    let registry = Registry::new();
    registry.register_type_encoder(type_name::<Celsius>(), celsius_encoder());
    registry.register_type_decoder(type_name::<Celsius>(), celsius_decoder());
    let api = Config::default().freeze_in(&registry);

    let reading = Reading {
        celsius: Celsius { degrees: 21.5 },
        backup: Some(Celsius { degrees: -3.0 }),
        station: "north".to_string(),
    };
    let json = api.marshal_to_string(&reading).unwrap();
    assert_eq!(json, r#"{"celsius":21.5,"backup":-3,"station":"north"}"#);
    assert_eq!(api.unmarshal::<Reading>(json.as_bytes()).unwrap(), reading);

    let none = Reading::default();
    assert_eq!(
        api.marshal_to_string(&none).unwrap(),
        r#"{"celsius":0,"backup":null,"station":""}"#
    );
}

struct Uppercase;

impl Decoder for Uppercase {
    fn decode(&self, target: &mut dyn Any, ctx: &mut ReadContext<'_>) {
        let Some(text) = ctx.read(|r| r.read_string()) else {
            return;
        };
        if let Some(s) = ctx.track(downcast_mut::<String>(target)) {
            *s = text.to_uppercase();
        }
    }
}

#[test]
fn test_field_overrides() {
    let registry = Registry::new();
    registry.register_field_decoder(type_name::<Reading>(), "station", Arc::new(Uppercase));
    registry.register_field_encoder(type_name::<Reading>(), "station", constant(r#""hidden""#));
    let api = Config::default().freeze_in(&registry);

    let reading: Reading = api.unmarshal(br#"{"station":"south"}"#).unwrap();
    assert_eq!(reading.station, "SOUTH");
    let json = api.marshal_to_string(&reading).unwrap();
    assert!(json.ends_with(r#""station":"hidden"}"#), "{json}");

    #[derive(Reflect, Debug, Default)]
    struct Other {
        station: String,
    }
    let other: Other = api.unmarshal(br#"{"station":"south"}"#).unwrap();
    assert_eq!(other.station, "south");
}
