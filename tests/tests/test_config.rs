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

use std::collections::HashMap;
use std::sync::Arc;

use jsonic_core::config::Config;
use jsonic_core::registry::Registry;
use jsonic_derive::Reflect;

#[derive(Reflect, Debug, Default, PartialEq)]
struct Doc {
    title: String,
    tags: Vec<String>,
    ratio: f64,
}

#[test]
fn test_freeze_is_idempotent() {
    let registry = Registry::new();
    let a = Config::default().escape_html(true).freeze_in(&registry);
    let b = Config::standard().freeze_in(&registry);
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(registry.frozen_count(), 1);

    let c = Config::standard().sort_map_keys(true).freeze_in(&registry);
    assert!(!Arc::ptr_eq(&a, &c));
    assert_eq!(registry.frozen_count(), 2);

    let isolated = Registry::new();
    let d = Config::standard().freeze_in(&isolated);
    assert!(!Arc::ptr_eq(&a, &d));
}

#[test]
fn test_global_registry() {
    let a = Config::fastest().freeze();
    let b = Config::fastest().freeze();
    assert!(Arc::ptr_eq(&a, &b));
    assert!(Arc::ptr_eq(a.registry(), Registry::global()));
}

#[test]
fn test_codecs_are_compiled_once() {
    let api = Config::default().freeze_in(&Registry::new());
    let first = api.encoder_of::<Doc>();
    let second = api.encoder_of::<Doc>();
    assert!(Arc::ptr_eq(&first, &second));

    let first = api.decoder_of::<Doc>();
    let second = api.decoder_of::<Doc>();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_escape_html() {
    let registry = Registry::new();
    let text = "<a href=\"x\">&</a>".to_string();

    let plain = Config::default().freeze_in(&registry);
    assert_eq!(
        plain.marshal_to_string(&text).unwrap(),
        r#""<a href=\"x\">&</a>""#
    );

    let escaped = Config::standard().freeze_in(&registry);
    assert_eq!(
        escaped.marshal_to_string(&text).unwrap(),
        r#""\u003ca href=\"x\"\u003e\u0026\u003c/a\u003e""#
    );
}

#[test]
fn test_lossy_floats() {
    let registry = Registry::new();
    let doc = Doc {
        ratio: 1.234_567_89,
        ..Doc::default()
    };
    let exact = Config::default().freeze_in(&registry);
    assert!(exact
        .marshal_to_string(&doc)
        .unwrap()
        .contains(r#""ratio":1.23456789"#));

    let fastest = Config::fastest().freeze_in(&registry);
    assert!(fastest
        .marshal_to_string(&doc)
        .unwrap()
        .contains(r#""ratio":1.234568"#));
    assert_eq!(fastest.marshal_to_string(&2.5f32).unwrap(), "2.5");
}

#[test]
fn test_sort_map_keys() {
    let registry = Registry::new();
    let mut map = HashMap::new();
    for (i, key) in ["delta", "alpha", "charlie", "bravo"].iter().enumerate() {
        map.insert(key.to_string(), i as i32);
    }
    let sorted = Config::default().sort_map_keys(true).freeze_in(&registry);
    assert_eq!(
        sorted.marshal_to_string(&map).unwrap(),
        r#"{"alpha":1,"bravo":3,"charlie":2,"delta":0}"#
    );

    let unsorted = Config::default().freeze_in(&registry);
    let json = unsorted.marshal_to_string(&map).unwrap();
    let back: HashMap<String, i32> = unsorted.unmarshal(json.as_bytes()).unwrap();
    assert_eq!(back, map);
}

#[test]
fn test_marshal_indent() {
    let api = Config::default().freeze_in(&Registry::new());
    let doc = Doc {
        title: "t".to_string(),
        tags: vec!["a".to_string(), "b".to_string()],
        ratio: 0.5,
    };
    let pretty = String::from_utf8(api.marshal_indent(&doc, "", "  ").unwrap()).unwrap();
    assert_eq!(
        pretty,
        "{\n  \"title\": \"t\",\n  \"tags\": [\n    \"a\",\n    \"b\"\n  ],\n  \"ratio\": 0.5\n}"
    );

    let empty = String::from_utf8(api.marshal_indent(&Doc::default(), "", "  ").unwrap()).unwrap();
    assert_eq!(empty, "{\n  \"title\": \"\",\n  \"tags\": [],\n  \"ratio\": 0\n}");
}

#[test]
#[should_panic(expected = "prefix is not supported")]
fn test_marshal_indent_rejects_prefix() {
    let api = Config::default().freeze_in(&Registry::new());
    let _ = api.marshal_indent(&1i32, ">", "  ");
}

#[test]
fn test_derive_keeps_extras_and_flags() {
    let registry = Registry::new();
    let api = Config::default().freeze_in(&registry);
    let strict = api.derive(|config| config.disallow_unknown_fields(true));
    assert!(strict.config().disallow_unknown_fields);
    assert!(!api.config().disallow_unknown_fields);
    assert!(Arc::ptr_eq(
        &strict,
        &Config::default()
            .disallow_unknown_fields(true)
            .freeze_in(&registry)
    ));
}

#[test]
fn test_valid() {
    let api = Config::default().freeze_in(&Registry::new());
    assert!(api.valid(br#"{"a":[1,2,{"b":null}]}"#));
    assert!(api.valid(b" true "));
    assert!(!api.valid(br#"{"a":}"#));
    assert!(!api.valid(b"[1] [2]"));
    assert!(!api.valid(b""));
}

#[test]
fn test_whitespace_only_input_is_a_no_op() {
    let api = Config::default().freeze_in(&Registry::new());
    let mut doc = Doc {
        title: "kept".to_string(),
        ..Doc::default()
    };
    api.unmarshal_into(b"  \n ", &mut doc).unwrap();
    assert_eq!(doc.title, "kept");
}
