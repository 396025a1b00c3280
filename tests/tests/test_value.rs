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

use std::collections::BTreeMap;

use jsonic_core::config::Config;
use jsonic_core::registry::Registry;
use jsonic_core::value::{Bytes, Dynamic, Number, RawMessage, Value};
use jsonic_derive::Reflect;

#[test]
fn test_use_number_keeps_precision() {
    let registry = Registry::new();
    let input = br#"{"x":123456789012345678901}"#;

    let exact = Config::default().use_number(true).freeze_in(&registry);
    let value: Value = exact.unmarshal(input).unwrap();
    assert_eq!(
        value.get("x"),
        Some(&Value::Number(Number::new("123456789012345678901")))
    );
    assert_eq!(
        exact.marshal_to_string(&value).unwrap(),
        r#"{"x":123456789012345678901}"#
    );

    let lossy = Config::default().freeze_in(&registry);
    let value: Value = lossy.unmarshal(input).unwrap();
    assert!(matches!(value.get("x"), Some(Value::Float(_))));
    assert_eq!(value.get("x").and_then(Value::as_f64), Some(123_456_789_012_345_678_901.0));
}

#[test]
fn test_value_tree() {
    let api = Config::default().freeze_in(&Registry::new());
    let value: Value = api
        .unmarshal(br#" {"b":[true,null,"s",1.5],"a":{}} "#)
        .unwrap();
    let mut expected = BTreeMap::new();
    expected.insert(
        "b".to_string(),
        Value::Array(vec![
            Value::Bool(true),
            Value::Null,
            Value::String("s".to_string()),
            Value::Float(1.5),
        ]),
    );
    expected.insert("a".to_string(), Value::Object(BTreeMap::new()));
    assert_eq!(value, Value::Object(expected));
    assert_eq!(
        api.marshal_to_string(&value).unwrap(),
        r#"{"a":{},"b":[true,null,"s",1.5]}"#
    );
}

#[test]
fn test_value_depth_limit() {
    let api = Config::default().freeze_in(&Registry::new());
    let deep = "[".repeat(2000) + &"]".repeat(2000);
    assert!(api.unmarshal::<Value>(deep.as_bytes()).is_err());
    let shallow = "[".repeat(50) + &"]".repeat(50);
    assert!(api.unmarshal::<Value>(shallow.as_bytes()).is_ok());
}

#[test]
fn test_dynamic_encodes_held_type() {
    #[derive(Reflect, Debug, Default, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    let api = Config::default().freeze_in(&Registry::new());
    let values = vec![
        Dynamic::new(1u8),
        Dynamic::new("two".to_string()),
        Dynamic::new(Point { x: 3, y: 4 }),
        Dynamic::default(),
    ];
    assert_eq!(
        api.marshal_to_string(&values).unwrap(),
        r#"[1,"two",{"x":3,"y":4},null]"#
    );
}

#[test]
fn test_dynamic_decodes_into_held_type() {
    #[derive(Reflect, Default)]
    struct Envelope {
        kind: String,
        #[tag(json = "payload,omitempty")]
        payload: Dynamic,
    }

    let api = Config::default().freeze_in(&Registry::new());
    let mut envelope = Envelope::default();
    api.unmarshal_into(br#"{"kind":"k","payload":[1,2]}"#, &mut envelope)
        .unwrap();
    assert_eq!(
        envelope.payload.downcast_ref::<Value>(),
        Some(&Value::Array(vec![Value::Float(1.0), Value::Float(2.0)]))
    );

    let mut envelope = Envelope {
        payload: Dynamic::new(Vec::<i64>::new()),
        ..Envelope::default()
    };
    api.unmarshal_into(br#"{"payload":[1,2]}"#, &mut envelope)
        .unwrap();
    assert_eq!(envelope.payload.downcast_ref::<Vec<i64>>(), Some(&vec![1, 2]));

    let empty = Envelope::default();
    assert_eq!(api.marshal_to_string(&empty).unwrap(), r#"{"kind":""}"#);
}

#[test]
fn test_raw_message() {
    #[derive(Reflect, Debug, Default, PartialEq)]
    struct Deferred {
        id: i32,
        body: RawMessage,
    }

    let registry = Registry::new();
    let api = Config::default().freeze_in(&registry);
    let deferred: Deferred = api.unmarshal(br#"{"id":1,"body":{"a": [1, 2]}}"#).unwrap();
    assert_eq!(deferred.body.0, br#"{"a": [1, 2]}"#.to_vec());
    assert_eq!(
        api.marshal_to_string(&deferred).unwrap(),
        r#"{"id":1,"body":{"a": [1, 2]}}"#
    );
    assert_eq!(
        api.marshal_to_string(&Deferred::default()).unwrap(),
        r#"{"id":0,"body":null}"#
    );

    let broken = Deferred {
        id: 2,
        body: RawMessage(b"{oops".to_vec()),
    };
    let compatible = Config::compatible_with_standard_library().freeze_in(&registry);
    assert_eq!(
        compatible.marshal_to_string(&broken).unwrap(),
        r#"{"id":2,"body":null}"#
    );
}

#[test]
fn test_number_field() {
    #[derive(Reflect, Debug, Default, PartialEq)]
    struct Price {
        amount: Number,
    }

    let api = Config::default().freeze_in(&Registry::new());
    let price: Price = api.unmarshal(br#"{"amount":1.50}"#).unwrap();
    assert_eq!(price.amount.as_str(), "1.50");
    assert_eq!(api.marshal_to_string(&price).unwrap(), r#"{"amount":1.50}"#);

    let price: Price = api.unmarshal(br#"{"amount":"42"}"#).unwrap();
    assert_eq!(price.amount.as_i64().unwrap(), 42);

    assert_eq!(
        api.marshal_to_string(&Price::default()).unwrap(),
        r#"{"amount":0}"#
    );
}

#[test]
fn test_bytes_are_base64() {
    let api = Config::default().freeze_in(&Registry::new());
    let bytes = Bytes(b"hi there".to_vec());
    let json = api.marshal_to_string(&bytes).unwrap();
    assert_eq!(json, r#""aGkgdGhlcmU=""#);
    assert_eq!(api.unmarshal::<Bytes>(json.as_bytes()).unwrap(), bytes);
    assert!(api.unmarshal::<Bytes>(br#""not base64!""#).is_err());
}
