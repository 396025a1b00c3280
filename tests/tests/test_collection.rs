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

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::NaiveDate;
use jsonic_core::config::Config;
use jsonic_core::error::Error;
use jsonic_core::registry::Registry;

#[test]
fn test_vec() {
    let api = Config::default().freeze_in(&Registry::new());
    let v = vec![vec![1i16, 2], vec![], vec![-3]];
    let json = api.marshal_to_string(&v).unwrap();
    assert_eq!(json, "[[1,2],[],[-3]]");
    assert_eq!(api.unmarshal::<Vec<Vec<i16>>>(json.as_bytes()).unwrap(), v);

    let mut existing = vec![9u32, 9, 9];
    api.unmarshal_into(b"[1]", &mut existing).unwrap();
    assert_eq!(existing, vec![1]);
    api.unmarshal_into(b"null", &mut existing).unwrap();
    assert!(existing.is_empty());
}

#[test]
fn test_fixed_array() {
    let api = Config::default().freeze_in(&Registry::new());
    assert_eq!(api.marshal_to_string(&[1u8, 2, 3]).unwrap(), "[1,2,3]");
    assert_eq!(api.marshal_to_string(&[0i32; 0]).unwrap(), "[]");

    let mut arr = [7i32; 3];
    api.unmarshal_into(b"[1]", &mut arr).unwrap();
    assert_eq!(arr, [1, 0, 0]);
    api.unmarshal_into(b"[4,5,6,7,8]", &mut arr).unwrap();
    assert_eq!(arr, [4, 5, 6]);
    api.unmarshal_into(b"null", &mut arr).unwrap();
    assert_eq!(arr, [4, 5, 6]);
}

#[test]
fn test_sequence_element_error() {
    let api = Config::default().freeze_in(&Registry::new());
    let err = api.unmarshal::<Vec<u8>>(b"[1,2,-1]").unwrap_err();
    assert!(matches!(err, Error::Decode(_)), "{err}");
}

#[test]
fn test_option_and_box() {
    let api = Config::default().freeze_in(&Registry::new());
    assert_eq!(api.marshal_to_string(&None::<i32>).unwrap(), "null");
    assert_eq!(api.marshal_to_string(&Some(Box::new(3i32))).unwrap(), "3");
    assert_eq!(api.marshal_to_string(&Arc::new("s".to_string())).unwrap(), r#""s""#);

    let mut slot = Some(5i32);
    api.unmarshal_into(b"null", &mut slot).unwrap();
    assert_eq!(slot, None);
    api.unmarshal_into(b"6", &mut slot).unwrap();
    assert_eq!(slot, Some(6));
}

#[test]
fn test_primitives_ignore_null() {
    let api = Config::default().freeze_in(&Registry::new());
    let mut n = 5i64;
    api.unmarshal_into(b"null", &mut n).unwrap();
    assert_eq!(n, 5);
    let mut s = "kept".to_string();
    api.unmarshal_into(b"null", &mut s).unwrap();
    assert_eq!(s, "kept");
}

#[test]
fn test_integer_range_checks() {
    let api = Config::default().freeze_in(&Registry::new());
    assert_eq!(api.unmarshal::<i8>(b"-128").unwrap(), -128);
    assert!(api.unmarshal::<i8>(b"128").is_err());
    assert!(api.unmarshal::<u32>(b"-1").is_err());
    assert_eq!(api.unmarshal::<u64>(b"18446744073709551615").unwrap(), u64::MAX);
    assert!(api.unmarshal::<i32>(b"1.5").is_err());

    assert_eq!(api.unmarshal::<f32>(b"3.4e38").unwrap(), 3.4e38f32);
    let err = api.unmarshal::<f32>(b"1e300").unwrap_err();
    assert!(err.to_string().contains("overflows f32"), "{err}");
    let mut kept = 2.5f32;
    assert!(api.unmarshal_into(b"-1e39", &mut kept).is_err());
    assert_eq!(kept, 2.5);
}

#[test]
fn test_non_finite_floats_fail() {
    let api = Config::default().freeze_in(&Registry::new());
    assert!(matches!(api.marshal(&f64::NAN), Err(Error::Encode(_))));
    assert!(api.marshal(&vec![1.0f32, f32::INFINITY]).is_err());
    assert_eq!(api.marshal_to_string(&1e21f64).unwrap(), "1e+21");
}

#[test]
fn test_map_keys() {
    let api = Config::default().freeze_in(&Registry::new());

    let mut ints = BTreeMap::new();
    ints.insert(1i32, "a".to_string());
    ints.insert(-2i32, "b".to_string());
    let json = api.marshal_to_string(&ints).unwrap();
    assert_eq!(json, r#"{"-2":"b","1":"a"}"#);
    assert_eq!(api.unmarshal::<BTreeMap<i32, String>>(json.as_bytes()).unwrap(), ints);

    let mut dates = BTreeMap::new();
    dates.insert(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), 3i32);
    let json = api.marshal_to_string(&dates).unwrap();
    assert_eq!(json, r#"{"2024-01-02":3}"#);
    assert_eq!(
        api.unmarshal::<BTreeMap<NaiveDate, i32>>(json.as_bytes()).unwrap(),
        dates
    );

    assert!(api.unmarshal::<BTreeMap<i32, String>>(br#"{"x":"a"}"#).is_err());
}

#[test]
fn test_unsupported_map_key() {
    let api = Config::default().freeze_in(&Registry::new());
    let empty: BTreeMap<Vec<i32>, i32> = BTreeMap::new();
    assert_eq!(api.marshal_to_string(&empty).unwrap(), "{}");

    let mut full = BTreeMap::new();
    full.insert(vec![1], 1);
    let err = api.marshal(&full).unwrap_err();
    assert!(matches!(err, Error::Unsupported(_)), "{err}");

    let flags = BTreeMap::from([(true, 1i32)]);
    let err = api.marshal_to_string(&flags).unwrap_err();
    assert!(err.to_string().contains("unsupported map key type: bool"), "{err}");
    let err = api.unmarshal::<HashMap<bool, u8>>(br#"{"true":1}"#).unwrap_err();
    assert!(matches!(err, Error::Unsupported(_)), "{err}");
}

#[test]
fn test_map_decode_merges_and_null_clears() {
    let api = Config::default().freeze_in(&Registry::new());
    let mut map = HashMap::new();
    map.insert("old".to_string(), 1i32);
    api.unmarshal_into(br#"{"new":2}"#, &mut map).unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map["new"], 2);

    api.unmarshal_into(b"null", &mut map).unwrap();
    assert!(map.is_empty());
}

#[test]
fn test_sorted_map_keys_with_html_escape() {
    let api = Config::compatible_with_standard_library().freeze_in(&Registry::new());
    let mut map = HashMap::new();
    map.insert("b<".to_string(), 1);
    map.insert("a".to_string(), 2);
    map.insert("10".to_string(), 3);
    map.insert("9".to_string(), 4);
    assert_eq!(
        api.marshal_to_string(&map).unwrap(),
        r#"{"10":3,"9":4,"a":2,"b\u003c":1}"#
    );

    let mut ints = HashMap::new();
    ints.insert(10u16, 'x'.to_string());
    ints.insert(9u16, 'y'.to_string());
    assert_eq!(
        api.marshal_to_string(&ints).unwrap(),
        r#"{"10":"x","9":"y"}"#
    );
}
