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

use jsonic_core::config::Config;
use jsonic_core::error::Error;
use jsonic_core::registry::Registry;
use jsonic_derive::Reflect;

#[derive(Reflect, Debug, Default, PartialEq, Clone)]
struct ColorGroup {
    #[tag(json = "ID")]
    id: i64,
    #[tag(json = "Name")]
    name: String,
    #[tag(json = "Colors")]
    colors: Vec<String>,
}

fn reds() -> ColorGroup {
    ColorGroup {
        id: 1,
        name: "Reds".to_string(),
        colors: vec!["Crimson".to_string(), "Red".to_string()],
    }
}

#[test]
fn test_encode_color_group() -> anyhow::Result<()> {
    let api = Config::standard().freeze_in(&Registry::new());
    let json = api.marshal_to_string(&reds())?;
    assert_eq!(json, r#"{"ID":1,"Name":"Reds","Colors":["Crimson","Red"]}"#);
    Ok(())
}

#[test]
fn test_decode_color_group() -> anyhow::Result<()> {
    let api = Config::standard().freeze_in(&Registry::new());
    let group: ColorGroup =
        api.unmarshal(br#" {"ID":1, "Name":"Reds", "Colors":["Crimson","Red"]} "#)?;
    assert_eq!(group, reds());
    Ok(())
}

#[test]
fn test_unknown_field() {
    let registry = Registry::new();
    let lenient = Config::default().freeze_in(&registry);
    let group: ColorGroup = lenient.unmarshal(br#"{"ID":1,"Extra":"x"}"#).unwrap();
    assert_eq!(group.id, 1);

    let strict = Config::default()
        .disallow_unknown_fields(true)
        .freeze_in(&registry);
    let err = strict
        .unmarshal::<ColorGroup>(br#"{"ID":1,"Extra":"x"}"#)
        .unwrap_err();
    assert!(matches!(err, Error::UnknownField(_)));
    assert!(err.to_string().contains("Extra"));
}

#[test]
fn test_absent_fields_keep_their_value() {
    let api = Config::default().freeze_in(&Registry::new());
    let mut group = reds();
    api.unmarshal_into(br#"{"Name":"Blues"}"#, &mut group).unwrap();
    assert_eq!(group.id, 1);
    assert_eq!(group.name, "Blues");
    assert_eq!(group.colors.len(), 2);

    api.unmarshal_into(b"null", &mut group).unwrap();
    assert_eq!(group.name, "Blues");
}

#[test]
fn test_field_names_without_tags() {
    #[derive(Reflect, Debug, Default, PartialEq)]
    struct Plain {
        width: u32,
        r#type: String,
    }

    let api = Config::default().freeze_in(&Registry::new());
    let plain = Plain {
        width: 3,
        r#type: "box".to_string(),
    };
    assert_eq!(
        api.marshal_to_string(&plain).unwrap(),
        r#"{"width":3,"type":"box"}"#
    );
    assert_eq!(api.unmarshal::<Plain>(br#"{"width":3,"type":"box"}"#).unwrap(), plain);
}

#[test]
fn test_omit_empty_and_dash() {
    #[derive(Reflect, Debug, Default, PartialEq)]
    struct Sparse {
        #[tag(json = "a,omitempty")]
        a: i32,
        #[tag(json = "b,omitempty")]
        b: String,
        #[tag(json = "c,omitempty")]
        c: Vec<u8>,
        #[tag(json = "d,omitempty")]
        d: Option<bool>,
        #[tag(json = "-")]
        hidden: i32,
        #[jsonic(skip)]
        skipped: i32,
        e: bool,
    }

    let api = Config::default().freeze_in(&Registry::new());
    let sparse = Sparse {
        hidden: 5,
        skipped: 6,
        ..Sparse::default()
    };
    assert_eq!(api.marshal_to_string(&sparse).unwrap(), r#"{"e":false}"#);

    let full = Sparse {
        a: 1,
        b: "x".to_string(),
        c: vec![1],
        d: Some(false),
        ..Sparse::default()
    };
    assert_eq!(
        api.marshal_to_string(&full).unwrap(),
        r#"{"a":1,"b":"x","c":[1],"d":false,"e":false}"#
    );

    let decoded: Sparse = api.unmarshal(br#"{"hidden":9,"skipped":9}"#).unwrap();
    assert_eq!(decoded.hidden, 0);
    assert_eq!(decoded.skipped, 0);
}

#[test]
fn test_case_insensitive_matching() {
    #[derive(Reflect, Debug, Default, PartialEq)]
    struct Account {
        #[tag(json = "UserName")]
        user_name: String,
    }

    let registry = Registry::new();
    let api = Config::default().freeze_in(&registry);
    let account: Account = api.unmarshal(br#"{"username":"ada"}"#).unwrap();
    assert_eq!(account.user_name, "ada");
    let account: Account = api.unmarshal(br#"{"USERNAME":"bob"}"#).unwrap();
    assert_eq!(account.user_name, "bob");

    let exact = Config::default().case_sensitive(true).freeze_in(&registry);
    let account: Account = exact.unmarshal(br#"{"username":"ada"}"#).unwrap();
    assert_eq!(account.user_name, "");
    let account: Account = exact.unmarshal(br#"{"UserName":"ada"}"#).unwrap();
    assert_eq!(account.user_name, "ada");
}

#[test]
fn test_custom_tag_key_and_only_tagged() {
    #[derive(Reflect, Debug, Default, PartialEq)]
    struct Row {
        #[tag(json = "json_id", db = "row_id")]
        id: i64,
        label: String,
    }

    let registry = Registry::new();
    let row = Row {
        id: 7,
        label: "seven".to_string(),
    };

    let db = Config::default().tag_key("db").freeze_in(&registry);
    assert_eq!(
        db.marshal_to_string(&row).unwrap(),
        r#"{"row_id":7,"label":"seven"}"#
    );

    let only_tagged = Config::default()
        .tag_key("db")
        .only_tagged_field(true)
        .freeze_in(&registry);
    assert_eq!(only_tagged.marshal_to_string(&row).unwrap(), r#"{"row_id":7}"#);
}

#[test]
fn test_string_option() {
    #[derive(Reflect, Debug, Default, PartialEq)]
    struct Quoted {
        #[tag(json = "count,string")]
        count: i64,
        #[tag(json = "ok,string")]
        ok: bool,
        #[tag(json = "label,string")]
        label: String,
        #[tag(json = "items,string")]
        items: Vec<i32>,
    }

    let api = Config::default().freeze_in(&Registry::new());
    let value = Quoted {
        count: 12,
        ok: true,
        label: "hi".to_string(),
        items: vec![1, 2],
    };
    let json = api.marshal_to_string(&value).unwrap();
    assert_eq!(
        json,
        r#"{"count":"12","ok":"true","label":"\"hi\"","items":[1,2]}"#
    );
    assert_eq!(api.unmarshal::<Quoted>(json.as_bytes()).unwrap(), value);
}

#[test]
fn test_name_conflicts() {
    #[derive(Reflect, Debug, Default, PartialEq)]
    struct Clash {
        #[tag(json = "name")]
        tagged: String,
        name: String,
        #[tag(json = "both")]
        first: i32,
        #[tag(json = "both")]
        second: i32,
    }

    let api = Config::default().freeze_in(&Registry::new());
    let clash = Clash {
        tagged: "t".to_string(),
        name: "n".to_string(),
        first: 1,
        second: 2,
    };
    assert_eq!(api.marshal_to_string(&clash).unwrap(), r#"{"name":"t"}"#);

    let decoded: Clash = api.unmarshal(br#"{"name":"x","both":3}"#).unwrap();
    assert_eq!(decoded.tagged, "x");
    assert_eq!(decoded.name, "");
    assert_eq!(decoded.first, 0);
    assert_eq!(decoded.second, 0);
}

#[test]
fn test_nested_field_error_names_the_field() {
    #[derive(Reflect, Debug, Default)]
    struct Inner {
        n: u8,
    }

    #[derive(Reflect, Debug, Default)]
    struct Outer {
        inner: Inner,
    }

    let api = Config::default().freeze_in(&Registry::new());
    let err = api
        .unmarshal::<Outer>(br#"{"inner":{"n":300}}"#)
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Outer.inner"), "{message}");
    assert!(message.contains("Inner.n"), "{message}");
}

#[test]
fn test_generic_struct() {
    #[derive(Reflect, Debug, Default, PartialEq)]
    struct Page<T> {
        items: Vec<T>,
        total: usize,
    }

    let api = Config::default().freeze_in(&Registry::new());
    let page = Page {
        items: vec!["a".to_string()],
        total: 1,
    };
    let json = api.marshal_to_string(&page).unwrap();
    assert_eq!(json, r#"{"items":["a"],"total":1}"#);
    assert_eq!(api.unmarshal::<Page<String>>(json.as_bytes()).unwrap(), page);
}

#[test]
fn test_malformed_input() {
    let api = Config::default().freeze_in(&Registry::new());
    assert!(api.unmarshal::<ColorGroup>(br#"{"ID":}"#).is_err());
    assert!(api.unmarshal::<ColorGroup>(br#"{"ID":1"#).is_err());
    assert!(api.unmarshal::<ColorGroup>(br#"[1]"#).is_err());

    let err = api.unmarshal::<ColorGroup>(br#"{"ID":1} {}"#).unwrap_err();
    assert!(matches!(err, Error::TrailingData(_)));
}
