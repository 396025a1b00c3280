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

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use jsonic_core::codec::marshaler::{Marshaler, TextMarshaler, TextUnmarshaler, Unmarshaler};
use jsonic_core::config::Config;
use jsonic_core::error::Error;
use jsonic_core::reflect::{marshaler_hooks, Kind, Reflect, TypeDescriptor};
use jsonic_core::registry::Registry;
use jsonic_derive::Reflect;

/// Encodes as a two-element array instead of an object.
#[derive(Reflect, Debug, Default, PartialEq)]
#[jsonic(marshaler)]
struct Pair {
    left: i32,
    right: i32,
}

impl Marshaler for Pair {
    fn marshal_json(&self) -> Result<Vec<u8>, Error> {
        Ok(format!("[{},{}]\n", self.left, self.right).into_bytes())
    }
}

impl Unmarshaler for Pair {
    fn unmarshal_json(&mut self, data: &[u8]) -> Result<(), Error> {
        if data == b"null" {
            return Ok(());
        }
        let text = std::str::from_utf8(data).map_err(|e| Error::decode(e.to_string()))?;
        let inner = text
            .trim()
            .strip_prefix('[')
            .and_then(|t| t.strip_suffix(']'))
            .ok_or_else(|| Error::decode("pair must be an array"))?;
        let (left, right) = inner
            .split_once(',')
            .ok_or_else(|| Error::decode("pair needs two elements"))?;
        self.left = left.trim().parse().map_err(|_| Error::decode("bad left"))?;
        self.right = right.trim().parse().map_err(|_| Error::decode("bad right"))?;
        Ok(())
    }
}

#[derive(Reflect, Debug, Default, PartialEq)]
struct Segment {
    from: Pair,
    to: Option<Pair>,
}

#[test]
fn test_marshaler() {
    let api = Config::default().freeze_in(&Registry::new());
    let segment = Segment {
        from: Pair { left: 1, right: 2 },
        to: Some(Pair { left: 3, right: 4 }),
    };
    let json = api.marshal_to_string(&segment).unwrap();
    assert_eq!(json, r#"{"from":[1,2],"to":[3,4]}"#);
    assert_eq!(api.unmarshal::<Segment>(json.as_bytes()).unwrap(), segment);

    let err = api
        .unmarshal::<Segment>(br#"{"from":{"left":1}}"#)
        .unwrap_err();
    assert!(err.to_string().contains("pair must be an array"), "{err}");
}

/// Temperature written as text such as `"21.5C"`.
#[derive(Debug, Default, PartialEq, Clone, Copy)]
struct Celsius(f64);

impl TextMarshaler for Celsius {
    fn marshal_text(&self) -> Result<String, Error> {
        if self.0 < -273.15 {
            return Err(Error::encode("below absolute zero"));
        }
        Ok(format!("{}C", self.0))
    }
}

impl TextUnmarshaler for Celsius {
    fn unmarshal_text(&mut self, text: &str) -> Result<(), Error> {
        let degrees = text
            .strip_suffix('C')
            .ok_or_else(|| Error::decode("missing unit"))?;
        self.0 = degrees
            .parse()
            .map_err(|_| Error::decode(format!("bad temperature {text}")))?;
        Ok(())
    }
}

impl Reflect for Celsius {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<Celsius>(Kind::Opaque)
            .with_text_marshaler(jsonic_core::reflect::text_marshaler_hooks::<Celsius>())
    }
}

#[test]
fn test_text_marshaler() {
    let api = Config::standard().freeze_in(&Registry::new());
    let readings = vec![Celsius(21.5), Celsius(-3.0)];
    let json = api.marshal_to_string(&readings).unwrap();
    assert_eq!(json, r#"["21.5C","-3C"]"#);
    assert_eq!(api.unmarshal::<Vec<Celsius>>(json.as_bytes()).unwrap(), readings);

    let mut kept = Celsius(1.0);
    api.unmarshal_into(b"null", &mut kept).unwrap();
    assert_eq!(kept, Celsius(1.0));

    let err = api.marshal(&Celsius(-500.0)).unwrap_err();
    assert!(matches!(err, Error::Encode(_)), "{err}");
    assert!(api.unmarshal::<Celsius>(br#""21.5F""#).is_err());
}

/// A hand-written descriptor may attach both hook sets; the JSON one wins.
#[derive(Debug, Default, PartialEq)]
struct Flag(bool);

impl Marshaler for Flag {
    fn marshal_json(&self) -> Result<Vec<u8>, Error> {
        Ok(if self.0 { b"1".to_vec() } else { b"0".to_vec() })
    }
}

impl Unmarshaler for Flag {
    fn unmarshal_json(&mut self, data: &[u8]) -> Result<(), Error> {
        self.0 = data == b"1";
        Ok(())
    }
}

impl TextMarshaler for Flag {
    fn marshal_text(&self) -> Result<String, Error> {
        Ok(self.0.to_string())
    }
}

impl TextUnmarshaler for Flag {
    fn unmarshal_text(&mut self, text: &str) -> Result<(), Error> {
        self.0 = text == "true";
        Ok(())
    }
}

impl Reflect for Flag {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<Flag>(Kind::Opaque)
            .with_marshaler(marshaler_hooks::<Flag>())
            .with_text_marshaler(jsonic_core::reflect::text_marshaler_hooks::<Flag>())
    }
}

#[test]
fn test_marshaler_takes_precedence() {
    let api = Config::default().freeze_in(&Registry::new());
    assert_eq!(api.marshal_to_string(&Flag(true)).unwrap(), "1");
    assert_eq!(api.unmarshal::<Flag>(b"1").unwrap(), Flag(true));
}

#[derive(Reflect, Debug, Default, PartialEq)]
struct Event {
    day: NaiveDate,
    at: NaiveDateTime,
    #[tag(json = "stamp")]
    stamp: DateTime<Utc>,
}

#[test]
fn test_chrono() {
    let api = Config::default().freeze_in(&Registry::new());
    let day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    let event = Event {
        day,
        at: day.and_hms_milli_opt(13, 4, 5, 250).unwrap(),
        stamp: Utc.with_ymd_and_hms(2024, 2, 29, 13, 4, 5).unwrap(),
    };
    let json = api.marshal_to_string(&event).unwrap();
    assert_eq!(
        json,
        r#"{"day":"2024-02-29","at":"2024-02-29T13:04:05.250","stamp":"2024-02-29T13:04:05Z"}"#
    );
    assert_eq!(api.unmarshal::<Event>(json.as_bytes()).unwrap(), event);
    assert!(api
        .unmarshal::<Event>(br#"{"day":"2024-02-30"}"#)
        .is_err());
}
