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

//! Byte-level writer and scanner driven by the compiled codecs.

use std::borrow::Cow;
use std::io::Write as _;

use crate::error::Error;
use crate::util::excerpt;

const MAX_SKIP_DEPTH: usize = 10_000;
const EXCERPT_LEN: usize = 20;

static HEX: &[u8; 16] = b"0123456789abcdef";

#[derive(Default)]
pub struct Writer {
    pub(crate) bf: Vec<u8>,
    indention_step: usize,
    indention: usize,
}

impl Writer {
    pub fn new(indention_step: usize) -> Writer {
        Writer {
            bf: Vec::with_capacity(512),
            indention_step,
            indention: 0,
        }
    }

    /// Clears the output and the nesting state, keeping the allocation.
    pub fn reset(&mut self) {
        self.bf.clear();
        self.indention = 0;
    }

    /// An empty writer positioned at this writer's nesting level.
    pub fn child(&self) -> Writer {
        Writer {
            bf: Vec::new(),
            indention_step: self.indention_step,
            indention: self.indention,
        }
    }

    pub fn set_indention_step(&mut self, step: usize) {
        self.indention_step = step;
    }

    pub fn indention_step(&self) -> usize {
        self.indention_step
    }

    pub fn dump(&self) -> Vec<u8> {
        self.bf.clone()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bf
    }

    pub fn len(&self) -> usize {
        self.bf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bf.is_empty()
    }

    pub fn truncate(&mut self, len: usize) {
        self.bf.truncate(len);
    }

    #[inline(always)]
    pub fn write_raw(&mut self, v: &[u8]) {
        self.bf.extend_from_slice(v);
    }

    #[inline(always)]
    pub fn write_byte(&mut self, b: u8) {
        self.bf.push(b);
    }

    pub fn write_null(&mut self) {
        self.bf.extend_from_slice(b"null");
    }

    pub fn write_bool(&mut self, v: bool) {
        self.bf
            .extend_from_slice(if v { b"true" as &[u8] } else { b"false" });
    }

    pub fn write_i64(&mut self, v: i64) {
        let _ = write!(self.bf, "{v}");
    }

    pub fn write_u64(&mut self, v: u64) {
        let _ = write!(self.bf, "{v}");
    }

    /// Shortest representation that reads back to the same `f64`.
    pub fn write_f64(&mut self, v: f64) -> Result<(), Error> {
        if !v.is_finite() {
            return Err(Error::encode(format!("unsupported value: {v}")));
        }
        let abs = v.abs();
        if abs != 0.0 && !(1e-6..1e21).contains(&abs) {
            self.write_exponent(format!("{v:e}"));
        } else {
            let _ = write!(self.bf, "{v}");
        }
        Ok(())
    }

    pub fn write_f32(&mut self, v: f32) -> Result<(), Error> {
        if !v.is_finite() {
            return Err(Error::encode(format!("unsupported value: {v}")));
        }
        let abs = v.abs();
        if abs != 0.0 && !(1e-6..1e21).contains(&abs) {
            self.write_exponent(format!("{v:e}"));
        } else {
            let _ = write!(self.bf, "{v}");
        }
        Ok(())
    }

    // `1e21` -> `1e+21`
    fn write_exponent(&mut self, formatted: String) {
        match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => {
                self.bf.extend_from_slice(mantissa.as_bytes());
                self.bf.extend_from_slice(b"e+");
                self.bf.extend_from_slice(exp.as_bytes());
            }
            _ => self.bf.extend_from_slice(formatted.as_bytes()),
        }
    }

    /// Fixed six-digit precision. Faster, but does not round-trip.
    pub fn write_f64_lossy(&mut self, v: f64) -> Result<(), Error> {
        if !v.is_finite() {
            return Err(Error::encode(format!("unsupported value: {v}")));
        }
        let mut val = v;
        if val < 0.0 {
            self.bf.push(b'-');
            val = -val;
        }
        if val > 0x4ff_ffff as f64 {
            return self.write_f64(val);
        }
        const EXP: u64 = 1_000_000;
        let scaled = (val * EXP as f64 + 0.5) as u64;
        self.write_u64(scaled / EXP);
        let frac = scaled % EXP;
        if frac == 0 {
            return Ok(());
        }
        let _ = write!(self.bf, ".{frac:06}");
        while self.bf.last() == Some(&b'0') {
            self.bf.pop();
        }
        Ok(())
    }

    pub fn write_f32_lossy(&mut self, v: f32) -> Result<(), Error> {
        self.write_f64_lossy(v as f64)
    }

    /// Writes a quoted string escaping only what the grammar requires.
    pub fn write_string(&mut self, s: &str) {
        self.write_escaped(s, false);
    }

    /// Like [`Writer::write_string`], additionally escaping `<`, `>`, `&`,
    /// U+2028 and U+2029.
    pub fn write_string_html(&mut self, s: &str) {
        self.write_escaped(s, true);
    }

    fn write_escaped(&mut self, s: &str, html: bool) {
        self.bf.push(b'"');
        let bytes = s.as_bytes();
        let mut start = 0;
        let mut i = 0;
        while i < bytes.len() {
            let b = bytes[i];
            let escape: Option<&[u8]> = match b {
                b'"' => Some(b"\\\""),
                b'\\' => Some(b"\\\\"),
                b'\n' => Some(b"\\n"),
                b'\r' => Some(b"\\r"),
                b'\t' => Some(b"\\t"),
                0x08 => Some(b"\\b"),
                0x0c => Some(b"\\f"),
                _ => None,
            };
            if let Some(escape) = escape {
                self.bf.extend_from_slice(&bytes[start..i]);
                self.bf.extend_from_slice(escape);
                i += 1;
                start = i;
                continue;
            }
            if b < 0x20 || (html && matches!(b, b'<' | b'>' | b'&')) {
                self.bf.extend_from_slice(&bytes[start..i]);
                self.bf.extend_from_slice(b"\\u00");
                self.bf.push(HEX[(b >> 4) as usize]);
                self.bf.push(HEX[(b & 0xf) as usize]);
                i += 1;
                start = i;
                continue;
            }
            // U+2028 / U+2029 are E2 80 A8 / E2 80 A9
            if html && b == 0xe2 && bytes.get(i + 1) == Some(&0x80) {
                if let Some(&last @ (0xa8 | 0xa9)) = bytes.get(i + 2) {
                    self.bf.extend_from_slice(&bytes[start..i]);
                    self.bf.extend_from_slice(b"\\u202");
                    self.bf.push(HEX[(last & 0xf) as usize]);
                    i += 3;
                    start = i;
                    continue;
                }
            }
            i += 1;
        }
        self.bf.extend_from_slice(&bytes[start..]);
        self.bf.push(b'"');
    }

    fn write_indention(&mut self) {
        if self.indention_step == 0 {
            return;
        }
        self.bf.push(b'\n');
        self.bf.resize(self.bf.len() + self.indention, b' ');
    }

    pub fn begin_object(&mut self) {
        self.indention += self.indention_step;
        self.bf.push(b'{');
    }

    /// Writes the separator, the key and the colon preceding an object member.
    pub fn object_field(&mut self, name: &str, first: bool) {
        if !first {
            self.bf.push(b',');
        }
        self.write_indention();
        self.write_string(name);
        self.object_colon();
    }

    /// Writes the separator before a member whose key is emitted by the caller.
    pub fn object_member(&mut self, first: bool) {
        if !first {
            self.bf.push(b',');
        }
        self.write_indention();
    }

    pub fn object_colon(&mut self) {
        if self.indention_step > 0 {
            self.bf.extend_from_slice(b": ");
        } else {
            self.bf.push(b':');
        }
    }

    pub fn end_object(&mut self, empty: bool) {
        self.indention -= self.indention_step;
        if !empty {
            self.write_indention();
        }
        self.bf.push(b'}');
    }

    pub fn begin_array(&mut self) {
        self.indention += self.indention_step;
        self.bf.push(b'[');
    }

    pub fn array_element(&mut self, first: bool) {
        if !first {
            self.bf.push(b',');
        }
        self.write_indention();
    }

    pub fn end_array(&mut self, empty: bool) {
        self.indention -= self.indention_step;
        if !empty {
            self.write_indention();
        }
        self.bf.push(b']');
    }
}

/// Kind of the next value in the input, decided from its first byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueType {
    Invalid,
    String,
    Number,
    Null,
    Bool,
    Array,
    Object,
}

pub struct Reader<'a> {
    bf: &'a [u8],
    cursor: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bf: &'a [u8]) -> Reader<'a> {
        Reader { bf, cursor: 0 }
    }

    pub fn get_cursor(&self) -> usize {
        self.cursor
    }

    /// Input not yet consumed.
    pub fn remaining(&self) -> &'a [u8] {
        &self.bf[self.cursor..]
    }

    #[inline(always)]
    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\n' | b'\t' | b'\r') = self.bf.get(self.cursor) {
            self.cursor += 1;
        }
    }

    #[inline(always)]
    fn peek_token(&mut self) -> Option<u8> {
        self.skip_whitespace();
        self.bf.get(self.cursor).copied()
    }

    /// Whether only whitespace remains.
    pub fn is_at_end(&mut self) -> bool {
        self.peek_token().is_none()
    }

    /// Next non-whitespace byte, not consumed.
    pub fn peek_byte(&mut self) -> Option<u8> {
        self.peek_token()
    }

    pub fn what_is_next(&mut self) -> ValueType {
        match self.peek_token() {
            Some(b'"') => ValueType::String,
            Some(b'-' | b'0'..=b'9') => ValueType::Number,
            Some(b'n') => ValueType::Null,
            Some(b't' | b'f') => ValueType::Bool,
            Some(b'[') => ValueType::Array,
            Some(b'{') => ValueType::Object,
            _ => ValueType::Invalid,
        }
    }

    /// Builds a positioned error: `UnexpectedEof` when the input ran out, `Decode` otherwise.
    #[cold]
    pub fn error(&self, op: &str, msg: &str) -> Error {
        let around = excerpt(self.bf, self.cursor, EXCERPT_LEN);
        let text = format!(
            "{op}: {msg}, error found in #{} byte of ...|{around}|...",
            self.cursor
        );
        if self.cursor >= self.bf.len() {
            Error::unexpected_eof(text)
        } else {
            Error::decode(text)
        }
    }

    #[cold]
    fn unexpected(&self, op: &str, expected: &str) -> Error {
        match self.bf.get(self.cursor) {
            Some(&b) => self.error(
                op,
                &format!("expect {expected}, but found {}", b as char),
            ),
            None => self.error(op, &format!("expect {expected}, but input ended")),
        }
    }

    fn expect_token(&mut self, op: &str, token: u8, expected: &str) -> Result<(), Error> {
        match self.peek_token() {
            Some(b) if b == token => {
                self.cursor += 1;
                Ok(())
            }
            _ => Err(self.unexpected(op, expected)),
        }
    }

    fn expect_literal(&mut self, op: &str, literal: &[u8]) -> Result<(), Error> {
        self.skip_whitespace();
        let rest = &self.bf[self.cursor..];
        if rest.starts_with(literal) {
            self.cursor += literal.len();
            Ok(())
        } else if literal.starts_with(rest) {
            self.cursor = self.bf.len();
            Err(self.unexpected(op, &String::from_utf8_lossy(literal)))
        } else {
            Err(self.unexpected(op, &String::from_utf8_lossy(literal)))
        }
    }

    /// Consumes `null` if it is next. Returns whether it did.
    pub fn read_null(&mut self) -> Result<bool, Error> {
        if self.peek_token() != Some(b'n') {
            return Ok(false);
        }
        self.expect_literal("readNull", b"null")?;
        Ok(true)
    }

    pub fn read_bool(&mut self) -> Result<bool, Error> {
        match self.peek_token() {
            Some(b't') => self.expect_literal("readBool", b"true").map(|_| true),
            Some(b'f') => self.expect_literal("readBool", b"false").map(|_| false),
            _ => Err(self.unexpected("readBool", "t or f")),
        }
    }

    pub fn read_string(&mut self) -> Result<String, Error> {
        self.read_str().map(Cow::into_owned)
    }

    /// Reads a quoted string, borrowing from the input when it holds no escapes.
    pub fn read_str(&mut self) -> Result<Cow<'a, str>, Error> {
        self.expect_token("readString", b'"', "\"")?;
        let start = self.cursor;
        let mut i = start;
        while i < self.bf.len() {
            match self.bf[i] {
                b'"' => {
                    self.cursor = i + 1;
                    return self.utf8(&self.bf[start..i]).map(Cow::Borrowed);
                }
                b'\\' => return self.read_escaped(start, i).map(Cow::Owned),
                b if b < 0x20 => {
                    self.cursor = i;
                    return Err(self.error("readString", "invalid control character in string"));
                }
                _ => i += 1,
            }
        }
        self.cursor = self.bf.len();
        Err(self.error("readString", "unterminated string"))
    }

    fn utf8(&self, bytes: &'a [u8]) -> Result<&'a str, Error> {
        std::str::from_utf8(bytes).map_err(|_| self.error("readString", "invalid utf-8 in string"))
    }

    fn read_escaped(&mut self, start: usize, first_escape: usize) -> Result<String, Error> {
        let mut out: Vec<u8> = self.bf[start..first_escape].to_vec();
        let mut i = first_escape;
        loop {
            let Some(&b) = self.bf.get(i) else {
                self.cursor = self.bf.len();
                return Err(self.error("readString", "unterminated string"));
            };
            match b {
                b'"' => {
                    self.cursor = i + 1;
                    return String::from_utf8(out)
                        .map_err(|_| self.error("readString", "invalid utf-8 in string"));
                }
                b'\\' => {
                    self.cursor = i + 1;
                    let Some(&esc) = self.bf.get(i + 1) else {
                        self.cursor = self.bf.len();
                        return Err(self.error("readString", "unterminated escape"));
                    };
                    i += 2;
                    match esc {
                        b'"' | b'\\' | b'/' => out.push(esc),
                        b'b' => out.push(0x08),
                        b'f' => out.push(0x0c),
                        b'n' => out.push(b'\n'),
                        b'r' => out.push(b'\r'),
                        b't' => out.push(b'\t'),
                        b'u' => {
                            let high = self.read_hex4(i)?;
                            i += 4;
                            let c = if (0xd800..0xdc00).contains(&high) {
                                if self.bf.get(i) == Some(&b'\\') && self.bf.get(i + 1) == Some(&b'u') {
                                    let low = self.read_hex4(i + 2)?;
                                    if (0xdc00..0xe000).contains(&low) {
                                        i += 6;
                                        char::from_u32(
                                            0x10000 + ((high - 0xd800) << 10) + (low - 0xdc00),
                                        )
                                    } else {
                                        None
                                    }
                                } else {
                                    None
                                }
                            } else {
                                char::from_u32(high)
                            };
                            let c = c.unwrap_or(char::REPLACEMENT_CHARACTER);
                            let mut buf = [0u8; 4];
                            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                        }
                        _ => {
                            return Err(self.error(
                                "readString",
                                &format!("invalid escape char after \\: {}", esc as char),
                            ))
                        }
                    }
                }
                b if b < 0x20 => {
                    self.cursor = i;
                    return Err(self.error("readString", "invalid control character in string"));
                }
                _ => {
                    out.push(b);
                    i += 1;
                }
            }
        }
    }

    fn read_hex4(&mut self, at: usize) -> Result<u32, Error> {
        let bf = self.bf;
        let Some(digits) = bf.get(at..at + 4) else {
            self.cursor = bf.len();
            return Err(self.error("readU4", "unterminated unicode escape"));
        };
        let mut v = 0u32;
        for &d in digits {
            let n = match d {
                b'0'..=b'9' => d - b'0',
                b'a'..=b'f' => d - b'a' + 10,
                b'A'..=b'F' => d - b'A' + 10,
                _ => {
                    self.cursor = at;
                    return Err(self.error("readU4", &format!("expect hex digit, but found {}", d as char)));
                }
            };
            v = (v << 4) | n as u32;
        }
        Ok(v)
    }

    /// Reads an object key and the colon after it.
    ///
    /// With `simple` set the key is taken verbatim up to the next quote, without unescaping.
    pub fn read_field_name(&mut self, simple: bool) -> Result<Cow<'a, str>, Error> {
        let name = if simple {
            self.expect_token("readObjectField", b'"', "\"")?;
            let start = self.cursor;
            let end = self.bf[start..]
                .iter()
                .position(|&b| b == b'"')
                .map(|p| start + p)
                .ok_or_else(|| {
                    self.cursor = self.bf.len();
                    self.error("readObjectField", "unterminated field name")
                })?;
            self.cursor = end + 1;
            Cow::Borrowed(self.utf8(&self.bf[start..end])?)
        } else {
            self.read_str()?
        };
        self.expect_token("readObjectField", b':', ":")?;
        Ok(name)
    }

    /// Reads the text of a number literal, validating its grammar.
    pub fn read_number_literal(&mut self) -> Result<&'a str, Error> {
        self.skip_whitespace();
        let start = self.cursor;
        let bf = self.bf;
        let mut i = start;
        if bf.get(i) == Some(&b'-') {
            i += 1;
        }
        match bf.get(i) {
            Some(b'0') => i += 1,
            Some(b'1'..=b'9') => {
                while let Some(b'0'..=b'9') = bf.get(i) {
                    i += 1;
                }
            }
            _ => {
                self.cursor = i;
                return Err(self.unexpected("readNumber", "digit"));
            }
        }
        if bf.get(i) == Some(&b'.') {
            i += 1;
            if !matches!(bf.get(i), Some(b'0'..=b'9')) {
                self.cursor = i;
                return Err(self.unexpected("readNumber", "digit after ."));
            }
            while let Some(b'0'..=b'9') = bf.get(i) {
                i += 1;
            }
        }
        if let Some(b'e' | b'E') = bf.get(i) {
            i += 1;
            if let Some(b'+' | b'-') = bf.get(i) {
                i += 1;
            }
            if !matches!(bf.get(i), Some(b'0'..=b'9')) {
                self.cursor = i;
                return Err(self.unexpected("readNumber", "digit in exponent"));
            }
            while let Some(b'0'..=b'9') = bf.get(i) {
                i += 1;
            }
        }
        self.cursor = i;
        // digits, signs and dots are ascii
        std::str::from_utf8(&bf[start..i]).map_err(|_| self.error("readNumber", "invalid number"))
    }

    pub fn read_i64(&mut self) -> Result<i64, Error> {
        let start = self.peek_offset();
        let literal = self.read_number_literal()?;
        literal.parse::<i64>().map_err(|e| {
            self.cursor = start;
            self.error("readInt64", &format!("can not decode {literal} as integer: {e}"))
        })
    }

    pub fn read_u64(&mut self) -> Result<u64, Error> {
        let start = self.peek_offset();
        let literal = self.read_number_literal()?;
        literal.parse::<u64>().map_err(|e| {
            self.cursor = start;
            self.error("readUint64", &format!("can not decode {literal} as unsigned integer: {e}"))
        })
    }

    pub fn read_f64(&mut self) -> Result<f64, Error> {
        let start = self.peek_offset();
        let literal = self.read_number_literal()?;
        literal.parse::<f64>().map_err(|e| {
            self.cursor = start;
            self.error("readFloat64", &format!("can not decode {literal} as float: {e}"))
        })
    }

    fn peek_offset(&mut self) -> usize {
        self.skip_whitespace();
        self.cursor
    }

    /// Consumes `[`. Returns `false` (and consumes `]`) for an empty array.
    pub fn read_array_begin(&mut self) -> Result<bool, Error> {
        self.expect_token("readArray", b'[', "[ or n")?;
        if self.peek_token() == Some(b']') {
            self.cursor += 1;
            return Ok(false);
        }
        Ok(true)
    }

    /// Consumes the token after an element. Returns whether another element follows.
    pub fn read_array_next(&mut self) -> Result<bool, Error> {
        let more = match self.peek_token() {
            Some(b',') => true,
            Some(b']') => false,
            _ => return Err(self.unexpected("readArray", ", or ]")),
        };
        self.cursor += 1;
        Ok(more)
    }

    /// Consumes `{`. Returns `false` (and consumes `}`) for an empty object.
    pub fn read_object_begin(&mut self) -> Result<bool, Error> {
        self.expect_token("readObject", b'{', "{ or n")?;
        if self.peek_token() == Some(b'}') {
            self.cursor += 1;
            return Ok(false);
        }
        Ok(true)
    }

    pub fn read_object_next(&mut self) -> Result<bool, Error> {
        let more = match self.peek_token() {
            Some(b',') => true,
            Some(b'}') => false,
            _ => return Err(self.unexpected("readObject", ", or }")),
        };
        self.cursor += 1;
        Ok(more)
    }

    /// Consumes the `:` between an object key and its value.
    pub fn read_colon(&mut self) -> Result<(), Error> {
        self.expect_token("readObject", b':', ":")
    }

    /// Skips one complete, well-formed value.
    pub fn skip(&mut self) -> Result<(), Error> {
        self.skip_value(0)
    }

    /// Skips one value and returns its bytes, without surrounding whitespace.
    pub fn skip_and_return_bytes(&mut self) -> Result<&'a [u8], Error> {
        let start = self.peek_offset();
        self.skip()?;
        Ok(&self.bf[start..self.cursor])
    }

    fn skip_value(&mut self, depth: usize) -> Result<(), Error> {
        if depth > MAX_SKIP_DEPTH {
            return Err(self.error("skip", "exceeded max depth"));
        }
        match self.what_is_next() {
            ValueType::String => self.skip_string(),
            ValueType::Number => self.read_number_literal().map(|_| ()),
            ValueType::Null => self.expect_literal("skip", b"null"),
            ValueType::Bool => self.read_bool().map(|_| ()),
            ValueType::Array => {
                if self.read_array_begin()? {
                    loop {
                        self.skip_value(depth + 1)?;
                        if !self.read_array_next()? {
                            break;
                        }
                    }
                }
                Ok(())
            }
            ValueType::Object => {
                if self.read_object_begin()? {
                    loop {
                        self.skip_string()?;
                        self.expect_token("skipObject", b':', ":")?;
                        self.skip_value(depth + 1)?;
                        if !self.read_object_next()? {
                            break;
                        }
                    }
                }
                Ok(())
            }
            ValueType::Invalid => Err(self.unexpected("skip", "a value")),
        }
    }

    fn skip_string(&mut self) -> Result<(), Error> {
        self.expect_token("skipString", b'"', "\"")?;
        let mut i = self.cursor;
        while i < self.bf.len() {
            match self.bf[i] {
                b'"' => {
                    self.cursor = i + 1;
                    return Ok(());
                }
                b'\\' => i += 2,
                b if b < 0x20 => {
                    self.cursor = i;
                    return Err(self.error("skipString", "invalid control character in string"));
                }
                _ => i += 1,
            }
        }
        self.cursor = self.bf.len();
        Err(self.error("skipString", "unterminated string"))
    }
}
