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

//! Stream adapters: successive values over `io::Write` and `io::Read`.

use std::any::Any;
use std::io::{Read, Write};
use std::sync::Arc;

use crate::api::{check_indent, FrozenConfig};
use crate::buffer::{Reader, ValueType};
use crate::codec::Decoder;
use crate::error::Error;
use crate::reflect::{AnyReflect, Reflect};
use crate::resolver::context::ReadContext;

const READ_CHUNK: usize = 4096;

/// Writes one value per [`encode`](Self::encode) call, each followed by a
/// newline.
pub struct StreamEncoder<W: Write> {
    api: Arc<FrozenConfig>,
    output: W,
}

impl<W: Write> StreamEncoder<W> {
    pub fn new(api: Arc<FrozenConfig>, output: W) -> StreamEncoder<W> {
        StreamEncoder { api, output }
    }

    pub fn encode<T: Reflect>(&mut self, value: &T) -> Result<(), Error> {
        let mut bytes = self.api.marshal(value)?;
        bytes.push(b'\n');
        self.output.write_all(&bytes)?;
        Ok(())
    }

    pub fn encode_dyn(&mut self, value: &dyn AnyReflect) -> Result<(), Error> {
        let mut bytes = self.api.marshal_dyn(value)?;
        bytes.push(b'\n');
        self.output.write_all(&bytes)?;
        Ok(())
    }

    /// # Panics
    ///
    /// When `prefix` is not empty or `indent` contains anything but spaces.
    pub fn set_indent(&mut self, prefix: &str, indent: &str) {
        check_indent(prefix, indent);
        let step = indent.len();
        self.api = self.api.derive(|config| config.indention_step(step));
    }

    pub fn set_escape_html(&mut self, escape: bool) {
        self.api = self.api.derive(|config| config.escape_html(escape));
    }

    pub fn flush(&mut self) -> Result<(), Error> {
        self.output.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.output
    }
}

/// Reads successive whitespace-separated values.
///
/// A value is decoded only once it is complete in the buffer, so a value
/// that fails to scan leaves the destination untouched. The first failure
/// sticks: later calls return it again without reading.
pub struct StreamDecoder<R: Read> {
    api: Arc<FrozenConfig>,
    input: R,
    buf: Vec<u8>,
    pos: usize,
    eof: bool,
    error: Option<Error>,
}

impl<R: Read> StreamDecoder<R> {
    pub fn new(api: Arc<FrozenConfig>, input: R) -> StreamDecoder<R> {
        StreamDecoder {
            api,
            input,
            buf: Vec::new(),
            pos: 0,
            eof: false,
            error: None,
        }
    }

    /// Decodes the next value. Returns [`Error::Eof`] once the input holds
    /// nothing but whitespace.
    pub fn decode<T: Reflect>(&mut self, target: &mut T) -> Result<(), Error> {
        let decoder = self.api.decoder_of::<T>();
        self.decode_with(&*decoder, target)
    }

    pub fn decode_dyn(&mut self, target: &mut dyn AnyReflect) -> Result<(), Error> {
        let decoder = self.api.decoder_for(&target.reflect_descriptor());
        self.decode_with(&*decoder, target.as_any_mut())
    }

    fn decode_with(&mut self, decoder: &dyn Decoder, target: &mut dyn Any) -> Result<(), Error> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        match self.decode_next(decoder, target) {
            Err(err) if !err.is_eof() => {
                self.error = Some(err.clone());
                Err(err)
            }
            result => result,
        }
    }

    fn decode_next(&mut self, decoder: &dyn Decoder, target: &mut dyn Any) -> Result<(), Error> {
        loop {
            if !self.skip_whitespace()? {
                return Err(Error::Eof);
            }
            let pending = &self.buf[self.pos..];
            let mut probe = Reader::new(pending);
            let is_number = probe.what_is_next() == ValueType::Number;
            match probe.skip() {
                Ok(()) => {
                    let end = probe.get_cursor();
                    if is_number && end == pending.len() && !self.eof {
                        self.fill()?;
                        continue;
                    }
                    let mut ctx = ReadContext::new(&self.api, Reader::new(&pending[..end]));
                    decoder.decode(target, &mut ctx);
                    let err = ctx.take_error();
                    self.pos += end;
                    return match err {
                        Some(err) => Err(err),
                        None => Ok(()),
                    };
                }
                Err(Error::UnexpectedEof(_)) if !self.eof => self.fill()?,
                Err(err) => return Err(err),
            }
        }
    }

    /// Whether another value follows, reading more input if needed.
    pub fn more(&mut self) -> bool {
        if self.error.is_some() {
            return false;
        }
        match self.skip_whitespace() {
            Ok(true) => !matches!(self.buf.get(self.pos), Some(b']' | b'}')),
            _ => false,
        }
    }

    /// Input read from the source but not yet decoded.
    pub fn buffered(&self) -> &[u8] {
        &self.buf[self.pos..]
    }

    /// Switches untyped number decoding to [`Number`](crate::value::Number).
    pub fn use_number(&mut self) {
        self.api = self.api.derive(|config| config.use_number(true));
    }

    pub fn disallow_unknown_fields(&mut self) {
        self.api = self.api.derive(|config| config.disallow_unknown_fields(true));
    }

    /// Advances past whitespace. Returns whether a non-whitespace byte is
    /// available.
    fn skip_whitespace(&mut self) -> Result<bool, Error> {
        loop {
            while let Some(b' ' | b'\n' | b'\t' | b'\r') = self.buf.get(self.pos) {
                self.pos += 1;
            }
            if self.pos < self.buf.len() {
                return Ok(true);
            }
            if self.eof {
                return Ok(false);
            }
            self.fill()?;
        }
    }

    fn fill(&mut self) -> Result<(), Error> {
        if self.pos > 0 {
            self.buf.drain(..self.pos);
            self.pos = 0;
        }
        let start = self.buf.len();
        self.buf.resize(start + READ_CHUNK, 0);
        let read = loop {
            match self.input.read(&mut self.buf[start..]) {
                Ok(n) => break n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.buf.truncate(start);
                    return Err(e.into());
                }
            }
        };
        self.buf.truncate(start + read);
        if read == 0 {
            self.eof = true;
        }
        Ok(())
    }
}
