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

mod base64;

pub use base64::{decode_base64, encode_base64};

/// Returns `true` when every byte of `s` is an ASCII space.
#[inline]
pub fn is_all_spaces(s: &str) -> bool {
    s.bytes().all(|b| b == b' ')
}

/// Renders at most `max` bytes of `input` around `pos` for error messages.
pub(crate) fn excerpt(input: &[u8], pos: usize, max: usize) -> String {
    let start = pos.saturating_sub(max / 2);
    let end = (start + max).min(input.len());
    let start = start.min(end);
    String::from_utf8_lossy(&input[start..end]).into_owned()
}
