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

//! Error type shared by the scanner, the writer and every codec.
//!
//! Errors are never returned from individual codecs. A codec records the
//! first failure on its [`ReadContext`](crate::resolver::context::ReadContext)
//! or [`WriteContext`](crate::resolver::context::WriteContext) and the
//! top-level entry point hands it back unchanged.
//!
//! Error constructors sit on cold paths that are reachable from every
//! scanner call, so they are `#[cold]` and `#[track_caller]`. Keep it that way.

use std::borrow::Cow;

use thiserror::Error;

/// Global flag to check if JSONIC_PANIC_ON_ERROR environment variable is set at compile time.
/// Set JSONIC_PANIC_ON_ERROR=1 at compile time to enable panic on error.
pub const PANIC_ON_ERROR: bool = option_env!("JSONIC_PANIC_ON_ERROR").is_some();

/// Check if JSONIC_PANIC_ON_ERROR environment variable is set.
#[inline(always)]
pub const fn should_panic_on_error() -> bool {
    PANIC_ON_ERROR
}

/// Error type for jsonic encoding and decoding.
///
/// # Always use the constructor functions
///
/// Build errors through [`Error::decode`], [`Error::unknown_field`] and the
/// other constructors instead of the variant syntax. The constructors accept
/// anything convertible into `Cow<'static, str>` and honour the
/// `JSONIC_PANIC_ON_ERROR` debugging switch:
///
/// ```bash
/// RUST_BACKTRACE=1 JSONIC_PANIC_ON_ERROR=1 cargo test
/// ```
///
/// With the switch set at compile time every constructor panics at the call
/// site, which gives a backtrace pointing at the exact codec that failed.
///
/// ```rust
/// use jsonic_core::error::Error;
///
/// let err = Error::decode("readInt: unexpected character");
/// let err = Error::unknown_field(format!("found unknown field: {}", "Extra"));
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Malformed input or a token that cannot start the expected value.
    #[error("{0}")]
    Decode(Cow<'static, str>),

    /// An object key with no matching struct field while unknown fields are disallowed.
    #[error("{0}")]
    UnknownField(Cow<'static, str>),

    /// The value at a typed location is not the type the codec was compiled for.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: Cow<'static, str>,
    },

    /// The type has no codec. Raised lazily, when a value of it is actually converted.
    #[error("{0}")]
    Unsupported(Cow<'static, str>),

    /// Failure while producing output, including custom marshaler failures.
    #[error("{0}")]
    Encode(Cow<'static, str>),

    /// Input ended in the middle of a value.
    #[error("{0}")]
    UnexpectedEof(Cow<'static, str>),

    /// A single-value decode left unconsumed input behind.
    #[error("{0}")]
    TrailingData(Cow<'static, str>),

    /// Clean end of a stream: nothing further was expected.
    #[error("end of input")]
    Eof,

    /// I/O failure from a stream adapter.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error.
    #[error("{0}")]
    Unknown(Cow<'static, str>),
}

impl Error {
    /// Creates a new [`Error::Decode`].
    ///
    /// # Example
    /// ```
    /// use jsonic_core::error::Error;
    ///
    /// let err = Error::decode("expect { or n, but found [");
    /// ```
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn decode<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::Decode(s.into());
        if PANIC_ON_ERROR {
            panic!("JSONIC_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::UnknownField`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unknown_field<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::UnknownField(s.into());
        if PANIC_ON_ERROR {
            panic!("JSONIC_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::TypeMismatch`].
    ///
    /// # Example
    /// ```
    /// use jsonic_core::error::Error;
    ///
    /// let err = Error::type_mismatch("alloc::string::String", "i32");
    /// ```
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn type_mismatch<S: Into<Cow<'static, str>>>(expected: &'static str, found: S) -> Self {
        let err = Error::TypeMismatch {
            expected,
            found: found.into(),
        };
        if PANIC_ON_ERROR {
            panic!("JSONIC_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::Unsupported`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unsupported<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::Unsupported(s.into());
        if PANIC_ON_ERROR {
            panic!("JSONIC_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::Encode`].
    ///
    /// # Example
    /// ```
    /// use jsonic_core::error::Error;
    ///
    /// let err = Error::encode(format!("unsupported value: {}", f64::NAN));
    /// ```
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn encode<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::Encode(s.into());
        if PANIC_ON_ERROR {
            panic!("JSONIC_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::UnexpectedEof`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unexpected_eof<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::UnexpectedEof(s.into());
        if PANIC_ON_ERROR {
            panic!("JSONIC_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::TrailingData`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn trailing_data<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::TrailingData(s.into());
        if PANIC_ON_ERROR {
            panic!("JSONIC_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::Unknown`].
    ///
    /// # Example
    /// ```
    /// use jsonic_core::error::Error;
    ///
    /// let err = Error::unknown("Something went wrong");
    /// let err = Error::unknown(format!("ID:{} not found", 1));
    /// ```
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unknown<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::Unknown(s.into());
        if PANIC_ON_ERROR {
            panic!("JSONIC_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Whether this error marks a clean end of input rather than a failure.
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, Error::Eof)
    }

    /// Prefixes the message of a decode-side error with the operation that failed.
    ///
    /// Errors without a message payload are returned unchanged.
    #[inline(never)]
    pub fn with_context(self, context: &str) -> Error {
        match self {
            Error::Decode(s) => Error::Decode(format!("{context}: {s}").into()),
            Error::Encode(s) => Error::Encode(format!("{context}: {s}").into()),
            Error::Unsupported(s) => Error::Unsupported(format!("{context}: {s}").into()),
            other => other,
        }
    }
}

impl Clone for Error {
    fn clone(&self) -> Self {
        match self {
            Error::Decode(s) => Error::Decode(s.clone()),
            Error::UnknownField(s) => Error::UnknownField(s.clone()),
            Error::TypeMismatch { expected, found } => Error::TypeMismatch {
                expected: *expected,
                found: found.clone(),
            },
            Error::Unsupported(s) => Error::Unsupported(s.clone()),
            Error::Encode(s) => Error::Encode(s.clone()),
            Error::UnexpectedEof(s) => Error::UnexpectedEof(s.clone()),
            Error::TrailingData(s) => Error::TrailingData(s.clone()),
            Error::Eof => Error::Eof,
            // io::Error is not Clone; keep its kind and message.
            Error::Io(e) => Error::Io(std::io::Error::new(e.kind(), e.to_string())),
            Error::Unknown(s) => Error::Unknown(s.clone()),
        }
    }
}

/// Ensures a condition is true; otherwise returns an [`enum@Error`].
///
/// # Examples
/// ```
/// use jsonic_core::ensure;
/// use jsonic_core::error::Error;
///
/// fn check_value(n: i32) -> Result<(), Error> {
///     ensure!(n > 0, "value must be positive");
///     ensure!(n < 10, "value {} too large", n);
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:literal) => {
        if !$cond {
            return Err($crate::error::Error::unknown($msg));
        }
    };
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            return Err($crate::error::Error::unknown(format!($fmt, $($arg)*)));
        }
    };
}

/// Returns early with an [`enum@Error`].
///
/// # Examples
/// ```
/// use jsonic_core::bail;
/// use jsonic_core::error::Error;
///
/// fn fail_fast() -> Result<(), Error> {
///     bail!("something went wrong");
/// }
/// ```
#[macro_export]
macro_rules! bail {
    ($err:expr) => {
        return Err($crate::error::Error::unknown($err))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::error::Error::unknown(format!($fmt, $($arg)*)))
    };
}
