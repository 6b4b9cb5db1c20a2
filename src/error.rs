//! Error types for `key = value` encoding and decoding.
//!
//! Every error that can be traced back to the input text carries the 1-based
//! line number it came from, so a caller can point at the offending line of
//! a configuration file.
//!
//! ## Error Categories
//!
//! - **Syntax**: [`Error::MalformedLine`] for a line without `=`
//! - **Destination**: [`Error::InvalidTarget`] and [`Error::TypeConflict`]
//! - **Conversion**: [`Error::PrimitiveParse`] and [`Error::CustomConversion`]
//! - **Shape**: [`Error::UnsupportedType`] for kinds the flat format cannot carry
//! - **I/O**: [`Error::Io`], propagated from the underlying stream unchanged
//!
//! ## Examples
//!
//! ```rust
//! use serde_kvconf::{from_str, Error};
//! use std::collections::HashMap;
//!
//! let result: Result<HashMap<String, String>, Error> = from_str("a = 1\nbroken\nc = 3");
//!
//! match result {
//!     Err(Error::MalformedLine { line, .. }) => assert_eq!(line, 2),
//!     other => panic!("unexpected result: {:?}", other),
//! }
//! ```

use std::fmt;
use std::io;
use thiserror::Error;

/// A primitive kind a text value can be converted to.
///
/// Reported by [`Error::PrimitiveParse`] when a value does not parse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarKind {
    Int,
    Uint,
    Float,
    Bool,
    Char,
    String,
}

impl ScalarKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ScalarKind::Int => "int",
            ScalarKind::Uint => "uint",
            ScalarKind::Float => "float",
            ScalarKind::Bool => "bool",
            ScalarKind::Char => "char",
            ScalarKind::String => "string",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a custom conversion failed.
///
/// Decoding knows the input line; encoding only knows the key being written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Location {
    Line(usize),
    Key(String),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Line(line) => write!(f, "line {}", line),
            Location::Key(key) => write!(f, "key `{}`", key),
        }
    }
}

/// Represents all possible errors that can occur while encoding or decoding.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from the underlying reader or writer
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A non-blank line without a `=` separator
    #[error("Malformed line {line}: expected `key = value`, found `{content}`")]
    MalformedLine { line: usize, content: String },

    /// The decode destination is not a map, a struct or a dynamic value
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    /// The dynamic destination already holds a value that is not a map
    #[error("Type conflict on line {line}: destination already holds a non-map value")]
    TypeConflict { line: usize },

    /// A value could not be parsed as the field's primitive kind
    #[error("Cannot parse `{raw}` as {kind} on line {line}")]
    PrimitiveParse {
        kind: ScalarKind,
        raw: String,
        line: usize,
    },

    /// A user-supplied converter rejected the value
    #[error("Custom conversion failed at {location}: {cause}")]
    CustomConversion { location: Location, cause: String },

    /// The kind cannot be represented in a flat `key = value` file
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Generic message, raised through `serde::de::Error::custom` and friends
    #[error("{0}")]
    Message(String),
}

impl Error {
    /// Creates a malformed line error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_kvconf::Error;
    ///
    /// let err = Error::malformed_line(2, "no separator here");
    /// assert!(err.to_string().contains("line 2"));
    /// ```
    pub fn malformed_line(line: usize, content: &str) -> Self {
        Error::MalformedLine {
            line,
            content: content.to_string(),
        }
    }

    pub fn invalid_target(msg: &str) -> Self {
        Error::InvalidTarget(msg.to_string())
    }

    pub fn type_conflict(line: usize) -> Self {
        Error::TypeConflict { line }
    }

    /// Creates a primitive parse error for `raw` on `line`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_kvconf::{Error, ScalarKind};
    ///
    /// let err = Error::primitive_parse(ScalarKind::Int, "abc", 4);
    /// assert_eq!(err.to_string(), "Cannot parse `abc` as int on line 4");
    /// ```
    pub fn primitive_parse(kind: ScalarKind, raw: &str, line: usize) -> Self {
        Error::PrimitiveParse {
            kind,
            raw: raw.to_string(),
            line,
        }
    }

    pub fn custom_conversion<T: fmt::Display>(location: Location, cause: T) -> Self {
        Error::CustomConversion {
            location,
            cause: cause.to_string(),
        }
    }

    pub fn unsupported_type(msg: &str) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    /// Creates a free-form error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }

    /// Returns the input line this error points at, if any.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_kvconf::Error;
    ///
    /// assert_eq!(Error::type_conflict(7).line(), Some(7));
    /// assert_eq!(Error::unsupported_type("sequence").line(), None);
    /// ```
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::MalformedLine { line, .. }
            | Error::TypeConflict { line }
            | Error::PrimitiveParse { line, .. } => Some(*line),
            Error::CustomConversion {
                location: Location::Line(line),
                ..
            } => Some(*line),
            _ => None,
        }
    }

    /// Attributes a free-form error raised by a user conversion to `location`.
    ///
    /// Errors that already know where they happened pass through untouched.
    pub(crate) fn locate(self, location: impl FnOnce() -> Location) -> Self {
        match self {
            Error::Message(cause) => Error::CustomConversion {
                location: location(),
                cause,
            },
            other => other,
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
