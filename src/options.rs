//! Configuration options for `key = value` output.
//!
//! - [`KvOptions`]: main configuration struct
//! - [`LineEnding`]: terminator written after every line
//!
//! ## Examples
//!
//! ```rust
//! use serde_kvconf::{to_string_with_options, KvOptions, LineEnding};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Server { port: u16 }
//!
//! let options = KvOptions::new().with_line_ending(LineEnding::CrLf);
//! let text = to_string_with_options(&Server { port: 80 }, options).unwrap();
//! assert_eq!(text, "port=80\r\n");
//!
//! let text = to_string_with_options(&Server { port: 80 }, KvOptions::pretty()).unwrap();
//! assert_eq!(text, "port = 80\n");
//! ```

/// Line terminator written after every `key=value` pair.
///
/// The decoder accepts both forms regardless of this setting.
///
/// # Examples
///
/// ```rust
/// use serde_kvconf::LineEnding;
///
/// assert_eq!(LineEnding::Lf.as_str(), "\n");
/// assert_eq!(LineEnding::CrLf.as_str(), "\r\n");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }

    /// The conventional terminator of the host platform.
    ///
    /// Never picked implicitly; pass it to [`KvOptions::with_line_ending`] to
    /// opt in.
    #[must_use]
    pub const fn native() -> Self {
        if cfg!(windows) {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }
}

/// Configuration options for encoding.
///
/// # Examples
///
/// ```rust
/// use serde_kvconf::{KvOptions, LineEnding};
///
/// // Default: `key=value\n`
/// let options = KvOptions::new();
///
/// // `key = value\n`
/// let options = KvOptions::pretty();
///
/// // `key = value\r\n`
/// let options = KvOptions::pretty().with_line_ending(LineEnding::CrLf);
/// assert!(options.spaced);
/// ```
#[derive(Clone, Debug, Default)]
pub struct KvOptions {
    pub line_ending: LineEnding,
    /// Surround `=` with single spaces.
    pub spaced: bool,
}

impl KvOptions {
    /// Creates default options (`key=value`, LF terminator).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_kvconf::{KvOptions, LineEnding};
    ///
    /// let options = KvOptions::new();
    /// assert_eq!(options.line_ending, LineEnding::Lf);
    /// assert!(!options.spaced);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options that write `key = value`.
    #[must_use]
    pub fn pretty() -> Self {
        KvOptions {
            spaced: true,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    #[must_use]
    pub fn with_spaced(mut self, spaced: bool) -> Self {
        self.spaced = spaced;
        self
    }

    pub(crate) const fn separator(&self) -> &'static str {
        if self.spaced {
            " = "
        } else {
            "="
        }
    }
}
