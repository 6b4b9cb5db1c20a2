//! Line parser.
//!
//! Turns a byte stream into [`LineRecord`]s. For every physical line:
//!
//! 1. everything from the first `#` to the end of the line is dropped
//!    (there is no escape, a `#` inside a value always starts a comment)
//! 2. surrounding whitespace is trimmed
//! 3. blank results are skipped
//! 4. the rest is split on the first `=` into a trimmed key and value
//!
//! ```rust
//! use serde_kvconf::parse::Lines;
//!
//! let input = "# server\nport = 8080\n\nhost=example.com # primary\n";
//! let records: Vec<_> = Lines::new(input.as_bytes())
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//!
//! assert_eq!(records.len(), 2);
//! assert_eq!(records[0].line, 2);
//! assert_eq!(records[0].key, "port");
//! assert_eq!(records[1].value, "example.com");
//! ```

use crate::{Error, Result};
use std::io::BufRead;

/// Marker that starts a comment running to the end of the line.
pub const COMMENT: char = '#';

/// Separator between key and value.
pub const SEPARATOR: char = '=';

/// One `key = value` pair and the 1-based line it was read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineRecord {
    pub line: usize,
    pub key: String,
    pub value: String,
}

/// Parses a single physical line.
///
/// Returns `Ok(None)` for lines that are blank once the comment is removed.
///
/// # Errors
///
/// Returns [`Error::MalformedLine`] when the line has content but no `=`.
///
/// # Examples
///
/// ```rust
/// use serde_kvconf::parse::parse_line;
///
/// let record = parse_line(1, "  url = http://a/?x=1  # note").unwrap().unwrap();
/// assert_eq!(record.key, "url");
/// assert_eq!(record.value, "http://a/?x=1");
///
/// assert!(parse_line(2, "   # only a comment").unwrap().is_none());
/// assert!(parse_line(3, "missing separator").is_err());
/// ```
pub fn parse_line(line: usize, text: &str) -> Result<Option<LineRecord>> {
    let content = match text.find(COMMENT) {
        Some(idx) => &text[..idx],
        None => text,
    }
    .trim();

    if content.is_empty() {
        return Ok(None);
    }

    let (key, value) = content
        .split_once(SEPARATOR)
        .ok_or_else(|| Error::malformed_line(line, content))?;

    Ok(Some(LineRecord {
        line,
        key: key.trim().to_string(),
        value: value.trim().to_string(),
    }))
}

/// Lazy iterator of [`LineRecord`]s over a buffered reader.
///
/// The iterator consumes the reader and stops for good after the first
/// error. Both `\n` and `\r\n` terminators are accepted.
pub struct Lines<R> {
    reader: R,
    buf: String,
    line: usize,
    done: bool,
}

impl<R: BufRead> Lines<R> {
    pub fn new(reader: R) -> Self {
        Lines {
            reader,
            buf: String::new(),
            line: 0,
            done: false,
        }
    }

    /// Number of physical lines read so far.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    fn fail(&mut self, err: Error) -> Option<Result<LineRecord>> {
        self.done = true;
        Some(Err(err))
    }
}

impl<R: BufRead> Iterator for Lines<R> {
    type Item = Result<LineRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(_) => {
                    self.line += 1;
                    match parse_line(self.line, &self.buf) {
                        Ok(Some(record)) => {
                            tracing::trace!(line = record.line, key = %record.key, "parsed line");
                            return Some(Ok(record));
                        }
                        Ok(None) => continue,
                        Err(err) => return self.fail(err),
                    }
                }
                Err(err) => return self.fail(Error::Io(err)),
            }
        }
    }
}
