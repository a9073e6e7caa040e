//! Trace Reader.
//!
//! This module turns a memory trace into [`MemoryReference`]s. It provides:
//! 1. **Line parsing:** `<r|w> <hex-address>`, kind in either case, `0x` optional.
//! 2. **Filtering:** Blank lines and `#` comments are skipped.
//! 3. **Streaming:** References are produced lazily from any [`BufRead`].
//!
//! Tokens after the address are ignored.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::common::data::{AccessType, MemoryReference};
use crate::common::error::TraceError;

/// Iterator over the references of a trace.
///
/// Yields one `Result` per reference line. Parsing does not stop at the first
/// error; callers that want that behavior use
/// [`Simulator::replay`](crate::sim::simulator::Simulator::replay).
///
/// ```
/// use cachesim_core::common::MemoryReference;
/// use cachesim_core::sim::trace::TraceReader;
///
/// let trace = "r 0x10\n\n# comment\nW 20\n";
/// let refs: Vec<_> = TraceReader::new(trace.as_bytes()).collect::<Result<_, _>>().unwrap();
/// assert_eq!(refs, vec![MemoryReference::read(0x10), MemoryReference::write(0x20)]);
/// ```
#[derive(Debug)]
pub struct TraceReader<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> TraceReader<R> {
    /// Wraps a buffered reader.
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }

    /// Number of lines consumed so far.
    #[inline]
    pub const fn line(&self) -> usize {
        self.line
    }
}

impl TraceReader<BufReader<File>> {
    /// Opens a trace file.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::Open`] if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| TraceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "opened trace");
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<MemoryReference, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => self.line += 1,
                Err(e) => return Some(Err(e.into())),
            }
            match parse_line(&self.buf) {
                Ok(Some(reference)) => return Some(Ok(reference)),
                Ok(None) => {}
                Err(e) => return Some(Err(e.at_line(self.line))),
            }
        }
    }
}

/// Parses one trace line; `Ok(None)` for blank and comment lines.
///
/// # Errors
///
/// Fails on an unknown access kind, a missing address, or an address that is
/// not a 32-bit hexadecimal number. Errors carry line number 0.
pub fn parse_line(line: &str) -> Result<Option<MemoryReference>, TraceError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut tokens = line.split_whitespace();
    let kind = match tokens.next() {
        Some(token) => parse_kind(token)?,
        None => return Ok(None),
    };
    let text = tokens
        .next()
        .ok_or(TraceError::MissingAddress { line: 0 })?;
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    let addr = u32::from_str_radix(digits, 16).map_err(|_| TraceError::BadAddress {
        line: 0,
        text: text.to_owned(),
    })?;

    Ok(Some(MemoryReference { kind, addr }))
}

fn parse_kind(token: &str) -> Result<AccessType, TraceError> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => AccessType::try_from(c),
        _ => Err(TraceError::UnknownAccessKind {
            line: 0,
            kind: token.to_owned(),
        }),
    }
}
