//! Locating and bounding the data region of a padded CSV file.
//!
//! The pipeline is a stack of lazy iterators over byte lines:
//!
//! ```text
//! RawLines (BufRead) -> Located (skip banner) -> UntilPadding (stop at trailer)
//! ```
//!
//! No stage buffers more than one line, so files of any size stream straight through.

use std::fmt;
use std::io::{self, BufRead};
use std::str::FromStr;

use serde::Deserialize;
use tracing::debug;

use crate::error::{UploadError, UploadResult};

use super::classify::is_padding;

/// Policy for how many leading lines precede the CSV header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "HeaderLengthRepr")]
pub enum HeaderLength {
    /// Find the header dynamically: the first non-padding line preceded by at least two
    /// consecutive padding lines.
    #[default]
    Auto,
    /// Skip exactly this many leading lines unconditionally.
    Fixed(usize),
}

/// Minimum run of padding lines that separates a banner from the data block.
pub const MIN_SEPARATOR_LINES: usize = 2;

#[derive(Deserialize)]
#[serde(untagged)]
enum HeaderLengthRepr {
    Fixed(usize),
    Keyword(String),
}

impl TryFrom<HeaderLengthRepr> for HeaderLength {
    type Error = String;

    fn try_from(repr: HeaderLengthRepr) -> Result<Self, Self::Error> {
        match repr {
            HeaderLengthRepr::Fixed(n) => Ok(Self::Fixed(n)),
            HeaderLengthRepr::Keyword(s) => s.parse(),
        }
    }
}

impl FromStr for HeaderLength {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        s.parse::<usize>()
            .map(Self::Fixed)
            .map_err(|_| format!("header length must be \"auto\" or a non-negative integer, got '{s}'"))
    }
}

impl fmt::Display for HeaderLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Fixed(n) => write!(f, "{n}"),
        }
    }
}

/// Byte lines of a [`BufRead`], each including its line terminator.
#[derive(Debug)]
pub struct RawLines<R> {
    reader: R,
}

impl<R: BufRead> RawLines<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> Iterator for RawLines<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut line = Vec::new();
        match self.reader.read_until(b'\n', &mut line) {
            Ok(0) => None,
            Ok(_) => Some(Ok(line)),
            Err(e) => Some(Err(e)),
        }
    }
}

/// A line sequence positioned at the header line.
///
/// Produced by [`locate`]; yields the header first, then the rest of the input untouched.
#[derive(Debug)]
pub struct Located<I> {
    header: Option<Vec<u8>>,
    rest: I,
}

impl<I> Iterator for Located<I>
where
    I: Iterator<Item = io::Result<Vec<u8>>>,
{
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.header.take() {
            Some(line) => Some(Ok(line)),
            None => self.rest.next(),
        }
    }
}

/// Advance `lines` to the first line of the data region.
///
/// - [`HeaderLength::Fixed`]: discards exactly `n` lines. Shorter input just leaves an empty
///   sequence.
/// - [`HeaderLength::Auto`]: discards lines until a non-padding line follows at least
///   [`MIN_SEPARATOR_LINES`] consecutive padding lines; that line is the header. Fails with
///   [`UploadError::DataRegionNotFound`] if input ends first.
///
/// Only the discarded prefix is consumed; the remainder stays lazy.
pub fn locate<I>(mut lines: I, header_length: HeaderLength) -> UploadResult<Located<I>>
where
    I: Iterator<Item = io::Result<Vec<u8>>>,
{
    match header_length {
        HeaderLength::Fixed(n) => {
            for _ in 0..n {
                match lines.next() {
                    Some(line) => {
                        line?;
                    }
                    None => break,
                }
            }
            Ok(Located {
                header: None,
                rest: lines,
            })
        }
        HeaderLength::Auto => {
            let mut consecutive_padding = 0usize;
            let mut scanned = 0usize;
            while let Some(line) = lines.next() {
                let line = line?;
                scanned += 1;
                if is_padding(&line) {
                    consecutive_padding += 1;
                    continue;
                }
                if consecutive_padding >= MIN_SEPARATOR_LINES {
                    debug!(header_line = scanned, "located data region");
                    return Ok(Located {
                        header: Some(line),
                        rest: lines,
                    });
                }
                consecutive_padding = 0;
            }
            Err(UploadError::DataRegionNotFound {
                lines_scanned: scanned,
            })
        }
    }
}

/// Yields lines until the first padding line (exclusive), then stops for good.
#[derive(Debug)]
pub struct UntilPadding<I> {
    lines: I,
    done: bool,
}

impl<I> UntilPadding<I> {
    pub fn new(lines: I) -> Self {
        Self { lines, done: false }
    }
}

impl<I> Iterator for UntilPadding<I>
where
    I: Iterator<Item = io::Result<Vec<u8>>>,
{
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.lines.next() {
            Some(Ok(line)) if is_padding(&line) => {
                self.done = true;
                None
            }
            None => {
                self.done = true;
                None
            }
            other => other,
        }
    }
}

/// Lines of the data region of a padded CSV: header first, trailer excluded.
pub type RegionLines<R> = UntilPadding<Located<RawLines<R>>>;

/// Locate and bound the data region of `reader` under `header_length`.
pub fn padded_csv_lines<R: BufRead>(reader: R, header_length: HeaderLength) -> UploadResult<RegionLines<R>> {
    let located = locate(RawLines::new(reader), header_length)?;
    Ok(UntilPadding::new(located))
}
