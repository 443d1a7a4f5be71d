//! File-like adapter over a line iterator.

use std::io::{self, BufRead, Read};

/// Presents a lazy sequence of byte lines as a sequential reader.
///
/// Consumers see one contiguous byte stream (the concatenated lines) and EOF once the
/// sequence is exhausted. At most one line is buffered at a time; seeking is not supported.
#[derive(Debug)]
pub struct LineReader<I> {
    lines: I,
    buf: Vec<u8>,
    pos: usize,
}

impl<I> LineReader<I>
where
    I: Iterator<Item = io::Result<Vec<u8>>>,
{
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            buf: Vec::new(),
            pos: 0,
        }
    }

    /// Give back the underlying line iterator, dropping any partially read line.
    pub fn into_inner(self) -> I {
        self.lines
    }
}

impl<I> BufRead for LineReader<I>
where
    I: Iterator<Item = io::Result<Vec<u8>>>,
{
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        // Skip zero-length items: an empty return must mean EOF.
        while self.pos >= self.buf.len() {
            match self.lines.next() {
                Some(line) => {
                    self.buf = line?;
                    self.pos = 0;
                }
                None => {
                    self.buf.clear();
                    self.pos = 0;
                    break;
                }
            }
        }
        Ok(&self.buf[self.pos..])
    }

    fn consume(&mut self, amt: usize) {
        self.pos = (self.pos + amt).min(self.buf.len());
    }
}

impl<I> Read for LineReader<I>
where
    I: Iterator<Item = io::Result<Vec<u8>>>,
{
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let available = self.fill_buf()?;
        let n = available.len().min(out.len());
        out[..n].copy_from_slice(&available[..n]);
        self.consume(n);
        Ok(n)
    }
}
