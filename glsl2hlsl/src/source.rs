//! Source locations and character sources

use std::fmt;
use std::io::{BufRead, BufReader, Read};

use crate::Result;

/// Span of source text, 1-based, inclusive of its start and exclusive of its end column
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// First line of the span
    pub line: u32,
    /// First column of the span
    pub column: u32,
    /// Last line of the span
    pub end_line: u32,
    /// Column following the last character of the span
    pub end_column: u32,
}

impl SourceLocation {
    /// Location of a single point in the source
    pub fn new(line: u32, column: u32) -> Self {
        Self {
            line,
            column,
            end_line: line,
            end_column: column,
        }
    }

    /// Span starting at `self` and ending where `other` ends
    pub fn to(self, other: SourceLocation) -> Self {
        Self {
            line: self.line,
            column: self.column,
            end_line: other.end_line,
            end_column: other.end_column,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Pull-based source of characters consumed by the lexer
pub trait CharSource {
    /// Pull the next character, or `None` once the input is exhausted
    fn next_char(&mut self) -> Result<Option<char>>;
}

/// Character source over an in-memory string
pub struct StrSource<'s> {
    chars: std::str::Chars<'s>,
}

impl<'s> StrSource<'s> {
    /// Create a new in-memory source
    pub fn new(text: &'s str) -> Self {
        Self {
            chars: text.chars(),
        }
    }
}

impl CharSource for StrSource<'_> {
    fn next_char(&mut self) -> Result<Option<char>> {
        Ok(self.chars.next())
    }
}

/// Character source reading from a stream, one line at a time
pub struct ReaderSource<R: Read> {
    reader: BufReader<R>,
    line: Vec<char>,
    pos: usize,
    done: bool,
}

impl<R: Read> ReaderSource<R> {
    /// Create a new stream-backed source
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line: Vec::new(),
            pos: 0,
            done: false,
        }
    }

    fn refill(&mut self) -> Result<()> {
        let mut buf = String::new();
        if self.reader.read_line(&mut buf)? == 0 {
            self.done = true;
        }

        self.line = buf.chars().collect();
        self.pos = 0;
        Ok(())
    }
}

impl<R: Read> CharSource for ReaderSource<R> {
    fn next_char(&mut self) -> Result<Option<char>> {
        while self.pos >= self.line.len() {
            if self.done {
                return Ok(None);
            }

            self.refill()?;
        }

        let c = self.line[self.pos];
        self.pos += 1;
        Ok(Some(c))
    }
}

/// Drain a character source into a vector
pub(crate) fn drain(source: &mut dyn CharSource) -> Result<Vec<char>> {
    let mut chars = Vec::new();
    while let Some(c) = source.next_char()? {
        chars.push(c);
    }
    Ok(chars)
}
