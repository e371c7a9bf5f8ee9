use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::TraceError;
use crate::memory::PageFlags;

/// Memory geometry from the first line of a trace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceHeader {
    /// Logical memory size in pages
    pub pages: u64,
    /// Physical memory size in frames
    pub frames: u64,
    /// Page size exponent: pages are `2^page_shift` addressable units
    pub page_shift: u64,
    pub processes: u64,
}

impl TraceHeader {
    pub fn parse(line: &str) -> Option<Self> {
        let mut values = [0u64; 4];
        let mut tokens = line.split_whitespace();
        for value in values.iter_mut() {
            *value = tokens.next()?.parse().ok()?;
        }
        if tokens.next().is_some() {
            return None;
        }
        let [pages, frames, page_shift, processes] = values;
        Some(TraceHeader {
            pages,
            frames,
            page_shift,
            processes,
        })
    }
}

/// One directive from the body of a trace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent {
    /// `a <pid> <page> <rwx>`
    Allocate { pid: u64, page: u64, access: PageFlags },
    /// `r <pid> <hex address> <r|w|x>`
    Reference { pid: u64, address: u64, access: PageFlags },
}

impl TraceEvent {
    pub fn parse(line: &str) -> Option<Self> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != 4 {
            return None;
        }

        let pid: u64 = parse_decimal(tokens[1])?;
        match tokens[0] {
            "a" => Some(TraceEvent::Allocate {
                pid,
                page: parse_decimal(tokens[2])?,
                access: parse_rwx(tokens[3])?,
            }),
            "r" if tokens[3].len() == 1 => Some(TraceEvent::Reference {
                pid,
                address: parse_hex(tokens[2])?,
                access: parse_rwx(tokens[3])?,
            }),
            _ => None,
        }
    }
}

fn parse_decimal(token: &str) -> Option<u64> {
    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

fn parse_hex(token: &str) -> Option<u64> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u64::from_str_radix(digits, 16).ok()
}

/// Convert a string of distinct `r`, `w` and `x` characters into access flags.
///
/// Case-sensitive; empty strings, repeats and any other character are rejected.
pub fn parse_rwx(s: &str) -> Option<PageFlags> {
    if s.is_empty() || s.len() > 3 {
        return None;
    }
    let mut access = PageFlags::empty();
    for c in s.chars() {
        let flag = match c {
            'r' => PageFlags::READ,
            'w' => PageFlags::WRITE,
            'x' => PageFlags::EXECUTE,
            _ => return None,
        };
        if access.contains(flag) {
            return None;
        }
        access |= flag;
    }
    Some(access)
}

/// Line-oriented trace reader. Blank lines are skipped everywhere.
pub struct TraceReader<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl TraceReader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, TraceError> {
        let file = File::open(path.as_ref())?;
        Ok(TraceReader::new(BufReader::new(file)))
    }
}

impl<R: BufRead> TraceReader<R> {
    pub fn new(reader: R) -> Self {
        TraceReader {
            reader,
            line: 0,
            buf: String::new(),
        }
    }

    /// Line number of the last line read, 1-based
    pub fn line_number(&self) -> usize {
        self.line
    }

    /// Next non-blank line, trimmed, with its line number; `None` at end of input
    fn next_line(&mut self) -> Result<Option<(usize, &str)>, TraceError> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            if !self.buf.trim().is_empty() {
                return Ok(Some((self.line, self.buf.trim())));
            }
        }
    }

    /// Read the header. Must be called before iterating events.
    pub fn read_header(&mut self) -> Result<TraceHeader, TraceError> {
        let (line, text) = self.next_line()?.ok_or(TraceError::MissingHeader)?;
        TraceHeader::parse(text).ok_or_else(|| TraceError::MalformedHeader {
            line,
            text: text.to_string(),
        })
    }

    /// Next event, `Ok(None)` at a clean end of trace
    pub fn next_event(&mut self) -> Result<Option<TraceEvent>, TraceError> {
        let Some((line, text)) = self.next_line()? else {
            return Ok(None);
        };
        match TraceEvent::parse(text) {
            Some(event) => Ok(Some(event)),
            None => Err(TraceError::MalformedLine {
                line,
                text: text.to_string(),
            }),
        }
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<TraceEvent, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event().transpose()
    }
}
