//! Source location utilities.

use serde::{Deserialize, Serialize};

/// Row/column location within the source XML document (1-indexed), plus the byte
/// offset of the construct that was being read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub(crate) line: u32,
    pub(crate) column: u32,
    pub(crate) offset: u32,
}

impl Location {
    /// Sentinel value meaning "location unknown".
    pub const UNKNOWN: Self = Self {
        line: 0,
        column: 0,
        offset: 0,
    };

    /// Components past `u32::MAX` saturate, which only happens for inputs over 4 GiB
    /// parsed without a budget.
    pub(crate) fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line: saturate(line),
            column: saturate(column),
            offset: saturate(offset),
        }
    }

    /// 1-indexed line number.
    pub fn line(&self) -> u64 {
        self.line as u64
    }

    /// 1-indexed column, counted in characters.
    pub fn column(&self) -> u64 {
        self.column as u64
    }

    /// Byte offset of the construct within the input.
    pub fn offset(&self) -> usize {
        self.offset as usize
    }

    pub fn is_known(&self) -> bool {
        self.line != 0 && self.column != 0
    }
}

/// Precomputed line starts used to turn byte offsets into [`Location`]s.
#[derive(Debug, Clone)]
pub(crate) struct LineIndex<'a> {
    text: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            text,
            starts: line_starts(text),
        }
    }

    /// Convert a byte offset into a 1-based line/column location.
    ///
    /// Offsets past the end are clamped to the end of input. Offsets that do not fall
    /// on a character boundary are moved back to the previous one.
    pub(crate) fn locate(&self, offset: usize) -> Location {
        let mut offset = offset.min(self.text.len());
        while offset > 0 && !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        let row = match self.starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(next) => next.saturating_sub(1),
        };
        let line_start = self.starts.get(row).copied().unwrap_or(0);
        let column = self.text[line_start..offset].chars().count() + 1;
        Location::new(row + 1, column, offset)
    }
}

fn saturate(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

pub(crate) fn line_starts(source: &str) -> Vec<usize> {
    let mut starts = vec![0usize];
    for (i, b) in source.as_bytes().iter().enumerate() {
        if *b == b'\n' {
            // '\n' is ASCII, so i + 1 is always a char boundary.
            starts.push(i + 1);
        }
    }
    starts
}
