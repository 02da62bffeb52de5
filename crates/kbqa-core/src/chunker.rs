//! Fixed-size character windows with overlap.
//!
//! Sizes are counted in `char`s so a window never splits a UTF-8 sequence.
//! Consecutive windows share exactly `overlap` characters; the last window
//! may be shorter and always ends at the end of the text.

use crate::error::{Error, Result};

pub const DEFAULT_CHUNK_SIZE: usize = 2000;
pub const DEFAULT_OVERLAP: usize = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    chunk_size: usize,
    overlap: usize,
}

impl Default for Chunker {
    fn default() -> Self {
        Self { chunk_size: DEFAULT_CHUNK_SIZE, overlap: DEFAULT_OVERLAP }
    }
}

impl Chunker {
    /// Requires `0 <= overlap < chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk size must be positive".to_string()));
        }
        if overlap >= chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunk overlap ({overlap}) must be smaller than chunk size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    pub fn chunk_size(&self) -> usize { self.chunk_size }

    pub fn overlap(&self) -> usize { self.overlap }

    fn step(&self) -> usize { self.chunk_size - self.overlap }

    /// Split `text` into overlapping windows. Empty text yields no chunks.
    pub fn chunk<'a>(&self, text: &'a str) -> Vec<&'a str> {
        if text.is_empty() {
            return Vec::new();
        }
        // Byte offset of every char start, plus the end of the text.
        let bounds: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let char_len = bounds.len() - 1;

        let mut chunks = Vec::with_capacity(self.expected_chunks(char_len));
        let mut start = 0;
        loop {
            let end = (start + self.chunk_size).min(char_len);
            chunks.push(&text[bounds[start]..bounds[end]]);
            if end >= char_len {
                break;
            }
            start += self.step();
        }
        chunks
    }

    /// Number of windows `chunk` produces for a text of `char_len` characters.
    pub fn expected_chunks(&self, char_len: usize) -> usize {
        match char_len {
            0 => 0,
            l if l <= self.overlap => 1,
            l => (l - self.overlap).div_ceil(self.step()),
        }
    }
}

/// One-shot form of [`Chunker::chunk`] that validates the parameters first.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<&str>> {
    Ok(Chunker::new(chunk_size, overlap)?.chunk(text))
}
