// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Fixed-window text chunker
//!
//! Windows are measured in characters, not bytes, so multi-byte text is
//! never cut inside a code point. Each chunk after the first repeats the
//! last `overlap` characters of its predecessor.

use thiserror::Error;

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    #[error("Chunk size must be greater than zero")]
    ZeroSize,

    #[error("Chunk overlap {overlap} must be smaller than chunk size {size}")]
    OverlapTooLarge { size: usize, overlap: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position of the chunk within its document
    pub index: usize,
    pub text: String,
    /// Length of `text` in characters
    pub char_len: usize,
    /// Character offset of the chunk start in the source text
    pub start: usize,
    /// Leading characters shared with the previous chunk
    pub overlap: usize,
}

impl Chunk {
    /// The part of the chunk not already covered by its predecessor
    pub fn fresh_text(&self) -> &str {
        match self.text.char_indices().nth(self.overlap) {
            Some((byte, _)) => &self.text[byte..],
            None => "",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TextSplitter {
    size: usize,
    overlap: usize,
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self {
            size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl TextSplitter {
    pub fn new(size: usize, overlap: usize) -> Result<Self, ChunkError> {
        if size == 0 {
            return Err(ChunkError::ZeroSize);
        }
        if overlap >= size {
            return Err(ChunkError::OverlapTooLarge { size, overlap });
        }
        Ok(Self { size, overlap })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split `text` into ordered chunks; empty text yields none
    pub fn split(&self, text: &str) -> Vec<Chunk> {
        // Byte offset of every char boundary, including the end
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let total = boundaries.len() - 1;
        let step = self.size - self.overlap;

        let mut chunks = Vec::new();
        let mut start = 0;
        while start < total {
            let end = (start + self.size).min(total);
            chunks.push(Chunk {
                index: chunks.len(),
                text: text[boundaries[start]..boundaries[end]].to_string(),
                char_len: end - start,
                start,
                overlap: if start == 0 { 0 } else { self.overlap },
            });
            if end == total {
                break;
            }
            start += step;
        }
        chunks
    }
}
