// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Plain-text extraction from uploaded documents

use thiserror::Error;
use tracing::debug;

const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Only PDF files are supported")]
    Unsupported,

    #[error("Failed to parse document: {0}")]
    Parse(String),

    #[error("Document contains no extractable text")]
    Empty,
}

/// Turns raw uploaded bytes into text. Implementations are blocking.
pub trait TextExtractor: Send + Sync {
    /// Cheap admission check run before any parsing
    fn accepts(&self, filename: &str, content_type: Option<&str>, bytes: &[u8]) -> bool;

    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn is_pdf(filename: &str, content_type: Option<&str>, bytes: &[u8]) -> bool {
        let declared = content_type
            .map(|ct| ct.to_ascii_lowercase().contains("pdf"))
            .unwrap_or(false)
            || filename.to_ascii_lowercase().ends_with(".pdf");
        declared && bytes.starts_with(PDF_MAGIC)
    }
}

impl TextExtractor for PdfTextExtractor {
    fn accepts(&self, filename: &str, content_type: Option<&str>, bytes: &[u8]) -> bool {
        Self::is_pdf(filename, content_type, bytes)
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        if !bytes.starts_with(PDF_MAGIC) {
            return Err(ExtractError::Unsupported);
        }
        let text = pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| ExtractError::Parse(e.to_string()))?;
        let text = text.trim();
        if text.is_empty() {
            return Err(ExtractError::Empty);
        }
        debug!("Extracted {} chars from {} byte PDF", text.len(), bytes.len());
        Ok(text.to_string())
    }
}
