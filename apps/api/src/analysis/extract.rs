//! Text/binary extraction for uploaded tender documents.
//!
//! Dispatch is by lower-cased file-name suffix only; content is never sniffed.

use std::io::{Cursor, Read};

use bytes::Bytes;
use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

use crate::config::PdfStrategy;

/// Maximum number of characters forwarded to the model on the text path.
pub const MAX_TEXT_CHARS: usize = 500_000;

pub const PDF_MIME_TYPE: &str = "application/pdf";

const DOCX_BODY_PART: &str = "word/document.xml";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type '.{0}'. Please upload a PDF, DOCX, or TXT file.")]
    UnsupportedFileType(String),

    #[error("Could not extract text from the uploaded file. The file may be empty or corrupted.")]
    EmptyOrCorruptFile,

    #[error("Failed to read document: {0}")]
    Decode(String),
}

impl ExtractionError {
    /// Whether the failure is the uploader's fault (bad type, empty file).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ExtractionError::UnsupportedFileType(_) | ExtractionError::EmptyOrCorruptFile
        )
    }
}

/// A request-scoped upload. Never persisted.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    pub content: Bytes,
}

impl UploadedDocument {
    pub fn new(file_name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }

    /// Lower-cased suffix after the last dot; empty when the name has none.
    pub fn extension(&self) -> String {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default()
    }
}

/// Output of extraction: exactly one of text or a binary attachment.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionResult {
    Text(String),
    BinaryAttachment { data: Bytes, mime_type: &'static str },
}

impl ExtractionResult {
    /// Character count of the text payload, if this is the text path.
    pub fn text_len(&self) -> Option<usize> {
        match self {
            ExtractionResult::Text(text) => Some(text.chars().count()),
            ExtractionResult::BinaryAttachment { .. } => None,
        }
    }
}

/// Extracts the model payload from an upload. The caller has already
/// enforced the upload size ceiling.
pub fn extract(
    document: &UploadedDocument,
    pdf_strategy: PdfStrategy,
) -> Result<ExtractionResult, ExtractionError> {
    let text = match document.extension().as_str() {
        "pdf" if document.content.is_empty() => return Err(ExtractionError::EmptyOrCorruptFile),
        "pdf" => match pdf_strategy {
            PdfStrategy::Inline => {
                return Ok(ExtractionResult::BinaryAttachment {
                    data: document.content.clone(),
                    mime_type: PDF_MIME_TYPE,
                })
            }
            PdfStrategy::Extract => pdf_extract::extract_text_from_mem(&document.content)
                .map_err(|e| ExtractionError::Decode(format!("PDF text extraction failed: {e}")))?,
        },
        "docx" => extract_docx_text(&document.content)?,
        "txt" => String::from_utf8_lossy(&document.content).into_owned(),
        other => return Err(ExtractionError::UnsupportedFileType(other.to_string())),
    };

    if text.trim().is_empty() {
        return Err(ExtractionError::EmptyOrCorruptFile);
    }

    Ok(ExtractionResult::Text(truncate_chars(text, MAX_TEXT_CHARS)))
}

/// Cuts `text` to at most `max_chars` characters, keeping the start.
pub fn truncate_chars(mut text: String, max_chars: usize) -> String {
    if let Some((byte_idx, _)) = text.char_indices().nth(max_chars) {
        text.truncate(byte_idx);
    }
    text
}

/// Pulls the raw text out of a DOCX package: runs of `w:t`, with paragraph
/// ends, breaks and tabs mapped to whitespace.
fn extract_docx_text(content: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(content))
        .map_err(|_| ExtractionError::EmptyOrCorruptFile)?;
    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY_PART)
        .map_err(|_| ExtractionError::EmptyOrCorruptFile)?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractionError::Decode(format!("DOCX body is unreadable: {e}")))?;

    let mut reader = Reader::from_str(&xml);
    let mut text = String::new();
    let mut in_run = false;
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:r" => in_run = true,
                b"w:t" => in_text_run = true,
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:r" => in_run = false,
                b"w:t" => in_text_run = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            // Outside a run, `w:tab` is a tab-stop definition in `w:pPr`.
            Ok(Event::Empty(e)) if in_run => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" | b"w:cr" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text_run => {
                let unescaped = t
                    .unescape()
                    .map_err(|e| ExtractionError::Decode(format!("DOCX body is malformed: {e}")))?;
                text.push_str(&unescaped);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ExtractionError::Decode(format!(
                    "DOCX body is malformed at byte {}: {e}",
                    reader.buffer_position()
                )))
            }
        }
    }

    Ok(text)
}
