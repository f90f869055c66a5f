use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_WORD_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_WORD_DOC_LEGACY: &str = "application/msword";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum MediaType {
    Pdf,
    WordDocx,
    WordDocLegacy,
    PlainText,
}

impl MediaType {
    /// Maps a declared media-type label onto an extraction strategy key.
    /// Matching ignores ASCII case and any `;`-delimited parameters; every
    /// unrecognized label falls back to the plain-text strategy.
    pub fn from_declared(label: &str) -> Self {
        let essence = label.split(';').next().unwrap_or("").trim();

        if essence.eq_ignore_ascii_case(MIME_PDF) {
            MediaType::Pdf
        } else if essence.eq_ignore_ascii_case(MIME_WORD_DOCX) {
            MediaType::WordDocx
        } else if essence.eq_ignore_ascii_case(MIME_WORD_DOC_LEGACY) {
            MediaType::WordDocLegacy
        } else {
            MediaType::PlainText
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MediaType::Pdf => "pdf",
            MediaType::WordDocx => "word-docx",
            MediaType::WordDocLegacy => "word-doc-legacy",
            MediaType::PlainText => "plain-text",
        };
        f.write_str(label)
    }
}

/// An uploaded document as handed over by the caller: the raw bytes plus the
/// media type the caller declared for them. Borrowed on purpose; the pipeline
/// never keeps a reference past the extraction call.
#[derive(Debug, Clone, Copy)]
pub struct SourceDocument<'a> {
    pub bytes: &'a [u8],
    pub media_type: MediaType,
}

impl<'a> SourceDocument<'a> {
    pub fn new(bytes: &'a [u8], declared_type: &str) -> Self {
        Self {
            bytes,
            media_type: MediaType::from_declared(declared_type),
        }
    }

    pub fn with_media_type(bytes: &'a [u8], media_type: MediaType) -> Self {
        Self { bytes, media_type }
    }
}
