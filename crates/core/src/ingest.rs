use crate::cancel::CancelToken;
use crate::error::ExtractError;
use crate::extractors::extract_document;
use crate::models::SourceDocument;
use crate::normalize::normalize;

/// Runs the whole pipeline: dispatch on the declared media type, extract the
/// raw text, normalize it into canonical form. Extraction is all-or-nothing;
/// an empty result is a successful result.
pub fn ingest_document(document: &SourceDocument<'_>) -> Result<String, ExtractError> {
    ingest_document_with_cancel(document, &CancelToken::new())
}

pub fn ingest_document_with_cancel(
    document: &SourceDocument<'_>,
    cancel: &CancelToken,
) -> Result<String, ExtractError> {
    let raw = extract_document(document, cancel)?;
    Ok(normalize(&raw))
}
