mod pdf;
mod plain;
mod word;

pub use pdf::PdfExtractor;
pub use plain::PlainTextExtractor;
pub use word::WordExtractor;

use crate::cancel::CancelToken;
use crate::error::ExtractError;
use crate::models::{MediaType, SourceDocument};

/// One extraction strategy per supported container format. Adding a format
/// means one new implementation plus one arm in `extractor_for`.
pub trait ContainerExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8], cancel: &CancelToken) -> Result<String, ExtractError>;
}

pub fn extractor_for(media_type: MediaType) -> &'static dyn ContainerExtractor {
    match media_type {
        MediaType::Pdf => &PdfExtractor,
        MediaType::WordDocx | MediaType::WordDocLegacy => &WordExtractor,
        MediaType::PlainText => &PlainTextExtractor,
    }
}

pub fn extract_document(
    document: &SourceDocument<'_>,
    cancel: &CancelToken,
) -> Result<String, ExtractError> {
    extractor_for(document.media_type).extract(document.bytes, cancel)
}
