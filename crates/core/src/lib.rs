pub mod cancel;
pub mod error;
pub mod extractors;
pub mod ingest;
pub mod models;
pub mod normalize;

pub use cancel::CancelToken;
pub use error::ExtractError;
pub use extractors::{
    extract_document, extractor_for, ContainerExtractor, PdfExtractor, PlainTextExtractor,
    WordExtractor,
};
pub use ingest::{ingest_document, ingest_document_with_cancel};
pub use models::{
    MediaType, SourceDocument, MIME_PDF, MIME_WORD_DOCX, MIME_WORD_DOC_LEGACY,
};
pub use normalize::{normalize, NormalizationPass, PASSES};
