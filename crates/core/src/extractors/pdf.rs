use crate::cancel::CancelToken;
use crate::error::ExtractError;
use crate::extractors::ContainerExtractor;
use lopdf::Document;

#[derive(Debug, Default)]
pub struct PdfExtractor;

impl ContainerExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8], cancel: &CancelToken) -> Result<String, ExtractError> {
        cancel.bail_if_cancelled()?;

        let document = Document::load_mem(bytes)
            .map_err(|error| ExtractError::MalformedContainer(format!("pdf: {error}")))?;

        let mut pages = Vec::new();
        for (page_no, _page_id) in document.get_pages() {
            cancel.bail_if_cancelled()?;

            // A page whose text cannot be extracted has no text layer; it
            // contributes an empty string at its position rather than
            // failing the document.
            let text = document.extract_text(&[page_no]).unwrap_or_default();
            pages.push(text.trim().to_string());
        }

        Ok(pages.join("\n\n").trim().to_string())
    }
}
