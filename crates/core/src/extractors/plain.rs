use crate::cancel::CancelToken;
use crate::error::ExtractError;
use crate::extractors::ContainerExtractor;

#[derive(Debug, Default)]
pub struct PlainTextExtractor;

impl ContainerExtractor for PlainTextExtractor {
    // Strict decode: downstream normalization assumes valid text, so invalid
    // UTF-8 is rejected instead of substituting replacement characters.
    fn extract(&self, bytes: &[u8], cancel: &CancelToken) -> Result<String, ExtractError> {
        cancel.bail_if_cancelled()?;

        let text = std::str::from_utf8(bytes)
            .map_err(|error| ExtractError::InvalidEncoding(error.to_string()))?;
        Ok(text.to_string())
    }
}
