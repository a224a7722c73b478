//! Résumé reading: routes an upload to the right extractor

use crate::error::{RecommenderError, Result};
use crate::input::file_detector::DocumentFormat;
use crate::input::text_extractor::{
    MarkdownExtractor, PdfExtractor, PlainTextExtractor, TextExtractor,
};
use log::debug;
use std::path::Path;

/// Extract the text of a résumé as a single line.
///
/// Fails with `DocumentUnreadable` when the file is missing or cannot be
/// parsed and with `UnsupportedFormat` for file types we do not read.
pub async fn extract_resume_text(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(RecommenderError::DocumentUnreadable(format!(
            "File does not exist: {}",
            path.display()
        )));
    }

    let text = match DocumentFormat::from_path(path) {
        DocumentFormat::Pdf => {
            debug!("Extracting text from PDF: {}", path.display());
            PdfExtractor.extract(path).await?
        }
        DocumentFormat::Text => {
            debug!("Reading plain text résumé: {}", path.display());
            PlainTextExtractor.extract(path).await?
        }
        DocumentFormat::Markdown => {
            debug!("Reading markdown résumé: {}", path.display());
            MarkdownExtractor.extract(path).await?
        }
        DocumentFormat::Unknown => {
            return Err(RecommenderError::UnsupportedFormat(format!(
                "Unsupported résumé type: {}",
                path.display()
            )));
        }
    };

    Ok(flatten_lines(&text))
}

/// Replace line breaks with spaces.
pub fn flatten_lines(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}
