//! Text extraction from résumé uploads

use crate::error::{RecommenderError, Result};
use pulldown_cmark::{Event, Parser};
use std::path::Path;
use tokio::fs;

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> impl std::future::Future<Output = Result<String>> + Send;
}

async fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).await.map_err(|e| {
        RecommenderError::DocumentUnreadable(format!("Failed to read '{}': {}", path.display(), e))
    })
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    /// Pages are joined with a single space.
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = read_bytes(path).await?;

        // The parser is CPU bound and panics on some malformed files.
        let pages = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem_by_pages(&bytes)
        })
        .await
        .map_err(|e| {
            RecommenderError::DocumentUnreadable(format!(
                "PDF parser aborted on '{}': {}",
                path.display(),
                e
            ))
        })?
        .map_err(|e| {
            RecommenderError::DocumentUnreadable(format!(
                "Failed to extract text from PDF '{}': {}",
                path.display(),
                e
            ))
        })?;

        Ok(pages.join(" "))
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = read_bytes(path).await?;
        String::from_utf8(bytes).map_err(|e| {
            RecommenderError::DocumentUnreadable(format!(
                "'{}' is not valid UTF-8: {}",
                path.display(),
                e
            ))
        })
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let markdown = PlainTextExtractor.extract(path).await?;
        Ok(markdown_to_text(&markdown))
    }
}

/// Keep the textual content of a Markdown document, dropping the markup.
fn markdown_to_text(markdown: &str) -> String {
    let mut text = String::with_capacity(markdown.len());
    for event in Parser::new(markdown) {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak | Event::End(_) => text.push(' '),
            _ => {}
        }
    }
    text
}
