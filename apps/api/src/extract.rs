//! PDF text extraction.
//!
//! Text is pulled page by page in document order and concatenated with no
//! separator. A page that yields nothing (scanned image, unsupported font
//! encoding) contributes an empty string rather than failing the document.

use lopdf::Document;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("uploaded file is empty")]
    Empty,

    #[error("not a readable PDF: {0}")]
    Parse(String),

    #[error("PDF is encrypted")]
    Encrypted,
}

/// Converts an uploaded document into plain text.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// `lopdf`-backed extractor for PDF uploads.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    /// Returns the text of every page, in page order.
    pub fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
        if bytes.is_empty() {
            return Err(ExtractionError::Empty);
        }

        let doc = Document::load_mem(bytes).map_err(|e| ExtractionError::Parse(e.to_string()))?;
        if doc.is_encrypted() {
            return Err(ExtractionError::Encrypted);
        }

        // get_pages() is keyed by page number, so iteration is already in document order.
        let pages = doc
            .get_pages()
            .into_keys()
            .map(|page| match doc.extract_text(&[page]) {
                Ok(text) => text,
                Err(e) => {
                    debug!("No extractable text on page {page}: {e}");
                    String::new()
                }
            })
            .collect::<Vec<_>>();

        debug!("Extracted text from {} PDF page(s)", pages.len());
        Ok(pages)
    }
}

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        Ok(self.extract_pages(bytes)?.concat())
    }
}

/// Builds small PDFs for tests: one entry per page, `None` for a page with no text.
#[cfg(test)]
pub(crate) fn test_pdf(pages: &[Option<&str>]) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let operations = match text {
            Some(text) => vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
            None => vec![],
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content stream"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("serialize test PDF");
    bytes
}
