//! PDF text extraction for uploaded resumes and job descriptions.

use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};

use bytes::Bytes;
use lopdf::Document;
use pdf_extract::{output_doc_page, OutputError, PlainTextOutput};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Could not read PDF: {0}")]
    Unreadable(String),
}

/// Extracts the text layer of a PDF, page by page.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    /// Returns the text of every page that has any, in page order, joined by
    /// newlines. Pages without a text layer (scans, images) are skipped, so an
    /// image-only PDF yields an empty string. A page that fails to extract is
    /// skipped the same way and the remaining pages are still returned.
    ///
    /// Fails only when the document as a whole cannot be parsed.
    pub fn extract(&self, pdf: &[u8]) -> Result<String, PdfError> {
        let doc = load_document(pdf)?;
        let page_numbers: Vec<u32> = doc.get_pages().into_keys().collect();

        let pages = collect_pages(&page_numbers, |page_num| page_text(&doc, page_num));

        let text = join_pages(pages);
        debug!(
            "Extracted {} chars from {} PDF pages",
            text.len(),
            page_numbers.len()
        );
        if text.is_empty() {
            warn!(
                "PDF has no extractable text on any of its {} pages",
                page_numbers.len()
            );
        }
        Ok(text)
    }

    /// Runs [`Self::extract`] on the blocking pool.
    pub async fn extract_async(&self, pdf: Bytes) -> Result<String, PdfError> {
        let extractor = *self;
        tokio::task::spawn_blocking(move || extractor.extract(&pdf))
            .await
            .map_err(|e| PdfError::Unreadable(format!("extraction task failed: {e}")))?
    }
}

fn load_document(pdf: &[u8]) -> Result<Document, PdfError> {
    let mut doc = panic::catch_unwind(AssertUnwindSafe(|| Document::load_mem(pdf)))
        .map_err(|_| PdfError::Unreadable("PDF parser panicked".to_string()))?
        .map_err(|e| PdfError::Unreadable(e.to_string()))?;

    // Owner-password-only PDFs open with the empty user password.
    if doc.is_encrypted() {
        doc.decrypt("")
            .map_err(|e| PdfError::Unreadable(format!("encrypted PDF: {e}")))?;
    }
    Ok(doc)
}

fn page_text(doc: &Document, page_num: u32) -> Result<String, OutputError> {
    let mut text = String::new();
    {
        let mut output = PlainTextOutput::new(&mut text);
        output_doc_page(doc, &mut output, page_num)?;
    }
    Ok(text)
}

/// Extracts each page on its own. A page whose extraction errors or panics
/// (pdf-extract panics on e.g. a missing MediaBox) is logged and dropped.
fn collect_pages<F, E>(page_numbers: &[u32], extract_page: F) -> Vec<String>
where
    F: Fn(u32) -> Result<String, E>,
    E: Display,
{
    page_numbers
        .iter()
        .filter_map(|&page_num| {
            match panic::catch_unwind(AssertUnwindSafe(|| extract_page(page_num))) {
                Ok(Ok(text)) => Some(text),
                Ok(Err(e)) => {
                    warn!("Skipping unreadable PDF page {page_num}: {e}");
                    None
                }
                Err(_) => {
                    warn!("Skipping PDF page {page_num}: parser panicked");
                    None
                }
            }
        })
        .collect()
}

fn join_pages(pages: Vec<String>) -> String {
    pages
        .iter()
        .map(|page| page.trim_matches(|c| c == '\n' || c == '\r'))
        .filter(|page| !page.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Hand-built PDFs for tests.
#[cfg(test)]
pub(crate) mod test_pdf {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    pub(crate) enum TestPage {
        /// One line of Helvetica text.
        Text(&'static str),
        /// No content stream, like a scanned page with no text layer.
        Blank,
        /// Text, but the page (and its parents) carry no MediaBox.
        NoMediaBox(&'static str),
    }

    pub(crate) fn build_pdf(pages: &[TestPage]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for page in pages {
            let mut page_dict = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Resources" => resources_id,
            };
            let text = match page {
                TestPage::Text(text) => Some(*text),
                TestPage::Blank => None,
                TestPage::NoMediaBox(text) => Some(*text),
            };
            if !matches!(page, TestPage::NoMediaBox(_)) {
                let media_box: Vec<Object> = vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(595),
                    Object::Integer(842),
                ];
                page_dict.set("MediaBox", media_box);
            }
            if let Some(text) = text {
                let content = Content {
                    operations: vec![
                        Operation::new("BT", vec![]),
                        Operation::new("Tf", vec!["F1".into(), 24.into()]),
                        Operation::new("Td", vec![100.into(), 700.into()]),
                        Operation::new("Tj", vec![Object::string_literal(text)]),
                        Operation::new("ET", vec![]),
                    ],
                };
                let content_id =
                    doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
                page_dict.set("Contents", content_id);
            }
            kids.push(doc.add_object(page_dict).into());
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
        doc.save_to(&mut bytes).unwrap();
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::test_pdf::{build_pdf, TestPage};
    use super::*;

    #[test]
    fn test_join_pages_skips_empty_pages() {
        let pages = vec![
            "Jane Doe\nBackend Engineer".to_string(),
            String::new(),
            "  \n ".to_string(),
            "Skills: Rust, Python".to_string(),
        ];
        assert_eq!(
            join_pages(pages),
            "Jane Doe\nBackend Engineer\nSkills: Rust, Python"
        );
    }

    #[test]
    fn test_join_pages_all_empty_yields_empty_string() {
        let pages = vec![String::new(), "\n".to_string()];
        assert_eq!(join_pages(pages), "");
    }

    #[test]
    fn test_join_pages_trims_edge_newlines_only() {
        let pages = vec![
            "\n\nPageOne\n\n".to_string(),
            "  indented\r\n".to_string(),
            "first\n\nsecond".to_string(),
        ];
        assert_eq!(join_pages(pages), "PageOne\n  indented\nfirst\n\nsecond");
    }

    #[test]
    fn test_collect_pages_skips_failing_and_panicking_pages() {
        let pages = collect_pages(&[1, 2, 3, 4], |page_num| match page_num {
            2 => Err("bad content stream"),
            3 => panic!("MediaBox"),
            n => Ok(format!("page {n}")),
        });
        assert_eq!(pages, vec!["page 1".to_string(), "page 4".to_string()]);
    }

    #[test]
    fn test_extracts_text_from_every_page() {
        let pdf = build_pdf(&[TestPage::Text("PageOne"), TestPage::Text("PageTwo")]);
        let text = PdfTextExtractor.extract(&pdf).unwrap();
        assert_eq!(text, "PageOne\nPageTwo");
    }

    #[test]
    fn test_bad_middle_page_keeps_the_pages_after_it() {
        let pdf = build_pdf(&[
            TestPage::Text("PageOne"),
            TestPage::NoMediaBox("PageTwo"),
            TestPage::Text("PageThree"),
        ]);
        let text = PdfTextExtractor.extract(&pdf).unwrap();
        assert_eq!(text, "PageOne\nPageThree");
    }

    #[test]
    fn test_image_only_pdf_yields_empty_text() {
        let pdf = build_pdf(&[TestPage::Blank, TestPage::Blank]);
        let text = PdfTextExtractor.extract(&pdf).unwrap();
        assert_eq!(text, "");
    }

    #[test]
    fn test_blank_pages_are_skipped_between_text_pages() {
        let pdf = build_pdf(&[
            TestPage::Blank,
            TestPage::Text("Summary"),
            TestPage::Blank,
            TestPage::Text("Experience"),
        ]);
        let text = PdfTextExtractor.extract(&pdf).unwrap();
        assert_eq!(text, "Summary\nExperience");
    }

    #[test]
    fn test_non_pdf_bytes_are_unreadable() {
        let result = PdfTextExtractor.extract(b"this is plainly not a PDF");
        assert!(matches!(result, Err(PdfError::Unreadable(_))));
    }

    #[tokio::test]
    async fn test_extract_async_propagates_errors() {
        let result = PdfTextExtractor
            .extract_async(Bytes::from_static(b"%PDF-garbage"))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_extract_async_returns_page_text() {
        let pdf = build_pdf(&[TestPage::Text("Rustacean")]);
        let text = PdfTextExtractor.extract_async(Bytes::from(pdf)).await.unwrap();
        assert_eq!(text, "Rustacean");
    }
}
