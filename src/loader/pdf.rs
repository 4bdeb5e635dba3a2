// file: src/loader/pdf.rs
// description: PDF loader producing one page record per PDF page
// reference: https://docs.rs/lopdf

use crate::error::{PipelineError, Result};
use crate::models::Page;
use crate::utils::Validator;
use lopdf::Document;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub struct PdfLoader;

impl PdfLoader {
    pub fn new() -> Self {
        Self
    }

    /// Reads every page of the PDF at `path`, in document order.
    ///
    /// Page numbers are 1-based and contiguous. A page whose text cannot be
    /// extracted is kept with empty text so later pages keep their numbers.
    pub fn load(&self, path: &Path) -> Result<Vec<Page>> {
        Validator::validate_pdf_path(path).map_err(|e| PipelineError::Load {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let document = Document::load(path).map_err(|e| PipelineError::Load {
            path: path.to_path_buf(),
            message: format!("not a readable PDF: {}", e),
        })?;

        let source = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
        let mut pages = Vec::with_capacity(page_numbers.len());

        for (index, pdf_page_number) in page_numbers.iter().enumerate() {
            let text = match document.extract_text(&[*pdf_page_number]) {
                Ok(text) => text,
                Err(e) => {
                    warn!(
                        "Could not extract text from page {} of {}: {}",
                        index + 1,
                        source,
                        e
                    );
                    String::new()
                }
            };

            debug!("Page {} has {} chars", index + 1, text.chars().count());
            pages.push(Page::new(text, (index + 1) as u32, source.clone()));
        }

        info!("Loaded {} pages from {}", pages.len(), path.display());
        Ok(pages)
    }
}
