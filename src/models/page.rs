// file: src/models/page.rs
// description: single pdf page with extracted text
// reference: internal data structures

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub text: String,
    /// 1-based position in the source PDF.
    pub page_number: u32,
    pub source: String,
}

impl Page {
    pub fn new(text: impl Into<String>, page_number: u32, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            page_number,
            source: source.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_creation() {
        let page = Page::new("Café menu", 3, "menu.pdf");
        assert_eq!(page.page_number, 3);
        assert_eq!(page.source, "menu.pdf");
        assert!(!page.is_blank());
        assert!(Page::new(" \n\t", 1, "menu.pdf").is_blank());
    }
}
