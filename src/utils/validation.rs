// file: src/utils/validation.rs
// description: data validation utilities and helpers
// reference: input validation patterns

use crate::error::{PipelineError, Result};
use std::fs;
use std::path::Path;

pub struct Validator;

impl Validator {
    pub fn validate_file_path(path: &Path) -> Result<()> {
        let canonical = fs::canonicalize(path)?;

        if !canonical.is_file() {
            return Err(PipelineError::Validation(format!(
                "Path is not a file: {}",
                canonical.display()
            )));
        }

        Ok(())
    }

    pub fn validate_pdf_extension(path: &Path) -> Result<()> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => Ok(()),
            _ => Err(PipelineError::Validation(format!(
                "File is not a PDF: {}",
                path.display()
            ))),
        }
    }

    pub fn validate_pdf_path(path: &Path) -> Result<()> {
        Self::validate_pdf_extension(path)?;
        Self::validate_file_path(path)
    }

    pub fn validate_question(question: &str) -> Result<()> {
        if question.trim().is_empty() {
            return Err(PipelineError::Validation("Question is empty".to_string()));
        }
        Ok(())
    }

    pub fn validate_url(url: &str) -> Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(PipelineError::Validation(format!(
                "Invalid URL format: {}",
                url
            )));
        }
        Ok(())
    }

    /// Truncates on character boundaries so multi-byte text never panics.
    pub fn truncate_text(text: &str, max_length: usize) -> String {
        if text.chars().count() <= max_length {
            text.to_string()
        } else {
            let truncated: String = text.chars().take(max_length).collect();
            format!("{}...", truncated)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_validate_file_path() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("test.pdf");
        fs::write(&file_path, "test").unwrap();

        assert!(Validator::validate_file_path(&file_path).is_ok());
        assert!(matches!(
            Validator::validate_file_path(&temp.path().join("absent.pdf")),
            Err(PipelineError::Io(_))
        ));
        assert!(matches!(
            Validator::validate_file_path(temp.path()),
            Err(PipelineError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_pdf_extension() {
        assert!(Validator::validate_pdf_extension(Path::new("report.pdf")).is_ok());
        assert!(Validator::validate_pdf_extension(Path::new("REPORT.PDF")).is_ok());
        assert!(Validator::validate_pdf_extension(Path::new("report.txt")).is_err());
        assert!(Validator::validate_pdf_extension(Path::new("report")).is_err());
    }

    #[test]
    fn test_validate_question() {
        assert!(Validator::validate_question("what does 6.7 say?").is_ok());
        assert!(Validator::validate_question("").is_err());
        assert!(Validator::validate_question("   ").is_err());
    }

    #[test]
    fn test_validate_url() {
        assert!(Validator::validate_url("https://api.groq.com/openai/v1").is_ok());
        assert!(Validator::validate_url("http://localhost:8080").is_ok());
        assert!(Validator::validate_url("api.groq.com").is_err());
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(Validator::truncate_text("short", 10), "short");
        assert_eq!(
            Validator::truncate_text("this is a very long text", 10),
            "this is a ..."
        );
        assert_eq!(Validator::truncate_text("ééééé", 2), "éé...");
    }
}
