// file: src/reference.rs
// description: asks the language model whether a question targets one document reference
// reference: single-shot classification with fail-open normalisation

use crate::llm::{LanguageModel, complete};
use lazy_static::lazy_static;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Longest reply still accepted as an identifier; longer replies are prose.
const MAX_REFERENCE_CHARS: usize = 40;

const NO_REFERENCE: &str = "NONE";

lazy_static! {
    static ref LEADING_LABEL: Regex = Regex::new(
        r"(?i)^\s*(?:(?:reference(?:\s+(?:number|id))?|ref\.?)\s*[:=\-]\s*|(?:section|clause|article)\b\s*[:=\-]?\s*|§\s*)"
    ).expect("LEADING_LABEL regex is valid");

    static ref TRAILING_PUNCTUATION: Regex = Regex::new(
        r"[\s.,;:!?]+$"
    ).expect("TRAILING_PUNCTUATION regex is valid");

    static ref NONE_SENTINEL: Regex = Regex::new(
        r"(?i)^(?:none|no reference|n/?a|null)$"
    ).expect("NONE_SENTINEL regex is valid");
}

pub struct ReferenceExtractor {
    model: Arc<dyn LanguageModel>,
}

impl ReferenceExtractor {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Returns the literal reference the question asks about, if any.
    ///
    /// Never fails: model errors and unusable replies are logged and treated
    /// as "no reference" so the query can continue with similarity search.
    pub async fn extract(&self, question: &str) -> Option<String> {
        let prompt = build_prompt(question);

        let reply = match complete(self.model.as_ref(), &prompt).await {
            Ok(Some(reply)) => reply,
            Ok(None) => {
                warn!("Reference lookup returned no text, continuing without a reference");
                return None;
            }
            Err(e) => {
                warn!("Reference lookup failed, continuing without a reference: {}", e);
                return None;
            }
        };

        debug!("Reference lookup replied: {:?}", reply);

        let reference = normalize_reply(&reply);
        match &reference {
            Some(reference) => info!("Question targets reference '{}'", reference),
            None => info!("No specific reference in question"),
        }
        reference
    }
}

pub fn build_prompt(question: &str) -> String {
    format!(
        r#"You classify questions about a document.

Decide whether the question below asks about one specific reference identifier in the document, such as a section or clause number (for example 6.7, 8.21 or A.5.1).

- If it does, reply with that identifier exactly as it would appear in the document and nothing else.
- If it does not, reply with {none}.

Question:
{question}

Reply:"#,
        none = NO_REFERENCE,
        question = question.trim()
    )
}

fn is_wrapper(c: char) -> bool {
    matches!(c, '"' | '\'' | '`' | '“' | '”' | '‘' | '’' | '*' | '_') || c.is_whitespace()
}

/// Turns a raw model reply into a usable identifier or `None`.
///
/// Identifiers never contain whitespace once labels and markdown are
/// stripped; anything else is prose and means "no reference".
pub fn normalize_reply(reply: &str) -> Option<String> {
    let reply = reply.trim();
    if reply.is_empty() || reply.contains('\n') {
        return None;
    }

    let reply = reply.trim_matches(is_wrapper);
    let reply = LEADING_LABEL.replace(reply, "");
    let reply = reply.trim_matches(is_wrapper);
    let reply = TRAILING_PUNCTUATION.replace(reply, "");
    let reply = reply.trim_matches(is_wrapper);

    if reply.is_empty()
        || reply.contains(char::is_whitespace)
        || NONE_SENTINEL.is_match(reply)
        || reply.chars().count() > MAX_REFERENCE_CHARS
    {
        return None;
    }

    Some(reply.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::tests::ScriptedModel;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_plain_identifier() {
        assert_eq!(normalize_reply("6.7").as_deref(), Some("6.7"));
        assert_eq!(normalize_reply("  8.21  ").as_deref(), Some("8.21"));
    }

    #[test]
    fn test_normalize_strips_decoration() {
        assert_eq!(normalize_reply("\"6.7\"").as_deref(), Some("6.7"));
        assert_eq!(normalize_reply("`A.5.1`").as_deref(), Some("A.5.1"));
        assert_eq!(normalize_reply("6.7.").as_deref(), Some("6.7"));
        assert_eq!(normalize_reply("Reference: 6.7").as_deref(), Some("6.7"));
        assert_eq!(normalize_reply("reference number - '12.3';").as_deref(), Some("12.3"));
        assert_eq!(normalize_reply("**6.7**").as_deref(), Some("6.7"));
        assert_eq!(normalize_reply("_8.21_").as_deref(), Some("8.21"));
        assert_eq!(normalize_reply("Section 6.7").as_deref(), Some("6.7"));
        assert_eq!(normalize_reply("**Clause A.5.1.**").as_deref(), Some("A.5.1"));
        assert_eq!(normalize_reply("§ 12.3").as_deref(), Some("12.3"));
    }

    #[test]
    fn test_normalize_sentinels_mean_no_reference() {
        assert_eq!(normalize_reply("NONE"), None);
        assert_eq!(normalize_reply("none."), None);
        assert_eq!(normalize_reply("No reference"), None);
        assert_eq!(normalize_reply("N/A"), None);
        assert_eq!(normalize_reply(""), None);
    }

    #[test]
    fn test_normalize_rejects_prose() {
        assert_eq!(normalize_reply("6.7\nbecause the question mentions it"), None);
        assert_eq!(
            normalize_reply("The question seems to be about supplier security in general"),
            None
        );
        assert_eq!(normalize_reply("6.7 of the policy"), None);
        assert_eq!(normalize_reply("Section"), None);
    }

    #[test]
    fn test_prompt_carries_question() {
        let prompt = build_prompt("  what does 6.7 say?  ");
        assert!(prompt.contains("Question:\nwhat does 6.7 say?\n"));
        assert!(prompt.contains("reply with NONE"));
    }

    #[tokio::test]
    async fn test_extract_returns_reference() {
        let model = Arc::new(ScriptedModel::replying("6.7"));
        let extractor = ReferenceExtractor::new(model.clone());

        assert_eq!(extractor.extract("what does 6.7 say?").await.as_deref(), Some("6.7"));
        assert_eq!(model.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_extract_unwraps_markdown_reply() {
        let extractor = ReferenceExtractor::new(Arc::new(ScriptedModel::replying("**Section 6.7**")));
        assert_eq!(extractor.extract("what does 6.7 say?").await.as_deref(), Some("6.7"));
    }

    #[tokio::test]
    async fn test_extract_fails_open() {
        let extractor = ReferenceExtractor::new(Arc::new(ScriptedModel::failing()));
        assert_eq!(extractor.extract("what does 6.7 say?").await, None);

        let extractor = ReferenceExtractor::new(Arc::new(ScriptedModel::replying("   ")));
        assert_eq!(extractor.extract("anything").await, None);
    }
}
