// file: src/generator.rs
// description: builds the cited context block and prompt, then asks the model once
// reference: context-only answering with page citations

use crate::error::{PipelineError, Result};
use crate::llm::{LanguageModel, complete};
use crate::models::{Answer, Chunk};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const NOT_FOUND_ANSWER: &str = "Information not found in the document.";
pub const NO_RESPONSE_ANSWER: &str = "No response generated";

const EMPTY_CONTEXT_NOTE: &str = "(No context was retrieved from the document for this question.)";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PromptOptions {
    /// Every bullet point must carry `[Source: <file>, Page: <page>]`.
    pub strict_citations: bool,
}

pub struct AnswerGenerator {
    model: Arc<dyn LanguageModel>,
}

impl AnswerGenerator {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Answers `question` from `chunks` with exactly one model call.
    ///
    /// An empty chunk list still produces a prompt; the model is told nothing
    /// was retrieved and is expected to say so.
    pub async fn generate(
        &self,
        question: &str,
        chunks: &[&Chunk],
        options: PromptOptions,
    ) -> Result<Answer> {
        let context = build_context(chunks);
        let prompt = build_prompt(question, &context, options);

        debug!(
            "Generating answer with {} from {} chunks ({} prompt chars)",
            self.model.model_id(),
            chunks.len(),
            prompt.chars().count()
        );

        let text = complete(self.model.as_ref(), &prompt)
            .await
            .map_err(PipelineError::Generation)?;

        match text {
            Some(text) => {
                info!("Answer generated by {}", self.model.model_id());
                Ok(Answer::new(text))
            }
            None => {
                warn!(
                    "{} returned no text in any known response shape",
                    self.model.model_id()
                );
                Ok(Answer::new(NO_RESPONSE_ANSWER))
            }
        }
    }
}

/// One header per chunk, numbered in retrieval order, separated by blank lines.
pub fn build_context(chunks: &[&Chunk]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(idx, chunk)| {
            format!(
                "CHUNK {} (Source: {}, Page: {})\n{}",
                idx + 1,
                chunk.source,
                chunk.page_number,
                chunk.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn build_prompt(question: &str, context: &str, options: PromptOptions) -> String {
    let citation_rule = if options.strict_citations {
        "- Every bullet point MUST end with its citation in the form [Source: <file>, Page: <page>]"
    } else {
        "- Cite the page numbers you used in the form (Source: <file>, Page: <page>)"
    };

    let context = if context.trim().is_empty() {
        EMPTY_CONTEXT_NOTE
    } else {
        context
    };

    format!(
        r#"You are a helpful document assistant. Use ONLY the provided context to answer the question.

Instructions:
- Provide detailed answers from the context
- Look for section numbers (6.7, 8.21, etc.) and their full descriptions
- If information spans multiple chunks, synthesize them
{citation_rule}
- If the answer is not in the context, say "{not_found}"
- Guidelines for a reference number usually span the paragraphs right after (or just before) that number; answer with that whole paragraph

Context:
{context}

Question:
{question}

Answer:"#,
        citation_rule = citation_rule,
        not_found = NOT_FOUND_ANSWER,
        context = context,
        question = question.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;
    use crate::llm::tests::ScriptedModel;
    use pretty_assertions::assert_eq;

    fn chunks() -> Vec<Chunk> {
        vec![
            Chunk::new("6.7 Supplier Security\nVendors are assessed.", 2, 5, "policy.pdf"),
            Chunk::new("Assessments repeat yearly.", 3, 9, "policy.pdf"),
        ]
    }

    #[test]
    fn test_context_headers_follow_retrieval_order() {
        let chunks = chunks();
        let refs: Vec<&Chunk> = chunks.iter().rev().collect();

        let context = build_context(&refs);

        assert_eq!(
            context,
            "CHUNK 1 (Source: policy.pdf, Page: 3)\nAssessments repeat yearly.\n\n\
             CHUNK 2 (Source: policy.pdf, Page: 2)\n6.7 Supplier Security\nVendors are assessed."
        );
    }

    #[test]
    fn test_prompt_variants() {
        let standard = build_prompt(
            "What is 6.7?",
            "CHUNK 1 (Source: a.pdf, Page: 1)\nx",
            PromptOptions::default(),
        );
        assert!(standard.contains("Use ONLY the provided context"));
        assert!(standard.contains(NOT_FOUND_ANSWER));
        assert!(!standard.contains("MUST end with its citation"));

        let strict = build_prompt(
            "What is 6.7?",
            "CHUNK 1 (Source: a.pdf, Page: 1)\nx",
            PromptOptions {
                strict_citations: true,
            },
        );
        assert!(strict.contains("[Source: <file>, Page: <page>]"));
    }

    #[test]
    fn test_empty_context_is_stated() {
        let prompt = build_prompt("What is 9.9?", "", PromptOptions::default());
        assert!(prompt.contains(EMPTY_CONTEXT_NOTE));
    }

    #[tokio::test]
    async fn test_generate_calls_model_once() {
        let model = Arc::new(ScriptedModel::replying("6.7 requires vendor assessments (Page: 2)"));
        let generator = AnswerGenerator::new(model.clone());
        let chunks = chunks();
        let refs: Vec<&Chunk> = chunks.iter().collect();

        let answer = generator
            .generate("What is 6.7?", &refs, PromptOptions::default())
            .await
            .unwrap();

        assert_eq!(answer.text, "6.7 requires vendor assessments (Page: 2)");
        let prompts = model.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("CHUNK 1 (Source: policy.pdf, Page: 2)"));
    }

    #[tokio::test]
    async fn test_generate_without_chunks_still_answers() {
        let model = Arc::new(ScriptedModel::replying(NOT_FOUND_ANSWER));
        let generator = AnswerGenerator::new(model.clone());

        let answer = generator
            .generate("What is 9.9?", &[], PromptOptions::default())
            .await
            .unwrap();

        assert_eq!(answer.text, NOT_FOUND_ANSWER);
        assert_eq!(model.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_response_falls_back() {
        let generator = AnswerGenerator::new(Arc::new(ScriptedModel::replying("")));
        let answer = generator
            .generate("What is 6.7?", &[], PromptOptions::default())
            .await
            .unwrap();
        assert_eq!(answer.text, NO_RESPONSE_ANSWER);
    }

    #[tokio::test]
    async fn test_model_failure_is_generation_error() {
        let model = Arc::new(ScriptedModel::new(|_| {
            Err(BackendError::Status {
                service: "scripted".to_string(),
                status: 500,
                body: "internal".to_string(),
            })
        }));
        let generator = AnswerGenerator::new(model.clone());

        let err = generator
            .generate("What is 6.7?", &[], PromptOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Generation(_)));
        assert_eq!(model.prompts().len(), 1);
    }
}
