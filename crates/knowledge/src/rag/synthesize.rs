//! Answer synthesis over retrieved chunks.

use crate::rag::types::QuestionType;
use crate::types::ScoredChunk;
use docqa_core::AppResult;
use docqa_llm::GenerativeModel;
use docqa_prompt::{build_prompt, BuiltPrompt, PromptSet};
use std::collections::HashMap;

/// Result of the synthesis call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Synthesis {
    Answer(String),
    Failed(String),
}

/// Context block handed to the model: chunk texts separated by blank lines.
pub fn build_context(chunks: &[ScoredChunk]) -> String {
    chunks
        .iter()
        .map(|scored| scored.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render the answer prompt for a question.
pub fn build_answer_prompt(
    prompts: &PromptSet,
    question_type: Option<QuestionType>,
    chunks: &[ScoredChunk],
    query: &str,
) -> AppResult<BuiltPrompt> {
    let instruction = question_type.unwrap_or_default().instruction_text();

    let mut vars = HashMap::new();
    vars.insert("instruction".to_string(), instruction.to_string());
    vars.insert("context".to_string(), build_context(chunks));
    vars.insert("question".to_string(), query.to_string());

    build_prompt(&prompts.answer, vars)
}

/// Generate an answer from all chunks in a single model call.
pub async fn synthesize(
    model: &dyn GenerativeModel,
    prompts: &PromptSet,
    question_type: Option<QuestionType>,
    chunks: &[ScoredChunk],
    query: &str,
) -> Synthesis {
    let prompt = match build_answer_prompt(prompts, question_type, chunks, query) {
        Ok(prompt) => prompt,
        Err(e) => return Synthesis::Failed(e.to_string()),
    };

    tracing::debug!(
        "Synthesizing answer from {} chunks ({} chars of prompt)",
        chunks.len(),
        prompt.user.len()
    );

    match model.invoke(&prompt.user).await {
        Ok(answer) => Synthesis::Answer(answer.trim().to_string()),
        Err(e) => Synthesis::Failed(e.to_string()),
    }
}
