//! Question-type and topic classification through the generative model.

use crate::rag::types::QuestionType;
use crate::topic::Topic;
use docqa_core::AppResult;
use docqa_llm::GenerativeModel;
use docqa_prompt::{build_prompt, PromptDefinition, PromptSet};
use std::collections::HashMap;

/// Outcome of a classification call.
///
/// `Fallback` covers backend errors, template errors and labels outside the
/// closed set. Callers pick their own default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified<T> {
    Label(T),
    Fallback(String),
}

impl<T> Classified<T> {
    pub fn label(self) -> Option<T> {
        match self {
            Self::Label(label) => Some(label),
            Self::Fallback(_) => None,
        }
    }
}

pub async fn classify_question_type(
    model: &dyn GenerativeModel,
    prompts: &PromptSet,
    query: &str,
) -> Classified<QuestionType> {
    classify(model, &prompts.question_type, query, QuestionType::parse).await
}

pub async fn classify_topic(
    model: &dyn GenerativeModel,
    prompts: &PromptSet,
    query: &str,
) -> Classified<Topic> {
    classify(model, &prompts.topic, query, Topic::parse).await
}

async fn classify<T>(
    model: &dyn GenerativeModel,
    prompt: &PromptDefinition,
    query: &str,
    parse: fn(&str) -> Option<T>,
) -> Classified<T> {
    let raw = match invoke_classifier(model, prompt, query).await {
        Ok(raw) => raw,
        Err(e) => return Classified::Fallback(e.to_string()),
    };

    match parse(normalize_label(&raw)) {
        Some(label) => Classified::Label(label),
        None => Classified::Fallback(format!("unrecognised label '{}'", raw.trim())),
    }
}

async fn invoke_classifier(
    model: &dyn GenerativeModel,
    prompt: &PromptDefinition,
    query: &str,
) -> AppResult<String> {
    let mut vars = HashMap::new();
    vars.insert("query".to_string(), query.to_string());

    let built = build_prompt(prompt, vars)?;
    model.invoke(&built.user).await
}

/// Strip whitespace, quotes, markdown emphasis and a trailing period.
fn normalize_label(raw: &str) -> &str {
    let trimmed = raw.trim_matches(|c: char| c.is_whitespace() || matches!(c, '"' | '\'' | '*' | '`'));
    let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);
    trimmed.trim_matches(|c: char| c.is_whitespace() || matches!(c, '"' | '\'' | '*' | '`'))
}
