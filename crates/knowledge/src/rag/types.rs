//! RAG request and answer types.

use crate::topic::Topic;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default number of chunks retrieved per question.
pub const DEFAULT_TOP_K: usize = 3;

/// Largest cosine distance a retrieved chunk may have and still be used.
pub const RELEVANCE_THRESHOLD: f32 = 0.5;

/// Kind of answer a question calls for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionType {
    /// Specific information stated directly in a document
    Factual,
    /// Synthesis, implications or themes
    #[default]
    Interpretive,
}

impl QuestionType {
    pub const ALL: [QuestionType; 2] = [QuestionType::Factual, QuestionType::Interpretive];

    /// Parse a label case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|qt| qt.as_str().eq_ignore_ascii_case(s.trim()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Factual => "Factual",
            Self::Interpretive => "Interpretive",
        }
    }

    /// Instruction inserted at the top of the answer prompt.
    pub fn instruction_text(&self) -> &'static str {
        match self {
            Self::Factual => FACTUAL_INSTRUCTION,
            Self::Interpretive => INTERPRETIVE_INSTRUCTION,
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const FACTUAL_INSTRUCTION: &str = "Your task is to answer the question based ONLY on the provided context. Extract specific, accurate information directly from the text. If the answer is not found, clearly state that the information is unavailable. Provide a complete and well-formed answer in full sentences.";

const INTERPRETIVE_INSTRUCTION: &str = "Your task is to provide a thoughtful interpretive answer by synthesizing the information in the provided context. Draw meaningful connections, explain implications, and summarize broader themes or significance. Make your answer clear, coherent, and complete, even if the information is scattered.";

/// A user question plus optional routing hints.
#[derive(Debug, Clone, PartialEq)]
pub struct AskRequest {
    pub query: String,

    /// Restrict retrieval to a single document
    pub filename: Option<String>,

    /// Skip topic classification and filter on this topic
    pub topic: Option<Topic>,

    /// Skip question-type classification
    pub question_type: Option<QuestionType>,

    /// Number of chunks to retrieve
    pub k: usize,
}

impl AskRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            filename: None,
            topic: None,
            question_type: None,
            k: DEFAULT_TOP_K,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_topic(mut self, topic: Topic) -> Self {
        self.topic = Some(topic);
        self
    }

    pub fn with_question_type(mut self, question_type: QuestionType) -> Self {
        self.question_type = Some(question_type);
        self
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }
}

/// How a question was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOutcome {
    Answered,
    EmptyQuery,
    OutOfDomain,
    RetrievalFailed,
    NoRelevantResults,
    SynthesisFailed,
}

impl AnswerOutcome {
    /// Fixed user-facing message, `None` for `Answered`.
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Answered => None,
            Self::EmptyQuery => Some("Please enter a question.".to_string()),
            Self::OutOfDomain => Some(out_of_domain_message()),
            Self::RetrievalFailed => Some("There was an error retrieving documents.".to_string()),
            Self::NoRelevantResults => Some(
                "Sorry, I couldn't find any documents related to your question. \
                 Please try asking something else or check the document collection \
                 to see which topics are likely covered."
                    .to_string(),
            ),
            Self::SynthesisFailed => {
                Some("Sorry, I was unable to process your request.".to_string())
            }
        }
    }
}

fn out_of_domain_message() -> String {
    let covered = Topic::covered()
        .iter()
        .map(|t| format!("'{}'", t))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Your question falls under the topic category '{}', which is outside of the \
         covered document topics. Try asking a question whose topic falls under one of [{}].",
        Topic::Other,
        covered
    )
}

/// Result of `answer_question`. `result` is always set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub result: String,
    pub outcome: AnswerOutcome,

    /// Distinct source names of the chunks given to the model
    #[serde(default)]
    pub sources: Vec<String>,
}

impl Answer {
    /// Answer carrying an outcome's fixed message.
    pub fn fixed(outcome: AnswerOutcome) -> Self {
        Self {
            result: outcome.message().unwrap_or_default(),
            outcome,
            sources: Vec::new(),
        }
    }

    pub fn answered(result: String, sources: Vec<String>) -> Self {
        Self {
            result,
            outcome: AnswerOutcome::Answered,
            sources,
        }
    }
}
