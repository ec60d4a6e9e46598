//! Question answering orchestration.
//!
//! Classify, route, retrieve, filter by relevance, synthesize. Every failure
//! past the empty-query check resolves to a fixed user-facing message, so
//! `answer_question` has no error path.

use crate::rag::classify::{classify_question_type, classify_topic, Classified};
use crate::rag::router::select_store;
use crate::rag::synthesize::{synthesize, Synthesis};
use crate::rag::types::{Answer, AnswerOutcome, AskRequest, QuestionType, RELEVANCE_THRESHOLD};
use crate::store::PartitionedStores;
use crate::topic::Topic;
use crate::types::ScoredChunk;
use docqa_llm::GenerativeModel;
use docqa_prompt::PromptSet;
use std::sync::Arc;

/// Answers questions against the two partition stores.
#[derive(Clone)]
pub struct RagPipeline {
    model: Arc<dyn GenerativeModel>,
    stores: PartitionedStores,
    prompts: PromptSet,
}

impl RagPipeline {
    pub fn new(model: Arc<dyn GenerativeModel>, stores: PartitionedStores, prompts: PromptSet) -> Self {
        Self {
            model,
            stores,
            prompts,
        }
    }

    pub fn stores(&self) -> &PartitionedStores {
        &self.stores
    }

    pub async fn answer_question(&self, request: AskRequest) -> Answer {
        let query = request.query.trim();
        if query.is_empty() {
            return Answer::fixed(AnswerOutcome::EmptyQuery);
        }

        tracing::info!("Answering question: {}", query);

        let question_type = match request.question_type {
            Some(question_type) => question_type,
            None => match classify_question_type(self.model.as_ref(), &self.prompts, query).await {
                Classified::Label(question_type) => question_type,
                Classified::Fallback(reason) => {
                    tracing::warn!(
                        "Question type classification failed ({}), using {}",
                        reason,
                        QuestionType::default()
                    );
                    QuestionType::default()
                }
            },
        };

        let topic = match (&request.filename, request.topic) {
            (_, Some(topic)) => Some(topic),
            (Some(_), None) => None,
            (None, None) => match classify_topic(self.model.as_ref(), &self.prompts, query).await {
                Classified::Label(topic) => Some(topic),
                Classified::Fallback(reason) => {
                    tracing::warn!("Topic classification failed ({}), searching without a topic filter", reason);
                    None
                }
            },
        };

        tracing::info!(
            question_type = %question_type,
            topic = topic.map(|t| t.as_str()).unwrap_or("none"),
            "Detected question labels"
        );

        if topic == Some(Topic::Other) {
            tracing::info!("Question is outside the covered topics");
            return Answer::fixed(AnswerOutcome::OutOfDomain);
        }

        let (store, filter) = select_store(request.filename.as_deref(), topic, &self.stores);

        let filter_desc = filter
            .as_ref()
            .map(|f| f.to_string())
            .unwrap_or_else(|| "none".to_string());
        tracing::info!(store = store.name(), filter = %filter_desc, "Routing retrieval");

        let results = match store
            .similarity_search_with_score(query, request.k, filter.as_ref())
            .await
        {
            Ok(results) => results,
            Err(e) => {
                tracing::error!("Retrieval failed: {}", e);
                return Answer::fixed(AnswerOutcome::RetrievalFailed);
            }
        };

        let retrieved = results.len();
        let relevant = relevant_chunks(results);

        tracing::info!(
            "Retrieved {} chunks, {} within distance {}",
            retrieved,
            relevant.len(),
            RELEVANCE_THRESHOLD
        );

        if relevant.is_empty() {
            return Answer::fixed(AnswerOutcome::NoRelevantResults);
        }

        match synthesize(
            self.model.as_ref(),
            &self.prompts,
            Some(question_type),
            &relevant,
            query,
        )
        .await
        {
            Synthesis::Answer(text) => Answer::answered(text, distinct_sources(&relevant)),
            Synthesis::Failed(reason) => {
                tracing::error!("Answer synthesis failed: {}", reason);
                Answer::fixed(AnswerOutcome::SynthesisFailed)
            }
        }
    }
}

/// Chunks with distance at or below the relevance threshold.
pub fn relevant_chunks(results: Vec<ScoredChunk>) -> Vec<ScoredChunk> {
    results
        .into_iter()
        .filter(|scored| scored.distance <= RELEVANCE_THRESHOLD)
        .collect()
}

/// Source names in first-seen order.
fn distinct_sources(chunks: &[ScoredChunk]) -> Vec<String> {
    let mut sources: Vec<String> = Vec::new();
    for scored in chunks {
        let source = &scored.chunk.metadata.source;
        if !sources.contains(source) {
            sources.push(source.clone());
        }
    }
    sources
}
