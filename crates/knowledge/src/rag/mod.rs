//! Retrieval-augmented question answering.

pub mod classify;
pub mod pipeline;
pub mod router;
pub mod synthesize;
pub mod types;

pub use classify::{classify_question_type, classify_topic, Classified};
pub use pipeline::RagPipeline;
pub use router::{partition_for_filename, partition_for_topic, select_store};
pub use synthesize::{synthesize, Synthesis};
pub use types::{Answer, AnswerOutcome, AskRequest, QuestionType, DEFAULT_TOP_K, RELEVANCE_THRESHOLD};
