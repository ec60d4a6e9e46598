//! Ask command handler.
//!
//! Answers one question and prints the result.

use clap::{Args, ValueEnum};
use docqa_core::{config::AppConfig, AppResult};
use docqa_knowledge::{AskRequest, QuestionType, Topic};

use super::build_pipeline;

/// Topic hint accepted on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TopicArg {
    Technology,
    People,
    Science,
    Literature,
    Other,
}

impl From<TopicArg> for Topic {
    fn from(arg: TopicArg) -> Self {
        match arg {
            TopicArg::Technology => Topic::Technology,
            TopicArg::People => Topic::People,
            TopicArg::Science => Topic::Science,
            TopicArg::Literature => Topic::Literature,
            TopicArg::Other => Topic::Other,
        }
    }
}

/// Question type hint accepted on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuestionTypeArg {
    Factual,
    Interpretive,
}

impl From<QuestionTypeArg> for QuestionType {
    fn from(arg: QuestionTypeArg) -> Self {
        match arg {
            QuestionTypeArg::Factual => QuestionType::Factual,
            QuestionTypeArg::Interpretive => QuestionType::Interpretive,
        }
    }
}

/// Ask a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub query: String,

    /// Restrict retrieval to one document (file name, e.g. data.json)
    #[arg(short, long)]
    pub file: Option<String>,

    /// Topic of the question (skips topic classification)
    #[arg(short, long, value_enum)]
    pub topic: Option<TopicArg>,

    /// Question type (skips question type classification)
    #[arg(short, long, value_enum)]
    pub question_type: Option<QuestionTypeArg>,

    /// Number of chunks to retrieve (defaults to the configured topK)
    #[arg(short)]
    pub k: Option<usize>,

    /// Rebuild both partitions before answering
    #[arg(long)]
    pub force_rebuild: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let (pipeline, _) = build_pipeline(config, self.force_rebuild).await?;

        let answer = pipeline.answer_question(self.to_request(config)).await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&answer)?);
        } else {
            println!("{}", answer.result);
            if !answer.sources.is_empty() {
                println!("\nSources: {}", answer.sources.join(", "));
            }
        }

        Ok(())
    }

    fn to_request(&self, config: &AppConfig) -> AskRequest {
        AskRequest {
            query: self.query.clone(),
            filename: self.file.clone(),
            topic: self.topic.map(Topic::from),
            question_type: self.question_type.map(QuestionType::from),
            k: self.k.unwrap_or(config.index.top_k),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        ask: AskCommand,
    }

    #[test]
    fn test_parses_all_hints() {
        let harness = Harness::parse_from([
            "docqa",
            "What is in the catalogue?",
            "--file",
            "data.json",
            "--topic",
            "literature",
            "--question-type",
            "interpretive",
            "-k",
            "2",
            "--json",
        ]);

        let ask = harness.ask;
        assert_eq!(ask.file.as_deref(), Some("data.json"));
        assert_eq!(ask.topic, Some(TopicArg::Literature));
        assert_eq!(ask.question_type, Some(QuestionTypeArg::Interpretive));
        assert_eq!(ask.k, Some(2));
        assert!(ask.json);
    }

    #[test]
    fn test_topic_arg_maps_to_topic() {
        assert_eq!(Topic::from(TopicArg::Technology), Topic::Technology);
        assert_eq!(Topic::from(TopicArg::Other), Topic::Other);
        assert_eq!(
            QuestionType::from(QuestionTypeArg::Factual),
            QuestionType::Factual
        );
    }

    #[test]
    fn test_rejects_unknown_topic() {
        assert!(Harness::try_parse_from(["docqa", "q", "--topic", "cooking"]).is_err());
    }
}
