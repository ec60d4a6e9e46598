//! Chat command handler.
//!
//! Interactive loop: each turn reads a question plus optional hints, where a
//! blank hint lets the pipeline infer it.

use clap::Args;
use docqa_core::{config::AppConfig, AppResult};
use docqa_knowledge::{AskRequest, QuestionType, Topic};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use super::build_pipeline;

/// Interactive question loop
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Rebuild both partitions before the first question
    #[arg(long)]
    pub force_rebuild: bool,
}

/// One turn's input after parsing.
#[derive(Debug, PartialEq)]
enum Turn {
    Exit,
    Ask(AskRequest),
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let (pipeline, report) = build_pipeline(config, self.force_rebuild).await?;
        tracing::info!(
            "Index ready: {} pdf chunks, {} non-pdf chunks",
            report.pdf_chunks,
            report.non_pdf_chunks
        );

        println!("Ask questions about your documents. Type 'exit' or 'quit' to leave.");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let turn = match read_turn(&mut lines, config.index.top_k).await? {
                Some(turn) => turn,
                None => break,
            };

            match turn {
                Turn::Exit => break,
                Turn::Ask(request) => {
                    let answer = pipeline.answer_question(request).await;
                    println!("\n{}\n", answer.result);
                }
            }
        }

        println!("Goodbye.");
        Ok(())
    }
}

/// Read one turn; `None` at end of input.
async fn read_turn(lines: &mut Lines<BufReader<Stdin>>, k: usize) -> AppResult<Option<Turn>> {
    let Some(query) = prompt_line(lines, "Question: ").await? else {
        return Ok(None);
    };
    if is_exit(&query) {
        return Ok(Some(Turn::Exit));
    }

    let Some(filename) = prompt_line(lines, "File name (blank to search all): ").await? else {
        return Ok(None);
    };
    let Some(topic) = prompt_line(lines, "Topic (blank to infer): ").await? else {
        return Ok(None);
    };
    let Some(question_type) =
        prompt_line(lines, "Question type, Factual or Interpretive (blank to infer): ").await?
    else {
        return Ok(None);
    };

    Ok(Some(Turn::Ask(build_request(
        &query,
        &filename,
        &topic,
        &question_type,
        k,
    ))))
}

async fn prompt_line(lines: &mut Lines<BufReader<Stdin>>, label: &str) -> AppResult<Option<String>> {
    print!("{}", label);
    std::io::stdout().flush()?;
    Ok(lines.next_line().await?)
}

fn is_exit(input: &str) -> bool {
    matches!(input.trim().to_ascii_lowercase().as_str(), "exit" | "quit")
}

/// Turn raw answers to the chat prompts into a request.
///
/// Unrecognised topic or question type labels are treated as blank.
fn build_request(query: &str, filename: &str, topic: &str, question_type: &str, k: usize) -> AskRequest {
    let filename = filename.trim();
    let topic = topic.trim();
    let question_type = question_type.trim();

    let topic = if topic.is_empty() {
        None
    } else {
        let parsed = Topic::parse(topic);
        if parsed.is_none() {
            tracing::warn!("Unknown topic '{}', inferring instead", topic);
        }
        parsed
    };

    let question_type = if question_type.is_empty() {
        None
    } else {
        let parsed = QuestionType::parse(question_type);
        if parsed.is_none() {
            tracing::warn!("Unknown question type '{}', inferring instead", question_type);
        }
        parsed
    };

    AskRequest {
        query: query.to_string(),
        filename: (!filename.is_empty()).then(|| filename.to_string()),
        topic,
        question_type,
        k,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_words() {
        assert!(is_exit("exit"));
        assert!(is_exit("  QUIT "));
        assert!(!is_exit("exit now"));
    }

    #[test]
    fn test_blank_hints_are_inferred() {
        let request = build_request("Who was Tesla?", "  ", "", "\t", 3);
        assert_eq!(request, AskRequest::new("Who was Tesla?"));
    }

    #[test]
    fn test_hints_are_parsed() {
        let request = build_request("Summarise", "data.json", "literature", "Interpretive", 2);
        assert_eq!(request.filename.as_deref(), Some("data.json"));
        assert_eq!(request.topic, Some(Topic::Literature));
        assert_eq!(request.question_type, Some(QuestionType::Interpretive));
        assert_eq!(request.k, 2);
    }

    #[test]
    fn test_unknown_labels_are_dropped() {
        let request = build_request("Anything", "", "cooking", "rhetorical", 3);
        assert_eq!(request.topic, None);
        assert_eq!(request.question_type, None);
    }
}
