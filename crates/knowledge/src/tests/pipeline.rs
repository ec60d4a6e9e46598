//! End-to-end behaviour of `RagPipeline::answer_question` with scripted
//! collaborators.

use super::mocks::{scored, MockModel, MockStore, MockStores, Reply};
use crate::rag::{AnswerOutcome, AskRequest, QuestionType, RagPipeline};
use crate::topic::Topic;
use crate::types::MetadataFilter;
use docqa_prompt::PromptSet;
use std::sync::Arc;

fn pipeline(model: &Arc<MockModel>, stores: &MockStores) -> RagPipeline {
    RagPipeline::new(model.clone(), stores.partitioned(), PromptSet::builtin())
}

fn empty_stores() -> MockStores {
    MockStores::new(MockStore::new("pdf", vec![]), MockStore::new("non_pdf", vec![]))
}

#[tokio::test]
async fn test_tesla_question_routes_to_people_partition() {
    let model = Arc::new(MockModel::new(
        Reply::text("Factual"),
        Reply::text("People"),
        Reply::text("Nikola Tesla was born in 1856."),
    ));
    let stores = MockStores::new(
        MockStore::new("pdf", vec![]),
        MockStore::new(
            "non_pdf",
            vec![scored(
                "Nikola Tesla was born on 10 July 1856 in Smiljan.",
                "inventors.txt",
                Topic::People,
                0.3,
            )],
        ),
    );

    let answer = pipeline(&model, &stores)
        .answer_question(AskRequest::new("What year was Nikola Tesla born?"))
        .await;

    assert_eq!(answer.outcome, AnswerOutcome::Answered);
    assert_eq!(answer.result, "Nikola Tesla was born in 1856.");
    assert_eq!(answer.sources, vec!["inventors.txt"]);

    assert_eq!(stores.pdf.calls(), 0);
    assert_eq!(stores.non_pdf.calls(), 1);
    assert_eq!(stores.non_pdf.last_filter(), Some(MetadataFilter::Topic(Topic::People)));
    assert_eq!(stores.non_pdf.last_k(), 3);

    let prompts = model.answer_prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains(QuestionType::Factual.instruction_text()));
    assert!(prompts[0].contains("Nikola Tesla was born on 10 July 1856 in Smiljan."));
}

#[tokio::test]
async fn test_filename_overrides_classified_topic() {
    let model = Arc::new(MockModel::new(
        Reply::text("Interpretive"),
        Reply::text("Technology"),
        Reply::text("Most books are contemporary fiction."),
    ));
    let stores = MockStores::new(
        MockStore::new("pdf", vec![]),
        MockStore::new(
            "non_pdf",
            vec![
                scored("Title: Gilead", "data.json", Topic::Literature, 0.2),
                scored("Title: The Road", "data.json", Topic::Literature, 0.25),
                scored("Title: Dune", "data.json", Topic::Literature, 0.3),
            ],
        ),
    );

    let request = AskRequest::new("Summarise the books in the catalogue")
        .with_filename("data.json")
        .with_k(2);
    let answer = pipeline(&model, &stores).answer_question(request).await;

    assert_eq!(answer.outcome, AnswerOutcome::Answered);
    assert_eq!(stores.pdf.calls(), 0);
    assert_eq!(
        stores.non_pdf.last_filter(),
        Some(MetadataFilter::Source("data.json".to_string()))
    );
    assert_eq!(stores.non_pdf.last_k(), 2);
    // Topic is not classified when a filename is given
    assert_eq!(model.topic_calls(), 0);

    let prompts = model.answer_prompts();
    assert!(prompts[0].contains("Title: Gilead"));
    assert!(prompts[0].contains("Title: The Road"));
    assert!(!prompts[0].contains("Title: Dune"));
}

#[tokio::test]
async fn test_explicit_filename_wins_over_explicit_topic() {
    let model = Arc::new(MockModel::new(
        Reply::text("Factual"),
        Reply::text("People"),
        Reply::text("Backpropagation computes gradients."),
    ));
    let stores = MockStores::new(
        MockStore::new(
            "pdf",
            vec![scored("Backpropagation computes gradients.", "nn.pdf", Topic::Technology, 0.1)],
        ),
        MockStore::new("non_pdf", vec![]),
    );

    let request = AskRequest::new("How are gradients computed?")
        .with_filename("nn.pdf")
        .with_topic(Topic::People);
    let answer = pipeline(&model, &stores).answer_question(request).await;

    assert_eq!(answer.outcome, AnswerOutcome::Answered);
    assert_eq!(stores.non_pdf.calls(), 0);
    assert_eq!(
        stores.pdf.last_filter(),
        Some(MetadataFilter::Source("nn.pdf".to_string()))
    );
}

#[tokio::test]
async fn test_explicit_technology_topic_searches_pdf_partition() {
    let model = Arc::new(MockModel::new(
        Reply::text("Factual"),
        Reply::text("People"),
        Reply::text("Gradient descent."),
    ));
    let stores = MockStores::new(
        MockStore::new(
            "pdf",
            vec![scored("Gradient descent minimises loss.", "ml.pdf", Topic::Technology, 0.2)],
        ),
        MockStore::new("non_pdf", vec![]),
    );

    let request = AskRequest::new("Which optimiser is common?").with_topic(Topic::Technology);
    pipeline(&model, &stores).answer_question(request).await;

    assert_eq!(model.topic_calls(), 0);
    assert_eq!(stores.pdf.calls(), 1);
    assert_eq!(stores.pdf.last_filter(), Some(MetadataFilter::Topic(Topic::Technology)));
}

#[tokio::test]
async fn test_classified_other_topic_short_circuits() {
    let model = Arc::new(MockModel::new(
        Reply::text("Factual"),
        Reply::text("Other"),
        Reply::text("unused"),
    ));
    let stores = empty_stores();

    let answer = pipeline(&model, &stores)
        .answer_question(AskRequest::new("What cheese goes with red wine?"))
        .await;

    assert_eq!(answer.outcome, AnswerOutcome::OutOfDomain);
    assert_eq!(answer.result, AnswerOutcome::OutOfDomain.message().unwrap());
    assert_eq!(stores.total_calls(), 0);
    assert_eq!(model.answer_calls(), 0);
}

#[tokio::test]
async fn test_explicit_other_topic_short_circuits() {
    let model = Arc::new(MockModel::new(
        Reply::text("Factual"),
        Reply::text("People"),
        Reply::text("unused"),
    ));
    let stores = empty_stores();

    let request = AskRequest::new("Who won the match?").with_topic(Topic::Other);
    let answer = pipeline(&model, &stores).answer_question(request).await;

    assert_eq!(answer.outcome, AnswerOutcome::OutOfDomain);
    assert_eq!(model.topic_calls(), 0);
    assert_eq!(stores.total_calls(), 0);
    assert_eq!(model.answer_calls(), 0);
}

#[tokio::test]
async fn test_distant_chunks_give_no_results_message() {
    let model = Arc::new(MockModel::new(
        Reply::text("Factual"),
        Reply::text("Science"),
        Reply::text("unused"),
    ));
    let stores = MockStores::new(
        MockStore::new("pdf", vec![]),
        MockStore::new(
            "non_pdf",
            vec![
                scored("Coral reefs bleach.", "climate.html", Topic::Science, 0.6),
                scored("Ice sheets melt.", "climate.html", Topic::Science, 0.9),
            ],
        ),
    );

    let answer = pipeline(&model, &stores)
        .answer_question(AskRequest::new("What causes volcanic eruptions?"))
        .await;

    assert_eq!(answer.outcome, AnswerOutcome::NoRelevantResults);
    assert_eq!(
        answer.result,
        "Sorry, I couldn't find any documents related to your question. Please try asking something else or check the document collection to see which topics are likely covered."
    );
    assert!(answer.sources.is_empty());
    assert_eq!(model.answer_calls(), 0);
}

#[tokio::test]
async fn test_threshold_boundary() {
    let model = Arc::new(MockModel::new(
        Reply::text("Factual"),
        Reply::text("Science"),
        Reply::text("Warming bleaches coral."),
    ));
    let stores = MockStores::new(
        MockStore::new("pdf", vec![]),
        MockStore::new(
            "non_pdf",
            vec![
                scored("On the boundary.", "edge.html", Topic::Science, 0.5),
                scored("Just past it.", "past.html", Topic::Science, 0.500001),
            ],
        ),
    );

    let answer = pipeline(&model, &stores)
        .answer_question(AskRequest::new("Why does coral bleach?"))
        .await;

    assert_eq!(answer.outcome, AnswerOutcome::Answered);
    assert_eq!(answer.sources, vec!["edge.html"]);

    let prompt = &model.answer_prompts()[0];
    assert!(prompt.contains("On the boundary."));
    assert!(!prompt.contains("Just past it."));
}

#[tokio::test]
async fn test_classifier_failure_falls_back() {
    let model = Arc::new(MockModel::new(
        Reply::fail("timeout"),
        Reply::text("Cooking"),
        Reply::text("An answer."),
    ));
    let stores = MockStores::new(
        MockStore::new("pdf", vec![]),
        MockStore::new(
            "non_pdf",
            vec![scored("Some passage.", "bios.txt", Topic::People, 0.1)],
        ),
    );

    let answer = pipeline(&model, &stores)
        .answer_question(AskRequest::new("Tell me about the collection"))
        .await;

    assert_eq!(answer.outcome, AnswerOutcome::Answered);
    // Unrecognised topic label: default partition, no filter
    assert_eq!(stores.non_pdf.calls(), 1);
    assert_eq!(stores.non_pdf.last_filter(), None);
    assert_eq!(stores.pdf.calls(), 0);
    // Failed question type: interpretive instruction
    let prompt = &model.answer_prompts()[0];
    assert!(prompt.contains(QuestionType::Interpretive.instruction_text()));
}

#[tokio::test]
async fn test_topic_classifier_error_searches_unfiltered() {
    let model = Arc::new(MockModel::new(
        Reply::text("Factual"),
        Reply::fail("connection refused"),
        Reply::text("1856."),
    ));
    let stores = MockStores::new(
        MockStore::new("pdf", vec![]),
        MockStore::new(
            "non_pdf",
            vec![scored("Tesla was born in 1856.", "inventors.txt", Topic::People, 0.2)],
        ),
    );

    let answer = pipeline(&model, &stores)
        .answer_question(AskRequest::new("When was Tesla born?"))
        .await;

    assert_eq!(answer.outcome, AnswerOutcome::Answered);
    assert_eq!(model.topic_calls(), 1);
    assert_eq!(stores.pdf.calls(), 0);
    assert_eq!(stores.non_pdf.calls(), 1);
    assert_eq!(stores.non_pdf.last_filter(), None);
    assert!(model.answer_prompts()[0].contains(QuestionType::Factual.instruction_text()));
}

#[tokio::test]
async fn test_classifier_output_is_normalised() {
    let model = Arc::new(MockModel::new(
        Reply::text(" **factual**.\n"),
        Reply::text("\"Literature\""),
        Reply::text("Dune."),
    ));
    let stores = MockStores::new(
        MockStore::new("pdf", vec![]),
        MockStore::new(
            "non_pdf",
            vec![scored("Title: Dune", "data.json", Topic::Literature, 0.2)],
        ),
    );

    pipeline(&model, &stores)
        .answer_question(AskRequest::new("Which book features sandworms?"))
        .await;

    assert_eq!(
        stores.non_pdf.last_filter(),
        Some(MetadataFilter::Topic(Topic::Literature))
    );
    assert!(model.answer_prompts()[0].contains(QuestionType::Factual.instruction_text()));
}

#[tokio::test]
async fn test_empty_query_invokes_nothing() {
    let model = Arc::new(MockModel::new(
        Reply::text("Factual"),
        Reply::text("People"),
        Reply::text("unused"),
    ));
    let stores = empty_stores();

    for query in ["", "   ", "\n\t"] {
        let answer = pipeline(&model, &stores)
            .answer_question(AskRequest::new(query))
            .await;
        assert_eq!(answer.outcome, AnswerOutcome::EmptyQuery);
        assert_eq!(answer.result, "Please enter a question.");
    }

    assert_eq!(model.question_type_calls(), 0);
    assert_eq!(model.topic_calls(), 0);
    assert_eq!(stores.total_calls(), 0);
}

#[tokio::test]
async fn test_retrieval_error_gives_fixed_message() {
    let model = Arc::new(MockModel::new(
        Reply::text("Factual"),
        Reply::text("People"),
        Reply::text("unused"),
    ));
    let stores = MockStores::new(MockStore::new("pdf", vec![]), MockStore::failing("non_pdf"));

    let answer = pipeline(&model, &stores)
        .answer_question(AskRequest::new("Who invented the telephone?"))
        .await;

    assert_eq!(answer.outcome, AnswerOutcome::RetrievalFailed);
    assert_eq!(answer.result, "There was an error retrieving documents.");
    assert_eq!(model.answer_calls(), 0);
}

#[tokio::test]
async fn test_synthesis_error_gives_fixed_message() {
    let model = Arc::new(MockModel::new(
        Reply::text("Factual"),
        Reply::text("People"),
        Reply::fail("connection refused"),
    ));
    let stores = MockStores::new(
        MockStore::new("pdf", vec![]),
        MockStore::new(
            "non_pdf",
            vec![scored("Ada Lovelace wrote notes.", "bios.txt", Topic::People, 0.2)],
        ),
    );

    let answer = pipeline(&model, &stores)
        .answer_question(AskRequest::new("Who was Ada Lovelace?"))
        .await;

    assert_eq!(answer.outcome, AnswerOutcome::SynthesisFailed);
    assert_eq!(answer.result, "Sorry, I was unable to process your request.");
    assert!(answer.sources.is_empty());
}

#[tokio::test]
async fn test_backend_down_everywhere() {
    let model = Arc::new(MockModel::failing());
    let stores = MockStores::new(
        MockStore::new("pdf", vec![]),
        MockStore::new(
            "non_pdf",
            vec![scored("Some passage.", "bios.txt", Topic::People, 0.1)],
        ),
    );

    let answer = pipeline(&model, &stores)
        .answer_question(AskRequest::new("Anything?"))
        .await;

    assert_eq!(answer.outcome, AnswerOutcome::SynthesisFailed);
    assert_eq!(stores.non_pdf.last_filter(), None);
}

#[tokio::test]
async fn test_identical_requests_give_identical_answers() {
    let model = Arc::new(MockModel::new(
        Reply::text("Interpretive"),
        Reply::text("People"),
        Reply::text("Tesla shaped modern power systems."),
    ));
    let stores = MockStores::new(
        MockStore::new("pdf", vec![]),
        MockStore::new(
            "non_pdf",
            vec![
                scored("Tesla developed AC motors.", "inventors.txt", Topic::People, 0.2),
                scored("Edison promoted DC.", "rivals.txt", Topic::People, 0.4),
            ],
        ),
    );
    let pipeline = pipeline(&model, &stores);

    let first = pipeline
        .answer_question(AskRequest::new("Why does Tesla matter?"))
        .await;
    let second = pipeline
        .answer_question(AskRequest::new("Why does Tesla matter?"))
        .await;

    assert_eq!(first, second);
    assert_eq!(first.sources, vec!["inventors.txt", "rivals.txt"]);
    let prompts = model.answer_prompts();
    assert_eq!(prompts[0], prompts[1]);
}

#[tokio::test]
async fn test_explicit_question_type_skips_classifier() {
    let model = Arc::new(MockModel::new(
        Reply::text("Factual"),
        Reply::text("People"),
        Reply::text("A summary."),
    ));
    let stores = MockStores::new(
        MockStore::new("pdf", vec![]),
        MockStore::new(
            "non_pdf",
            vec![scored("Passage.", "bios.txt", Topic::People, 0.1)],
        ),
    );

    let request = AskRequest::new("Summarise Tesla's life")
        .with_question_type(QuestionType::Interpretive);
    pipeline(&model, &stores).answer_question(request).await;

    assert_eq!(model.question_type_calls(), 0);
    assert!(model.answer_prompts()[0].contains(QuestionType::Interpretive.instruction_text()));
}
