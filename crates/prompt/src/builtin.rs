//! Built-in prompt definitions.
//!
//! The classifier templates constrain the model to a closed label set with a
//! handful of few-shot examples. The answer template receives the
//! question-type instruction, the retrieved context and the question.

use crate::types::PromptDefinition;

/// Question-type classifier (`Factual` / `Interpretive`).
pub const QUESTION_TYPE_PROMPT_ID: &str = "classify.question_type";

/// Topic classifier (`Technology` / `People` / `Science` / `Literature` / `Other`).
pub const TOPIC_PROMPT_ID: &str = "classify.topic";

/// Answer synthesis over retrieved context.
pub const ANSWER_PROMPT_ID: &str = "answer";

const API_VERSION: &str = "1.0";

const QUESTION_TYPE_TEMPLATE: &str = r#"You are a classifier that determines whether a user question is Factual or Interpretive.

- A *Factual* question asks for specific information found directly in a document (e.g., names, dates, techniques, facts).
- An *Interpretive* question asks for broader meaning, implications, or synthesis (e.g., summaries, themes, significance).

Respond with only the single word: Factual or Interpretive.

Examples:

Question: What year was Nikola Tesla born?
Classification: Factual

Question: What is this paper mainly about?
Classification: Interpretive

Question: Who are the key figures mentioned in this research?
Classification: Factual

Question: How does this paper relate to broader trends in machine learning?
Classification: Interpretive

Now classify the following question:
Question: {{query}}
Classification:"#;

const TOPIC_TEMPLATE: &str = r#"You are a classifier that assigns a topic label to a question.
Choose the single most relevant topic from this exact list:

- Technology
- People
- Science
- Literature
- Other

Respond with ONLY the topic name (one of the above) and nothing else.

Examples:

Question: What are common techniques used in machine learning?
Topic: Technology

Question: What was Alan Turing's contribution to computer science?
Topic: People

Question: What are some of the impacts of climate change?
Topic: Science

Question: What are some popular books published after 2000?
Topic: Literature

Question: What is a good cheese to pair with red wine?
Topic: Other

Now classify this question:
Question: {{query}}
Topic:"#;

const ANSWER_TEMPLATE: &str = r#"You are an intelligent document assistant.
{{instruction}}

Context:
{{context}}

Question:
{{question}}

Answer in complete sentences, using ONLY the information given in the context.
If the context does not contain the answer, say so clearly.

Answer:"#;

/// Look up a built-in prompt by ID.
pub fn builtin_prompt(id: &str) -> Option<PromptDefinition> {
    match id {
        QUESTION_TYPE_PROMPT_ID => Some(question_type_prompt()),
        TOPIC_PROMPT_ID => Some(topic_prompt()),
        ANSWER_PROMPT_ID => Some(answer_prompt()),
        _ => None,
    }
}

pub fn question_type_prompt() -> PromptDefinition {
    definition(QUESTION_TYPE_PROMPT_ID, "Question type classifier", QUESTION_TYPE_TEMPLATE)
}

pub fn topic_prompt() -> PromptDefinition {
    definition(TOPIC_PROMPT_ID, "Topic classifier", TOPIC_TEMPLATE)
}

pub fn answer_prompt() -> PromptDefinition {
    definition(ANSWER_PROMPT_ID, "Document answer", ANSWER_TEMPLATE)
}

fn definition(id: &str, title: &str, template: &str) -> PromptDefinition {
    PromptDefinition {
        id: id.to_string(),
        title: title.to_string(),
        api_version: API_VERSION.to_string(),
        created_by: "docqa".to_string(),
        template: template.to_string(),
    }
}

/// IDs of every built-in prompt.
pub fn builtin_ids() -> [&'static str; 3] {
    [QUESTION_TYPE_PROMPT_ID, TOPIC_PROMPT_ID, ANSWER_PROMPT_ID]
}
