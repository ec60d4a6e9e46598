//! Prompt builder for rendering templates.

use crate::types::{BuiltPrompt, PromptDefinition};
use docqa_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Build a prompt from a definition and input variables.
///
/// # Example
/// ```no_run
/// use docqa_prompt::{build_prompt, PromptSet};
/// use std::collections::HashMap;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompts = PromptSet::builtin();
/// let mut vars = HashMap::new();
/// vars.insert("query".to_string(), "Who was Ada Lovelace?".to_string());
///
/// let built = build_prompt(&prompts.topic, vars)?;
/// println!("{}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let rendered = render_template(&definition.template, &variables)?;

    Ok(BuiltPrompt::new(rendered, definition.id.clone(), variables))
}

/// Render a Handlebars template with variables.
pub fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Disable HTML escaping for plain text
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    let rendered = handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::PromptSet;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_simple_template() {
        let result = render_template("Question: {{query}}", &vars(&[("query", "Hello")]));
        assert_eq!(result.unwrap(), "Question: Hello");
    }

    #[test]
    fn test_render_does_not_escape_html() {
        let result = render_template("{{context}}", &vars(&[("context", "<b>R&D</b> \"quoted\"")]));
        assert_eq!(result.unwrap(), "<b>R&D</b> \"quoted\"");
    }

    #[test]
    fn test_render_template_missing_variable() {
        // Handlebars renders missing variables as empty string
        let result = render_template("Question: {{missing}}", &HashMap::new());
        assert_eq!(result.unwrap(), "Question: ");
    }

    #[test]
    fn test_render_rejects_broken_template() {
        let result = render_template("{{#if query}}unterminated", &HashMap::new());
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }

    #[test]
    fn test_build_topic_prompt() {
        let prompts = PromptSet::builtin();
        let built = build_prompt(
            &prompts.topic,
            vars(&[("query", "What year was Nikola Tesla born?")]),
        )
        .unwrap();

        assert!(built
            .user
            .ends_with("Question: What year was Nikola Tesla born?\nTopic:"));
        assert_eq!(built.metadata.source_prompt_id, "classify.topic");
    }

    #[test]
    fn test_build_answer_prompt() {
        let prompts = PromptSet::builtin();
        let built = build_prompt(
            &prompts.answer,
            vars(&[
                ("instruction", "Be precise."),
                ("context", "Tesla was born in 1856."),
                ("question", "When was Tesla born?"),
            ]),
        )
        .unwrap();

        assert!(built.user.starts_with("You are an intelligent document assistant.\nBe precise."));
        assert!(built.user.contains("Context:\nTesla was born in 1856."));
        assert!(built.user.contains("Question:\nWhen was Tesla born?"));
        assert!(built.user.ends_with("Answer:"));
    }
}
