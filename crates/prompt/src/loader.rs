//! Prompt loader.
//!
//! A prompt is resolved from `.docqa/prompts/<id>.yml` when the workspace
//! provides one, and from the built-in set otherwise.

use crate::builtin::{
    answer_prompt, builtin_prompt, question_type_prompt, topic_prompt, ANSWER_PROMPT_ID,
    QUESTION_TYPE_PROMPT_ID, TOPIC_PROMPT_ID,
};
use crate::types::PromptDefinition;
use docqa_core::{AppError, AppResult};
use std::path::{Path, PathBuf};

/// Load a prompt definition by ID.
///
/// # Arguments
/// * `workspace_path` - Root workspace directory containing `.docqa/`
/// * `prompt_id` - Prompt identifier (e.g., "classify.topic")
///
/// # Example
/// ```no_run
/// use docqa_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), "answer")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = override_path(workspace_path, prompt_id);

    if !prompt_file.exists() {
        return builtin_prompt(prompt_id)
            .ok_or_else(|| AppError::Prompt(format!("Unknown prompt: {}", prompt_id)));
    }

    tracing::debug!("Loading prompt override from: {:?}", prompt_file);

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse prompt YAML {:?}: {}",
            prompt_file, e
        ))
    })?;

    validate_prompt(&definition, prompt_id)?;

    tracing::info!("Using prompt override: {} ({})", definition.id, definition.title);

    Ok(definition)
}

fn override_path(workspace_path: &Path, prompt_id: &str) -> PathBuf {
    workspace_path
        .join(".docqa/prompts")
        .join(format!("{}.yml", prompt_id))
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition, expected_id: &str) -> AppResult<()> {
    if def.id != expected_id {
        return Err(AppError::Prompt(format!(
            "Prompt file for '{}' declares id '{}'",
            expected_id, def.id
        )));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    // Validate API version format (simple check)
    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}

/// The three prompts the question-answering pipeline renders.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptSet {
    pub question_type: PromptDefinition,
    pub topic: PromptDefinition,
    pub answer: PromptDefinition,
}

impl PromptSet {
    /// Load every pipeline prompt, honouring workspace overrides.
    pub fn load(workspace_path: &Path) -> AppResult<Self> {
        Ok(Self {
            question_type: load_prompt(workspace_path, QUESTION_TYPE_PROMPT_ID)?,
            topic: load_prompt(workspace_path, TOPIC_PROMPT_ID)?,
            answer: load_prompt(workspace_path, ANSWER_PROMPT_ID)?,
        })
    }

    /// Built-in prompts only.
    pub fn builtin() -> Self {
        Self {
            question_type: question_type_prompt(),
            topic: topic_prompt(),
            answer: answer_prompt(),
        }
    }
}
