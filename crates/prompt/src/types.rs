//! Prompt types for docqa.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A prompt definition, built in or loaded from a workspace YAML override.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptDefinition {
    /// One of the built-in IDs, e.g. `classify.topic`
    pub id: String,
    pub title: String,

    /// Must look like `MAJOR.MINOR`
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    #[serde(rename = "createdBy", default)]
    pub created_by: String,

    /// Handlebars template; variables depend on the prompt
    pub template: String,
}

/// Rendered prompt text plus where it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPrompt {
    pub user: String,
    pub metadata: BuiltPromptMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuiltPromptMetadata {
    pub source_prompt_id: String,
    pub resolved_variables: HashMap<String, String>,
}

impl BuiltPrompt {
    pub fn new(
        user: String,
        source_prompt_id: String,
        resolved_variables: HashMap<String, String>,
    ) -> Self {
        Self {
            user,
            metadata: BuiltPromptMetadata {
                source_prompt_id,
                resolved_variables,
            },
        }
    }
}
