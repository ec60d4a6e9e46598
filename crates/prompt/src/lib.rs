//! Prompt system for docqa.
//!
//! This crate provides:
//! - Built-in classifier and answer templates
//! - YAML overrides from `.docqa/prompts/`
//! - Handlebars template rendering

pub mod builder;
pub mod builtin;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::{build_prompt, render_template};
pub use builtin::{builtin_prompt, ANSWER_PROMPT_ID, QUESTION_TYPE_PROMPT_ID, TOPIC_PROMPT_ID};
pub use loader::{load_prompt, PromptSet};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition};
