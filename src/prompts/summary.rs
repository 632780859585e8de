//! Abstract summarization prompts.
//!
//! Contains system and user prompt templates for the key-point summary column.

/// Language the summaries are written in unless configured otherwise
pub const DEFAULT_SUMMARY_LANGUAGE: &str = "Traditional Chinese";

/// System prompt template
/// Placeholders: {language}
pub const SYSTEM_PROMPT_TEMPLATE: &str = r#"You are an expert in medical literature, functional nutrition and evidence-based medicine. You help the user pull the key points out of a paper abstract.

Rules you MUST follow:
- Write in {language}.
- Prefer a bulleted list, one finding per bullet.
- Use only what the abstract states; do not add outside facts."#;

/// User prompt template for a single abstract
/// Placeholders: {language}, {abstract}
pub const USER_PROMPT_TEMPLATE: &str = r#"Paper abstract: {abstract}

Summarize the key points in {language} (use a bulleted list where possible)."#;

pub fn build_system_prompt(language: &str) -> String {
    SYSTEM_PROMPT_TEMPLATE.replace("{language}", language)
}

/// Build user prompt with the abstract text
pub fn build_user_prompt(language: &str, abstract_text: &str) -> String {
    USER_PROMPT_TEMPLATE
        .replace("{language}", language)
        .replace("{abstract}", abstract_text)
}
