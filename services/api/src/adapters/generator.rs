//! services/api/src/adapters/generator.rs
//!
//! This module contains the adapter for the survey-generating LLM.
//! It implements the `SurveyGenerationService` port from the `surveysmith_core`
//! crate using the OpenAI Responses API.

use async_openai::{
    config::OpenAIConfig, error::OpenAIError, types::responses::CreateResponseArgs, Client,
};
use async_trait::async_trait;
use surveysmith_core::ports::{PortError, PortResult, SurveyGenerationService};
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `SurveyGenerationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiSurveyAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiSurveyAdapter {
    /// Creates a new `OpenAiSurveyAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    /// Strips a markdown code fence if the model wrapped its JSON in one.
    /// The prompt forbids commentary, but fencing still shows up.
    fn strip_code_fence(text: &str) -> &str {
        let trimmed = text.trim();
        let Some(inner) = trimmed.strip_prefix("```") else {
            return trimmed;
        };
        // Drop a language tag like "json" on the opening fence line.
        let inner = match inner.split_once('\n') {
            Some((first_line, rest)) if !first_line.trim().starts_with('{') => rest,
            _ => inner,
        };
        inner.trim().trim_end_matches("```").trim()
    }
}

//=========================================================================================
// `SurveyGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl SurveyGenerationService for OpenAiSurveyAdapter {
    /// Sends the fully built prompt as a single input and returns the raw
    /// response text. One attempt, no retry.
    async fn generate_survey(&self, prompt: &str) -> PortResult<String> {
        debug!(model = %self.model, prompt_len = prompt.len(), "Requesting survey generation");

        let request = CreateResponseArgs::default()
            .model(&self.model)
            .input(prompt.to_string())
            .max_output_tokens(8000u32)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .responses()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Provider(e.to_string()))?;

        let raw = response.output_text().unwrap_or_default();
        let cleaned = Self::strip_code_fence(&raw);

        if cleaned.is_empty() {
            return Err(PortError::Provider(
                "The generation provider returned an empty response".to_string(),
            ));
        }

        Ok(cleaned.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn bare_json_passes_through_untouched() {
        let raw = r#"{"sections": []}"#;
        assert_eq!(OpenAiSurveyAdapter::strip_code_fence(raw), raw);
    }

    #[test]
    fn fenced_json_with_language_tag_is_unwrapped() {
        let raw = "```json\n{\"sections\": []}\n```";
        assert_eq!(
            OpenAiSurveyAdapter::strip_code_fence(raw),
            r#"{"sections": []}"#
        );
    }

    #[test]
    fn fenced_json_without_language_tag_is_unwrapped() {
        let raw = "```\n{\"sections\": []}\n```";
        assert_eq!(
            OpenAiSurveyAdapter::strip_code_fence(raw),
            r#"{"sections": []}"#
        );
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let raw = "\n  {\"sections\": []}  \n";
        assert_eq!(
            OpenAiSurveyAdapter::strip_code_fence(raw),
            r#"{"sections": []}"#
        );
    }
}
