//! Generation Service — prompt construction plus one chat-completion call.
//!
//! Callers must have passed the Access Gate already; nothing here reads or
//! writes user state.

use serde::Deserialize;
use tracing::info;

use crate::generation::prompts::{fill, ADAPT_CV_PROMPT_TEMPLATE, COVER_LETTER_PROMPT_TEMPLATE};
use crate::llm_client::{CompletionParams, LlmClient, LlmError};

/// The model used for every generation.
pub const MODEL: &str = "gpt-4o";

/// Request body shared by `/adapt-cv` and `/generate`.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationRequest {
    pub job_text: String,
    pub cv_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationKind {
    AdaptedCv,
    CoverLetter,
}

impl GenerationKind {
    pub fn template(self) -> &'static str {
        match self {
            GenerationKind::AdaptedCv => ADAPT_CV_PROMPT_TEMPLATE,
            GenerationKind::CoverLetter => COVER_LETTER_PROMPT_TEMPLATE,
        }
    }

    pub fn params(self) -> CompletionParams {
        match self {
            GenerationKind::AdaptedCv => CompletionParams {
                model: MODEL,
                temperature: 0.8,
                max_tokens: 1000,
            },
            GenerationKind::CoverLetter => CompletionParams {
                model: MODEL,
                temperature: 0.9,
                max_tokens: 800,
            },
        }
    }

    pub fn build_prompt(self, job_text: &str, cv_text: &str) -> String {
        fill(self.template(), job_text, cv_text)
    }
}

/// Builds the prompt for `kind`, calls the model once and returns the
/// trimmed text.
pub async fn generate(
    llm: &LlmClient,
    kind: GenerationKind,
    job_text: &str,
    cv_text: &str,
) -> Result<String, LlmError> {
    let prompt = kind.build_prompt(job_text, cv_text);
    let text = llm.complete(&prompt, kind.params()).await?;
    info!("{kind:?} generated ({} chars)", text.chars().count());
    Ok(text)
}

pub async fn adapt_cv(llm: &LlmClient, job_text: &str, cv_text: &str) -> Result<String, LlmError> {
    generate(llm, GenerationKind::AdaptedCv, job_text, cv_text).await
}

pub async fn generate_letter(
    llm: &LlmClient,
    job_text: &str,
    cv_text: &str,
) -> Result<String, LlmError> {
    generate(llm, GenerationKind::CoverLetter, job_text, cv_text).await
}
