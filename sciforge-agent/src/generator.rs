//! Candidate generation: one LLM round-trip producing a fitted model.

use crate::archive::TopKArchive;
use crate::candidate::Candidate;
use sciforge_error::{Error, Result};
use sciforge_vm::{ChatMessage, LlmProvider, Scope};

/// The immutable prompt strings for a run, built once at setup
#[derive(Debug, Clone)]
pub struct PromptContext {
    pub system_prompt: String,
    pub base_user_prompt: String,
    pub fit_harness: String,
}

/// Generates one candidate per call: archive feedback -> LLM -> extract ->
/// execute -> instantiate -> fit.
pub struct CandidateGenerator<P> {
    provider: P,
    /// Constructor symbol the generated source must define
    symbol: String,
}

impl<P: LlmProvider> CandidateGenerator<P> {
    pub fn new(provider: P, symbol: impl Into<String>) -> Self {
        Self { provider, symbol: symbol.into() }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn provider_ref(&self) -> &P {
        &self.provider
    }

    /// One generation attempt. Any failure here is retryable by the caller.
    pub async fn generate_and_fit(
        &self,
        prompts: &PromptContext,
        archive: &TopKArchive,
        train_x: &[Vec<f64>],
        train_y: &[f64],
    ) -> Result<Candidate> {
        // Outer-level optimization: remind the LLM of the current top-k
        let user_prompt = format!(
            "{}{}",
            render_feedback(archive),
            prompts.base_user_prompt
        );
        let messages = vec![
            ChatMessage::system(&prompts.system_prompt),
            ChatMessage::user(&user_prompt),
        ];

        let response = self.provider.chat(messages).await.map_err(|e| {
            Error::inference_failed(e.to_string())
                .with_operation("generator::generate_and_fit")
                .set_source(e)
        })?;

        let source = extract_code_block(&response)?.to_string();

        // Execute candidate + harness in a fresh scope
        let combined = format!("{}\n{}", source, prompts.fit_harness);
        let scope = Scope::execute(&combined)?;
        let mut model = scope.instantiate(&self.symbol)?;

        // Inner-level optimization: fit the free parameters
        model.fit(train_x, train_y)?;

        Ok(Candidate::new(model, source))
    }
}

/// Render the archive as feedback text: per entry, its source and its loss,
/// in ascending-loss order. Empty archive renders as empty.
pub fn render_feedback(archive: &TopKArchive) -> String {
    let mut text = String::new();
    for entry in archive.feedback_entries() {
        text.push_str(&format!(
            "### Previous iteration #{}:\n\n{}\n\n",
            entry.index, entry.source
        ));
        text.push_str(&format!(
            "### Feedback on previous iteration #{}:\n\nLoss = {}\n\n",
            entry.index, entry.loss
        ));
    }
    text
}

/// Extract the first ```model fenced block from an LLM response
pub fn extract_code_block(response: &str) -> Result<&str> {
    const FENCE_OPEN: &str = "```model";
    const FENCE_CLOSE: &str = "```";

    let start = response.find(FENCE_OPEN).ok_or_else(|| {
        Error::extraction_failed("no ```model code block in response")
            .with_operation("generator::extract_code_block")
            .with_context("response_chars", response.len().to_string())
    })?;
    let body = &response[start + FENCE_OPEN.len()..];
    let end = body.find(FENCE_CLOSE).ok_or_else(|| {
        Error::extraction_failed("```model code block is not terminated")
            .with_operation("generator::extract_code_block")
    })?;
    Ok(body[..end].trim())
}
