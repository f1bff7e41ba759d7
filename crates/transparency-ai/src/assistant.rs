use tracing::{debug, warn};

use transparency_common::api::{ProductResponse, Question};
use transparency_common::llm::{LlmClient, LlmError};

use crate::prompt::{self, Analysis};
use crate::recommendations::basic_recommendations;

/// Why a model-backed step produced nothing usable.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("model call failed: {0}")]
    Model(#[from] LlmError),

    #[error("model reply is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("model reply has unexpected shape: {0}")]
    Shape(&'static str),
}

/// Model-backed question suggestions and score analysis.
///
/// Each method makes exactly one model call and reports the outcome as a `Result`;
/// callers decide what to substitute on failure.
#[derive(Clone)]
pub struct AiAssistant {
    client: LlmClient,
}

impl AiAssistant {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }

    pub fn model(&self) -> &str {
        &self.client.config().model
    }

    /// Ask the model for up to three follow-up questions.
    pub async fn suggest_questions(
        &self,
        product_name: &str,
        category: &str,
        previous_answers: &[ProductResponse],
    ) -> Result<Vec<Question>, AiError> {
        let prompt = prompt::question_prompt(product_name, category, previous_answers)?;
        let reply = self.client.complete(&prompt).await?;
        let questions = prompt::parse_questions(&reply)?;
        debug!(count = questions.len(), "model suggested questions");
        Ok(questions)
    }

    /// Ask the model to explain a score and propose improvements.
    pub async fn analyze(
        &self,
        product_name: &str,
        category: &str,
        responses: &[ProductResponse],
        score: u8,
    ) -> Result<Analysis, AiError> {
        let prompt = prompt::analysis_prompt(product_name, category, responses, score)?;
        let reply = self.client.complete(&prompt).await?;
        prompt::parse_analysis(&reply)
    }

    /// [`Self::analyze`], replaced by [`fallback_analysis`] on any failure.
    pub async fn analyze_or_fallback(
        &self,
        product_name: &str,
        category: &str,
        responses: &[ProductResponse],
        score: u8,
    ) -> Analysis {
        match self.analyze(product_name, category, responses, score).await {
            Ok(analysis) => analysis,
            Err(e) => {
                log_failure("score analysis", &e);
                fallback_analysis(score)
            }
        }
    }
}

/// Deterministic analysis used when the model cannot be reached or misbehaves.
pub fn fallback_analysis(score: u8) -> Analysis {
    Analysis {
        analysis: format!("Product shows {score}% transparency. Further analysis pending."),
        recommendations: basic_recommendations(score),
    }
}

pub fn log_failure(step: &str, err: &AiError) {
    let timeout = matches!(err, AiError::Model(e) if e.is_timeout());
    warn!(step, timeout, error = %err, "AI step failed, using static content");
}
