//! Prompt construction and reply parsing for the model calls.
//!
//! The model answers in free text; the helpers here peel off a markdown fence if it
//! wrapped its JSON and validate the shape before anything reaches a response body.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use transparency_common::api::{ProductResponse, Question};

use crate::assistant::AiError;

/// Prior answers quoted back to the model when suggesting questions.
pub const MAX_PREVIOUS_ANSWERS: usize = 3;
/// Responses quoted back to the model when analysing a score.
pub const MAX_ANALYSED_RESPONSES: usize = 10;
/// Characters kept from each analysed answer.
pub const MAX_ANSWER_CHARS: usize = 200;
pub const MAX_SUGGESTED_QUESTIONS: usize = 3;
pub const MAX_AI_RECOMMENDATIONS: usize = 5;

/// Analysis and recommendations returned by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub analysis: String,
    pub recommendations: Vec<String>,
}

#[derive(Serialize)]
struct ResponseSummary<'a> {
    question: &'a str,
    answer: String,
}

pub fn question_prompt(
    product_name: &str,
    category: &str,
    previous_answers: &[ProductResponse],
) -> Result<String, serde_json::Error> {
    let mut context = format!("Product: {product_name}, Category: {category}");
    if !previous_answers.is_empty() {
        let quoted = &previous_answers[..previous_answers.len().min(MAX_PREVIOUS_ANSWERS)];
        context.push_str("\nPrevious answers: ");
        context.push_str(&serde_json::to_string(quoted)?);
    }

    Ok(format!(
        "You are an expert in product transparency and consumer health.

{context}

Generate 2-3 intelligent follow-up questions that would help assess:
1. Health impact and safety
2. Ethical sourcing and sustainability
3. Transparency and traceability

Return ONLY a JSON array with this exact structure (no markdown, no explanation):
[
  {{\"id\": \"unique_id\", \"question\": \"question text\", \"type\": \"text\", \"category\": \"health\"}}
]

Make questions specific, actionable, and relevant to {category} products."
    ))
}

pub fn analysis_prompt(
    product_name: &str,
    category: &str,
    responses: &[ProductResponse],
    score: u8,
) -> Result<String, serde_json::Error> {
    let summary: Vec<ResponseSummary<'_>> = responses
        .iter()
        .take(MAX_ANALYSED_RESPONSES)
        .map(|r| ResponseSummary {
            question: if r.question.is_empty() {
                "Unknown"
            } else {
                &r.question
            },
            answer: r
                .answer
                .as_deref()
                .unwrap_or("")
                .chars()
                .take(MAX_ANSWER_CHARS)
                .collect(),
        })
        .collect();
    let summary = serde_json::to_string_pretty(&summary)?;

    Ok(format!(
        "You are an expert analyst in product transparency, health, and ethics.

Product: {product_name}
Category: {category}
Current Transparency Score: {score}/100

Key Responses:
{summary}

Provide:
1. A 2-3 sentence analysis of the product's transparency, health implications, and ethical practices
2. 3-5 specific, actionable recommendations for improvement

Return as JSON:
{{
  \"analysis\": \"your analysis here\",
  \"recommendations\": [\"rec 1\", \"rec 2\", \"rec 3\"]
}}

Focus on: Health impact, Ethical sourcing, Environmental sustainability, Consumer safety"
    ))
}

/// Remove a surrounding ```` ``` ```` / ```` ```json ```` fence, if any.
pub fn strip_code_fence(reply: &str) -> &str {
    let text = reply.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest
        .strip_prefix("json")
        .or_else(|| rest.strip_prefix("JSON"))
        .unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse suggested questions. Items that are not valid question objects are dropped.
pub fn parse_questions(reply: &str) -> Result<Vec<Question>, AiError> {
    let value: Value = serde_json::from_str(strip_code_fence(reply))?;
    let Value::Array(items) = value else {
        return Err(AiError::Shape("expected a JSON array of questions"));
    };

    let total = items.len();
    let questions: Vec<Question> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<Question>(item).ok())
        .filter(|q| !q.id.trim().is_empty() && !q.question.trim().is_empty())
        .take(MAX_SUGGESTED_QUESTIONS)
        .collect();
    if questions.len() < total.min(MAX_SUGGESTED_QUESTIONS) {
        debug!(total, kept = questions.len(), "dropped malformed suggested questions");
    }
    Ok(questions)
}

pub fn parse_analysis(reply: &str) -> Result<Analysis, AiError> {
    let value: Value = serde_json::from_str(strip_code_fence(reply))?;
    let Value::Object(mut fields) = value else {
        return Err(AiError::Shape("expected a JSON object"));
    };

    let analysis = match fields.remove("analysis") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => return Err(AiError::Shape("missing analysis text")),
    };
    let Some(Value::Array(items)) = fields.remove("recommendations") else {
        return Err(AiError::Shape("missing recommendations list"));
    };

    let recommendations: Vec<String> = items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        })
        .take(MAX_AI_RECOMMENDATIONS)
        .collect();
    if recommendations.is_empty() {
        return Err(AiError::Shape("empty recommendations list"));
    }

    Ok(Analysis {
        analysis,
        recommendations,
    })
}
