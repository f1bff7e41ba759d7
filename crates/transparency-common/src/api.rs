use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Input widget for a question. Only free text is produced today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    #[default]
    Text,
}

/// A questionnaire entry, either from the static catalog or suggested by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(deserialize_with = "id_as_text")]
    pub id: String,
    pub question: String,
    #[serde(rename = "type", default)]
    pub kind: QuestionType,
    #[serde(default = "default_question_category")]
    pub category: String,
}

impl Question {
    pub fn text(id: &str, question: &str, category: &str) -> Self {
        Self {
            id: id.to_string(),
            question: question.to_string(),
            kind: QuestionType::Text,
            category: category.to_string(),
        }
    }
}

fn default_question_category() -> String {
    "general".to_string()
}

/// Model-suggested ids are sometimes plain numbers.
fn id_as_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "id must be a string or number, got {other}"
        ))),
    }
}

/// One answered (or skipped) question submitted by the caller.
///
/// `answer` accepts strings, numbers and booleans; `null` or a missing field means the
/// question was left unanswered. A `null` or missing `question`/`category` reads as `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub question: String,
    #[serde(default, deserialize_with = "answer_as_text")]
    pub answer: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
}

impl ProductResponse {
    /// The answer with surrounding whitespace removed, or `""` when absent.
    pub fn trimmed_answer(&self) -> &str {
        self.answer.as_deref().map(str::trim).unwrap_or("")
    }

    pub fn is_answered(&self) -> bool {
        !self.trimmed_answer().is_empty()
    }
}

fn answer_as_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "answer must be a string, number or boolean, got {other}"
        ))),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateQuestionsRequest {
    pub product_name: String,
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub previous_answers: Vec<ProductResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateQuestionsResponse {
    pub questions: Vec<Question>,
    pub ai_generated: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransparencyScoreRequest {
    pub product_name: String,
    pub category: String,
    pub responses: Vec<ProductResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransparencyScoreResponse {
    pub transparency_score: u8,
    pub health_score: u8,
    pub ethics_score: u8,
    pub recommendations: Vec<String>,
    pub ai_analysis: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub status: String,
    pub service: String,
    pub gemini_configured: bool,
    pub version: String,
}
