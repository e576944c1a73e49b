//! AI response normalisation and parsing.
//!
//! The prompt asks for bare JSON but nothing enforces it, so parsing is
//! defensive: stray code fences are stripped, the top-level shape is checked
//! key by key, and scores are range-checked before anything is persisted.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::llm_client::strip_json_fences;
use crate::models::feedback::{Feedback, HrReviewFeedback, ImprovedContent, JobFeedback};
use crate::models::resume::AnalysisType;

pub const MAX_SCORE: u32 = 100;

/// Raw reply from the inference backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AiResponse {
    pub message: AiMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AiMessage {
    pub content: MessageContent,
}

/// Message content arrives either as a plain string or as a list of parts
/// whose first element carries the text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentPart {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub part_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[cfg(test)]
impl AiResponse {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            message: AiMessage {
                content: MessageContent::Text(text.into()),
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum ResponseParseError {
    #[error("AI response contained no text")]
    NoText,

    #[error("AI response was empty")]
    Empty,

    #[error("AI response is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("AI response is not a JSON object")]
    NotAnObject,

    #[error("AI response is missing required key `{0}`")]
    MissingKey(&'static str),

    #[error("AI response does not match the expected shape: {0}")]
    Shape(#[source] serde_json::Error),

    #[error("Score {score} at `{field}` is outside 0-100")]
    ScoreOutOfRange { field: &'static str, score: u32 },
}

/// Normalises both content shapes to the text the model produced.
pub fn extract_text(response: &AiResponse) -> Result<&str, ResponseParseError> {
    match &response.message.content {
        MessageContent::Text(text) => Ok(text),
        MessageContent::Parts(parts) => parts
            .first()
            .and_then(|p| p.text.as_deref())
            .ok_or(ResponseParseError::NoText),
    }
}

/// Parses model output into the feedback shape `analysis_type` expects.
pub fn parse_feedback(
    text: &str,
    analysis_type: AnalysisType,
) -> Result<Feedback, ResponseParseError> {
    let feedback = match analysis_type {
        AnalysisType::JobSpecific => {
            Feedback::Job(parse_shape::<JobFeedback>(text, JobFeedback::REQUIRED_KEYS)?)
        }
        AnalysisType::HrReview => Feedback::HrReview(parse_shape::<HrReviewFeedback>(
            text,
            HrReviewFeedback::REQUIRED_KEYS,
        )?),
    };

    for (field, score) in feedback.scores() {
        if score > MAX_SCORE {
            return Err(ResponseParseError::ScoreOutOfRange { field, score });
        }
    }

    Ok(feedback)
}

pub fn parse_improved_content(text: &str) -> Result<ImprovedContent, ResponseParseError> {
    parse_shape(text, ImprovedContent::REQUIRED_KEYS)
}

fn parse_shape<T: DeserializeOwned>(
    text: &str,
    required_keys: &'static [&'static str],
) -> Result<T, ResponseParseError> {
    let text = strip_json_fences(text);
    if text.is_empty() {
        return Err(ResponseParseError::Empty);
    }

    let value: Value = serde_json::from_str(text).map_err(ResponseParseError::InvalidJson)?;
    let object = value.as_object().ok_or(ResponseParseError::NotAnObject)?;
    if let Some(missing) = required_keys.iter().find(|k| !object.contains_key(**k)) {
        return Err(ResponseParseError::MissingKey(*missing));
    }

    serde_json::from_value(value).map_err(ResponseParseError::Shape)
}
