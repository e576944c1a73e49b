//! Rewrite suggestions for the tips a completed analysis flagged "improve".
//! The result is returned to the caller and never persisted.

use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::analysis::prompts::build_improvement_prompt;
use crate::analysis::response::{extract_text, parse_improved_content, ResponseParseError};
use crate::llm_client::LlmError;
use crate::models::feedback::ImprovedContent;
use crate::records::RecordError;
use crate::state::Services;

#[derive(Debug, Error)]
pub enum ImproveError {
    #[error("Resume {0} not found")]
    NotFound(String),

    #[error("Analysis for {0} has not completed yet")]
    Pending(String),

    #[error("No areas marked for improvement found.")]
    NothingToImprove,

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error("Failed to generate improvements: {0}")]
    Ai(#[source] LlmError),

    #[error("AI returned invalid improvements: {0}")]
    Parse(#[source] ResponseParseError),
}

pub async fn improve_resume(
    services: &Services,
    id: &str,
    ai_timeout: Duration,
) -> Result<ImprovedContent, ImproveError> {
    let record = services
        .records
        .get(id)
        .await?
        .ok_or_else(|| ImproveError::NotFound(id.to_string()))?;
    let feedback = record
        .feedback
        .as_ref()
        .ok_or_else(|| ImproveError::Pending(id.to_string()))?;

    let tips = feedback.improvement_tips();
    let prompt = build_improvement_prompt(&tips).ok_or(ImproveError::NothingToImprove)?;
    info!("Requesting rewrites for {} flagged tips on {id}", tips.len());

    let response = tokio::time::timeout(
        ai_timeout,
        services.ai.improve_resume(&record.resume_path, &prompt),
    )
    .await
    .unwrap_or(Err(LlmError::Timeout(ai_timeout)))
    .map_err(ImproveError::Ai)?;

    extract_text(&response)
        .and_then(parse_improved_content)
        .map_err(|e| {
            warn!("Unparseable improvement response for {id}: {e}");
            ImproveError::Parse(e)
        })
}
