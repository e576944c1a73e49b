//! Analysis pipeline: upload → convert → upload image → persist placeholder
//! → call AI → parse → persist final record.
//!
//! Steps run strictly in sequence and the first failure ends the run; there
//! are no pipeline-level retries. The placeholder record is written before
//! the AI call and is left in place (never rolled back) if anything after it
//! fails, so every upload leaves a recoverable trace.

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::analysis::prompts::{build_hr_review_prompt, build_job_specific_prompt};
use crate::analysis::response::{extract_text, parse_feedback, ResponseParseError};
use crate::conversion::ConversionError;
use crate::llm_client::LlmError;
use crate::models::resume::{AnalysisType, ResumeRecord};
use crate::records::RecordError;
use crate::state::Services;
use crate::storage::StorageError;

// ────────────────────────────────────────────────────────────────────────────
// Inputs and outputs
// ────────────────────────────────────────────────────────────────────────────

/// The uploaded resume as received from the client.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub file_name: String,
    pub data: Bytes,
}

/// Which analysis to run, with the job context for job-specific runs.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisRequest {
    JobSpecific {
        company_name: String,
        job_title: String,
        job_description: String,
    },
    HrReview,
}

impl AnalysisRequest {
    pub fn analysis_type(&self) -> AnalysisType {
        match self {
            AnalysisRequest::JobSpecific { .. } => AnalysisType::JobSpecific,
            AnalysisRequest::HrReview => AnalysisType::HrReview,
        }
    }

    pub fn instructions(&self) -> String {
        match self {
            AnalysisRequest::JobSpecific {
                job_title,
                job_description,
                ..
            } => build_job_specific_prompt(job_title, job_description),
            AnalysisRequest::HrReview => build_hr_review_prompt(),
        }
    }

    fn placeholder(&self, id: String, resume_path: String, image_path: String) -> ResumeRecord {
        let (company_name, job_title, job_description) = match self {
            AnalysisRequest::JobSpecific {
                company_name,
                job_title,
                job_description,
            } => (
                non_empty(company_name),
                non_empty(job_title),
                non_empty(job_description),
            ),
            AnalysisRequest::HrReview => (None, None, None),
        };
        ResumeRecord {
            id,
            resume_path,
            image_path,
            company_name,
            job_title,
            job_description,
            analysis_type: self.analysis_type(),
            feedback: None,
            created_at: Some(Utc::now()),
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub id: String,
    pub route: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Phases
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisPhase {
    Idle,
    Uploading,
    ConvertingToImage,
    UploadingImage,
    PreparingRecord,
    Analyzing,
    ProcessingResponse,
    Complete,
    Error(String),
}

impl AnalysisPhase {
    /// The progress line shown to the user while in this phase.
    pub fn status_text(&self, analysis_type: AnalysisType) -> String {
        match self {
            AnalysisPhase::Idle => String::new(),
            AnalysisPhase::Uploading => "Uploading the file...".into(),
            AnalysisPhase::ConvertingToImage => "Converting to image...".into(),
            AnalysisPhase::UploadingImage => "Uploading the image...".into(),
            AnalysisPhase::PreparingRecord => "Preparing data...".into(),
            AnalysisPhase::Analyzing => match analysis_type {
                AnalysisType::JobSpecific => "Analyzing...".into(),
                AnalysisType::HrReview => {
                    "HR Quick Review in progress... (this may take 30-60 seconds)".into()
                }
            },
            AnalysisPhase::ProcessingResponse => "Processing AI response...".into(),
            AnalysisPhase::Complete => "Analysis complete, redirecting...".into(),
            AnalysisPhase::Error(message) => message.clone(),
        }
    }
}

impl fmt::Display for AnalysisPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisPhase::Error(_) => f.write_str("Error"),
            other => write!(f, "{other:?}"),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("resume upload failed: {0}")]
    UploadFailure(#[source] StorageError),

    #[error("PDF conversion failed: {0}")]
    ConversionFailure(#[source] ConversionError),

    #[error("image upload failed: {0}")]
    ImageUploadFailure(#[source] StorageError),

    #[error("record write failed: {0}")]
    RecordStoreFailure(#[source] RecordError),

    #[error("AI invocation failed: {1}")]
    AiInvocationFailure(AnalysisType, #[source] LlmError),

    #[error("AI response could not be parsed: {0}")]
    ResponseParseFailure(#[source] ResponseParseError),
}

impl AnalysisError {
    /// Single human-readable line that replaces the progress indicator.
    pub fn status_text(&self) -> String {
        match self {
            AnalysisError::UploadFailure(_) => "Error: Failed to upload the file".into(),
            AnalysisError::ConversionFailure(e) => {
                format!("Error: Failed to convert PDF to image. {e}")
            }
            AnalysisError::ImageUploadFailure(_) => "Error: Failed to upload the image".into(),
            AnalysisError::RecordStoreFailure(_) => "Error: Failed to save the resume record".into(),
            AnalysisError::AiInvocationFailure(AnalysisType::JobSpecific, _) => {
                "Error: Failed to analyze resume".into()
            }
            AnalysisError::AiInvocationFailure(AnalysisType::HrReview, _) => {
                "Error: Failed to analyze resume. Please try again.".into()
            }
            AnalysisError::ResponseParseFailure(_) => {
                "Error: AI returned invalid response. Please try again.".into()
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Runner
// ────────────────────────────────────────────────────────────────────────────

/// One analysis run. Tracks the current phase and every phase visited.
pub struct AnalysisRun<'a> {
    services: &'a Services,
    ai_timeout: Duration,
    analysis_type: AnalysisType,
    phase: AnalysisPhase,
    history: Vec<AnalysisPhase>,
}

impl<'a> AnalysisRun<'a> {
    pub fn new(services: &'a Services, ai_timeout: Duration) -> Self {
        Self {
            services,
            ai_timeout,
            analysis_type: AnalysisType::JobSpecific,
            phase: AnalysisPhase::Idle,
            history: vec![AnalysisPhase::Idle],
        }
    }

    pub fn phase(&self) -> &AnalysisPhase {
        &self.phase
    }

    #[cfg(test)]
    pub fn history(&self) -> &[AnalysisPhase] {
        &self.history
    }

    pub fn status_text(&self) -> String {
        self.phase.status_text(self.analysis_type)
    }

    /// Status lines of every phase entered so far, in order.
    pub fn progress(&self) -> Vec<String> {
        self.history
            .iter()
            .filter(|p| **p != AnalysisPhase::Idle)
            .map(|p| p.status_text(self.analysis_type))
            .collect()
    }

    fn enter(&mut self, phase: AnalysisPhase) {
        info!(
            "Analysis phase {} -> {}: {}",
            self.phase,
            phase,
            phase.status_text(self.analysis_type)
        );
        self.phase = phase.clone();
        self.history.push(phase);
    }

    /// Runs the whole pipeline. Ends in `Complete` or `Error`.
    pub async fn run(
        &mut self,
        upload: ResumeUpload,
        request: AnalysisRequest,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        self.analysis_type = request.analysis_type();
        match self.execute(upload, &request).await {
            Ok(outcome) => {
                self.enter(AnalysisPhase::Complete);
                Ok(outcome)
            }
            Err(e) => {
                error!("Analysis failed in phase {}: {e}", self.phase);
                self.enter(AnalysisPhase::Error(e.status_text()));
                Err(e)
            }
        }
    }

    async fn execute(
        &mut self,
        upload: ResumeUpload,
        request: &AnalysisRequest,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        let services = self.services;

        self.enter(AnalysisPhase::Uploading);
        let resume = services
            .blobs
            .upload(&upload.file_name, "application/pdf", upload.data.clone())
            .await
            .map_err(AnalysisError::UploadFailure)?;

        self.enter(AnalysisPhase::ConvertingToImage);
        let image = services
            .converter
            .convert(&upload.file_name, upload.data)
            .await
            .map_err(AnalysisError::ConversionFailure)?;

        self.enter(AnalysisPhase::UploadingImage);
        let image = services
            .blobs
            .upload(&image.file_name, image.content_type, image.data)
            .await
            .map_err(AnalysisError::ImageUploadFailure)?;

        self.enter(AnalysisPhase::PreparingRecord);
        let id = Uuid::new_v4().to_string();
        let mut record = request.placeholder(id.clone(), resume.path.clone(), image.path);
        services
            .records
            .set(&record)
            .await
            .map_err(AnalysisError::RecordStoreFailure)?;
        info!("Stored placeholder record {id}");

        self.enter(AnalysisPhase::Analyzing);
        let response = tokio::time::timeout(
            self.ai_timeout,
            services.ai.feedback(&resume.path, &request.instructions()),
        )
        .await
        .unwrap_or(Err(LlmError::Timeout(self.ai_timeout)))
        .map_err(|e| AnalysisError::AiInvocationFailure(self.analysis_type, e))?;

        self.enter(AnalysisPhase::ProcessingResponse);
        let feedback = extract_text(&response)
            .and_then(|text| parse_feedback(text, record.analysis_type))
            .map_err(|e| {
                warn!("Discarding unparseable AI response for {id}: {e}");
                AnalysisError::ResponseParseFailure(e)
            })?;

        record.feedback = Some(feedback);
        services
            .records
            .set(&record)
            .await
            .map_err(AnalysisError::RecordStoreFailure)?;
        info!("Stored completed {} analysis {id}", record.analysis_type.as_str());

        Ok(AnalysisOutcome {
            route: record.result_route(),
            id,
        })
    }
}
