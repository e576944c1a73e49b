use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, info};

use crate::analysis::improve::improve_resume;
use crate::analysis::pipeline::{AnalysisRequest, AnalysisRun, ResumeUpload};
use crate::errors::AppError;
use crate::models::feedback::ImprovedContent;
use crate::state::AppState;

const MISSING_FILE_MESSAGE: &str =
    "Please upload your CV (PDF) so we can analyze it against this job.";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub id: String,
    pub route: String,
    pub status: String,
    pub progress: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImproveResponse {
    #[serde(flatten)]
    pub content: ImprovedContent,
    pub copy_all_text: String,
}

/// Multipart form as submitted by the upload page.
#[derive(Debug, Default)]
struct UploadForm {
    company_name: String,
    job_title: String,
    job_description: String,
    file: Option<ResumeUpload>,
}

async fn read_upload_form(
    mut multipart: Multipart,
    max_upload_bytes: usize,
) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed form data: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("resume.pdf").to_string();
                let data: Bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read file: {e}")))?;
                if data.is_empty() {
                    continue;
                }
                if data.len() > max_upload_bytes {
                    return Err(AppError::Validation(format!(
                        "File is too large (limit {max_upload_bytes} bytes)"
                    )));
                }
                if !data.starts_with(b"%PDF-") {
                    return Err(AppError::Validation("Only PDF files are allowed".into()));
                }
                form.file = Some(ResumeUpload { file_name, data });
            }
            "company-name" | "job-title" | "job-description" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read {name}: {e}")))?;
                match name.as_str() {
                    "company-name" => form.company_name = value,
                    "job-title" => form.job_title = value,
                    _ => form.job_description = value,
                }
            }
            _ => {}
        }
    }
    Ok(form)
}

async fn run_analysis(
    state: &AppState,
    upload: ResumeUpload,
    request: AnalysisRequest,
) -> Result<(StatusCode, Json<AnalysisResponse>), AppError> {
    let mut run = AnalysisRun::new(&state.services, state.config.ai_timeout);
    let outcome = run.run(upload, request).await?;
    debug!("Analysis {} ended in phase {}", outcome.id, run.phase());
    Ok((
        StatusCode::CREATED,
        Json(AnalysisResponse {
            id: outcome.id,
            route: outcome.route,
            status: run.status_text(),
            progress: run.progress(),
        }),
    ))
}

/// POST /api/v1/resumes
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<AnalysisResponse>), AppError> {
    let form = read_upload_form(multipart, state.config.max_upload_bytes).await?;
    let upload = form
        .file
        .ok_or_else(|| AppError::Validation(MISSING_FILE_MESSAGE.into()))?;
    info!(
        "Job-specific analysis requested for {} ({} bytes)",
        upload.file_name,
        upload.data.len()
    );
    let request = AnalysisRequest::JobSpecific {
        company_name: form.company_name,
        job_title: form.job_title,
        job_description: form.job_description,
    };
    run_analysis(&state, upload, request).await
}

/// POST /api/v1/hr-reviews
pub async fn handle_hr_review(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<AnalysisResponse>), AppError> {
    let form = read_upload_form(multipart, state.config.max_upload_bytes).await?;
    let upload = form
        .file
        .ok_or_else(|| AppError::Validation("Please upload your CV (PDF) for review.".into()))?;
    info!(
        "HR quick review requested for {} ({} bytes)",
        upload.file_name,
        upload.data.len()
    );
    run_analysis(&state, upload, AnalysisRequest::HrReview).await
}

/// POST /api/v1/resumes/:id/improve
pub async fn handle_improve_resume(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ImproveResponse>, AppError> {
    let content = improve_resume(&state.services, &id, state.config.ai_timeout).await?;
    Ok(Json(ImproveResponse {
        copy_all_text: content.copy_all_text(),
        content,
    }))
}
