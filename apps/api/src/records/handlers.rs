use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::resume::ResumeRecord;
use crate::presentation::{resume_view, ResumeCardView, ResumeView};
use crate::state::{AppState, Services};
use crate::storage::StoredBlob;

async fn load(services: &Services, id: &str) -> Result<ResumeRecord, AppError> {
    services
        .records
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))
}

/// GET /api/v1/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
) -> Result<Json<Vec<ResumeCardView>>, AppError> {
    let records = state.services.records.list().await?;
    Ok(Json(records.iter().map(ResumeCardView::from).collect()))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ResumeRecord>, AppError> {
    Ok(Json(load(&state.services, &id).await?))
}

/// GET /api/v1/resumes/:id/view
pub async fn handle_get_resume_view(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ResumeView>, AppError> {
    let record = load(&state.services, &id).await?;
    let view = resume_view(&record).ok_or_else(|| {
        AppError::UnprocessableEntity(format!(
            "Stored feedback for {id} does not match analysis type {}",
            record.analysis_type.as_str()
        ))
    })?;
    Ok(Json(view))
}

/// GET /api/v1/resumes/:id/pdf
pub async fn handle_get_resume_pdf(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let record = load(&state.services, &id).await?;
    blob_response(&state.services, &record.resume_path, "application/pdf").await
}

/// GET /api/v1/resumes/:id/image
pub async fn handle_get_resume_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let record = load(&state.services, &id).await?;
    blob_response(&state.services, &record.image_path, "image/png").await
}

async fn blob_response(
    services: &Services,
    path: &str,
    content_type: &'static str,
) -> Result<impl IntoResponse, AppError> {
    let data = services
        .blobs
        .read(path)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("File {path} not found")))?;
    Ok(([(header::CONTENT_TYPE, content_type)], data))
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let record = load(&state.services, &id).await?;
    delete_resume(&state.services, &record).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Removes the record. Blob deletes are best-effort: failures are logged
/// and do not stop the record delete.
pub async fn delete_resume(services: &Services, record: &ResumeRecord) -> Result<(), AppError> {
    for path in [&record.resume_path, &record.image_path] {
        if let Err(e) = services.blobs.delete(path).await {
            warn!("Could not delete {path} for resume {}: {e}", record.id);
        }
    }
    services.records.delete(&record.id).await?;
    info!("Deleted resume {}", record.id);
    Ok(())
}

/// GET /api/v1/files
pub async fn handle_list_files(
    State(state): State<AppState>,
) -> Result<Json<Vec<StoredBlob>>, AppError> {
    Ok(Json(state.services.blobs.list().await?))
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WipeReport {
    pub files_deleted: usize,
    pub files_failed: usize,
    pub records_deleted: usize,
}

/// POST /api/v1/wipe
pub async fn handle_wipe(State(state): State<AppState>) -> Result<Json<WipeReport>, AppError> {
    Ok(Json(wipe_everything(&state.services).await?))
}

/// Deletes every stored file, then every record.
pub async fn wipe_everything(services: &Services) -> Result<WipeReport, AppError> {
    let files = services.blobs.list().await?;
    let mut report = WipeReport {
        files_deleted: 0,
        files_failed: 0,
        records_deleted: 0,
    };
    for file in &files {
        match services.blobs.delete(&file.path).await {
            Ok(()) => report.files_deleted += 1,
            Err(e) => {
                warn!("Could not delete {}: {e}", file.path);
                report.files_failed += 1;
            }
        }
    }
    report.records_deleted = services.records.wipe_all().await?;
    info!(
        "Wipe finished: {} files deleted, {} failed, {} records removed",
        report.files_deleted, report.files_failed, report.records_deleted
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use super::*;
    use crate::analysis::pipeline::tests::{
        frontend_request, harness, upload, StubAi, JOB_FEEDBACK_JSON,
    };
    use crate::analysis::pipeline::{AnalysisRequest, AnalysisRun};

    const TIMEOUT: Duration = Duration::from_secs(30);

    #[tokio::test]
    async fn test_wipe_removes_records_and_blobs() {
        let h = harness(StubAi::replying(JOB_FEEDBACK_JSON));
        let mut paths = Vec::new();
        for request in [frontend_request(), AnalysisRequest::HrReview] {
            // The HR run fails to parse but still leaves its blobs and placeholder.
            let _ = AnalysisRun::new(&h.services, TIMEOUT).run(upload(), request).await;
        }
        for record in h.services.records.list().await.unwrap() {
            paths.push(record.resume_path);
            paths.push(record.image_path);
        }
        assert_eq!(paths.len(), 4);

        let report = wipe_everything(&h.services).await.unwrap();

        assert_eq!(
            report,
            WipeReport {
                files_deleted: 4,
                files_failed: 0,
                records_deleted: 2
            }
        );
        assert!(h.services.records.list().await.unwrap().is_empty());
        for path in paths {
            assert_eq!(h.services.blobs.read(&path).await.unwrap(), None);
        }
    }

    #[tokio::test]
    async fn test_wipe_counts_failed_blob_deletes_and_still_clears_records() {
        let h = harness(StubAi::replying(JOB_FEEDBACK_JSON));
        AnalysisRun::new(&h.services, TIMEOUT)
            .run(upload(), frontend_request())
            .await
            .unwrap();
        h.blobs.fail_deletes.store(true, Ordering::SeqCst);

        let report = wipe_everything(&h.services).await.unwrap();

        assert_eq!(report.files_failed, 2);
        assert_eq!(report.records_deleted, 1);
        assert!(h.services.records.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_resume_ignores_blob_failures() {
        let h = harness(StubAi::replying(JOB_FEEDBACK_JSON));
        let id = AnalysisRun::new(&h.services, TIMEOUT)
            .run(upload(), frontend_request())
            .await
            .unwrap()
            .id;
        let record = h.services.records.get(&id).await.unwrap().unwrap();
        h.blobs.fail_deletes.store(true, Ordering::SeqCst);

        delete_resume(&h.services, &record).await.unwrap();

        assert_eq!(h.services.records.get(&id).await.unwrap(), None);
        assert_eq!(h.blobs.len(), 2);
    }
}
