pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::records::handlers as records;
use crate::state::AppState;

/// Room for the non-file form fields on top of the PDF itself.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + FORM_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/.well-known/appspecific/com.chrome.devtools.json",
            get(health::devtools_manifest_handler),
        )
        // Analysis
        .route(
            "/api/v1/resumes",
            post(analysis::handle_analyze_resume).get(records::handle_list_resumes),
        )
        .route("/api/v1/hr-reviews", post(analysis::handle_hr_review))
        .route(
            "/api/v1/resumes/:id/improve",
            post(analysis::handle_improve_resume),
        )
        // Records
        .route(
            "/api/v1/resumes/:id",
            get(records::handle_get_resume).delete(records::handle_delete_resume),
        )
        .route("/api/v1/resumes/:id/view", get(records::handle_get_resume_view))
        .route("/api/v1/resumes/:id/pdf", get(records::handle_get_resume_pdf))
        .route(
            "/api/v1/resumes/:id/image",
            get(records::handle_get_resume_image),
        )
        .route("/api/v1/files", get(records::handle_list_files))
        .route("/api/v1/wipe", post(records::handle_wipe))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
