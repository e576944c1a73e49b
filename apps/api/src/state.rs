use std::sync::Arc;

use crate::analysis::ai::ResumeAi;
use crate::config::Config;
use crate::conversion::PdfConverter;
use crate::records::RecordStore;
use crate::storage::BlobStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub config: Config,
}

/// The collaborators every operation is handed explicitly. Backends are
/// chosen in `main`; tests plug in the in-memory ones.
#[derive(Clone)]
pub struct Services {
    pub blobs: Arc<dyn BlobStore>,
    pub records: RecordStore,
    pub ai: Arc<dyn ResumeAi>,
    pub converter: Arc<dyn PdfConverter>,
}
