use axum::Json;
use serde_json::{json, Value};

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "resumind-api"
    }))
}

/// GET /.well-known/appspecific/com.chrome.devtools.json
/// Placeholder manifest so the browser's lookup resolves instead of 404ing.
pub async fn devtools_manifest_handler() -> Json<Value> {
    Json(json!({
        "devtoolsFrontendUrl": "",
        "url": "",
        "description": "Placeholder DevTools manifest"
    }))
}
