use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::app::{errors, services::AppServices};

/// Liveness plus a store round-trip.
pub async fn health(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.products().count().await {
        Ok(counts) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "ok",
                "active": counts.active,
                "deleted": counts.deleted,
            })),
        )
            .into_response(),
        Err(e) => errors::json_error(StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", e.to_string()),
    }
}
