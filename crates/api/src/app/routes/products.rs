use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_product).get(list_products))
        .route("/deleted", get(list_deleted_products))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/:id/delete", post(delete_product))
        .route("/:id/restore", post(restore_product))
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::ProductRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::body_rejection_to_response(rejection),
    };

    match services.products().create(body.into()).await {
        Ok(id) => (StatusCode::CREATED, Json(serde_json::json!({ "id": id }))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::ProductRequest>, JsonRejection>,
) -> axum::response::Response {
    let id = match errors::parse_product_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::body_rejection_to_response(rejection),
    };

    match services.products().update(id, body.into()).await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({ "id": id }))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_product_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.products().soft_delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn restore_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_product_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.products().restore(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_product_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.products().fetch(id).await {
        Ok(p) => (StatusCode::OK, Json(dto::product_to_json(&p))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Active products, or every product in `?category=` when given.
pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ListProductsQuery>,
) -> axum::response::Response {
    let products = match query.category.as_deref() {
        Some(category) => services.products().list_by_category(category).await,
        None => services.products().list_active().await,
    };

    match products {
        Ok(items) => (StatusCode::OK, Json(dto::products_to_json(&items))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_deleted_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.products().list_deleted().await {
        Ok(items) => (StatusCode::OK, Json(dto::products_to_json(&items))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
