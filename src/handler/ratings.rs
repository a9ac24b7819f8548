use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path,
    },
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use super::{json_body, path_id};
use crate::{
    dtos::{ratingdtos::UpsertRatingDto, ApiResponse},
    error::HttpError,
    middleware::{auth, JWTAuthMiddleware},
    AppState,
};

pub fn ratings_handler() -> Router {
    let public_routes = Router::new().route("/user/:user_id", get(ratings_for_user));

    let protected_routes = Router::new()
        .route("/", post(upsert_rating))
        .route("/:id", delete(delete_rating))
        .layer(middleware::from_fn(auth));

    Router::new().merge(public_routes).merge(protected_routes)
}

pub async fn upsert_rating(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    body: Result<Json<UpsertRatingDto>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let body = json_body(body)?;
    let (rating, created) = app_state
        .rating_service
        .upsert_rating(&auth.user, body)
        .await?;

    let (status, message) = if created {
        (StatusCode::CREATED, "Rating submitted successfully")
    } else {
        (StatusCode::OK, "Rating updated successfully")
    };

    Ok((status, Json(ApiResponse::success(message, rating))))
}

pub async fn ratings_for_user(
    Extension(app_state): Extension<Arc<AppState>>,
    user_id: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let ratings = app_state
        .rating_service
        .ratings_for_user(path_id(user_id)?)
        .await?;

    Ok(Json(ApiResponse::success(
        "Ratings retrieved successfully",
        ratings,
    )))
}

pub async fn delete_rating(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, HttpError> {
    app_state
        .rating_service
        .delete_rating(&auth.user, path_id(id)?)
        .await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Rating deleted successfully"
    })))
}
