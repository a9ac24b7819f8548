use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use super::{json_body, path_id};
use crate::{
    dtos::{
        applicationdtos::{CreateApplicationDto, UpdateApplicationStatusDto},
        ApiResponse,
    },
    error::HttpError,
    middleware::JWTAuthMiddleware,
    AppState,
};

/// Every route here requires authentication; the router applies `auth`.
pub fn applications_handler() -> Router {
    Router::new()
        .route("/", post(apply_to_job))
        .route("/my-applications", get(my_applications))
        .route("/:id", get(get_application))
        .route("/:id/status", put(update_application_status))
}

pub async fn apply_to_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    body: Result<Json<CreateApplicationDto>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let body = json_body(body)?;
    let application = app_state.application_service.apply(&auth.user, body).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Application submitted successfully",
            application,
        )),
    ))
}

pub async fn my_applications(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    let applications = app_state
        .application_service
        .my_applications(&auth.user)
        .await?;

    Ok(Json(ApiResponse::success(
        "Applications retrieved successfully",
        applications,
    )))
}

pub async fn get_application(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let application = app_state
        .application_service
        .get_application(&auth.user, path_id(id)?)
        .await?;

    Ok(Json(ApiResponse::success(
        "Application retrieved successfully",
        application,
    )))
}

pub async fn update_application_status(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<UpdateApplicationStatusDto>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let application_id = path_id(id)?;
    let body = json_body(body)?;
    let application = app_state
        .application_service
        .update_status(&auth.user, application_id, body)
        .await?;

    Ok(Json(ApiResponse::success(
        "Application status updated successfully",
        application,
    )))
}
