use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query,
    },
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use super::{json_body, path_id};
use crate::{
    dtos::{
        jobdtos::{CreateJobDto, JobListQuery, UpdateJobDto},
        ApiResponse, PaginationQuery,
    },
    error::HttpError,
    middleware::{auth, JWTAuthMiddleware},
    AppState,
};

pub fn jobs_handler() -> Router {
    let public_routes = Router::new()
        .route("/", get(list_jobs))
        .route("/:id", get(get_job));

    let protected_routes = Router::new()
        .route("/", post(create_job))
        .route("/my-jobs", get(list_my_jobs))
        .route("/:id", put(update_job).delete(delete_job))
        .layer(middleware::from_fn(auth));

    Router::new().merge(public_routes).merge(protected_routes)
}

pub async fn create_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    body: Result<Json<CreateJobDto>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let body = json_body(body)?;
    let job = app_state.job_service.create_job(&auth.user, body).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Job created successfully", job)),
    ))
}

pub async fn list_jobs(
    Extension(app_state): Extension<Arc<AppState>>,
    query: Result<Query<JobListQuery>, QueryRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let Query(query) = query.map_err(|_| HttpError::bad_request("Invalid query parameters"))?;
    let jobs = app_state.job_service.list_jobs(query).await?;

    Ok(Json(ApiResponse::success("Jobs retrieved successfully", jobs)))
}

pub async fn list_my_jobs(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    query: Result<Query<PaginationQuery>, QueryRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let Query(query) = query.map_err(|_| HttpError::bad_request("Invalid query parameters"))?;
    let jobs = app_state.job_service.list_my_jobs(&auth.user, query).await?;

    Ok(Json(ApiResponse::success("Jobs retrieved successfully", jobs)))
}

pub async fn get_job(
    Extension(app_state): Extension<Arc<AppState>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state.job_service.get_job(path_id(id)?).await?;

    Ok(Json(ApiResponse::success("Job retrieved successfully", job)))
}

pub async fn update_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<UpdateJobDto>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let job_id = path_id(id)?;
    let body = json_body(body)?;
    let job = app_state
        .job_service
        .update_job(&auth.user, job_id, body)
        .await?;

    Ok(Json(ApiResponse::success("Job updated successfully", job)))
}

pub async fn delete_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let job_id = path_id(id)?;
    app_state.job_service.delete_job(&auth.user, job_id).await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Job deleted successfully"
    })))
}
