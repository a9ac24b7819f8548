use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path,
    },
    middleware,
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use super::{json_body, path_id};
use crate::{
    dtos::{
        userdtos::{
            FilterUserDto, PublicUserDto, UpdateFarmerProfileDto, UpdateProfileDto,
            UpdateWorkerProfileDto,
        },
        validation_message, ApiResponse,
    },
    error::HttpError,
    middleware::{auth, JWTAuthMiddleware},
    models::usermodel::UserRole,
    AppState,
};

pub fn users_handler() -> Router {
    let public_routes = Router::new().route("/:id", get(get_user_by_id));

    let protected_routes = Router::new()
        .route("/profile", put(update_profile))
        .route("/worker-profile", put(update_worker_profile))
        .route("/farmer-profile", put(update_farmer_profile))
        .layer(middleware::from_fn(auth));

    Router::new().merge(public_routes).merge(protected_routes)
}

pub async fn update_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    body: Result<Json<UpdateProfileDto>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let body = json_body(body)?;
    body.validate()
        .map_err(|e| HttpError::bad_request(validation_message(&e)))?;

    if let Some(email) = &body.email {
        let owner = app_state.db_client.get_user(None, None, Some(email)).await?;
        if owner.is_some_and(|owner| owner.id != auth.user.id) {
            return Err(HttpError::bad_request("Email is already in use"));
        }
    }

    let user = app_state
        .db_client
        .update_user(auth.user.id, body.into())
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                HttpError::bad_request("Email is already in use")
            } else {
                HttpError::from(e)
            }
        })?;

    Ok(Json(ApiResponse::success(
        "Profile updated successfully",
        FilterUserDto::filter_user(&user),
    )))
}

pub async fn update_worker_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    body: Result<Json<UpdateWorkerProfileDto>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    if auth.user.role != UserRole::Worker {
        return Err(HttpError::forbidden("Only workers can update worker profiles"));
    }

    let body = json_body(body)?;
    body.validate()
        .map_err(|e| HttpError::bad_request(validation_message(&e)))?;

    let profile = app_state
        .db_client
        .update_worker_profile(auth.user.id, body.into())
        .await?;

    tracing::info!(user_id = %auth.user.id, "worker profile updated");

    Ok(Json(ApiResponse::success(
        "Worker profile updated successfully",
        profile,
    )))
}

pub async fn update_farmer_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    body: Result<Json<UpdateFarmerProfileDto>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    if auth.user.role != UserRole::Farmer {
        return Err(HttpError::forbidden("Only farmers can update farmer profiles"));
    }

    let body = json_body(body)?;
    body.validate()
        .map_err(|e| HttpError::bad_request(validation_message(&e)))?;

    let profile = app_state
        .db_client
        .update_farmer_profile(auth.user.id, body.into())
        .await?;

    tracing::info!(user_id = %auth.user.id, "farmer profile updated");

    Ok(Json(ApiResponse::success(
        "Farmer profile updated successfully",
        profile,
    )))
}

pub async fn get_user_by_id(
    Extension(app_state): Extension<Arc<AppState>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let user_id = path_id(id)?;

    let user = app_state
        .db_client
        .get_user(Some(user_id), None, None)
        .await?
        .ok_or_else(|| HttpError::not_found("User not found"))?;

    let (worker_profile, farmer_profile) = match user.role {
        UserRole::Worker => (app_state.db_client.get_worker_profile(user.id).await?, None),
        UserRole::Farmer => (None, app_state.db_client.get_farmer_profile(user.id).await?),
    };

    let received = app_state.rating_service.ratings_for_user(user.id).await?;

    Ok(Json(ApiResponse::success(
        "User retrieved successfully",
        PublicUserDto {
            user: FilterUserDto::filter_user(&user),
            worker_profile,
            farmer_profile,
            received_ratings: received.ratings,
        },
    )))
}

