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
    dtos::{paymentdtos::CreatePaymentDto, ApiResponse},
    error::HttpError,
    middleware::JWTAuthMiddleware,
    AppState,
};

/// Every route here requires authentication; the router applies `auth`.
pub fn payments_handler() -> Router {
    Router::new()
        .route("/", post(create_payment))
        .route("/:id", get(get_payment))
        .route("/:id/release", put(release_payment))
}

pub async fn create_payment(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    body: Result<Json<CreatePaymentDto>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let body = json_body(body)?;
    let payment = app_state
        .payment_service
        .create_payment(&auth.user, body)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Payment created and held in escrow",
            payment,
        )),
    ))
}

pub async fn release_payment(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let payment = app_state
        .payment_service
        .release_payment(&auth.user, path_id(id)?)
        .await?;

    Ok(Json(ApiResponse::success(
        "Payment released successfully",
        payment,
    )))
}

pub async fn get_payment(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let payment = app_state
        .payment_service
        .get_payment(&auth.user, path_id(id)?)
        .await?;

    Ok(Json(ApiResponse::success(
        "Payment retrieved successfully",
        payment,
    )))
}
