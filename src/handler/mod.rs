pub mod applications;
pub mod auth;
pub mod jobs;
pub mod payments;
pub mod ratings;
pub mod users;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path,
    },
    Json,
};
use uuid::Uuid;

use crate::error::HttpError;

/// Unwraps a JSON body, reporting malformed input as a 400 in the usual
/// error envelope instead of axum's plain-text rejection.
pub fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, HttpError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            tracing::debug!("rejected request body: {}", rejection.body_text());
            Err(HttpError::bad_request("Invalid request body"))
        }
    }
}

pub fn path_id(id: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, HttpError> {
    id.map(|Path(id)| id)
        .map_err(|_| HttpError::bad_request("Invalid id"))
}
