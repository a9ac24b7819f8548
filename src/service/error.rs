use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    db::error::StoreError,
    error::{ErrorMessage, HttpError},
    models::{
        applicationmodel::ApplicationStatus, jobmodel::JobStatus, paymentmodel::PaymentStatus,
    },
};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Job not found")]
    JobNotFound(Uuid),

    #[error("Application not found")]
    ApplicationNotFound(Uuid),

    #[error("Payment not found")]
    PaymentNotFound(Uuid),

    #[error("Rating not found")]
    RatingNotFound(Uuid),

    #[error("{0} not found")]
    UserNotFound(&'static str),

    #[error("{0}")]
    RoleRequired(&'static str),

    #[error("{0}")]
    NotOwner(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("This job is no longer accepting applications")]
    JobNotOpen(JobStatus),

    #[error("You have already applied to this job")]
    AlreadyApplied,

    #[error("Invalid status")]
    InvalidStatus,

    #[error("Cannot change application status from {} to {}", .from.to_str(), .to.to_str())]
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },

    #[error("Job is already full. Cannot accept more applications.")]
    JobFull { accepted: i64, workers_needed: i32 },

    #[error("Job is {} and cannot accept more applications", .0.to_str())]
    JobNotAccepting(JobStatus),

    #[error("Workers needed can only be changed while the job is open")]
    CapacityLocked(JobStatus),

    #[error("Workers needed cannot be lower than the {accepted} workers already accepted")]
    CapacityBelowAccepted { accepted: i64 },

    #[error("Cannot delete a job with accepted or completed applications")]
    JobHasCommitments(i64),

    #[error("Can only create payment for accepted applications")]
    ApplicationNotAccepted(ApplicationStatus),

    #[error("Payment already exists for this application")]
    PaymentExists,

    #[error("Amount mismatch. Expected ₹{expected} (₹{wage_per_day}/day × {duration} days)")]
    AmountMismatch {
        expected: String,
        wage_per_day: String,
        duration: i32,
    },

    #[error("Payment is not in escrow")]
    PaymentNotInEscrow(PaymentStatus),

    #[error("You cannot rate yourself")]
    SelfRating,

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::JobNotFound(_)
            | ServiceError::ApplicationNotFound(_)
            | ServiceError::PaymentNotFound(_)
            | ServiceError::RatingNotFound(_)
            | ServiceError::UserNotFound(_) => StatusCode::NOT_FOUND,

            ServiceError::RoleRequired(_) | ServiceError::NotOwner(_) => StatusCode::FORBIDDEN,

            ServiceError::Validation(_)
            | ServiceError::JobNotOpen(_)
            | ServiceError::AlreadyApplied
            | ServiceError::InvalidStatus
            | ServiceError::InvalidTransition { .. }
            | ServiceError::JobFull { .. }
            | ServiceError::JobNotAccepting(_)
            | ServiceError::CapacityLocked(_)
            | ServiceError::CapacityBelowAccepted { .. }
            | ServiceError::JobHasCommitments(_)
            | ServiceError::ApplicationNotAccepted(_)
            | ServiceError::PaymentExists
            | ServiceError::AmountMismatch { .. }
            | ServiceError::PaymentNotInEscrow(_)
            | ServiceError::SelfRating => StatusCode::BAD_REQUEST,

            ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        let status = error.status_code();

        if status.is_server_error() {
            tracing::error!("service failure: {}", error);
            return HttpError::server_error(ErrorMessage::ServerError.to_string());
        }

        HttpError::new(error.to_string(), status)
    }
}

impl From<StoreError> for HttpError {
    fn from(error: StoreError) -> Self {
        ServiceError::Store(error).into()
    }
}
