use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{applicationmodel::Application, paymentmodel::Payment};

use super::{jobdtos::JobWithFarmerDto, userdtos::UserSummaryDto};

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct CreateApplicationDto {
    #[validate(required(message = "Job ID is required"))]
    pub job_id: Option<Uuid>,

    #[validate(length(max = 1000, message = "Message must not exceed 1000 characters"))]
    pub message: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateApplicationStatusDto {
    pub status: Option<String>,
}

/// An application as listed under its job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationViewDto {
    #[serde(flatten)]
    pub application: Application,
    pub worker: Option<UserSummaryDto>,
    pub payment: Option<Payment>,
}

/// An application with its job, farmer, worker and payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationDetailDto {
    #[serde(flatten)]
    pub application: Application,
    pub job: Option<JobWithFarmerDto>,
    pub worker: Option<UserSummaryDto>,
    pub payment: Option<Payment>,
}
