use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::jobmodel::{Job, JobStatus};

use super::{applicationdtos::ApplicationViewDto, userdtos::UserSummaryDto, PaginationMeta, PaginationQuery};

pub const MISSING_FIELDS: &str = "Missing required fields";

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct CreateJobDto {
    #[validate(required(message = "Missing required fields"), length(min = 1, max = 200, message = "Title is required"))]
    pub title: Option<String>,

    #[validate(required(message = "Missing required fields"), length(min = 1, message = "Description is required"))]
    pub description: Option<String>,

    #[validate(required(message = "Missing required fields"), length(min = 1, max = 50, message = "Job type is required"))]
    pub job_type: Option<String>,

    #[validate(required(message = "Missing required fields"), length(min = 1, message = "Location is required"))]
    pub location: Option<String>,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    #[validate(required(message = "Missing required fields"))]
    pub wage_per_day: Option<f64>,

    #[validate(
        required(message = "Missing required fields"),
        range(min = 1, max = 365, message = "Duration must be between 1 and 365 days")
    )]
    pub duration: Option<i32>,

    #[validate(
        required(message = "Missing required fields"),
        range(min = 1, max = 1000, message = "Workers needed must be at least 1")
    )]
    pub workers_needed: Option<i32>,

    pub required_skills: Option<Vec<String>>,

    #[validate(required(message = "Missing required fields"))]
    pub start_date: Option<DateTime<Utc>>,

    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateJobDto {
    #[validate(length(min = 1, max = 200, message = "Title cannot be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 50, message = "Job type cannot be empty"))]
    pub job_type: Option<String>,
    #[validate(length(min = 1, message = "Location cannot be empty"))]
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub wage_per_day: Option<f64>,
    #[validate(range(min = 1, max = 365, message = "Duration must be between 1 and 365 days"))]
    pub duration: Option<i32>,
    #[validate(range(min = 1, max = 1000, message = "Workers needed must be at least 1"))]
    pub workers_needed: Option<i32>,
    pub required_skills: Option<Vec<String>>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobListQuery {
    pub status: Option<JobStatus>,
    pub job_type: Option<String>,
    pub location: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl JobListQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page,
            limit: self.limit,
        }
    }
}

/// A job with its farmer and, where relevant, its applications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDetailDto {
    #[serde(flatten)]
    pub job: Job,
    pub farmer: Option<UserSummaryDto>,
    pub applications: Vec<ApplicationViewDto>,
}

/// A job with its farmer only, embedded in application and payment views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobWithFarmerDto {
    #[serde(flatten)]
    pub job: Job,
    pub farmer: Option<UserSummaryDto>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JobListResponseDto {
    pub jobs: Vec<JobDetailDto>,
    pub pagination: PaginationMeta,
}
