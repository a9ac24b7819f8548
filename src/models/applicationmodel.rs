use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jobmodel::JobStatus;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "application_status", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
}

impl ApplicationStatus {
    pub fn to_str(&self) -> &str {
        match self {
            ApplicationStatus::Pending => "PENDING",
            ApplicationStatus::Accepted => "ACCEPTED",
            ApplicationStatus::Rejected => "REJECTED",
            ApplicationStatus::Completed => "COMPLETED",
        }
    }

    /// PENDING -> ACCEPTED | REJECTED, ACCEPTED -> COMPLETED.
    pub fn can_transition_to(&self, target: ApplicationStatus) -> bool {
        matches!(
            (self, target),
            (ApplicationStatus::Pending, ApplicationStatus::Accepted)
                | (ApplicationStatus::Pending, ApplicationStatus::Rejected)
                | (ApplicationStatus::Accepted, ApplicationStatus::Completed)
        )
    }
}

impl FromStr for ApplicationStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(ApplicationStatus::Pending),
            "ACCEPTED" => Ok(ApplicationStatus::Accepted),
            "REJECTED" => Ok(ApplicationStatus::Rejected),
            "COMPLETED" => Ok(ApplicationStatus::Completed),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub worker_id: Uuid,
    pub status: ApplicationStatus,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub enum ApplicationCreation {
    Created(Application),
    JobMissing,
    JobNotOpen(JobStatus),
    AlreadyApplied,
}

#[derive(Debug)]
pub enum ApplicationTransition {
    Updated {
        application: Application,
        job_status: JobStatus,
    },
    Missing,
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    JobFull {
        accepted: i64,
        workers_needed: i32,
    },
    JobNotAccepting(JobStatus),
}
