use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "job_status", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Open,
    InProgress,
    Completed,
    Cancelled,
}

impl JobStatus {
    pub fn to_str(&self) -> &str {
        match self {
            JobStatus::Open => "OPEN",
            JobStatus::InProgress => "IN_PROGRESS",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Cancelled => "CANCELLED",
        }
    }

    /// Closed jobs take no new hires. IN_PROGRESS still does, since a slot
    /// frees up whenever an accepted worker is marked completed.
    pub fn accepts_hires(&self) -> bool {
        matches!(self, JobStatus::Open | JobStatus::InProgress)
    }
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Job {
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub title: String,
    pub description: String,
    pub job_type: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub wage_per_day: BigDecimal,
    pub duration: i32,
    pub workers_needed: i32,
    pub required_skills: Vec<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// A job becomes full when its accepted applications reach `workers_needed`.
    pub fn is_full(&self, accepted: i64) -> bool {
        accepted >= i64::from(self.workers_needed)
    }
}

#[derive(Debug, Clone)]
pub struct NewJob {
    pub farmer_id: Uuid,
    pub title: String,
    pub description: String,
    pub job_type: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub wage_per_day: BigDecimal,
    pub duration: i32,
    pub workers_needed: i32,
    pub required_skills: Vec<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Fields a farmer may change on a posted job. `farmer_id` and `status`
/// are deliberately absent.
#[derive(Debug, Clone, Default)]
pub struct JobUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub job_type: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub wage_per_day: Option<BigDecimal>,
    pub duration: Option<i32>,
    pub workers_needed: Option<i32>,
    pub required_skills: Option<Vec<String>>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl JobUpdate {
    /// Merges the patch into `job`. When the worker count drops to the number
    /// already accepted the job is full and moves to IN_PROGRESS.
    pub fn apply_to(self, mut job: Job, accepted: i64) -> Job {
        if let Some(title) = self.title {
            job.title = title;
        }
        if let Some(description) = self.description {
            job.description = description;
        }
        if let Some(job_type) = self.job_type {
            job.job_type = job_type;
        }
        if let Some(location) = self.location {
            job.location = location;
        }
        if self.latitude.is_some() {
            job.latitude = self.latitude;
        }
        if self.longitude.is_some() {
            job.longitude = self.longitude;
        }
        if let Some(wage) = self.wage_per_day {
            job.wage_per_day = wage;
        }
        if let Some(duration) = self.duration {
            job.duration = duration;
        }
        if let Some(skills) = self.required_skills {
            job.required_skills = skills;
        }
        if let Some(start_date) = self.start_date {
            job.start_date = start_date;
        }
        if self.end_date.is_some() {
            job.end_date = self.end_date;
        }
        if let Some(workers_needed) = self.workers_needed {
            job.workers_needed = workers_needed;
            if job.status == JobStatus::Open && job.is_full(accepted) {
                job.status = JobStatus::InProgress;
            }
        }
        job
    }
}

#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub status: Option<JobStatus>,
    pub job_type: Option<String>,
    pub location: Option<String>,
    pub farmer_id: Option<Uuid>,
}

impl JobFilter {
    pub fn matches(&self, job: &Job) -> bool {
        if let Some(status) = self.status {
            if job.status != status {
                return false;
            }
        }
        if let Some(job_type) = &self.job_type {
            if &job.job_type != job_type {
                return false;
            }
        }
        if let Some(location) = &self.location {
            if !job.location.to_lowercase().contains(&location.to_lowercase()) {
                return false;
            }
        }
        if let Some(farmer_id) = self.farmer_id {
            if job.farmer_id != farmer_id {
                return false;
            }
        }
        true
    }

    /// `ILIKE` pattern for the location filter with `%`, `_` and `\` escaped.
    pub fn location_pattern(&self) -> Option<String> {
        self.location.as_ref().map(|location| {
            let escaped = location
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            format!("%{}%", escaped)
        })
    }
}

#[derive(Debug)]
pub enum JobUpdateOutcome {
    Updated(Job),
    Missing,
    /// `workers_needed` can only change while the job is OPEN.
    CapacityLocked(JobStatus),
    CapacityBelowAccepted { accepted: i64 },
}

#[derive(Debug)]
pub enum JobDeletion {
    Deleted,
    Missing,
    HasCommitments(i64),
}
