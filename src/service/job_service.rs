use std::sync::Arc;

use uuid::Uuid;

use super::{error::ServiceError, positive_money, require_role, validate_body, views};
use crate::{
    db::MarketStore,
    dtos::{
        jobdtos::{CreateJobDto, JobDetailDto, JobListQuery, JobListResponseDto, UpdateJobDto, MISSING_FIELDS},
        PaginationMeta, PaginationQuery,
    },
    models::{
        jobmodel::{Job, JobDeletion, JobFilter, JobUpdate, JobUpdateOutcome, NewJob},
        usermodel::{User, UserRole},
    },
};

const WAGE_MUST_BE_POSITIVE: &str = "Wage per day must be a positive number";

#[derive(Debug, Clone)]
pub struct JobService {
    db_client: Arc<dyn MarketStore>,
}

impl JobService {
    pub fn new(db_client: Arc<dyn MarketStore>) -> Self {
        Self { db_client }
    }

    pub async fn create_job(&self, farmer: &User, body: CreateJobDto) -> Result<JobDetailDto, ServiceError> {
        require_role(farmer, UserRole::Farmer, "Only farmers can create jobs")?;
        validate_body(&body)?;

        let (
            Some(title),
            Some(description),
            Some(job_type),
            Some(location),
            Some(wage_per_day),
            Some(duration),
            Some(workers_needed),
            Some(start_date),
        ) = (
            body.title,
            body.description,
            body.job_type,
            body.location,
            body.wage_per_day,
            body.duration,
            body.workers_needed,
            body.start_date,
        )
        else {
            return Err(ServiceError::Validation(MISSING_FIELDS.to_string()));
        };

        let wage_per_day = positive_money(wage_per_day, WAGE_MUST_BE_POSITIVE)?;
        if let Some(end_date) = body.end_date {
            if end_date < start_date {
                return Err(ServiceError::Validation(
                    "End date cannot be before start date".to_string(),
                ));
            }
        }

        let job = self
            .db_client
            .create_job(NewJob {
                farmer_id: farmer.id,
                title: title.trim().to_string(),
                description,
                job_type,
                location: location.trim().to_string(),
                latitude: body.latitude,
                longitude: body.longitude,
                wage_per_day,
                duration,
                workers_needed,
                required_skills: body.required_skills.unwrap_or_default(),
                start_date,
                end_date: body.end_date,
            })
            .await?;

        tracing::info!(job_id = %job.id, farmer_id = %farmer.id, "job posted");

        views::job_detail(&*self.db_client, job).await
    }

    pub async fn list_jobs(&self, query: JobListQuery) -> Result<JobListResponseDto, ServiceError> {
        let filter = JobFilter {
            status: query.status,
            job_type: non_blank(query.job_type.clone()),
            location: non_blank(query.location.clone()),
            farmer_id: None,
        };

        self.page_of_jobs(&filter, &query.pagination()).await
    }

    pub async fn get_job(&self, job_id: Uuid) -> Result<JobDetailDto, ServiceError> {
        let job = self.find_job(job_id).await?;
        views::job_detail(&*self.db_client, job).await
    }

    pub async fn update_job(
        &self,
        farmer: &User,
        job_id: Uuid,
        body: UpdateJobDto,
    ) -> Result<JobDetailDto, ServiceError> {
        validate_body(&body)?;
        let wage_per_day = body
            .wage_per_day
            .map(|wage| positive_money(wage, WAGE_MUST_BE_POSITIVE))
            .transpose()?;

        let job = self.find_job(job_id).await?;
        if job.farmer_id != farmer.id {
            return Err(ServiceError::NotOwner("You can only update your own jobs"));
        }

        let start_date = body.start_date.unwrap_or(job.start_date);
        if let Some(end_date) = body.end_date.or(job.end_date) {
            if end_date < start_date {
                return Err(ServiceError::Validation(
                    "End date cannot be before start date".to_string(),
                ));
            }
        }

        let update = JobUpdate {
            title: body.title,
            description: body.description,
            job_type: body.job_type,
            location: body.location,
            latitude: body.latitude,
            longitude: body.longitude,
            wage_per_day,
            duration: body.duration,
            workers_needed: body.workers_needed,
            required_skills: body.required_skills,
            start_date: body.start_date,
            end_date: body.end_date,
        };

        let job = match self.db_client.update_job(job_id, update).await? {
            JobUpdateOutcome::Updated(job) => job,
            JobUpdateOutcome::Missing => return Err(ServiceError::JobNotFound(job_id)),
            JobUpdateOutcome::CapacityLocked(status) => return Err(ServiceError::CapacityLocked(status)),
            JobUpdateOutcome::CapacityBelowAccepted { accepted } => {
                return Err(ServiceError::CapacityBelowAccepted { accepted })
            }
        };

        tracing::info!(job_id = %job.id, status = job.status.to_str(), "job updated");

        views::job_detail(&*self.db_client, job).await
    }

    pub async fn delete_job(&self, farmer: &User, job_id: Uuid) -> Result<(), ServiceError> {
        let job = self.find_job(job_id).await?;
        if job.farmer_id != farmer.id {
            return Err(ServiceError::NotOwner("You can only delete your own jobs"));
        }

        match self.db_client.delete_job(job_id).await? {
            JobDeletion::Deleted => {
                tracing::info!(job_id = %job_id, "job deleted");
                Ok(())
            }
            JobDeletion::Missing => Err(ServiceError::JobNotFound(job_id)),
            JobDeletion::HasCommitments(count) => Err(ServiceError::JobHasCommitments(count)),
        }
    }

    pub async fn list_my_jobs(
        &self,
        farmer: &User,
        pagination: PaginationQuery,
    ) -> Result<JobListResponseDto, ServiceError> {
        require_role(farmer, UserRole::Farmer, "Only farmers can view their jobs")?;

        let filter = JobFilter {
            farmer_id: Some(farmer.id),
            ..Default::default()
        };

        self.page_of_jobs(&filter, &pagination).await
    }

    async fn find_job(&self, job_id: Uuid) -> Result<Job, ServiceError> {
        self.db_client
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))
    }

    async fn page_of_jobs(
        &self,
        filter: &JobFilter,
        pagination: &PaginationQuery,
    ) -> Result<JobListResponseDto, ServiceError> {
        let page = pagination.resolve();
        let (jobs, total) = self
            .db_client
            .list_jobs(filter, page.limit, page.offset)
            .await?;

        let pagination = PaginationMeta::new(page, total, jobs.len());
        let jobs = views::job_details(&*self.db_client, jobs).await?;

        Ok(JobListResponseDto { jobs, pagination })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
