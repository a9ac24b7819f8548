use async_trait::async_trait;
use uuid::Uuid;

use super::{db::DBClient, error::StoreError};
use crate::models::{applicationmodel::ApplicationStatus, jobmodel::*};

#[async_trait]
pub trait JobExt {
    /// Inserts an OPEN job and bumps the farmer's `total_jobs_posted`.
    async fn create_job(&self, new_job: NewJob) -> Result<Job, StoreError>;

    async fn get_job_by_id(&self, job_id: Uuid) -> Result<Option<Job>, StoreError>;

    async fn get_jobs_by_ids(&self, job_ids: &[Uuid]) -> Result<Vec<Job>, StoreError>;

    /// Newest first. Returns the page and the total number of matches.
    async fn list_jobs(
        &self,
        filter: &JobFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Job>, i64), StoreError>;

    async fn update_job(&self, job_id: Uuid, update: JobUpdate) -> Result<JobUpdateOutcome, StoreError>;

    async fn delete_job(&self, job_id: Uuid) -> Result<JobDeletion, StoreError>;
}

#[async_trait]
impl JobExt for DBClient {
    async fn create_job(&self, new_job: NewJob) -> Result<Job, StoreError> {
        let mut tx = self.pool.begin().await?;

        let job = sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (
                farmer_id, title, description, job_type, location, latitude, longitude,
                wage_per_day, duration, workers_needed, required_skills, start_date, end_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(new_job.farmer_id)
        .bind(&new_job.title)
        .bind(&new_job.description)
        .bind(&new_job.job_type)
        .bind(&new_job.location)
        .bind(new_job.latitude)
        .bind(new_job.longitude)
        .bind(&new_job.wage_per_day)
        .bind(new_job.duration)
        .bind(new_job.workers_needed)
        .bind(&new_job.required_skills)
        .bind(new_job.start_date)
        .bind(new_job.end_date)
        .fetch_one(&mut *tx)
        .await?;

        let updated = sqlx::query(
            r#"
            UPDATE farmer_profiles
            SET total_jobs_posted = total_jobs_posted + 1, updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(new_job.farmer_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "Farmer profile",
                id: new_job.farmer_id,
            });
        }

        tx.commit().await?;

        Ok(job)
    }

    async fn get_job_by_id(&self, job_id: Uuid) -> Result<Option<Job>, StoreError> {
        let job = sqlx::query_as::<_, Job>(r#"SELECT * FROM jobs WHERE id = $1"#)
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(job)
    }

    async fn get_jobs_by_ids(&self, job_ids: &[Uuid]) -> Result<Vec<Job>, StoreError> {
        let jobs = sqlx::query_as::<_, Job>(r#"SELECT * FROM jobs WHERE id = ANY($1)"#)
            .bind(job_ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(jobs)
    }

    async fn list_jobs(
        &self,
        filter: &JobFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Job>, i64), StoreError> {
        let location_pattern = filter.location_pattern();

        let jobs = sqlx::query_as::<_, Job>(
            r#"
            SELECT * FROM jobs
            WHERE ($1::job_status IS NULL OR status = $1)
              AND ($2::text IS NULL OR job_type = $2)
              AND ($3::text IS NULL OR location ILIKE $3 ESCAPE '\')
              AND ($4::uuid IS NULL OR farmer_id = $4)
            ORDER BY created_at DESC
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(filter.status)
        .bind(&filter.job_type)
        .bind(&location_pattern)
        .bind(filter.farmer_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM jobs
            WHERE ($1::job_status IS NULL OR status = $1)
              AND ($2::text IS NULL OR job_type = $2)
              AND ($3::text IS NULL OR location ILIKE $3 ESCAPE '\')
              AND ($4::uuid IS NULL OR farmer_id = $4)
            "#,
        )
        .bind(filter.status)
        .bind(&filter.job_type)
        .bind(&location_pattern)
        .bind(filter.farmer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((jobs, total))
    }

    async fn update_job(&self, job_id: Uuid, update: JobUpdate) -> Result<JobUpdateOutcome, StoreError> {
        let mut tx = self.pool.begin().await?;

        let job = match sqlx::query_as::<_, Job>(r#"SELECT * FROM jobs WHERE id = $1 FOR UPDATE"#)
            .bind(job_id)
            .fetch_optional(&mut *tx)
            .await?
        {
            Some(job) => job,
            None => return Ok(JobUpdateOutcome::Missing),
        };

        let accepted = count_accepted(&mut tx, job_id).await?;

        if let Some(workers_needed) = update.workers_needed {
            if job.status != JobStatus::Open && workers_needed != job.workers_needed {
                return Ok(JobUpdateOutcome::CapacityLocked(job.status));
            }
            if i64::from(workers_needed) < accepted {
                return Ok(JobUpdateOutcome::CapacityBelowAccepted { accepted });
            }
        }

        let merged = update.apply_to(job, accepted);

        let job = sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs
            SET title = $2, description = $3, job_type = $4, location = $5, latitude = $6,
                longitude = $7, wage_per_day = $8, duration = $9, workers_needed = $10,
                required_skills = $11, start_date = $12, end_date = $13, status = $14,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(job_id)
        .bind(&merged.title)
        .bind(&merged.description)
        .bind(&merged.job_type)
        .bind(&merged.location)
        .bind(merged.latitude)
        .bind(merged.longitude)
        .bind(&merged.wage_per_day)
        .bind(merged.duration)
        .bind(merged.workers_needed)
        .bind(&merged.required_skills)
        .bind(merged.start_date)
        .bind(merged.end_date)
        .bind(merged.status)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(JobUpdateOutcome::Updated(job))
    }

    async fn delete_job(&self, job_id: Uuid) -> Result<JobDeletion, StoreError> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<Uuid> =
            sqlx::query_scalar(r#"SELECT id FROM jobs WHERE id = $1 FOR UPDATE"#)
                .bind(job_id)
                .fetch_optional(&mut *tx)
                .await?;

        if locked.is_none() {
            return Ok(JobDeletion::Missing);
        }

        let committed: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM applications
            WHERE job_id = $1 AND status IN ($2, $3)
            "#,
        )
        .bind(job_id)
        .bind(ApplicationStatus::Accepted)
        .bind(ApplicationStatus::Completed)
        .fetch_one(&mut *tx)
        .await?;

        if committed > 0 {
            return Ok(JobDeletion::HasCommitments(committed));
        }

        // pending and rejected applications go with the job (ON DELETE CASCADE)
        sqlx::query(r#"DELETE FROM jobs WHERE id = $1"#)
            .bind(job_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(JobDeletion::Deleted)
    }
}

/// Number of ACCEPTED applications for a job, read inside `tx`.
pub(crate) async fn count_accepted(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    job_id: Uuid,
) -> Result<i64, StoreError> {
    let accepted: i64 = sqlx::query_scalar(
        r#"SELECT COUNT(*) FROM applications WHERE job_id = $1 AND status = $2"#,
    )
    .bind(job_id)
    .bind(ApplicationStatus::Accepted)
    .fetch_one(&mut **tx)
    .await?;

    Ok(accepted)
}
