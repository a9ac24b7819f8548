use async_trait::async_trait;
use uuid::Uuid;

use super::{db::DBClient, error::StoreError, jobdb::count_accepted};
use crate::models::{applicationmodel::*, jobmodel::JobStatus};

#[async_trait]
pub trait ApplicationExt {
    /// Inserts a PENDING application while holding a share lock on the job,
    /// so the job cannot leave OPEN between the check and the insert.
    async fn create_application(
        &self,
        job_id: Uuid,
        worker_id: Uuid,
        message: Option<String>,
    ) -> Result<ApplicationCreation, StoreError>;

    async fn get_application_by_id(&self, application_id: Uuid) -> Result<Option<Application>, StoreError>;

    async fn get_worker_applications(&self, worker_id: Uuid) -> Result<Vec<Application>, StoreError>;

    async fn get_applications_for_jobs(&self, job_ids: &[Uuid]) -> Result<Vec<Application>, StoreError>;

    /// Moves an application along its lifecycle. Accepting runs the capacity
    /// check, the update and the IN_PROGRESS flip under the job's row lock.
    async fn transition_application(
        &self,
        application_id: Uuid,
        target: ApplicationStatus,
    ) -> Result<ApplicationTransition, StoreError>;
}

#[async_trait]
impl ApplicationExt for DBClient {
    async fn create_application(
        &self,
        job_id: Uuid,
        worker_id: Uuid,
        message: Option<String>,
    ) -> Result<ApplicationCreation, StoreError> {
        let mut tx = self.pool.begin().await?;

        let job_status: Option<JobStatus> =
            sqlx::query_scalar(r#"SELECT status FROM jobs WHERE id = $1 FOR SHARE"#)
                .bind(job_id)
                .fetch_optional(&mut *tx)
                .await?;

        match job_status {
            None => return Ok(ApplicationCreation::JobMissing),
            Some(JobStatus::Open) => {}
            Some(status) => return Ok(ApplicationCreation::JobNotOpen(status)),
        }

        let inserted = sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications (job_id, worker_id, message)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(job_id)
        .bind(worker_id)
        .bind(&message)
        .fetch_one(&mut *tx)
        .await
        .map_err(StoreError::from);

        let application = match inserted {
            Ok(application) => application,
            Err(err) if err.is_unique_violation() => return Ok(ApplicationCreation::AlreadyApplied),
            Err(err) => return Err(err),
        };

        tx.commit().await?;

        Ok(ApplicationCreation::Created(application))
    }

    async fn get_application_by_id(&self, application_id: Uuid) -> Result<Option<Application>, StoreError> {
        let application = sqlx::query_as::<_, Application>(
            r#"SELECT * FROM applications WHERE id = $1"#,
        )
        .bind(application_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(application)
    }

    async fn get_worker_applications(&self, worker_id: Uuid) -> Result<Vec<Application>, StoreError> {
        let applications = sqlx::query_as::<_, Application>(
            r#"
            SELECT * FROM applications
            WHERE worker_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(worker_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(applications)
    }

    async fn get_applications_for_jobs(&self, job_ids: &[Uuid]) -> Result<Vec<Application>, StoreError> {
        let applications = sqlx::query_as::<_, Application>(
            r#"
            SELECT * FROM applications
            WHERE job_id = ANY($1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(job_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(applications)
    }

    async fn transition_application(
        &self,
        application_id: Uuid,
        target: ApplicationStatus,
    ) -> Result<ApplicationTransition, StoreError> {
        // job_id never changes, so it is safe to read before locking
        let job_id: Option<Uuid> =
            sqlx::query_scalar(r#"SELECT job_id FROM applications WHERE id = $1"#)
                .bind(application_id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(job_id) = job_id else {
            return Ok(ApplicationTransition::Missing);
        };

        let mut tx = self.pool.begin().await?;

        // job row first, then the application: every accept on this job queues here
        let job = sqlx::query_as::<_, (JobStatus, i32)>(
            r#"SELECT status, workers_needed FROM jobs WHERE id = $1 FOR UPDATE"#,
        )
        .bind(job_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((job_status, workers_needed)) = job else {
            return Ok(ApplicationTransition::Missing);
        };

        let application = sqlx::query_as::<_, Application>(
            r#"SELECT * FROM applications WHERE id = $1 FOR UPDATE"#,
        )
        .bind(application_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(application) = application else {
            return Ok(ApplicationTransition::Missing);
        };

        if !application.status.can_transition_to(target) {
            return Ok(ApplicationTransition::InvalidTransition {
                from: application.status,
                to: target,
            });
        }

        if target == ApplicationStatus::Accepted {
            let accepted = count_accepted(&mut tx, job_id).await?;
            if accepted >= i64::from(workers_needed) {
                return Ok(ApplicationTransition::JobFull { accepted, workers_needed });
            }
            if !job_status.accepts_hires() {
                return Ok(ApplicationTransition::JobNotAccepting(job_status));
            }
        }

        let application = sqlx::query_as::<_, Application>(
            r#"
            UPDATE applications
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(application_id)
        .bind(target)
        .fetch_one(&mut *tx)
        .await?;

        let mut job_status = job_status;
        if target == ApplicationStatus::Accepted {
            let accepted = count_accepted(&mut tx, job_id).await?;
            if accepted >= i64::from(workers_needed) {
                job_status = sqlx::query_scalar(
                    r#"
                    UPDATE jobs
                    SET status = $2, updated_at = NOW()
                    WHERE id = $1
                    RETURNING status
                    "#,
                )
                .bind(job_id)
                .bind(JobStatus::InProgress)
                .fetch_one(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        Ok(ApplicationTransition::Updated { application, job_status })
    }
}
