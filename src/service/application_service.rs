use std::sync::Arc;

use uuid::Uuid;

use super::{error::ServiceError, require_role, validate_body, views};
use crate::{
    db::MarketStore,
    dtos::applicationdtos::{ApplicationDetailDto, CreateApplicationDto, UpdateApplicationStatusDto},
    models::{
        applicationmodel::{Application, ApplicationCreation, ApplicationStatus, ApplicationTransition},
        jobmodel::{Job, JobStatus},
        usermodel::{User, UserRole},
    },
};

#[derive(Debug, Clone)]
pub struct ApplicationService {
    db_client: Arc<dyn MarketStore>,
}

impl ApplicationService {
    pub fn new(db_client: Arc<dyn MarketStore>) -> Self {
        Self { db_client }
    }

    pub async fn apply(
        &self,
        worker: &User,
        body: CreateApplicationDto,
    ) -> Result<ApplicationDetailDto, ServiceError> {
        require_role(worker, UserRole::Worker, "Only workers can apply to jobs")?;
        validate_body(&body)?;
        let job_id = body
            .job_id
            .ok_or_else(|| ServiceError::Validation("Job ID is required".to_string()))?;

        let job = self.find_job(job_id).await?;
        if job.status != JobStatus::Open {
            return Err(ServiceError::JobNotOpen(job.status));
        }

        let message = body.message.filter(|m| !m.trim().is_empty());
        let application = match self
            .db_client
            .create_application(job_id, worker.id, message)
            .await?
        {
            ApplicationCreation::Created(application) => application,
            ApplicationCreation::JobMissing => return Err(ServiceError::JobNotFound(job_id)),
            ApplicationCreation::JobNotOpen(status) => return Err(ServiceError::JobNotOpen(status)),
            ApplicationCreation::AlreadyApplied => return Err(ServiceError::AlreadyApplied),
        };

        tracing::info!(
            application_id = %application.id,
            job_id = %job_id,
            worker_id = %worker.id,
            "application submitted"
        );

        views::application_detail(&*self.db_client, application).await
    }

    pub async fn my_applications(&self, worker: &User) -> Result<Vec<ApplicationDetailDto>, ServiceError> {
        require_role(worker, UserRole::Worker, "Only workers can view their applications")?;

        let applications = self.db_client.get_worker_applications(worker.id).await?;
        views::application_details(&*self.db_client, applications).await
    }

    pub async fn get_application(
        &self,
        caller: &User,
        application_id: Uuid,
    ) -> Result<ApplicationDetailDto, ServiceError> {
        let (application, job) = self.find_application_with_job(application_id).await?;

        if caller.id != application.worker_id && caller.id != job.farmer_id {
            return Err(ServiceError::NotOwner(
                "You do not have permission to view this application",
            ));
        }

        views::application_detail(&*self.db_client, application).await
    }

    pub async fn update_status(
        &self,
        farmer: &User,
        application_id: Uuid,
        body: UpdateApplicationStatusDto,
    ) -> Result<ApplicationDetailDto, ServiceError> {
        require_role(farmer, UserRole::Farmer, "Only farmers can update application status")?;

        let target = body
            .status
            .as_deref()
            .and_then(|s| s.parse::<ApplicationStatus>().ok())
            .filter(|s| *s != ApplicationStatus::Pending)
            .ok_or(ServiceError::InvalidStatus)?;

        let (_, job) = self.find_application_with_job(application_id).await?;
        if job.farmer_id != farmer.id {
            return Err(ServiceError::NotOwner(
                "You can only update applications for your own jobs",
            ));
        }

        let application = match self
            .db_client
            .transition_application(application_id, target)
            .await?
        {
            ApplicationTransition::Updated { application, job_status } => {
                tracing::info!(
                    application_id = %application.id,
                    job_id = %application.job_id,
                    status = application.status.to_str(),
                    job_status = job_status.to_str(),
                    "application status changed"
                );
                application
            }
            ApplicationTransition::Missing => {
                return Err(ServiceError::ApplicationNotFound(application_id))
            }
            ApplicationTransition::InvalidTransition { from, to } => {
                return Err(ServiceError::InvalidTransition { from, to })
            }
            ApplicationTransition::JobFull { accepted, workers_needed } => {
                tracing::warn!(
                    job_id = %job.id,
                    accepted,
                    workers_needed,
                    "accept refused, job is full"
                );
                return Err(ServiceError::JobFull { accepted, workers_needed });
            }
            ApplicationTransition::JobNotAccepting(status) => {
                return Err(ServiceError::JobNotAccepting(status))
            }
        };

        views::application_detail(&*self.db_client, application).await
    }

    async fn find_job(&self, job_id: Uuid) -> Result<Job, ServiceError> {
        self.db_client
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))
    }

    async fn find_application_with_job(
        &self,
        application_id: Uuid,
    ) -> Result<(Application, Job), ServiceError> {
        let application = self
            .db_client
            .get_application_by_id(application_id)
            .await?
            .ok_or(ServiceError::ApplicationNotFound(application_id))?;

        let job = self
            .db_client
            .get_job_by_id(application.job_id)
            .await?
            .ok_or(ServiceError::ApplicationNotFound(application_id))?;

        Ok((application, job))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{applicationdb::ApplicationExt, jobdb::JobExt},
        service::testkit,
    };

    fn apply_body(job_id: Uuid) -> CreateApplicationDto {
        CreateApplicationDto {
            job_id: Some(job_id),
            message: Some("I have five seasons of experience".to_string()),
        }
    }

    fn status(value: &str) -> UpdateApplicationStatusDto {
        UpdateApplicationStatusDto {
            status: Some(value.to_string()),
        }
    }

    #[tokio::test]
    async fn worker_applies_once() {
        let db = testkit::store();
        let farmer = testkit::farmer(&db, "Lakshmi").await;
        let worker = testkit::worker(&db, "Ravi").await;
        let job = testkit::open_job(&db, &farmer, 500.0, 5, 2).await;
        let service = ApplicationService::new(db.clone());

        let created = service.apply(&worker, apply_body(job.id)).await.unwrap();
        assert_eq!(created.application.status, ApplicationStatus::Pending);
        assert_eq!(created.job.as_ref().unwrap().job.id, job.id);
        assert_eq!(created.job.as_ref().unwrap().farmer.as_ref().unwrap().id, farmer.id);

        let err = service.apply(&worker, apply_body(job.id)).await.unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyApplied));
        assert_eq!(err.to_string(), "You have already applied to this job");
    }

    #[tokio::test]
    async fn farmers_cannot_apply_and_unknown_jobs_are_404() {
        let db = testkit::store();
        let farmer = testkit::farmer(&db, "Lakshmi").await;
        let worker = testkit::worker(&db, "Ravi").await;
        let job = testkit::open_job(&db, &farmer, 500.0, 5, 2).await;
        let service = ApplicationService::new(db.clone());

        let err = service.apply(&farmer, apply_body(job.id)).await.unwrap_err();
        assert_eq!(err.to_string(), "Only workers can apply to jobs");

        let err = service.apply(&worker, apply_body(Uuid::new_v4())).await.unwrap_err();
        assert!(matches!(err, ServiceError::JobNotFound(_)));

        let err = service
            .apply(&worker, CreateApplicationDto::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Job ID is required");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_applies_create_a_single_application() {
        let db = testkit::store();
        let farmer = testkit::farmer(&db, "Lakshmi").await;
        let worker = testkit::worker(&db, "Ravi").await;
        let job = testkit::open_job(&db, &farmer, 500.0, 5, 2).await;
        let service = Arc::new(ApplicationService::new(db.clone()));
        let job_id = job.id;

        let mut handles = vec![];
        for _ in 0..8 {
            let service = service.clone();
            let worker = worker.clone();
            handles.push(tokio::spawn(async move {
                service.apply(&worker, apply_body(job_id)).await
            }));
        }

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(err) => assert!(matches!(err, ServiceError::AlreadyApplied)),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(db.get_worker_applications(worker.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn accepting_fills_the_job_then_refuses() {
        let db = testkit::store();
        let farmer = testkit::farmer(&db, "Lakshmi").await;
        let job = testkit::open_job(&db, &farmer, 500.0, 5, 2).await;
        let service = ApplicationService::new(db.clone());

        let mut applications = vec![];
        for name in ["Ravi", "Shanthi", "Kiran"] {
            let worker = testkit::worker(&db, name).await;
            let created = service.apply(&worker, apply_body(job.id)).await.unwrap();
            applications.push(created.application.id);
        }

        service
            .update_status(&farmer, applications[0], status("ACCEPTED"))
            .await
            .unwrap();
        assert_eq!(
            db.get_job_by_id(job.id).await.unwrap().unwrap().status,
            JobStatus::Open
        );

        service
            .update_status(&farmer, applications[1], status("ACCEPTED"))
            .await
            .unwrap();
        assert_eq!(
            db.get_job_by_id(job.id).await.unwrap().unwrap().status,
            JobStatus::InProgress
        );

        let err = service
            .update_status(&farmer, applications[2], status("ACCEPTED"))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Job is already full. Cannot accept more applications."
        );
        let third = db.get_application_by_id(applications[2]).await.unwrap().unwrap();
        assert_eq!(third.status, ApplicationStatus::Pending);

        // a full job no longer takes applications
        let late = testkit::worker(&db, "Suma").await;
        let err = service.apply(&late, apply_body(job.id)).await.unwrap_err();
        assert!(matches!(err, ServiceError::JobNotOpen(JobStatus::InProgress)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_accepts_for_last_slot_admit_exactly_one() {
        let db = testkit::store();
        let farmer = testkit::farmer(&db, "Lakshmi").await;
        let job = testkit::open_job(&db, &farmer, 500.0, 5, 1).await;
        let service = Arc::new(ApplicationService::new(db.clone()));

        let mut application_ids = vec![];
        for i in 0..6 {
            let worker = testkit::worker(&db, &format!("Worker {}", i)).await;
            let created = service.apply(&worker, apply_body(job.id)).await.unwrap();
            application_ids.push(created.application.id);
        }

        let mut handles = vec![];
        for application_id in application_ids {
            let service = service.clone();
            let farmer = farmer.clone();
            handles.push(tokio::spawn(async move {
                service
                    .update_status(&farmer, application_id, status("ACCEPTED"))
                    .await
            }));
        }

        let mut accepted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => accepted += 1,
                Err(err) => assert!(matches!(err, ServiceError::JobFull { .. })),
            }
        }

        assert_eq!(accepted, 1);
        let job = db.get_job_by_id(job.id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::InProgress);
    }

    #[tokio::test]
    async fn status_changes_follow_the_lifecycle() {
        let db = testkit::store();
        let farmer = testkit::farmer(&db, "Lakshmi").await;
        let worker = testkit::worker(&db, "Ravi").await;
        let job = testkit::open_job(&db, &farmer, 500.0, 5, 2).await;
        let service = ApplicationService::new(db.clone());

        let application = service.apply(&worker, apply_body(job.id)).await.unwrap().application;

        let err = service
            .update_status(&farmer, application.id, status("COMPLETED"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidTransition { .. }));

        let err = service
            .update_status(&farmer, application.id, status("PENDING"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidStatus));

        let err = service
            .update_status(&farmer, application.id, status("HIRED"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid status");

        let rejected = service
            .update_status(&farmer, application.id, status("REJECTED"))
            .await
            .unwrap();
        assert_eq!(rejected.application.status, ApplicationStatus::Rejected);

        let err = service
            .update_status(&farmer, application.id, status("ACCEPTED"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn accepted_application_can_be_marked_completed_directly() {
        let db = testkit::store();
        let farmer = testkit::farmer(&db, "Lakshmi").await;
        let worker = testkit::worker(&db, "Ravi").await;
        let job = testkit::open_job(&db, &farmer, 500.0, 5, 2).await;
        let service = ApplicationService::new(db.clone());

        let application = service.apply(&worker, apply_body(job.id)).await.unwrap().application;
        service
            .update_status(&farmer, application.id, status("ACCEPTED"))
            .await
            .unwrap();

        let completed = service
            .update_status(&farmer, application.id, status("COMPLETED"))
            .await
            .unwrap();
        assert_eq!(completed.application.status, ApplicationStatus::Completed);
    }

    #[tokio::test]
    async fn completing_a_hire_frees_its_slot() {
        let db = testkit::store();
        let farmer = testkit::farmer(&db, "Lakshmi").await;
        let job = testkit::open_job(&db, &farmer, 500.0, 5, 2).await;
        let service = ApplicationService::new(db.clone());

        let mut applications = vec![];
        for name in ["Ravi", "Shanthi", "Kiran"] {
            let worker = testkit::worker(&db, name).await;
            let created = service.apply(&worker, apply_body(job.id)).await.unwrap();
            applications.push(created.application.id);
        }

        for id in &applications[..2] {
            service
                .update_status(&farmer, *id, status("ACCEPTED"))
                .await
                .unwrap();
        }
        assert_eq!(
            db.get_job_by_id(job.id).await.unwrap().unwrap().status,
            JobStatus::InProgress
        );

        service
            .update_status(&farmer, applications[0], status("COMPLETED"))
            .await
            .unwrap();

        let third = service
            .update_status(&farmer, applications[2], status("ACCEPTED"))
            .await
            .unwrap();
        assert_eq!(third.application.status, ApplicationStatus::Accepted);
        assert_eq!(
            db.get_job_by_id(job.id).await.unwrap().unwrap().status,
            JobStatus::InProgress
        );
    }

    #[tokio::test]
    async fn visibility_is_limited_to_worker_and_job_owner() {
        let db = testkit::store();
        let farmer = testkit::farmer(&db, "Lakshmi").await;
        let other_farmer = testkit::farmer(&db, "Manjunath").await;
        let worker = testkit::worker(&db, "Ravi").await;
        let stranger = testkit::worker(&db, "Kiran").await;
        let job = testkit::open_job(&db, &farmer, 500.0, 5, 2).await;
        let service = ApplicationService::new(db.clone());

        let application = service.apply(&worker, apply_body(job.id)).await.unwrap().application;

        assert!(service.get_application(&worker, application.id).await.is_ok());
        assert!(service.get_application(&farmer, application.id).await.is_ok());

        let err = service.get_application(&stranger, application.id).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "You do not have permission to view this application"
        );

        let err = service
            .update_status(&other_farmer, application.id, status("ACCEPTED"))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "You can only update applications for your own jobs"
        );

        let err = service.get_application(&worker, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::ApplicationNotFound(_)));
    }

    #[tokio::test]
    async fn my_applications_lists_newest_first() {
        let db = testkit::store();
        let farmer = testkit::farmer(&db, "Lakshmi").await;
        let worker = testkit::worker(&db, "Ravi").await;
        let first = testkit::open_job(&db, &farmer, 500.0, 5, 2).await;
        let second = testkit::open_job(&db, &farmer, 450.0, 2, 1).await;
        let service = ApplicationService::new(db.clone());

        service.apply(&worker, apply_body(first.id)).await.unwrap();
        service.apply(&worker, apply_body(second.id)).await.unwrap();

        let mine = service.my_applications(&worker).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].application.job_id, second.id);
        assert_eq!(mine[1].application.job_id, first.id);
    }
}
