//! Builds the nested response views (jobs with farmers and applications,
//! applications with jobs and payments, ratings with reviewers) using one
//! batched lookup per table instead of a query per row.

use std::collections::HashMap;

use uuid::Uuid;

use super::error::ServiceError;
use crate::{
    db::MarketStore,
    dtos::{
        applicationdtos::{ApplicationDetailDto, ApplicationViewDto},
        jobdtos::{JobDetailDto, JobWithFarmerDto},
        paymentdtos::PaymentDetailDto,
        ratingdtos::RatingDto,
        userdtos::UserSummaryDto,
    },
    models::{
        applicationmodel::Application, jobmodel::Job, paymentmodel::Payment, ratingmodel::Rating,
    },
};

pub async fn user_summaries(
    db: &dyn MarketStore,
    user_ids: &[Uuid],
) -> Result<HashMap<Uuid, UserSummaryDto>, ServiceError> {
    let mut ids = user_ids.to_vec();
    ids.sort();
    ids.dedup();

    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let users = db.get_users_by_ids(&ids).await?;
    let mut workers: HashMap<_, _> = db
        .get_worker_profiles(&ids)
        .await?
        .into_iter()
        .map(|profile| (profile.user_id, profile))
        .collect();
    let mut farmers: HashMap<_, _> = db
        .get_farmer_profiles(&ids)
        .await?
        .into_iter()
        .map(|profile| (profile.user_id, profile))
        .collect();

    Ok(users
        .iter()
        .map(|user| {
            let summary =
                UserSummaryDto::new(user, workers.remove(&user.id), farmers.remove(&user.id));
            (user.id, summary)
        })
        .collect())
}

async fn payments_by_application(
    db: &dyn MarketStore,
    application_ids: &[Uuid],
) -> Result<HashMap<Uuid, Payment>, ServiceError> {
    if application_ids.is_empty() {
        return Ok(HashMap::new());
    }

    Ok(db
        .get_payments_for_applications(application_ids)
        .await?
        .into_iter()
        .map(|payment| (payment.application_id, payment))
        .collect())
}

/// Jobs with their farmer and every application (worker and payment included).
pub async fn job_details(
    db: &dyn MarketStore,
    jobs: Vec<Job>,
) -> Result<Vec<JobDetailDto>, ServiceError> {
    if jobs.is_empty() {
        return Ok(vec![]);
    }

    let job_ids: Vec<Uuid> = jobs.iter().map(|job| job.id).collect();
    let applications = db.get_applications_for_jobs(&job_ids).await?;

    let application_ids: Vec<Uuid> = applications.iter().map(|a| a.id).collect();
    let mut payments = payments_by_application(db, &application_ids).await?;

    let mut user_ids: Vec<Uuid> = jobs.iter().map(|job| job.farmer_id).collect();
    user_ids.extend(applications.iter().map(|a| a.worker_id));
    let users = user_summaries(db, &user_ids).await?;

    let mut by_job: HashMap<Uuid, Vec<ApplicationViewDto>> = HashMap::new();
    for application in applications {
        let view = ApplicationViewDto {
            worker: users.get(&application.worker_id).cloned(),
            payment: payments.remove(&application.id),
            application,
        };
        by_job.entry(view.application.job_id).or_default().push(view);
    }

    Ok(jobs
        .into_iter()
        .map(|job| JobDetailDto {
            farmer: users.get(&job.farmer_id).cloned(),
            applications: by_job.remove(&job.id).unwrap_or_default(),
            job,
        })
        .collect())
}

pub async fn job_detail(db: &dyn MarketStore, job: Job) -> Result<JobDetailDto, ServiceError> {
    let job_id = job.id;
    job_details(db, vec![job])
        .await?
        .pop()
        .ok_or(ServiceError::JobNotFound(job_id))
}

/// Applications with their job, the job's farmer, the worker and any payment.
pub async fn application_details(
    db: &dyn MarketStore,
    applications: Vec<Application>,
) -> Result<Vec<ApplicationDetailDto>, ServiceError> {
    if applications.is_empty() {
        return Ok(vec![]);
    }

    let mut job_ids: Vec<Uuid> = applications.iter().map(|a| a.job_id).collect();
    job_ids.sort();
    job_ids.dedup();
    let jobs: HashMap<Uuid, Job> = db
        .get_jobs_by_ids(&job_ids)
        .await?
        .into_iter()
        .map(|job| (job.id, job))
        .collect();

    let application_ids: Vec<Uuid> = applications.iter().map(|a| a.id).collect();
    let mut payments = payments_by_application(db, &application_ids).await?;

    let mut user_ids: Vec<Uuid> = applications.iter().map(|a| a.worker_id).collect();
    user_ids.extend(jobs.values().map(|job| job.farmer_id));
    let users = user_summaries(db, &user_ids).await?;

    Ok(applications
        .into_iter()
        .map(|application| ApplicationDetailDto {
            job: jobs.get(&application.job_id).map(|job| JobWithFarmerDto {
                farmer: users.get(&job.farmer_id).cloned(),
                job: job.clone(),
            }),
            worker: users.get(&application.worker_id).cloned(),
            payment: payments.remove(&application.id),
            application,
        })
        .collect())
}

pub async fn application_detail(
    db: &dyn MarketStore,
    application: Application,
) -> Result<ApplicationDetailDto, ServiceError> {
    let application_id = application.id;
    application_details(db, vec![application])
        .await?
        .pop()
        .ok_or(ServiceError::ApplicationNotFound(application_id))
}

pub async fn payment_detail(
    db: &dyn MarketStore,
    payment: Payment,
) -> Result<PaymentDetailDto, ServiceError> {
    let application = match db.get_application_by_id(payment.application_id).await? {
        Some(application) => Some(application_detail(db, application).await?),
        None => None,
    };

    Ok(PaymentDetailDto { payment, application })
}

/// Ratings with their reviewer, and the reviewee when `with_reviewee` is set.
pub async fn rating_views(
    db: &dyn MarketStore,
    ratings: Vec<Rating>,
    with_reviewee: bool,
) -> Result<Vec<RatingDto>, ServiceError> {
    let mut user_ids: Vec<Uuid> = ratings.iter().map(|r| r.reviewer_id).collect();
    if with_reviewee {
        user_ids.extend(ratings.iter().map(|r| r.reviewee_id));
    }
    let users = user_summaries(db, &user_ids).await?;

    Ok(ratings
        .into_iter()
        .map(|rating| RatingDto {
            reviewer: users.get(&rating.reviewer_id).cloned(),
            reviewee: if with_reviewee {
                users.get(&rating.reviewee_id).cloned()
            } else {
                None
            },
            rating,
        })
        .collect())
}
