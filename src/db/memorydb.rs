//! In-memory store used by the service and router tests.
//!
//! Every write works on a clone of the whole state under one async mutex and
//! swaps it in only when the closure succeeds, so multi-row operations are
//! serialized and all-or-nothing like their Postgres transactions.

use std::collections::HashMap;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Duration, Utc};
use num_traits::Zero;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    applicationdb::ApplicationExt, error::StoreError, jobdb::JobExt, paymentdb::PaymentExt,
    ratingdb::RatingExt, userdb::UserExt,
};
use crate::models::{
    applicationmodel::*, jobmodel::*, paymentmodel::*, ratingmodel::*, usermodel::*,
};

#[derive(Debug, Default, Clone)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    worker_profiles: HashMap<Uuid, WorkerProfile>,
    farmer_profiles: HashMap<Uuid, FarmerProfile>,
    jobs: HashMap<Uuid, Job>,
    applications: HashMap<Uuid, Application>,
    payments: HashMap<Uuid, Payment>,
    ratings: HashMap<Uuid, Rating>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl MemoryState {
    /// Strictly increasing clock so "newest first" is deterministic.
    fn now(&mut self) -> DateTime<Utc> {
        let mut now = Utc::now();
        if let Some(last) = self.last_timestamp {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        self.last_timestamp = Some(now);
        now
    }

    fn accepted_count(&self, job_id: Uuid) -> i64 {
        self.applications
            .values()
            .filter(|a| a.job_id == job_id && a.status == ApplicationStatus::Accepted)
            .count() as i64
    }

    fn recompute_average(&mut self, reviewee_id: Uuid, now: DateTime<Utc>) {
        let scores: Vec<i32> = self
            .ratings
            .values()
            .filter(|r| r.reviewee_id == reviewee_id)
            .map(|r| r.rating)
            .collect();
        let average = average_rating(&scores);

        if let Some(profile) = self.worker_profiles.get_mut(&reviewee_id) {
            profile.average_rating = average;
            profile.updated_at = now;
        }
        if let Some(profile) = self.farmer_profiles.get_mut(&reviewee_id) {
            profile.average_rating = average;
            profile.updated_at = now;
        }
    }

    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.users
            .values()
            .any(|u| u.email.as_deref() == Some(email) && Some(u.id) != except)
    }
}

fn newest_first<T>(items: &mut [T], created_at: impl Fn(&T) -> DateTime<Utc>) {
    items.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
}

#[derive(Debug, Default)]
pub struct MemoryDB {
    state: Mutex<MemoryState>,
}

impl MemoryDB {
    pub fn new() -> Self {
        Self::default()
    }

    async fn read<T>(&self, f: impl FnOnce(&MemoryState) -> T) -> T {
        let state = self.state.lock().await;
        f(&state)
    }

    async fn write<T>(
        &self,
        f: impl FnOnce(&mut MemoryState) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut state = self.state.lock().await;
        let mut draft = state.clone();
        let result = f(&mut draft)?;
        *state = draft;
        Ok(result)
    }

    /// Drops a farmer profile to simulate a broken aggregate row.
    pub async fn remove_farmer_profile(&self, user_id: Uuid) {
        self.state.lock().await.farmer_profiles.remove(&user_id);
    }
}

#[async_trait]
impl UserExt for MemoryDB {
    async fn get_user(
        &self,
        user_id: Option<Uuid>,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, StoreError> {
        Ok(self
            .read(|s| {
                if let Some(user_id) = user_id {
                    s.users.get(&user_id).cloned()
                } else if let Some(phone) = phone {
                    s.users.values().find(|u| u.phone == phone).cloned()
                } else if let Some(email) = email {
                    s.users
                        .values()
                        .find(|u| u.email.as_deref() == Some(email))
                        .cloned()
                } else {
                    None
                }
            })
            .await)
    }

    async fn get_users_by_ids(&self, user_ids: &[Uuid]) -> Result<Vec<User>, StoreError> {
        Ok(self
            .read(|s| user_ids.iter().filter_map(|id| s.users.get(id).cloned()).collect())
            .await)
    }

    async fn save_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        self.write(|s| {
            if s.users.values().any(|u| u.phone == new_user.phone) {
                return Err(StoreError::UniqueViolation("users_phone_key".to_string()));
            }
            if let Some(email) = &new_user.email {
                if s.email_taken(email, None) {
                    return Err(StoreError::UniqueViolation("users_email_key".to_string()));
                }
            }

            let now = s.now();
            let user = User {
                id: Uuid::new_v4(),
                name: new_user.name,
                phone: new_user.phone,
                email: new_user.email,
                password: new_user.password,
                role: new_user.role,
                profile_image: new_user.profile_image,
                whatsapp_number: new_user.whatsapp_number,
                is_verified: false,
                accepted_terms_at: new_user.accepted_terms_at,
                created_at: now,
                updated_at: now,
            };

            match user.role {
                UserRole::Worker => {
                    s.worker_profiles.insert(
                        user.id,
                        WorkerProfile {
                            id: Uuid::new_v4(),
                            user_id: user.id,
                            skills: vec![],
                            languages: vec![],
                            location: new_user.location,
                            latitude: new_user.latitude,
                            longitude: new_user.longitude,
                            experience_years: 0,
                            certifications: vec![],
                            total_earnings: BigDecimal::zero(),
                            total_jobs: 0,
                            average_rating: 0.0,
                            created_at: now,
                            updated_at: now,
                        },
                    );
                }
                UserRole::Farmer => {
                    s.farmer_profiles.insert(
                        user.id,
                        FarmerProfile {
                            id: Uuid::new_v4(),
                            user_id: user.id,
                            farm_name: None,
                            farm_location: new_user.location,
                            latitude: new_user.latitude,
                            longitude: new_user.longitude,
                            farm_size: None,
                            crop_types: vec![],
                            total_spent: BigDecimal::zero(),
                            total_jobs_posted: 0,
                            average_rating: 0.0,
                            created_at: now,
                            updated_at: now,
                        },
                    );
                }
            }

            s.users.insert(user.id, user.clone());
            Ok(user)
        })
        .await
    }

    async fn update_user(&self, user_id: Uuid, update: UserUpdate) -> Result<User, StoreError> {
        self.write(|s| {
            if let Some(email) = &update.email {
                if s.email_taken(email, Some(user_id)) {
                    return Err(StoreError::UniqueViolation("users_email_key".to_string()));
                }
            }
            let now = s.now();
            let user = s
                .users
                .get_mut(&user_id)
                .ok_or(StoreError::NotFound { entity: "User", id: user_id })?;

            if let Some(name) = update.name {
                user.name = name;
            }
            if update.email.is_some() {
                user.email = update.email;
            }
            if update.profile_image.is_some() {
                user.profile_image = update.profile_image;
            }
            user.updated_at = now;
            Ok(user.clone())
        })
        .await
    }

    async fn get_worker_profile(&self, user_id: Uuid) -> Result<Option<WorkerProfile>, StoreError> {
        Ok(self.read(|s| s.worker_profiles.get(&user_id).cloned()).await)
    }

    async fn get_farmer_profile(&self, user_id: Uuid) -> Result<Option<FarmerProfile>, StoreError> {
        Ok(self.read(|s| s.farmer_profiles.get(&user_id).cloned()).await)
    }

    async fn get_worker_profiles(&self, user_ids: &[Uuid]) -> Result<Vec<WorkerProfile>, StoreError> {
        Ok(self
            .read(|s| {
                user_ids
                    .iter()
                    .filter_map(|id| s.worker_profiles.get(id).cloned())
                    .collect()
            })
            .await)
    }

    async fn get_farmer_profiles(&self, user_ids: &[Uuid]) -> Result<Vec<FarmerProfile>, StoreError> {
        Ok(self
            .read(|s| {
                user_ids
                    .iter()
                    .filter_map(|id| s.farmer_profiles.get(id).cloned())
                    .collect()
            })
            .await)
    }

    async fn update_worker_profile(
        &self,
        user_id: Uuid,
        update: WorkerProfileUpdate,
    ) -> Result<WorkerProfile, StoreError> {
        self.write(|s| {
            let now = s.now();
            let current = s
                .worker_profiles
                .remove(&user_id)
                .ok_or(StoreError::NotFound { entity: "Worker profile", id: user_id })?;
            let mut merged = update.apply_to(current);
            merged.updated_at = now;
            s.worker_profiles.insert(user_id, merged.clone());
            Ok(merged)
        })
        .await
    }

    async fn update_farmer_profile(
        &self,
        user_id: Uuid,
        update: FarmerProfileUpdate,
    ) -> Result<FarmerProfile, StoreError> {
        self.write(|s| {
            let now = s.now();
            let current = s
                .farmer_profiles
                .remove(&user_id)
                .ok_or(StoreError::NotFound { entity: "Farmer profile", id: user_id })?;
            let mut merged = update.apply_to(current);
            merged.updated_at = now;
            s.farmer_profiles.insert(user_id, merged.clone());
            Ok(merged)
        })
        .await
    }
}

#[async_trait]
impl JobExt for MemoryDB {
    async fn create_job(&self, new_job: NewJob) -> Result<Job, StoreError> {
        self.write(|s| {
            let now = s.now();
            let job = Job {
                id: Uuid::new_v4(),
                farmer_id: new_job.farmer_id,
                title: new_job.title,
                description: new_job.description,
                job_type: new_job.job_type,
                location: new_job.location,
                latitude: new_job.latitude,
                longitude: new_job.longitude,
                wage_per_day: new_job.wage_per_day,
                duration: new_job.duration,
                workers_needed: new_job.workers_needed,
                required_skills: new_job.required_skills,
                start_date: new_job.start_date,
                end_date: new_job.end_date,
                status: JobStatus::Open,
                created_at: now,
                updated_at: now,
            };

            let profile = s.farmer_profiles.get_mut(&job.farmer_id).ok_or(StoreError::NotFound {
                entity: "Farmer profile",
                id: job.farmer_id,
            })?;
            profile.total_jobs_posted += 1;
            profile.updated_at = now;

            s.jobs.insert(job.id, job.clone());
            Ok(job)
        })
        .await
    }

    async fn get_job_by_id(&self, job_id: Uuid) -> Result<Option<Job>, StoreError> {
        Ok(self.read(|s| s.jobs.get(&job_id).cloned()).await)
    }

    async fn get_jobs_by_ids(&self, job_ids: &[Uuid]) -> Result<Vec<Job>, StoreError> {
        Ok(self
            .read(|s| job_ids.iter().filter_map(|id| s.jobs.get(id).cloned()).collect())
            .await)
    }

    async fn list_jobs(
        &self,
        filter: &JobFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Job>, i64), StoreError> {
        Ok(self
            .read(|s| {
                let mut jobs: Vec<Job> = s.jobs.values().filter(|j| filter.matches(j)).cloned().collect();
                newest_first(&mut jobs, |j| j.created_at);
                let total = jobs.len() as i64;
                let page = jobs
                    .into_iter()
                    .skip(offset.max(0) as usize)
                    .take(limit.max(0) as usize)
                    .collect();
                (page, total)
            })
            .await)
    }

    async fn update_job(&self, job_id: Uuid, update: JobUpdate) -> Result<JobUpdateOutcome, StoreError> {
        self.write(|s| {
            let Some(job) = s.jobs.get(&job_id).cloned() else {
                return Ok(JobUpdateOutcome::Missing);
            };
            let accepted = s.accepted_count(job_id);

            if let Some(workers_needed) = update.workers_needed {
                if job.status != JobStatus::Open && workers_needed != job.workers_needed {
                    return Ok(JobUpdateOutcome::CapacityLocked(job.status));
                }
                if i64::from(workers_needed) < accepted {
                    return Ok(JobUpdateOutcome::CapacityBelowAccepted { accepted });
                }
            }

            let now = s.now();
            let mut merged = update.apply_to(job, accepted);
            merged.updated_at = now;
            s.jobs.insert(job_id, merged.clone());
            Ok(JobUpdateOutcome::Updated(merged))
        })
        .await
    }

    async fn delete_job(&self, job_id: Uuid) -> Result<JobDeletion, StoreError> {
        self.write(|s| {
            if !s.jobs.contains_key(&job_id) {
                return Ok(JobDeletion::Missing);
            }
            let committed = s
                .applications
                .values()
                .filter(|a| {
                    a.job_id == job_id
                        && matches!(a.status, ApplicationStatus::Accepted | ApplicationStatus::Completed)
                })
                .count() as i64;
            if committed > 0 {
                return Ok(JobDeletion::HasCommitments(committed));
            }

            s.jobs.remove(&job_id);
            s.applications.retain(|_, a| a.job_id != job_id);
            Ok(JobDeletion::Deleted)
        })
        .await
    }
}

#[async_trait]
impl ApplicationExt for MemoryDB {
    async fn create_application(
        &self,
        job_id: Uuid,
        worker_id: Uuid,
        message: Option<String>,
    ) -> Result<ApplicationCreation, StoreError> {
        self.write(|s| {
            match s.jobs.get(&job_id).map(|j| j.status) {
                None => return Ok(ApplicationCreation::JobMissing),
                Some(JobStatus::Open) => {}
                Some(status) => return Ok(ApplicationCreation::JobNotOpen(status)),
            }
            if s
                .applications
                .values()
                .any(|a| a.job_id == job_id && a.worker_id == worker_id)
            {
                return Ok(ApplicationCreation::AlreadyApplied);
            }

            let now = s.now();
            let application = Application {
                id: Uuid::new_v4(),
                job_id,
                worker_id,
                status: ApplicationStatus::Pending,
                message,
                created_at: now,
                updated_at: now,
            };
            s.applications.insert(application.id, application.clone());
            Ok(ApplicationCreation::Created(application))
        })
        .await
    }

    async fn get_application_by_id(&self, application_id: Uuid) -> Result<Option<Application>, StoreError> {
        Ok(self.read(|s| s.applications.get(&application_id).cloned()).await)
    }

    async fn get_worker_applications(&self, worker_id: Uuid) -> Result<Vec<Application>, StoreError> {
        Ok(self
            .read(|s| {
                let mut applications: Vec<Application> = s
                    .applications
                    .values()
                    .filter(|a| a.worker_id == worker_id)
                    .cloned()
                    .collect();
                newest_first(&mut applications, |a| a.created_at);
                applications
            })
            .await)
    }

    async fn get_applications_for_jobs(&self, job_ids: &[Uuid]) -> Result<Vec<Application>, StoreError> {
        Ok(self
            .read(|s| {
                let mut applications: Vec<Application> = s
                    .applications
                    .values()
                    .filter(|a| job_ids.contains(&a.job_id))
                    .cloned()
                    .collect();
                newest_first(&mut applications, |a| a.created_at);
                applications
            })
            .await)
    }

    async fn transition_application(
        &self,
        application_id: Uuid,
        target: ApplicationStatus,
    ) -> Result<ApplicationTransition, StoreError> {
        self.write(|s| {
            let Some(application) = s.applications.get(&application_id).cloned() else {
                return Ok(ApplicationTransition::Missing);
            };
            let Some(job) = s.jobs.get(&application.job_id).cloned() else {
                return Ok(ApplicationTransition::Missing);
            };

            if !application.status.can_transition_to(target) {
                return Ok(ApplicationTransition::InvalidTransition {
                    from: application.status,
                    to: target,
                });
            }

            if target == ApplicationStatus::Accepted {
                let accepted = s.accepted_count(job.id);
                if job.is_full(accepted) {
                    return Ok(ApplicationTransition::JobFull {
                        accepted,
                        workers_needed: job.workers_needed,
                    });
                }
                if !job.status.accepts_hires() {
                    return Ok(ApplicationTransition::JobNotAccepting(job.status));
                }
            }

            let now = s.now();
            let mut updated = application;
            updated.status = target;
            updated.updated_at = now;
            s.applications.insert(updated.id, updated.clone());

            let mut job_status = job.status;
            if target == ApplicationStatus::Accepted && job.is_full(s.accepted_count(job.id)) {
                if let Some(stored) = s.jobs.get_mut(&job.id) {
                    stored.status = JobStatus::InProgress;
                    stored.updated_at = now;
                    job_status = stored.status;
                }
            }

            Ok(ApplicationTransition::Updated {
                application: updated,
                job_status,
            })
        })
        .await
    }
}

#[async_trait]
impl PaymentExt for MemoryDB {
    async fn create_payment(
        &self,
        application_id: Uuid,
        amount: BigDecimal,
    ) -> Result<PaymentCreation, StoreError> {
        self.write(|s| {
            let Some(application) = s.applications.get(&application_id).cloned() else {
                return Ok(PaymentCreation::ApplicationMissing);
            };
            let Some(job) = s.jobs.get(&application.job_id).cloned() else {
                return Ok(PaymentCreation::ApplicationMissing);
            };

            if s.payments.values().any(|p| p.application_id == application_id) {
                return Ok(PaymentCreation::AlreadyExists);
            }
            if application.status != ApplicationStatus::Accepted {
                return Ok(PaymentCreation::NotAccepted(application.status));
            }

            let expected = expected_amount(&job.wage_per_day, job.duration);
            if !amount_matches(&amount, &expected) {
                return Ok(PaymentCreation::AmountMismatch {
                    expected,
                    wage_per_day: job.wage_per_day,
                    duration: job.duration,
                });
            }

            let now = s.now();
            let payment = Payment {
                id: Uuid::new_v4(),
                application_id,
                amount: amount.round(2),
                status: PaymentStatus::HeldInEscrow,
                created_at: now,
                updated_at: now,
                released_at: None,
            };
            s.payments.insert(payment.id, payment.clone());
            Ok(PaymentCreation::Created(payment))
        })
        .await
    }

    async fn get_payment_by_id(&self, payment_id: Uuid) -> Result<Option<Payment>, StoreError> {
        Ok(self.read(|s| s.payments.get(&payment_id).cloned()).await)
    }

    async fn get_payments_for_applications(
        &self,
        application_ids: &[Uuid],
    ) -> Result<Vec<Payment>, StoreError> {
        Ok(self
            .read(|s| {
                s.payments
                    .values()
                    .filter(|p| application_ids.contains(&p.application_id))
                    .cloned()
                    .collect()
            })
            .await)
    }

    async fn release_payment(&self, payment_id: Uuid) -> Result<PaymentRelease, StoreError> {
        self.write(|s| {
            let Some(payment) = s.payments.get(&payment_id).cloned() else {
                return Ok(PaymentRelease::Missing);
            };
            if payment.status != PaymentStatus::HeldInEscrow {
                return Ok(PaymentRelease::NotInEscrow(payment.status));
            }

            let now = s.now();

            let mut released = payment.clone();
            released.status = PaymentStatus::Released;
            released.released_at = Some(now);
            released.updated_at = now;
            s.payments.insert(released.id, released.clone());

            let application = s.applications.get_mut(&payment.application_id).ok_or(
                StoreError::NotFound {
                    entity: "Application",
                    id: payment.application_id,
                },
            )?;
            application.status = ApplicationStatus::Completed;
            application.updated_at = now;
            let (worker_id, job_id) = (application.worker_id, application.job_id);

            let worker = s.worker_profiles.get_mut(&worker_id).ok_or(StoreError::NotFound {
                entity: "Worker profile",
                id: worker_id,
            })?;
            worker.total_earnings += &payment.amount;
            worker.total_jobs += 1;
            worker.updated_at = now;

            let farmer_id = s.jobs.get(&job_id).map(|j| j.farmer_id);
            let farmer = farmer_id
                .and_then(|id| s.farmer_profiles.get_mut(&id))
                .ok_or(StoreError::NotFound {
                    entity: "Farmer profile for job",
                    id: job_id,
                })?;
            farmer.total_spent += &payment.amount;
            farmer.updated_at = now;

            Ok(PaymentRelease::Released(released))
        })
        .await
    }
}

#[async_trait]
impl RatingExt for MemoryDB {
    async fn upsert_rating(
        &self,
        reviewer_id: Uuid,
        reviewee_id: Uuid,
        rating: i32,
        comment: Option<String>,
    ) -> Result<RatingUpsert, StoreError> {
        self.write(|s| {
            let now = s.now();
            let existing = s
                .ratings
                .values_mut()
                .find(|r| r.reviewer_id == reviewer_id && r.reviewee_id == reviewee_id);

            let upsert = match existing {
                Some(existing) => {
                    existing.rating = rating;
                    if comment.is_some() {
                        existing.comment = comment;
                    }
                    existing.updated_at = now;
                    RatingUpsert {
                        rating: existing.clone(),
                        created: false,
                    }
                }
                None => {
                    let saved = Rating {
                        id: Uuid::new_v4(),
                        reviewer_id,
                        reviewee_id,
                        rating,
                        comment,
                        created_at: now,
                        updated_at: now,
                    };
                    s.ratings.insert(saved.id, saved.clone());
                    RatingUpsert {
                        rating: saved,
                        created: true,
                    }
                }
            };

            s.recompute_average(reviewee_id, now);
            Ok(upsert)
        })
        .await
    }

    async fn get_rating_by_id(&self, rating_id: Uuid) -> Result<Option<Rating>, StoreError> {
        Ok(self.read(|s| s.ratings.get(&rating_id).cloned()).await)
    }

    async fn get_ratings_for_user(&self, reviewee_id: Uuid) -> Result<Vec<Rating>, StoreError> {
        Ok(self
            .read(|s| {
                let mut ratings: Vec<Rating> = s
                    .ratings
                    .values()
                    .filter(|r| r.reviewee_id == reviewee_id)
                    .cloned()
                    .collect();
                newest_first(&mut ratings, |r| r.created_at);
                ratings
            })
            .await)
    }

    async fn delete_rating(&self, rating_id: Uuid) -> Result<Option<Rating>, StoreError> {
        self.write(|s| {
            let Some(deleted) = s.ratings.remove(&rating_id) else {
                return Ok(None);
            };
            let now = s.now();
            s.recompute_average(deleted.reviewee_id, now);
            Ok(Some(deleted))
        })
        .await
    }
}
