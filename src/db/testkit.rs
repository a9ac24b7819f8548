//! Fixtures for the store tests that run against a live Postgres.
//!
//! `connect` returns `None` when `DATABASE_URL` is unset so those tests
//! become no-ops on machines without a database.

use bigdecimal::BigDecimal;
use chrono::{Duration, Utc};
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::{applicationdb::ApplicationExt, db::DBClient, jobdb::JobExt, userdb::UserExt};
use crate::models::{
    applicationmodel::{ApplicationCreation, ApplicationStatus, ApplicationTransition},
    jobmodel::{Job, NewJob},
    usermodel::{NewUser, User, UserRole},
};

pub async fn connect() -> Option<DBClient> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(24)
        .connect(&url)
        .await
        .expect("connect to DATABASE_URL");

    let db = DBClient::new(pool);
    db.migrate().await.expect("run migrations");
    Some(db)
}

pub async fn user(db: &DBClient, name: &str, role: UserRole) -> User {
    db.save_user(NewUser {
        name: name.to_string(),
        phone: format!("9{:09}", Uuid::new_v4().as_u128() % 1_000_000_000),
        email: None,
        password: "not-a-real-hash".to_string(),
        role,
        profile_image: None,
        whatsapp_number: None,
        accepted_terms_at: Some(Utc::now()),
        location: "Mandya".to_string(),
        latitude: None,
        longitude: None,
    })
    .await
    .unwrap()
}

pub async fn farmer(db: &DBClient, name: &str) -> User {
    user(db, name, UserRole::Farmer).await
}

pub async fn worker(db: &DBClient, name: &str) -> User {
    user(db, name, UserRole::Worker).await
}

pub async fn open_job(db: &DBClient, farmer: &User, wage: i64, duration: i32, workers_needed: i32) -> Job {
    db.create_job(NewJob {
        farmer_id: farmer.id,
        title: "Sugarcane cutting".to_string(),
        description: "Cut and load cane for the mill".to_string(),
        job_type: "HARVESTING".to_string(),
        location: "Mandya, Karnataka".to_string(),
        latitude: None,
        longitude: None,
        wage_per_day: BigDecimal::from(wage),
        duration,
        workers_needed,
        required_skills: vec![],
        start_date: Utc::now() + Duration::days(2),
        end_date: None,
    })
    .await
    .unwrap()
}

pub async fn apply(db: &DBClient, job: &Job, worker: &User) -> Uuid {
    match db.create_application(job.id, worker.id, None).await.unwrap() {
        ApplicationCreation::Created(application) => application.id,
        other => panic!("application was not created: {:?}", other),
    }
}

pub async fn accept(db: &DBClient, application_id: Uuid) {
    match db
        .transition_application(application_id, ApplicationStatus::Accepted)
        .await
        .unwrap()
    {
        ApplicationTransition::Updated { .. } => {}
        other => panic!("accept failed: {:?}", other),
    }
}
