use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Rating {
    pub id: Uuid,
    pub reviewer_id: Uuid,
    pub reviewee_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct RatingUpsert {
    pub rating: Rating,
    /// False when an existing (reviewer, reviewee) rating was overwritten.
    pub created: bool,
}

/// Mean of the given scores rounded to two decimals, 0 for none.
pub fn average_rating(scores: &[i32]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let sum: i64 = scores.iter().map(|score| i64::from(*score)).sum();
    let mean = sum as f64 / scores.len() as f64;
    (mean * 100.0).round() / 100.0
}
