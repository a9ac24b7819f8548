use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::applicationmodel::ApplicationStatus;

/// Upper bound on a single escrow payment, in rupees.
pub const MAX_PAYMENT_AMOUNT: f64 = 1_000_000.0;


#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    HeldInEscrow,
    Released,
    Refunded,
    Failed,
}

impl PaymentStatus {
    pub fn to_str(&self) -> &str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::HeldInEscrow => "HELD_IN_ESCROW",
            PaymentStatus::Released => "RELEASED",
            PaymentStatus::Refunded => "REFUNDED",
            PaymentStatus::Failed => "FAILED",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Payment {
    pub id: Uuid,
    pub application_id: Uuid,
    pub amount: BigDecimal,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub released_at: Option<DateTime<Utc>>,
}

pub fn expected_amount(wage_per_day: &BigDecimal, duration: i32) -> BigDecimal {
    wage_per_day * BigDecimal::from(duration)
}

/// True when `amount` is within one paisa of `expected`.
pub fn amount_matches(amount: &BigDecimal, expected: &BigDecimal) -> bool {
    // 1 * 10^-2
    let tolerance = BigDecimal::new(1.into(), 2);
    (amount - expected).abs() <= tolerance
}

#[derive(Debug)]
pub enum PaymentCreation {
    Created(Payment),
    ApplicationMissing,
    AlreadyExists,
    NotAccepted(ApplicationStatus),
    AmountMismatch {
        expected: BigDecimal,
        wage_per_day: BigDecimal,
        duration: i32,
    },
}

#[derive(Debug)]
pub enum PaymentRelease {
    Released(Payment),
    Missing,
    NotInEscrow(PaymentStatus),
}
