pub mod application_service;
pub mod error;
pub mod job_service;
pub mod payment_service;
pub mod rating_service;
pub mod views;

use bigdecimal::BigDecimal;
use validator::Validate;

use crate::{
    dtos::validation_message,
    models::usermodel::{User, UserRole},
    utils::decimal::{is_positive, money_from_f64},
};
use error::ServiceError;

pub(crate) fn require_role(
    user: &User,
    role: UserRole,
    message: &'static str,
) -> Result<(), ServiceError> {
    if user.role != role {
        return Err(ServiceError::RoleRequired(message));
    }
    Ok(())
}

pub(crate) fn validate_body<T: Validate>(body: &T) -> Result<(), ServiceError> {
    body.validate()
        .map_err(|e| ServiceError::Validation(validation_message(&e)))
}

pub(crate) fn positive_money(value: f64, message: &str) -> Result<BigDecimal, ServiceError> {
    match money_from_f64(value) {
        Some(amount) if is_positive(&amount) => Ok(amount),
        _ => Err(ServiceError::Validation(message.to_string())),
    }
}
