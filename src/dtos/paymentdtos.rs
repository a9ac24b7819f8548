use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::paymentmodel::Payment;

use super::applicationdtos::ApplicationDetailDto;

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct CreatePaymentDto {
    #[validate(required(message = "Application ID and amount are required"))]
    pub application_id: Option<Uuid>,

    #[validate(required(message = "Application ID and amount are required"))]
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentDetailDto {
    #[serde(flatten)]
    pub payment: Payment,
    pub application: Option<ApplicationDetailDto>,
}
