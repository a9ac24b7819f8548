use std::sync::Arc;

use uuid::Uuid;

use super::{error::ServiceError, positive_money, require_role, validate_body, views};
use crate::{
    db::MarketStore,
    dtos::paymentdtos::{CreatePaymentDto, PaymentDetailDto},
    models::{
        applicationmodel::Application,
        jobmodel::Job,
        paymentmodel::{Payment, PaymentCreation, PaymentRelease, PaymentStatus, MAX_PAYMENT_AMOUNT},
        usermodel::{User, UserRole},
    },
    utils::decimal::BigDecimalHelpers,
};

#[derive(Debug, Clone)]
pub struct PaymentService {
    db_client: Arc<dyn MarketStore>,
}

impl PaymentService {
    pub fn new(db_client: Arc<dyn MarketStore>) -> Self {
        Self { db_client }
    }

    /// Places the agreed wage for an accepted application into escrow.
    pub async fn create_payment(
        &self,
        farmer: &User,
        body: CreatePaymentDto,
    ) -> Result<PaymentDetailDto, ServiceError> {
        require_role(farmer, UserRole::Farmer, "Only farmers can create payments")?;
        validate_body(&body)?;

        let (Some(application_id), Some(raw_amount)) = (body.application_id, body.amount) else {
            return Err(ServiceError::Validation(
                "Application ID and amount are required".to_string(),
            ));
        };

        if !raw_amount.is_finite() || raw_amount <= 0.0 {
            return Err(ServiceError::Validation(
                "Amount must be a positive number".to_string(),
            ));
        }
        if raw_amount > MAX_PAYMENT_AMOUNT {
            return Err(ServiceError::Validation(
                "Amount cannot exceed ₹10,00,000".to_string(),
            ));
        }
        let amount = positive_money(raw_amount, "Amount must be a positive number")?;

        let (_, job) = self.find_application_with_job(application_id).await?;
        if job.farmer_id != farmer.id {
            return Err(ServiceError::NotOwner(
                "You can only create payments for your own jobs",
            ));
        }

        let payment = match self.db_client.create_payment(application_id, amount).await? {
            PaymentCreation::Created(payment) => payment,
            PaymentCreation::ApplicationMissing => {
                return Err(ServiceError::ApplicationNotFound(application_id))
            }
            PaymentCreation::AlreadyExists => return Err(ServiceError::PaymentExists),
            PaymentCreation::NotAccepted(status) => {
                return Err(ServiceError::ApplicationNotAccepted(status))
            }
            PaymentCreation::AmountMismatch {
                expected,
                wage_per_day,
                duration,
            } => {
                return Err(ServiceError::AmountMismatch {
                    expected: expected.to_money_string(),
                    wage_per_day: wage_per_day.to_money_string(),
                    duration,
                })
            }
        };

        tracing::info!(
            payment_id = %payment.id,
            application_id = %application_id,
            amount = %payment.amount,
            "payment held in escrow"
        );

        views::payment_detail(&*self.db_client, payment).await
    }

    /// Releases an escrowed payment to the worker and settles both profiles.
    pub async fn release_payment(
        &self,
        farmer: &User,
        payment_id: Uuid,
    ) -> Result<PaymentDetailDto, ServiceError> {
        require_role(farmer, UserRole::Farmer, "Only farmers can release payments")?;

        let payment = self.find_payment(payment_id).await?;
        let (_, job) = self.find_application_with_job(payment.application_id).await?;
        if job.farmer_id != farmer.id {
            return Err(ServiceError::NotOwner(
                "You can only release payments for your own jobs",
            ));
        }

        if payment.status != PaymentStatus::HeldInEscrow {
            return Err(ServiceError::PaymentNotInEscrow(payment.status));
        }

        let payment = match self.db_client.release_payment(payment_id).await? {
            PaymentRelease::Released(payment) => payment,
            PaymentRelease::Missing => return Err(ServiceError::PaymentNotFound(payment_id)),
            PaymentRelease::NotInEscrow(status) => {
                return Err(ServiceError::PaymentNotInEscrow(status))
            }
        };

        tracing::info!(
            payment_id = %payment.id,
            application_id = %payment.application_id,
            amount = %payment.amount,
            "payment released"
        );

        views::payment_detail(&*self.db_client, payment).await
    }

    pub async fn get_payment(
        &self,
        caller: &User,
        payment_id: Uuid,
    ) -> Result<PaymentDetailDto, ServiceError> {
        let payment = self.find_payment(payment_id).await?;
        let (application, job) = self.find_application_with_job(payment.application_id).await?;

        if caller.id != application.worker_id && caller.id != job.farmer_id {
            return Err(ServiceError::NotOwner(
                "You do not have permission to view this payment",
            ));
        }

        views::payment_detail(&*self.db_client, payment).await
    }

    async fn find_payment(&self, payment_id: Uuid) -> Result<Payment, ServiceError> {
        self.db_client
            .get_payment_by_id(payment_id)
            .await?
            .ok_or(ServiceError::PaymentNotFound(payment_id))
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
            .ok_or(ServiceError::JobNotFound(application.job_id))?;

        Ok((application, job))
    }
}
