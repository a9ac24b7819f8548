use async_trait::async_trait;
use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::{db::DBClient, error::StoreError};
use crate::models::{applicationmodel::ApplicationStatus, paymentmodel::*};

#[async_trait]
pub trait PaymentExt {
    /// Creates a HELD_IN_ESCROW payment after re-checking, under the
    /// application's row lock, that no payment exists, the application is
    /// ACCEPTED and the amount matches the job's wage times duration.
    async fn create_payment(
        &self,
        application_id: Uuid,
        amount: BigDecimal,
    ) -> Result<PaymentCreation, StoreError>;

    async fn get_payment_by_id(&self, payment_id: Uuid) -> Result<Option<Payment>, StoreError>;

    async fn get_payments_for_applications(
        &self,
        application_ids: &[Uuid],
    ) -> Result<Vec<Payment>, StoreError>;

    /// Releases an escrowed payment: payment RELEASED, application COMPLETED,
    /// worker earnings and job count, farmer spend. All or nothing.
    async fn release_payment(&self, payment_id: Uuid) -> Result<PaymentRelease, StoreError>;
}

#[async_trait]
impl PaymentExt for DBClient {
    async fn create_payment(
        &self,
        application_id: Uuid,
        amount: BigDecimal,
    ) -> Result<PaymentCreation, StoreError> {
        let mut tx = self.pool.begin().await?;

        let terms = sqlx::query_as::<_, (ApplicationStatus, BigDecimal, i32)>(
            r#"
            SELECT a.status, j.wage_per_day, j.duration
            FROM applications a
            JOIN jobs j ON j.id = a.job_id
            WHERE a.id = $1
            FOR UPDATE OF a
            "#,
        )
        .bind(application_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((status, wage_per_day, duration)) = terms else {
            return Ok(PaymentCreation::ApplicationMissing);
        };

        let existing: bool = sqlx::query_scalar(
            r#"SELECT EXISTS (SELECT 1 FROM payments WHERE application_id = $1)"#,
        )
        .bind(application_id)
        .fetch_one(&mut *tx)
        .await?;

        if existing {
            return Ok(PaymentCreation::AlreadyExists);
        }

        if status != ApplicationStatus::Accepted {
            return Ok(PaymentCreation::NotAccepted(status));
        }

        let expected = expected_amount(&wage_per_day, duration);
        if !amount_matches(&amount, &expected) {
            return Ok(PaymentCreation::AmountMismatch {
                expected,
                wage_per_day,
                duration,
            });
        }

        let inserted = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (application_id, amount, status)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(application_id)
        .bind(&amount)
        .bind(PaymentStatus::HeldInEscrow)
        .fetch_one(&mut *tx)
        .await
        .map_err(StoreError::from);

        let payment = match inserted {
            Ok(payment) => payment,
            Err(err) if err.is_unique_violation() => return Ok(PaymentCreation::AlreadyExists),
            Err(err) => return Err(err),
        };

        tx.commit().await?;

        Ok(PaymentCreation::Created(payment))
    }

    async fn get_payment_by_id(&self, payment_id: Uuid) -> Result<Option<Payment>, StoreError> {
        let payment = sqlx::query_as::<_, Payment>(r#"SELECT * FROM payments WHERE id = $1"#)
            .bind(payment_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(payment)
    }

    async fn get_payments_for_applications(
        &self,
        application_ids: &[Uuid],
    ) -> Result<Vec<Payment>, StoreError> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"SELECT * FROM payments WHERE application_id = ANY($1)"#,
        )
        .bind(application_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    async fn release_payment(&self, payment_id: Uuid) -> Result<PaymentRelease, StoreError> {
        let mut tx = self.pool.begin().await?;

        let payment = sqlx::query_as::<_, Payment>(
            r#"SELECT * FROM payments WHERE id = $1 FOR UPDATE"#,
        )
        .bind(payment_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(payment) = payment else {
            return Ok(PaymentRelease::Missing);
        };

        if payment.status != PaymentStatus::HeldInEscrow {
            return Ok(PaymentRelease::NotInEscrow(payment.status));
        }

        // 1. payment
        let released = sqlx::query_as::<_, Payment>(
            r#"
            UPDATE payments
            SET status = $2, released_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(payment_id)
        .bind(PaymentStatus::Released)
        .fetch_one(&mut *tx)
        .await?;

        // 2. application
        let (worker_id, job_id) = sqlx::query_as::<_, (Uuid, Uuid)>(
            r#"
            UPDATE applications
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING worker_id, job_id
            "#,
        )
        .bind(payment.application_id)
        .bind(ApplicationStatus::Completed)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound {
            entity: "Application",
            id: payment.application_id,
        })?;

        // 3. worker aggregates
        let worker = sqlx::query(
            r#"
            UPDATE worker_profiles
            SET total_earnings = total_earnings + $2,
                total_jobs = total_jobs + 1,
                updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(worker_id)
        .bind(&payment.amount)
        .execute(&mut *tx)
        .await?;

        if worker.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "Worker profile",
                id: worker_id,
            });
        }

        // 4. farmer spend
        let farmer = sqlx::query(
            r#"
            UPDATE farmer_profiles
            SET total_spent = total_spent + $2, updated_at = NOW()
            WHERE user_id = (SELECT farmer_id FROM jobs WHERE id = $1)
            "#,
        )
        .bind(job_id)
        .bind(&payment.amount)
        .execute(&mut *tx)
        .await?;

        if farmer.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "Farmer profile for job",
                id: job_id,
            });
        }

        tx.commit().await?;

        Ok(PaymentRelease::Released(released))
    }
}
