use async_trait::async_trait;
use uuid::Uuid;

use super::{db::DBClient, error::StoreError};
use crate::models::usermodel::*;

#[async_trait]
pub trait UserExt {
    async fn get_user(
        &self,
        user_id: Option<Uuid>,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, StoreError>;

    async fn get_users_by_ids(&self, user_ids: &[Uuid]) -> Result<Vec<User>, StoreError>;

    /// Inserts the user and the profile matching its role in one transaction.
    async fn save_user(&self, new_user: NewUser) -> Result<User, StoreError>;

    async fn update_user(&self, user_id: Uuid, update: UserUpdate) -> Result<User, StoreError>;

    async fn get_worker_profile(&self, user_id: Uuid) -> Result<Option<WorkerProfile>, StoreError>;

    async fn get_farmer_profile(&self, user_id: Uuid) -> Result<Option<FarmerProfile>, StoreError>;

    async fn get_worker_profiles(&self, user_ids: &[Uuid]) -> Result<Vec<WorkerProfile>, StoreError>;

    async fn get_farmer_profiles(&self, user_ids: &[Uuid]) -> Result<Vec<FarmerProfile>, StoreError>;

    async fn update_worker_profile(
        &self,
        user_id: Uuid,
        update: WorkerProfileUpdate,
    ) -> Result<WorkerProfile, StoreError>;

    async fn update_farmer_profile(
        &self,
        user_id: Uuid,
        update: FarmerProfileUpdate,
    ) -> Result<FarmerProfile, StoreError>;
}

#[async_trait]
impl UserExt for DBClient {
    async fn get_user(
        &self,
        user_id: Option<Uuid>,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, StoreError> {
        let mut user: Option<User> = None;

        if let Some(user_id) = user_id {
            user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE id = $1"#)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        } else if let Some(phone) = phone {
            user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE phone = $1"#)
                .bind(phone)
                .fetch_optional(&self.pool)
                .await?;
        } else if let Some(email) = email {
            user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE email = $1"#)
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        }

        Ok(user)
    }

    async fn get_users_by_ids(&self, user_ids: &[Uuid]) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE id = ANY($1)"#)
            .bind(user_ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    async fn save_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, phone, email, password, role, profile_image, whatsapp_number, accepted_terms_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&new_user.name)
        .bind(&new_user.phone)
        .bind(&new_user.email)
        .bind(&new_user.password)
        .bind(new_user.role)
        .bind(&new_user.profile_image)
        .bind(&new_user.whatsapp_number)
        .bind(new_user.accepted_terms_at)
        .fetch_one(&mut *tx)
        .await?;

        match new_user.role {
            UserRole::Worker => {
                sqlx::query(
                    r#"
                    INSERT INTO worker_profiles (user_id, location, latitude, longitude)
                    VALUES ($1, $2, $3, $4)
                    "#,
                )
                .bind(user.id)
                .bind(&new_user.location)
                .bind(new_user.latitude)
                .bind(new_user.longitude)
                .execute(&mut *tx)
                .await?;
            }
            UserRole::Farmer => {
                sqlx::query(
                    r#"
                    INSERT INTO farmer_profiles (user_id, farm_location, latitude, longitude)
                    VALUES ($1, $2, $3, $4)
                    "#,
                )
                .bind(user.id)
                .bind(&new_user.location)
                .bind(new_user.latitude)
                .bind(new_user.longitude)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        Ok(user)
    }

    async fn update_user(&self, user_id: Uuid, update: UserUpdate) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                profile_image = COALESCE($4, profile_image),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(update.name)
        .bind(update.email)
        .bind(update.profile_image)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound { entity: "User", id: user_id })?;

        Ok(user)
    }

    async fn get_worker_profile(&self, user_id: Uuid) -> Result<Option<WorkerProfile>, StoreError> {
        let profile = sqlx::query_as::<_, WorkerProfile>(
            r#"SELECT * FROM worker_profiles WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn get_farmer_profile(&self, user_id: Uuid) -> Result<Option<FarmerProfile>, StoreError> {
        let profile = sqlx::query_as::<_, FarmerProfile>(
            r#"SELECT * FROM farmer_profiles WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn get_worker_profiles(&self, user_ids: &[Uuid]) -> Result<Vec<WorkerProfile>, StoreError> {
        let profiles = sqlx::query_as::<_, WorkerProfile>(
            r#"SELECT * FROM worker_profiles WHERE user_id = ANY($1)"#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(profiles)
    }

    async fn get_farmer_profiles(&self, user_ids: &[Uuid]) -> Result<Vec<FarmerProfile>, StoreError> {
        let profiles = sqlx::query_as::<_, FarmerProfile>(
            r#"SELECT * FROM farmer_profiles WHERE user_id = ANY($1)"#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(profiles)
    }

    async fn update_worker_profile(
        &self,
        user_id: Uuid,
        update: WorkerProfileUpdate,
    ) -> Result<WorkerProfile, StoreError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, WorkerProfile>(
            r#"SELECT * FROM worker_profiles WHERE user_id = $1 FOR UPDATE"#,
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound { entity: "Worker profile", id: user_id })?;

        let merged = update.apply_to(current);

        let profile = sqlx::query_as::<_, WorkerProfile>(
            r#"
            UPDATE worker_profiles
            SET skills = $2, languages = $3, location = $4, latitude = $5, longitude = $6,
                experience_years = $7, certifications = $8, updated_at = NOW()
            WHERE user_id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&merged.skills)
        .bind(&merged.languages)
        .bind(&merged.location)
        .bind(merged.latitude)
        .bind(merged.longitude)
        .bind(merged.experience_years)
        .bind(&merged.certifications)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(profile)
    }

    async fn update_farmer_profile(
        &self,
        user_id: Uuid,
        update: FarmerProfileUpdate,
    ) -> Result<FarmerProfile, StoreError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, FarmerProfile>(
            r#"SELECT * FROM farmer_profiles WHERE user_id = $1 FOR UPDATE"#,
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound { entity: "Farmer profile", id: user_id })?;

        let merged = update.apply_to(current);

        let profile = sqlx::query_as::<_, FarmerProfile>(
            r#"
            UPDATE farmer_profiles
            SET farm_name = $2, farm_location = $3, latitude = $4, longitude = $5,
                farm_size = $6, crop_types = $7, updated_at = NOW()
            WHERE user_id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&merged.farm_name)
        .bind(&merged.farm_location)
        .bind(merged.latitude)
        .bind(merged.longitude)
        .bind(merged.farm_size)
        .bind(&merged.crop_types)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(profile)
    }
}
