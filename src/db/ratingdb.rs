use async_trait::async_trait;
use sqlx::{FromRow, Row};
use uuid::Uuid;

use super::{db::DBClient, error::StoreError};
use crate::models::ratingmodel::*;

#[async_trait]
pub trait RatingExt {
    /// Inserts or overwrites the reviewer's rating of the reviewee and
    /// recomputes the reviewee's average in the same transaction.
    async fn upsert_rating(
        &self,
        reviewer_id: Uuid,
        reviewee_id: Uuid,
        rating: i32,
        comment: Option<String>,
    ) -> Result<RatingUpsert, StoreError>;

    async fn get_rating_by_id(&self, rating_id: Uuid) -> Result<Option<Rating>, StoreError>;

    /// Ratings received by a user, newest first.
    async fn get_ratings_for_user(&self, reviewee_id: Uuid) -> Result<Vec<Rating>, StoreError>;

    /// Deletes the rating and recomputes the reviewee's average.
    async fn delete_rating(&self, rating_id: Uuid) -> Result<Option<Rating>, StoreError>;
}

/// Locks the reviewee's profile row. Rating writes for one reviewee queue here,
/// so each recompute starts after the previous writer has committed.
async fn lock_reviewee(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    reviewee_id: Uuid,
) -> Result<(), StoreError> {
    sqlx::query(r#"SELECT 1 FROM worker_profiles WHERE user_id = $1 FOR UPDATE"#)
        .bind(reviewee_id)
        .fetch_optional(&mut **tx)
        .await?;

    sqlx::query(r#"SELECT 1 FROM farmer_profiles WHERE user_id = $1 FOR UPDATE"#)
        .bind(reviewee_id)
        .fetch_optional(&mut **tx)
        .await?;

    Ok(())
}

/// Rewrites `average_rating` on whichever profile the user owns.
async fn recompute_average(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    reviewee_id: Uuid,
) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        UPDATE worker_profiles
        SET average_rating = COALESCE(
                (SELECT ROUND(AVG(rating)::numeric, 2) FROM ratings WHERE reviewee_id = $1), 0
            )::float8,
            updated_at = NOW()
        WHERE user_id = $1
        "#,
    )
    .bind(reviewee_id)
    .execute(&mut **tx)
    .await?;

    sqlx::query(
        r#"
        UPDATE farmer_profiles
        SET average_rating = COALESCE(
                (SELECT ROUND(AVG(rating)::numeric, 2) FROM ratings WHERE reviewee_id = $1), 0
            )::float8,
            updated_at = NOW()
        WHERE user_id = $1
        "#,
    )
    .bind(reviewee_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

#[async_trait]
impl RatingExt for DBClient {
    async fn upsert_rating(
        &self,
        reviewer_id: Uuid,
        reviewee_id: Uuid,
        rating: i32,
        comment: Option<String>,
    ) -> Result<RatingUpsert, StoreError> {
        let mut tx = self.pool.begin().await?;

        lock_reviewee(&mut tx, reviewee_id).await?;

        // xmax is 0 only for freshly inserted rows
        let row = sqlx::query(
            r#"
            INSERT INTO ratings (reviewer_id, reviewee_id, rating, comment)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (reviewer_id, reviewee_id) DO UPDATE
            SET rating = EXCLUDED.rating,
                comment = COALESCE(EXCLUDED.comment, ratings.comment),
                updated_at = NOW()
            RETURNING *, (xmax = 0) AS inserted
            "#,
        )
        .bind(reviewer_id)
        .bind(reviewee_id)
        .bind(rating)
        .bind(&comment)
        .fetch_one(&mut *tx)
        .await?;

        let saved = Rating::from_row(&row)?;
        let created: bool = row.try_get("inserted")?;

        recompute_average(&mut tx, reviewee_id).await?;

        tx.commit().await?;

        Ok(RatingUpsert { rating: saved, created })
    }

    async fn get_rating_by_id(&self, rating_id: Uuid) -> Result<Option<Rating>, StoreError> {
        let rating = sqlx::query_as::<_, Rating>(r#"SELECT * FROM ratings WHERE id = $1"#)
            .bind(rating_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(rating)
    }

    async fn get_ratings_for_user(&self, reviewee_id: Uuid) -> Result<Vec<Rating>, StoreError> {
        let ratings = sqlx::query_as::<_, Rating>(
            r#"
            SELECT * FROM ratings
            WHERE reviewee_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(reviewee_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ratings)
    }

    async fn delete_rating(&self, rating_id: Uuid) -> Result<Option<Rating>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let reviewee_id: Option<Uuid> =
            sqlx::query_scalar(r#"SELECT reviewee_id FROM ratings WHERE id = $1"#)
                .bind(rating_id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(reviewee_id) = reviewee_id else {
            return Ok(None);
        };

        lock_reviewee(&mut tx, reviewee_id).await?;

        let deleted = sqlx::query_as::<_, Rating>(
            r#"DELETE FROM ratings WHERE id = $1 RETURNING *"#,
        )
        .bind(rating_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(deleted) = deleted else {
            return Ok(None);
        };

        recompute_average(&mut tx, deleted.reviewee_id).await?;

        tx.commit().await?;

        Ok(Some(deleted))
    }
}
