use std::sync::Arc;

use uuid::Uuid;

use super::{error::ServiceError, validate_body, views};
use crate::{
    db::MarketStore,
    dtos::ratingdtos::{RatingDto, UpsertRatingDto, UserRatingsDto},
    models::{ratingmodel::average_rating, usermodel::User},
};

#[derive(Debug, Clone)]
pub struct RatingService {
    db_client: Arc<dyn MarketStore>,
}

impl RatingService {
    pub fn new(db_client: Arc<dyn MarketStore>) -> Self {
        Self { db_client }
    }

    /// Creates or overwrites the caller's rating of another user. The flag
    /// is true when a new rating was created.
    pub async fn upsert_rating(
        &self,
        reviewer: &User,
        body: UpsertRatingDto,
    ) -> Result<(RatingDto, bool), ServiceError> {
        validate_body(&body)?;

        let (Some(reviewee_id), Some(score)) = (body.reviewee_id, body.rating) else {
            return Err(ServiceError::Validation(
                "Reviewee ID and rating are required".to_string(),
            ));
        };

        if reviewee_id == reviewer.id {
            return Err(ServiceError::SelfRating);
        }

        self.db_client
            .get_user(Some(reviewee_id), None, None)
            .await?
            .ok_or(ServiceError::UserNotFound("Reviewee"))?;

        let upsert = self
            .db_client
            .upsert_rating(reviewer.id, reviewee_id, score, body.comment)
            .await?;

        tracing::info!(
            rating_id = %upsert.rating.id,
            reviewer_id = %reviewer.id,
            reviewee_id = %reviewee_id,
            score,
            created = upsert.created,
            "rating saved"
        );

        let view = views::rating_views(&*self.db_client, vec![upsert.rating], true)
            .await?
            .pop()
            .ok_or(ServiceError::UserNotFound("Reviewee"))?;

        Ok((view, upsert.created))
    }

    pub async fn ratings_for_user(&self, user_id: Uuid) -> Result<UserRatingsDto, ServiceError> {
        self.db_client
            .get_user(Some(user_id), None, None)
            .await?
            .ok_or(ServiceError::UserNotFound("User"))?;

        let ratings = self.db_client.get_ratings_for_user(user_id).await?;
        let scores: Vec<i32> = ratings.iter().map(|r| r.rating).collect();

        Ok(UserRatingsDto {
            average_rating: average_rating(&scores),
            total_ratings: ratings.len(),
            ratings: views::rating_views(&*self.db_client, ratings, false).await?,
        })
    }

    pub async fn delete_rating(&self, reviewer: &User, rating_id: Uuid) -> Result<(), ServiceError> {
        let rating = self
            .db_client
            .get_rating_by_id(rating_id)
            .await?
            .ok_or(ServiceError::RatingNotFound(rating_id))?;

        if rating.reviewer_id != reviewer.id {
            return Err(ServiceError::NotOwner("You can only delete your own ratings"));
        }

        self.db_client
            .delete_rating(rating_id)
            .await?
            .ok_or(ServiceError::RatingNotFound(rating_id))?;

        tracing::info!(rating_id = %rating_id, reviewee_id = %rating.reviewee_id, "rating deleted");
        Ok(())
    }
}
