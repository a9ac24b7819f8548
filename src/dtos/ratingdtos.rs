use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::ratingmodel::Rating;

use super::userdtos::UserSummaryDto;

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpsertRatingDto {
    #[validate(required(message = "Reviewee ID and rating are required"))]
    pub reviewee_id: Option<Uuid>,

    #[validate(
        required(message = "Reviewee ID and rating are required"),
        range(min = 1, max = 5, message = "Rating must be between 1 and 5")
    )]
    pub rating: Option<i32>,

    #[validate(length(max = 1000, message = "Comment must not exceed 1000 characters"))]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingDto {
    #[serde(flatten)]
    pub rating: Rating,
    pub reviewer: Option<UserSummaryDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewee: Option<UserSummaryDto>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserRatingsDto {
    pub ratings: Vec<RatingDto>,
    pub average_rating: f64,
    pub total_ratings: usize,
}
