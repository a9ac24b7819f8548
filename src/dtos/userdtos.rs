use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::usermodel::{
    FarmerProfile, FarmerProfileUpdate, User, UserRole, UserUpdate, WorkerProfile,
    WorkerProfileUpdate,
};

use super::ratingdtos::RatingDto;

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct SignupDto {
    #[validate(
        required(message = "Phone, name, password and role are required"),
        length(min = 1, max = 20, message = "Phone is required")
    )]
    pub phone: Option<String>,

    #[validate(
        required(message = "Phone, name, password and role are required"),
        length(min = 1, max = 100, message = "Name is required")
    )]
    pub name: Option<String>,

    #[validate(email(message = "Email is invalid"))]
    pub email: Option<String>,

    #[validate(
        required(message = "Phone, name, password and role are required"),
        length(min = 8, message = "Password must be at least 8 characters")
    )]
    pub password: Option<String>,

    #[validate(required(message = "Phone, name, password and role are required"))]
    pub role: Option<UserRole>,

    pub profile_image: Option<String>,
    pub whatsapp_number: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    pub accepted_terms: Option<bool>,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct LoginDto {
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterUserDto {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub role: String,
    pub profile_image: Option<String>,
    pub whatsapp_number: Option<String>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FilterUserDto {
    pub fn filter_user(user: &User) -> Self {
        FilterUserDto {
            id: user.id.to_string(),
            name: user.name.to_owned(),
            phone: user.phone.to_owned(),
            email: user.email.to_owned(),
            role: user.role.to_str().to_string(),
            profile_image: user.profile_image.to_owned(),
            whatsapp_number: user.whatsapp_number.to_owned(),
            is_verified: user.is_verified,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Public view of another user, embedded in jobs, applications and ratings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummaryDto {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub role: UserRole,
    pub profile_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_profile: Option<WorkerProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub farmer_profile: Option<FarmerProfile>,
}

impl UserSummaryDto {
    pub fn new(
        user: &User,
        worker_profile: Option<WorkerProfile>,
        farmer_profile: Option<FarmerProfile>,
    ) -> Self {
        UserSummaryDto {
            id: user.id,
            name: user.name.to_owned(),
            phone: user.phone.to_owned(),
            email: user.email.to_owned(),
            role: user.role,
            profile_image: user.profile_image.to_owned(),
            worker_profile,
            farmer_profile,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserLoginResponseDto {
    pub status: String,
    pub token: String,
    pub user: FilterUserDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthDataDto {
    pub user: FilterUserDto,
    pub token: String,
}

/// The caller together with the profile matching their role.
#[derive(Debug, Serialize, Deserialize)]
pub struct MeDto {
    pub user: FilterUserDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_profile: Option<WorkerProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub farmer_profile: Option<FarmerProfile>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PublicUserDto {
    pub user: FilterUserDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_profile: Option<WorkerProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub farmer_profile: Option<FarmerProfile>,
    pub received_ratings: Vec<RatingDto>,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateProfileDto {
    #[validate(length(min = 1, max = 100, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "Email is invalid"))]
    pub email: Option<String>,
    pub profile_image: Option<String>,
}

impl From<UpdateProfileDto> for UserUpdate {
    fn from(dto: UpdateProfileDto) -> Self {
        UserUpdate {
            name: dto.name,
            email: dto.email,
            profile_image: dto.profile_image,
        }
    }
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateWorkerProfileDto {
    pub skills: Option<Vec<String>>,
    pub languages: Option<Vec<String>>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[validate(range(min = 0, max = 80, message = "Experience years must be between 0 and 80"))]
    pub experience_years: Option<i32>,
    pub certifications: Option<Vec<String>>,
}

impl From<UpdateWorkerProfileDto> for WorkerProfileUpdate {
    fn from(dto: UpdateWorkerProfileDto) -> Self {
        WorkerProfileUpdate {
            skills: dto.skills,
            languages: dto.languages,
            location: dto.location,
            latitude: dto.latitude,
            longitude: dto.longitude,
            experience_years: dto.experience_years,
            certifications: dto.certifications,
        }
    }
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateFarmerProfileDto {
    pub farm_name: Option<String>,
    pub farm_location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[validate(range(min = 0.0, message = "Farm size cannot be negative"))]
    pub farm_size: Option<f64>,
    pub crop_types: Option<Vec<String>>,
}

impl From<UpdateFarmerProfileDto> for FarmerProfileUpdate {
    fn from(dto: UpdateFarmerProfileDto) -> Self {
        FarmerProfileUpdate {
            farm_name: dto.farm_name,
            farm_location: dto.farm_location,
            latitude: dto.latitude,
            longitude: dto.longitude,
            farm_size: dto.farm_size,
            crop_types: dto.crop_types,
        }
    }
}
