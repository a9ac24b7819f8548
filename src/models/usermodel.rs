use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Worker,
    Farmer,
}

impl UserRole {
    pub fn to_str(&self) -> &str {
        match self {
            UserRole::Worker => "WORKER",
            UserRole::Farmer => "FARMER",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub password: String,
    pub role: UserRole,
    pub profile_image: Option<String>,
    pub whatsapp_number: Option<String>,
    pub is_verified: bool,
    pub accepted_terms_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct WorkerProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub skills: Vec<String>,
    pub languages: Vec<String>,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub experience_years: i32,
    pub certifications: Vec<String>,
    pub total_earnings: BigDecimal,
    pub total_jobs: i32,
    pub average_rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct FarmerProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub farm_name: Option<String>,
    pub farm_location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub farm_size: Option<f64>,
    pub crop_types: Vec<String>,
    pub total_spent: BigDecimal,
    pub total_jobs_posted: i32,
    pub average_rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to insert a user together with its role profile.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub password: String,
    pub role: UserRole,
    pub profile_image: Option<String>,
    pub whatsapp_number: Option<String>,
    pub accepted_terms_at: Option<DateTime<Utc>>,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub profile_image: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct WorkerProfileUpdate {
    pub skills: Option<Vec<String>>,
    pub languages: Option<Vec<String>>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub experience_years: Option<i32>,
    pub certifications: Option<Vec<String>>,
}

impl WorkerProfileUpdate {
    pub fn apply_to(self, mut profile: WorkerProfile) -> WorkerProfile {
        if let Some(skills) = self.skills {
            profile.skills = skills;
        }
        if let Some(languages) = self.languages {
            profile.languages = languages;
        }
        if let Some(location) = self.location {
            profile.location = location;
        }
        if self.latitude.is_some() {
            profile.latitude = self.latitude;
        }
        if self.longitude.is_some() {
            profile.longitude = self.longitude;
        }
        if let Some(years) = self.experience_years {
            profile.experience_years = years;
        }
        if let Some(certifications) = self.certifications {
            profile.certifications = certifications;
        }
        profile
    }
}

#[derive(Debug, Clone, Default)]
pub struct FarmerProfileUpdate {
    pub farm_name: Option<String>,
    pub farm_location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub farm_size: Option<f64>,
    pub crop_types: Option<Vec<String>>,
}

impl FarmerProfileUpdate {
    pub fn apply_to(self, mut profile: FarmerProfile) -> FarmerProfile {
        if self.farm_name.is_some() {
            profile.farm_name = self.farm_name;
        }
        if let Some(farm_location) = self.farm_location {
            profile.farm_location = farm_location;
        }
        if self.latitude.is_some() {
            profile.latitude = self.latitude;
        }
        if self.longitude.is_some() {
            profile.longitude = self.longitude;
        }
        if self.farm_size.is_some() {
            profile.farm_size = self.farm_size;
        }
        if let Some(crop_types) = self.crop_types {
            profile.crop_types = crop_types;
        }
        profile
    }
}
