use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::model::{format_birth_date, User};

/// Public view of a user; the password hash never leaves the domain layer.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub is_email_verified: bool,
    pub is_admin: bool,
    pub date_of_birth: Option<String>,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            is_email_verified: user.is_email_verified,
            is_admin: user.is_admin,
            date_of_birth: user.date_of_birth.map(format_birth_date),
            description: user.description,
            created_at: user.created_at,
        }
    }
}

/// Request body for profile edits. Email is immutable and has no field here.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
    #[serde(default)]
    pub date_of_birth: Option<String>, // YYYY-MM-DD
    #[serde(default)]
    pub description: Option<String>,
}
