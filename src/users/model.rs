use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::errors::{AppError, AppResult};

pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 100;
pub const DESCRIPTION_MAX: usize = 500;
pub const PASSWORD_MIN: usize = 6;

/// User record as stored in the `users` collection.
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,                       // store-assigned, immutable
    pub name: String,                     // display name
    pub email: String,                    // lowercased, unique across users
    pub password_hash: String,            // argon2 digest, never the raw password
    pub is_email_verified: bool,
    pub is_admin: bool,
    pub date_of_birth: Option<Date>,
    pub description: String,              // free text, may be empty
    pub created_at: OffsetDateTime,       // stamped by the store at insertion
}

/// Payload for user creation; the store assigns `id` and `created_at`.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_email_verified: bool,
    pub is_admin: bool,
    pub date_of_birth: Option<Date>,
    pub description: String,
}

/// Partial update; absent fields are left untouched. `id` and `email` have no
/// update path at all.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub date_of_birth: Option<Date>,
    pub description: Option<String>,
    pub is_email_verified: Option<bool>,
}

pub fn validate_name(name: &str) -> AppResult<()> {
    let len = name.trim().chars().count();
    if !(NAME_MIN..=NAME_MAX).contains(&len) {
        return Err(AppError::validation(format!(
            "name must be between {NAME_MIN} and {NAME_MAX} characters"
        )));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> AppResult<()> {
    if description.chars().count() > DESCRIPTION_MAX {
        return Err(AppError::validation(format!(
            "description must be at most {DESCRIPTION_MAX} characters"
        )));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < PASSWORD_MIN {
        return Err(AppError::validation(format!(
            "password must be at least {PASSWORD_MIN} characters"
        )));
    }
    Ok(())
}

pub fn parse_birth_date(raw: &str) -> AppResult<Date> {
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::validation("date of birth must be YYYY-MM-DD"))
}

pub fn format_birth_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_default()
}
