use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::errors::{AppError, AppResult};
use crate::state::AppState;
use crate::users::model::{self, NewUser, User, UserUpdate};

use super::dto::RegisterRequest;
use super::password;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Registers a new, unverified user and fires off the verification email.
/// Returns a session token pair so the caller is signed in immediately.
pub async fn register(
    state: &AppState,
    mut payload: RegisterRequest,
) -> AppResult<(String, String, User)> {
    payload.email = payload.email.trim().to_lowercase();

    model::validate_name(&payload.name)?;
    if !is_valid_email(&payload.email) {
        return Err(AppError::validation("invalid email address"));
    }
    model::validate_password(&payload.password)?;
    let description = payload.description.unwrap_or_default();
    model::validate_description(&description)?;
    let date_of_birth = payload
        .date_of_birth
        .as_deref()
        .filter(|raw| !raw.is_empty())
        .map(model::parse_birth_date)
        .transpose()?;

    if state.users.find_by_email(&payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(AppError::conflict("email"));
    }

    let password_hash =
        password::hash_password(&payload.password).map_err(|e| AppError::internal(e.to_string()))?;

    let user = state
        .users
        .create(NewUser {
            name: payload.name.trim().to_string(),
            email: payload.email,
            password_hash,
            is_email_verified: false,
            is_admin: false,
            date_of_birth,
            description,
        })
        .await?;

    send_verification_email(state, &user).await;

    let access_token = state
        .jwt
        .sign_access(&user.id)
        .map_err(|e| AppError::internal(e.to_string()))?;
    let refresh_token = state
        .jwt
        .sign_refresh(&user.id)
        .map_err(|e| AppError::internal(e.to_string()))?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((access_token, refresh_token, user))
}

pub async fn login(state: &AppState, email: &str, password: &str) -> AppResult<(String, String, User)> {
    let user = state
        .users
        .find_by_email(email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !password::verify_password(password, &user.password_hash) {
        warn!(user_id = %user.id, "login with invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let access_token = state
        .jwt
        .sign_access(&user.id)
        .map_err(|e| AppError::internal(e.to_string()))?;
    let refresh_token = state
        .jwt
        .sign_refresh(&user.id)
        .map_err(|e| AppError::internal(e.to_string()))?;

    info!(user_id = %user.id, "user logged in");
    Ok((access_token, refresh_token, user))
}

pub async fn refresh(state: &AppState, refresh_token: &str) -> AppResult<(String, String, User)> {
    let claims = state
        .jwt
        .verify_refresh(refresh_token)
        .map_err(|_| AppError::Unauthorized)?;
    let user = state
        .users
        .find_by_id(&claims.sub)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let access_token = state
        .jwt
        .sign_access(&user.id)
        .map_err(|e| AppError::internal(e.to_string()))?;
    let refresh_token = state
        .jwt
        .sign_refresh(&user.id)
        .map_err(|e| AppError::internal(e.to_string()))?;
    Ok((access_token, refresh_token, user))
}

/// Fire-and-forget: a mail failure is logged and never propagated, so the
/// registration that triggered it cannot roll back on a down SMTP server.
pub async fn send_verification_email(state: &AppState, user: &User) {
    let token = match state.verification.issue(&user.id) {
        Ok(token) => token,
        Err(e) => {
            warn!(user_id = %user.id, error = %e, "failed to issue verification token");
            return;
        }
    };
    let link = format!(
        "{}/api/v1/auth/verify/{}",
        state.config.public_base_url.trim_end_matches('/'),
        token
    );
    let body = format!(
        "Hi {},\n\n\
         Welcome to Student Market! Please confirm your email address by\n\
         opening the link below within the next hour:\n\n\
         {}\n\n\
         If you did not create an account, you can ignore this message.\n",
        user.name, link
    );
    if let Err(e) = state
        .mailer
        .send(&user.email, "Confirm your Student Market account", &body)
        .await
    {
        warn!(user_id = %user.id, error = %e, "failed to send verification email");
    }
}

/// Resends the verification link for a signed-in user. Returns `false` when
/// the address is already verified and nothing was sent.
pub async fn resend_verification(state: &AppState, user_id: &str) -> AppResult<bool> {
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    if user.is_email_verified {
        return Ok(false);
    }
    send_verification_email(state, &user).await;
    Ok(true)
}

/// Redeems a verification link and flips the user's flag. Re-verifying an
/// already verified account is a no-op success, which also makes token
/// replay harmless.
pub async fn verify_email(state: &AppState, token: &str) -> AppResult<User> {
    let user_id = state.verification.redeem(token)?;
    let user = state
        .users
        .find_by_id(&user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    if user.is_email_verified {
        return Ok(user);
    }
    state
        .users
        .update(
            &user.id,
            UserUpdate {
                is_email_verified: Some(true),
                ..Default::default()
            },
        )
        .await?;
    info!(user_id = %user.id, "email verified");
    Ok(User {
        is_email_verified: true,
        ..user
    })
}
