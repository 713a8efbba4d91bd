use tracing::{debug, info, warn};

use crate::errors::{AppError, AppResult};
use crate::state::AppState;

use super::dto::UpdateProfileRequest;
use super::model::{self, User, UserUpdate};

pub async fn get_profile(state: &AppState, user_id: &str) -> AppResult<User> {
    state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn update_profile(
    state: &AppState,
    user_id: &str,
    payload: UpdateProfileRequest,
) -> AppResult<User> {
    model::validate_name(&payload.name)?;
    let description = payload.description.unwrap_or_default();
    model::validate_description(&description)?;
    let date_of_birth = payload
        .date_of_birth
        .as_deref()
        .filter(|raw| !raw.is_empty())
        .map(model::parse_birth_date)
        .transpose()?;

    let updated = state
        .users
        .update(
            user_id,
            UserUpdate {
                name: Some(payload.name.trim().to_string()),
                date_of_birth,
                description: Some(description),
                is_email_verified: None,
            },
        )
        .await?;
    if !updated {
        return Err(AppError::NotFound);
    }
    info!(user_id = %user_id, "profile updated");
    state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::NotFound)
}

/// A user may delete their own account; admins may delete anyone. Owned ads
/// go first, inside the repository cascade.
pub async fn delete_user(state: &AppState, actor_id: &str, target_id: &str) -> AppResult<()> {
    let actor = state
        .users
        .find_by_id(actor_id)
        .await?
        .ok_or(AppError::Unauthorized)?;
    if actor_id != target_id && !actor.is_admin {
        return Err(AppError::Forbidden);
    }
    if !state.users.delete(target_id).await? {
        return Err(AppError::NotFound);
    }
    info!(user_id = %target_id, actor_id = %actor_id, "user deleted");
    Ok(())
}

pub async fn list_users(state: &AppState, actor_id: &str) -> AppResult<Vec<User>> {
    let actor = state
        .users
        .find_by_id(actor_id)
        .await?
        .ok_or(AppError::Unauthorized)?;
    if !actor.is_admin {
        return Err(AppError::Forbidden);
    }
    Ok(state.users.list().await?)
}

/// Startup bootstrap. Store trouble is logged and swallowed so a transient
/// outage cannot crash the process.
pub async fn bootstrap_admin(state: &AppState) {
    let admin = &state.config.admin;
    let (Some(email), Some(password)) = (&admin.email, &admin.password) else {
        debug!("admin bootstrap not configured");
        return;
    };
    match state
        .users
        .create_admin_if_absent(&admin.name, email, password)
        .await
    {
        Ok(Some(user)) => info!(user_id = %user.id, email = %user.email, "admin user created"),
        Ok(None) => debug!("admin user already present"),
        Err(e) => warn!(error = %e, "admin bootstrap skipped"),
    }
}
