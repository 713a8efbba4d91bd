use std::sync::Arc;

use tracing::info;

use crate::auth::password;
use crate::store::{AdStore, StoreError, UserStore};

use super::model::{NewUser, User, UserUpdate};

/// Repository over the `users` collection. Owns email case normalization and
/// the ad cascade on delete.
#[derive(Clone)]
pub struct UserRepository {
    users: Arc<dyn UserStore>,
    ads: Arc<dyn AdStore>,
}

impl UserRepository {
    pub fn new(users: Arc<dyn UserStore>, ads: Arc<dyn AdStore>) -> Self {
        Self { users, ads }
    }

    /// Emails are lowercased here, once, before they reach the store; lookups
    /// fold case the same way so the store only ever does exact matching.
    pub async fn create(&self, mut user: NewUser) -> Result<User, StoreError> {
        user.email = user.email.trim().to_lowercase();
        self.users.insert_user(user).await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        self.users.user_by_id(id).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.users
            .user_by_email(&email.trim().to_lowercase())
            .await
    }

    pub async fn list(&self) -> Result<Vec<User>, StoreError> {
        self.users.list_users().await
    }

    pub async fn update(&self, id: &str, update: UserUpdate) -> Result<bool, StoreError> {
        self.users.update_user(id, update).await
    }

    /// Deletes every ad owned by the user before the user record itself. A
    /// crash between the two steps leaves a re-deletable user with no ads,
    /// never an orphaned ad.
    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let removed = self.ads.delete_ads_by_owner(id).await?;
        if removed > 0 {
            info!(user_id = %id, ads = removed, "cascade deleted owned ads");
        }
        self.users.delete_user(id).await
    }

    /// Idempotent startup bootstrap: no-op when a user with that email
    /// already exists. The created account is a verified admin.
    pub async fn create_admin_if_absent(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> anyhow::Result<Option<User>> {
        if self.find_by_email(email).await?.is_some() {
            return Ok(None);
        }
        let password_hash = password::hash_password(password)?;
        let admin = self
            .create(NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password_hash,
                is_email_verified: true,
                is_admin: true,
                date_of_birth: None,
                description: String::new(),
            })
            .await?;
        Ok(Some(admin))
    }
}
