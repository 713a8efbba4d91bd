//! Document-store contract consumed by the repositories.
//!
//! The traits are deliberately dumb persistence: filtering, ordering and
//! skip/limit, nothing domain-specific. Domain rules (rendering, cascades,
//! case normalization) live in the repositories on top.

use axum::async_trait;
use thiserror::Error;

use crate::ads::model::{Ad, AdContent, Category};
use crate::users::model::{NewUser, User, UserUpdate};

pub mod memory;
pub mod mongo;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document store unavailable: {0}")]
    Unavailable(#[from] mongodb::error::Error),
}

/// Filter over the `ads` collection; clauses are ANDed. `search` is a
/// case-insensitive substring match over title OR description.
#[derive(Debug, Clone, Default)]
pub struct AdFilter {
    pub category: Option<Category>,
    pub search: Option<String>,
    pub owner_id: Option<String>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Assigns an id and `created_at` and returns the stored record.
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;

    /// Malformed ids resolve to `None`, never an error.
    async fn user_by_id(&self, id: &str) -> Result<Option<User>, StoreError>;

    /// Exact match on the stored (lowercased) email.
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    /// Returns whether a record matched.
    async fn update_user(&self, id: &str, update: UserUpdate) -> Result<bool, StoreError>;

    async fn delete_user(&self, id: &str) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait AdStore: Send + Sync {
    async fn insert_ad(&self, content: AdContent, created_by: &str) -> Result<Ad, StoreError>;

    async fn ad_by_id(&self, id: &str) -> Result<Option<Ad>, StoreError>;

    /// Replaces the mutable fields; `id`, `created_by` and `created_at` are
    /// preserved. Returns whether a record matched.
    async fn update_ad(&self, id: &str, content: AdContent) -> Result<bool, StoreError>;

    /// Matching ads ordered by `created_at` descending, id descending as the
    /// tiebreak, with skip/limit applied after ordering.
    async fn list_ads(
        &self,
        filter: &AdFilter,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Ad>, StoreError>;

    /// Count of matching ads before any skip/limit.
    async fn count_ads(&self, filter: &AdFilter) -> Result<u64, StoreError>;

    async fn delete_ad(&self, id: &str) -> Result<bool, StoreError>;

    /// Removes every ad owned by the user; returns how many were deleted.
    async fn delete_ads_by_owner(&self, owner_id: &str) -> Result<u64, StoreError>;
}
