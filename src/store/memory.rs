//! In-memory stores with the same filter, ordering and pagination semantics
//! as the Mongo backend. Test double and storeless development fallback.

use std::collections::HashMap;
use std::sync::RwLock;

use axum::async_trait;
use bson::oid::ObjectId;
use time::OffsetDateTime;

use crate::ads::model::{Ad, AdContent};
use crate::users::model::{NewUser, User, UserUpdate};

use super::{AdFilter, AdStore, StoreError, UserStore};

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
    ads: RwLock<HashMap<String, Ad>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(ad: &Ad, filter: &AdFilter) -> bool {
    if let Some(category) = filter.category {
        if ad.category != category {
            return false;
        }
    }
    if let Some(owner_id) = &filter.owner_id {
        if &ad.created_by != owner_id {
            return false;
        }
    }
    if let Some(search) = &filter.search {
        let needle = search.to_lowercase();
        if !ad.title.to_lowercase().contains(&needle)
            && !ad.description.to_lowercase().contains(&needle)
        {
            return false;
        }
    }
    true
}

/// Newest first; ids (ObjectId hex, monotonic within a process) break ties.
fn newest_first(mut items: Vec<Ad>) -> Vec<Ad> {
    items.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    items
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let stored = User {
            id: ObjectId::new().to_hex(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            is_email_verified: user.is_email_verified,
            is_admin: user.is_admin,
            date_of_birth: user.date_of_birth,
            description: user.description,
            created_at: OffsetDateTime::now_utc(),
        };
        let mut users = self.users.write().expect("users lock poisoned");
        users.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn user_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().expect("users lock poisoned");
        Ok(users.get(id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().expect("users lock poisoned");
        Ok(users.values().find(|user| user.email == email).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let users = self.users.read().expect("users lock poisoned");
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(all)
    }

    async fn update_user(&self, id: &str, update: UserUpdate) -> Result<bool, StoreError> {
        let mut users = self.users.write().expect("users lock poisoned");
        let Some(user) = users.get_mut(id) else {
            return Ok(false);
        };
        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(date) = update.date_of_birth {
            user.date_of_birth = Some(date);
        }
        if let Some(description) = update.description {
            user.description = description;
        }
        if let Some(verified) = update.is_email_verified {
            user.is_email_verified = verified;
        }
        Ok(true)
    }

    async fn delete_user(&self, id: &str) -> Result<bool, StoreError> {
        let mut users = self.users.write().expect("users lock poisoned");
        Ok(users.remove(id).is_some())
    }
}

#[async_trait]
impl AdStore for MemoryStore {
    async fn insert_ad(&self, content: AdContent, created_by: &str) -> Result<Ad, StoreError> {
        let stored = Ad {
            id: ObjectId::new().to_hex(),
            title: content.title,
            description: content.description,
            description_html: content.description_html,
            category: content.category,
            created_by: created_by.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        let mut ads = self.ads.write().expect("ads lock poisoned");
        ads.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn ad_by_id(&self, id: &str) -> Result<Option<Ad>, StoreError> {
        let ads = self.ads.read().expect("ads lock poisoned");
        Ok(ads.get(id).cloned())
    }

    async fn update_ad(&self, id: &str, content: AdContent) -> Result<bool, StoreError> {
        let mut ads = self.ads.write().expect("ads lock poisoned");
        let Some(ad) = ads.get_mut(id) else {
            return Ok(false);
        };
        ad.title = content.title;
        ad.description = content.description;
        ad.description_html = content.description_html;
        ad.category = content.category;
        Ok(true)
    }

    async fn list_ads(
        &self,
        filter: &AdFilter,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Ad>, StoreError> {
        let ads = self.ads.read().expect("ads lock poisoned");
        let matching: Vec<Ad> = ads
            .values()
            .filter(|ad| matches(ad, filter))
            .cloned()
            .collect();
        Ok(newest_first(matching)
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_ads(&self, filter: &AdFilter) -> Result<u64, StoreError> {
        let ads = self.ads.read().expect("ads lock poisoned");
        Ok(ads.values().filter(|ad| matches(ad, filter)).count() as u64)
    }

    async fn delete_ad(&self, id: &str) -> Result<bool, StoreError> {
        let mut ads = self.ads.write().expect("ads lock poisoned");
        Ok(ads.remove(id).is_some())
    }

    async fn delete_ads_by_owner(&self, owner_id: &str) -> Result<u64, StoreError> {
        let mut ads = self.ads.write().expect("ads lock poisoned");
        let before = ads.len();
        ads.retain(|_, ad| ad.created_by != owner_id);
        Ok((before - ads.len()) as u64)
    }
}
