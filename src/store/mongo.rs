//! MongoDB-backed stores over the `users` and `ads` collections.

use anyhow::Context;
use axum::async_trait;
use bson::{doc, oid::ObjectId, Document};
use futures::TryStreamExt;
use mongodb::{options::FindOptions, Client, Collection};
use serde::{Deserialize, Serialize};

use crate::ads::model::{Ad, AdContent, Category};
use crate::users::model::{format_birth_date, parse_birth_date, NewUser, User, UserUpdate};

use super::{AdFilter, AdStore, StoreError, UserStore};

pub struct MongoStore {
    users: Collection<UserDoc>,
    ads: Collection<AdDoc>,
}

impl MongoStore {
    pub async fn connect(uri: &str, db_name: &str) -> anyhow::Result<Self> {
        let client = Client::with_uri_str(uri).await.context("connect to mongodb")?;
        let db = client.database(db_name);
        Ok(Self {
            users: db.collection("users"),
            ads: db.collection("ads"),
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct UserDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    name: String,
    email: String,
    password_hash: String,
    #[serde(default)]
    is_email_verified: bool,
    #[serde(default)]
    is_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dob: Option<String>,
    #[serde(default)]
    description: String,
    created_at: bson::DateTime,
}

impl UserDoc {
    fn from_new(user: NewUser) -> Self {
        Self {
            id: None,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            is_email_verified: user.is_email_verified,
            is_admin: user.is_admin,
            dob: user.date_of_birth.map(format_birth_date),
            description: user.description,
            created_at: bson::DateTime::now(),
        }
    }

    fn into_user(self) -> User {
        User {
            id: self.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            is_email_verified: self.is_email_verified,
            is_admin: self.is_admin,
            date_of_birth: self.dob.as_deref().and_then(|raw| parse_birth_date(raw).ok()),
            description: self.description,
            created_at: self.created_at.to_time_0_3(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct AdDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    title: String,
    description: String,
    #[serde(default)]
    description_html: String,
    category: String,
    created_by: String,
    created_at: bson::DateTime,
}

impl AdDoc {
    fn from_content(content: AdContent, created_by: &str) -> Self {
        Self {
            id: None,
            title: content.title,
            description: content.description,
            description_html: content.description_html,
            category: content.category.as_str().to_string(),
            created_by: created_by.to_string(),
            created_at: bson::DateTime::now(),
        }
    }

    fn into_ad(self) -> Ad {
        Ad {
            id: self.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            title: self.title,
            description: self.description,
            description_html: self.description_html,
            category: Category::parse(&self.category).unwrap_or(Category::Other),
            created_by: self.created_by,
            created_at: self.created_at.to_time_0_3(),
        }
    }
}

/// Builds the query document for an [`AdFilter`]. Search input is
/// regex-escaped so it matches as a literal substring.
fn ad_query(filter: &AdFilter) -> Document {
    let mut query = Document::new();
    if let Some(category) = filter.category {
        query.insert("category", category.as_str());
    }
    if let Some(owner_id) = &filter.owner_id {
        query.insert("created_by", owner_id.as_str());
    }
    if let Some(search) = &filter.search {
        let pattern = regex::escape(search);
        query.insert(
            "$or",
            vec![
                doc! { "title": { "$regex": pattern.as_str(), "$options": "i" } },
                doc! { "description": { "$regex": pattern.as_str(), "$options": "i" } },
            ],
        );
    }
    query
}

fn newest_first() -> Document {
    doc! { "created_at": -1, "_id": -1 }
}

#[async_trait]
impl UserStore for MongoStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut doc = UserDoc::from_new(user);
        let result = self.users.insert_one(&doc, None).await?;
        doc.id = result.inserted_id.as_object_id();
        Ok(doc.into_user())
    }

    async fn user_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        let doc = self.users.find_one(doc! { "_id": oid }, None).await?;
        Ok(doc.map(UserDoc::into_user))
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let doc = self.users.find_one(doc! { "email": email }, None).await?;
        Ok(doc.map(UserDoc::into_user))
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let options = FindOptions::builder().sort(newest_first()).build();
        let docs: Vec<UserDoc> = self.users.find(doc! {}, options).await?.try_collect().await?;
        Ok(docs.into_iter().map(UserDoc::into_user).collect())
    }

    async fn update_user(&self, id: &str, update: UserUpdate) -> Result<bool, StoreError> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(false);
        };
        let mut set = Document::new();
        if let Some(name) = update.name {
            set.insert("name", name);
        }
        if let Some(date) = update.date_of_birth {
            set.insert("dob", format_birth_date(date));
        }
        if let Some(description) = update.description {
            set.insert("description", description);
        }
        if let Some(verified) = update.is_email_verified {
            set.insert("is_email_verified", verified);
        }
        if set.is_empty() {
            return self.user_by_id(id).await.map(|user| user.is_some());
        }
        let result = self
            .users
            .update_one(doc! { "_id": oid }, doc! { "$set": set }, None)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_user(&self, id: &str) -> Result<bool, StoreError> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(false);
        };
        let result = self.users.delete_one(doc! { "_id": oid }, None).await?;
        Ok(result.deleted_count > 0)
    }
}

#[async_trait]
impl AdStore for MongoStore {
    async fn insert_ad(&self, content: AdContent, created_by: &str) -> Result<Ad, StoreError> {
        let mut doc = AdDoc::from_content(content, created_by);
        let result = self.ads.insert_one(&doc, None).await?;
        doc.id = result.inserted_id.as_object_id();
        Ok(doc.into_ad())
    }

    async fn ad_by_id(&self, id: &str) -> Result<Option<Ad>, StoreError> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        let doc = self.ads.find_one(doc! { "_id": oid }, None).await?;
        Ok(doc.map(AdDoc::into_ad))
    }

    async fn update_ad(&self, id: &str, content: AdContent) -> Result<bool, StoreError> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(false);
        };
        let set = doc! {
            "title": content.title,
            "description": content.description,
            "description_html": content.description_html,
            "category": content.category.as_str(),
        };
        let result = self
            .ads
            .update_one(doc! { "_id": oid }, doc! { "$set": set }, None)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn list_ads(
        &self,
        filter: &AdFilter,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Ad>, StoreError> {
        let options = FindOptions::builder()
            .sort(newest_first())
            .skip(skip)
            .limit(limit as i64)
            .build();
        let docs: Vec<AdDoc> = self
            .ads
            .find(ad_query(filter), options)
            .await?
            .try_collect()
            .await?;
        Ok(docs.into_iter().map(AdDoc::into_ad).collect())
    }

    async fn count_ads(&self, filter: &AdFilter) -> Result<u64, StoreError> {
        Ok(self.ads.count_documents(ad_query(filter), None).await?)
    }

    async fn delete_ad(&self, id: &str) -> Result<bool, StoreError> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(false);
        };
        let result = self.ads.delete_one(doc! { "_id": oid }, None).await?;
        Ok(result.deleted_count > 0)
    }

    async fn delete_ads_by_owner(&self, owner_id: &str) -> Result<u64, StoreError> {
        let result = self
            .ads
            .delete_many(doc! { "created_by": owner_id }, None)
            .await?;
        Ok(result.deleted_count)
    }
}
