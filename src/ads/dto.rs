use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::model::{Ad, AdDraft, Category};
use super::repo::AdPage;

/// Request body for creating or editing an ad. `description_html` is never
/// accepted from a client; it is derived on save.
#[derive(Debug, Deserialize)]
pub struct AdRequest {
    pub title: String,
    pub description: String,
    pub category: Category,
}

impl AdRequest {
    pub fn into_draft(self) -> AdDraft {
        AdDraft {
            title: self.title,
            description: self.description,
            category: self.category,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub description_html: String,
    pub category: Category,
    pub category_label: &'static str,
    pub created_by: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Ad> for AdResponse {
    fn from(ad: Ad) -> Self {
        Self {
            id: ad.id,
            title: ad.title,
            description: ad.description,
            description_html: ad.description_html,
            category: ad.category,
            category_label: ad.category.label(),
            created_by: ad.created_by,
            created_at: ad.created_at,
        }
    }
}

/// Listing query parameters. `category=all` (or absent) means no category
/// restriction.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

fn default_page() -> u64 {
    1
}

#[derive(Debug, Serialize)]
pub struct AdListResponse {
    pub items: Vec<AdResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

impl From<AdPage> for AdListResponse {
    fn from(page: AdPage) -> Self {
        Self {
            total_pages: page.total_pages(),
            total: page.total,
            page: page.page,
            per_page: page.per_page,
            items: page.items.into_iter().map(AdResponse::from).collect(),
        }
    }
}
