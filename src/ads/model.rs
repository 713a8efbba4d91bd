use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::content;
use crate::errors::{AppError, AppResult};

pub const TITLE_MIN: usize = 3;
pub const TITLE_MAX: usize = 200;
pub const DESCRIPTION_MIN: usize = 10;
pub const DESCRIPTION_MAX: usize = 5000;

/// Fixed category set; lowercase on the wire and in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Books,
    Electronics,
    Scripts,
    Clothes,
    Furniture,
    Sports,
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Books,
        Category::Electronics,
        Category::Scripts,
        Category::Clothes,
        Category::Furniture,
        Category::Sports,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Books => "books",
            Category::Electronics => "electronics",
            Category::Scripts => "scripts",
            Category::Clothes => "clothes",
            Category::Furniture => "furniture",
            Category::Sports => "sports",
            Category::Other => "other",
        }
    }

    /// Human-readable label for listings.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Books => "Books",
            Category::Electronics => "Electronics",
            Category::Scripts => "Scripts",
            Category::Clothes => "Clothes",
            Category::Furniture => "Furniture",
            Category::Sports => "Sports & Outdoors",
            Category::Other => "Other",
        }
    }

    pub fn parse(value: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.as_str() == value)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ad record as stored in the `ads` collection.
#[derive(Debug, Clone)]
pub struct Ad {
    pub id: String,                   // store-assigned, immutable
    pub title: String,
    pub description: String,          // raw markdown source
    pub description_html: String,     // sanitized rendering, derived from `description`
    pub category: Category,
    pub created_by: String,           // owning user's id
    pub created_at: OffsetDateTime,   // stamped by the store at insertion
}

/// Caller-supplied fields for creating or editing an ad.
#[derive(Debug, Clone)]
pub struct AdDraft {
    pub title: String,
    pub description: String,
    pub category: Category,
}

impl AdDraft {
    pub fn validate(&self) -> AppResult<()> {
        let title_len = self.title.trim().chars().count();
        if !(TITLE_MIN..=TITLE_MAX).contains(&title_len) {
            return Err(AppError::validation(format!(
                "title must be between {TITLE_MIN} and {TITLE_MAX} characters"
            )));
        }
        let description_len = self.description.chars().count();
        if !(DESCRIPTION_MIN..=DESCRIPTION_MAX).contains(&description_len) {
            return Err(AppError::validation(format!(
                "description must be between {DESCRIPTION_MIN} and {DESCRIPTION_MAX} characters"
            )));
        }
        Ok(())
    }
}

/// A draft plus its rendered HTML. This is the only payload the stores accept
/// for ad writes, so `description_html` cannot be supplied externally and is
/// regenerated on every save.
#[derive(Debug, Clone)]
pub struct AdContent {
    pub title: String,
    pub description: String,
    pub description_html: String,
    pub category: Category,
}

impl AdContent {
    pub fn from_draft(draft: AdDraft) -> Self {
        let description_html = content::render(&draft.description);
        Self {
            title: draft.title,
            description: draft.description,
            description_html,
            category: draft.category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str, description: &str) -> AdDraft {
        AdDraft {
            title: title.to_string(),
            description: description.to_string(),
            category: Category::Books,
        }
    }

    #[test]
    fn category_parse_covers_fixed_set() {
        for category in Category::ALL {
            assert_eq!(Category::parse(category.as_str()), Some(category));
        }
        assert_eq!(Category::parse("weapons"), None);
        assert_eq!(Category::parse("all"), None);
    }

    #[test]
    fn draft_validation_bounds() {
        assert!(draft("Bike", "A sturdy city bike.").validate().is_ok());
        assert!(draft("ab", "A sturdy city bike.").validate().is_err());
        assert!(draft("Bike", "too short").validate().is_err());
        assert!(draft(&"t".repeat(201), "A sturdy city bike.")
            .validate()
            .is_err());
        assert!(draft("Bike", &"d".repeat(5001)).validate().is_err());
    }

    #[test]
    fn content_always_renders_html_from_description() {
        let content = AdContent::from_draft(draft("Bike", "A **sturdy** city bike."));
        assert!(content.description_html.contains("<strong>sturdy</strong>"));
    }
}
