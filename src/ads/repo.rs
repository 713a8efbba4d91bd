use std::sync::Arc;

use crate::store::{AdFilter, AdStore, StoreError};

use super::model::{Ad, AdContent, AdDraft};

/// One page of ads plus the match count before skip/limit.
#[derive(Debug)]
pub struct AdPage {
    pub items: Vec<Ad>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

impl AdPage {
    pub fn total_pages(&self) -> u64 {
        if self.per_page == 0 {
            0
        } else {
            (self.total + self.per_page - 1) / self.per_page
        }
    }
}

/// Repository over the `ads` collection. Every write funnels through
/// [`AdContent::from_draft`], so the stored HTML is always regenerated from
/// the current markdown source.
#[derive(Clone)]
pub struct AdRepository {
    store: Arc<dyn AdStore>,
}

impl AdRepository {
    pub fn new(store: Arc<dyn AdStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, draft: AdDraft, owner_id: &str) -> Result<Ad, StoreError> {
        self.store
            .insert_ad(AdContent::from_draft(draft), owner_id)
            .await
    }

    pub async fn update(&self, id: &str, draft: AdDraft) -> Result<bool, StoreError> {
        self.store.update_ad(id, AdContent::from_draft(draft)).await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Ad>, StoreError> {
        self.store.ad_by_id(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        self.store.delete_ad(id).await
    }

    /// 1-indexed pages; `total` is counted before skip/limit, so a page past
    /// the end comes back empty with the count intact.
    pub async fn list(
        &self,
        filter: &AdFilter,
        page: u64,
        per_page: u64,
    ) -> Result<AdPage, StoreError> {
        let page = page.max(1);
        let total = self.store.count_ads(filter).await?;
        let skip = page.saturating_sub(1).saturating_mul(per_page);
        let items = self.store.list_ads(filter, skip, per_page).await?;
        Ok(AdPage {
            items,
            total,
            page,
            per_page,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(total: u64, per_page: u64) -> AdPage {
        AdPage {
            items: Vec::new(),
            total,
            page: 1,
            per_page,
        }
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(page(25, 12).total_pages(), 3);
        assert_eq!(page(24, 12).total_pages(), 2);
        assert_eq!(page(1, 12).total_pages(), 1);
        assert_eq!(page(0, 12).total_pages(), 0);
    }

    #[test]
    fn zero_page_size_yields_zero_pages() {
        assert_eq!(page(10, 0).total_pages(), 0);
    }
}
