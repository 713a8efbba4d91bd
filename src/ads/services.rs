use tracing::info;

use crate::errors::{AppError, AppResult};
use crate::state::AppState;
use crate::store::AdFilter;
use crate::users::model::User;

use super::dto::ListQuery;
use super::model::{Ad, AdDraft, Category};
use super::repo::AdPage;

/// Ads may be mutated by their owner or by an admin, nobody else.
fn can_modify(actor: &User, ad: &Ad) -> bool {
    actor.id == ad.created_by || actor.is_admin
}

pub(crate) fn filter_from_query(query: &ListQuery) -> AppResult<AdFilter> {
    let category = match query.category.as_deref() {
        None | Some("all") | Some("") => None,
        Some(raw) => {
            Some(Category::parse(raw).ok_or_else(|| AppError::validation("unknown category"))?)
        }
    };
    let search = query
        .search
        .clone()
        .filter(|search| !search.trim().is_empty());
    Ok(AdFilter {
        category,
        search,
        owner_id: None,
    })
}

pub async fn create_ad(state: &AppState, owner_id: &str, draft: AdDraft) -> AppResult<Ad> {
    draft.validate()?;
    let owner = state
        .users
        .find_by_id(owner_id)
        .await?
        .ok_or(AppError::Unauthorized)?;
    let ad = state.ads.create(draft, &owner.id).await?;
    info!(ad_id = %ad.id, user_id = %owner.id, "ad created");
    Ok(ad)
}

pub async fn get_ad(state: &AppState, id: &str) -> AppResult<Ad> {
    state.ads.find_by_id(id).await?.ok_or(AppError::NotFound)
}

pub async fn list_ads(state: &AppState, query: &ListQuery) -> AppResult<AdPage> {
    let filter = filter_from_query(query)?;
    Ok(state
        .ads
        .list(&filter, query.page, state.config.items_per_page)
        .await?)
}

/// The signed-in user's own ads, with the same filters as the public listing.
pub async fn my_ads(state: &AppState, owner_id: &str, query: &ListQuery) -> AppResult<AdPage> {
    let mut filter = filter_from_query(query)?;
    filter.owner_id = Some(owner_id.to_string());
    Ok(state
        .ads
        .list(&filter, query.page, state.config.items_per_page)
        .await?)
}

pub async fn edit_ad(state: &AppState, actor_id: &str, id: &str, draft: AdDraft) -> AppResult<Ad> {
    draft.validate()?;
    let ad = state.ads.find_by_id(id).await?.ok_or(AppError::NotFound)?;
    let actor = state
        .users
        .find_by_id(actor_id)
        .await?
        .ok_or(AppError::Unauthorized)?;
    if !can_modify(&actor, &ad) {
        return Err(AppError::Forbidden);
    }
    state.ads.update(id, draft).await?;
    info!(ad_id = %id, actor_id = %actor_id, "ad updated");
    state.ads.find_by_id(id).await?.ok_or(AppError::NotFound)
}

pub async fn delete_ad(state: &AppState, actor_id: &str, id: &str) -> AppResult<()> {
    let ad = state.ads.find_by_id(id).await?.ok_or(AppError::NotFound)?;
    let actor = state
        .users
        .find_by_id(actor_id)
        .await?
        .ok_or(AppError::Unauthorized)?;
    if !can_modify(&actor, &ad) {
        return Err(AppError::Forbidden);
    }
    state.ads.delete(id).await?;
    info!(ad_id = %id, actor_id = %actor_id, "ad deleted");
    Ok(())
}
