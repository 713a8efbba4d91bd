//! Listing, pagination, authorization and cascade behavior over in-memory
//! stores.

use student_market::ads::dto::ListQuery;
use student_market::ads::model::{AdDraft, Category};
use student_market::ads::services as ads;
use student_market::config::AppConfig;
use student_market::errors::AppError;
use student_market::state::AppState;
use student_market::users::model::{NewUser, User};
use student_market::users::services as users;

fn test_state() -> AppState {
    AppState::in_memory(AppConfig::for_tests())
}

async fn seed_user(state: &AppState, name: &str, email: &str, is_admin: bool) -> User {
    state
        .users
        .create(NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: "unused-in-these-tests".to_string(),
            is_email_verified: true,
            is_admin,
            date_of_birth: None,
            description: String::new(),
        })
        .await
        .expect("seed user")
}

fn draft(title: &str, description: &str, category: Category) -> AdDraft {
    AdDraft {
        title: title.to_string(),
        description: description.to_string(),
        category,
    }
}

fn query(page: u64) -> ListQuery {
    ListQuery {
        page,
        category: None,
        search: None,
    }
}

#[tokio::test]
async fn pagination_contract() {
    let state = test_state();
    let owner = seed_user(&state, "Seller", "seller@example.com", false).await;

    for i in 0..25 {
        ads::create_ad(
            &state,
            &owner.id,
            draft(
                &format!("Item number {i}"),
                "a perfectly ordinary item for sale",
                Category::Other,
            ),
        )
        .await
        .expect("create ad");
    }

    let first = ads::list_ads(&state, &query(1)).await.expect("page 1");
    assert_eq!(first.items.len(), 12);
    assert_eq!(first.total, 25);
    assert_eq!(first.total_pages(), 3);

    let third = ads::list_ads(&state, &query(3)).await.expect("page 3");
    assert_eq!(third.items.len(), 1);
    assert_eq!(third.total, 25);

    // out of range: empty page, count intact
    let fourth = ads::list_ads(&state, &query(4)).await.expect("page 4");
    assert!(fourth.items.is_empty());
    assert_eq!(fourth.total, 25);

    // page 0 clamps to page 1
    let zero = ads::list_ads(&state, &query(0)).await.expect("page 0");
    assert_eq!(zero.items.len(), 12);
    assert_eq!(zero.page, 1);
}

#[tokio::test]
async fn listing_orders_most_recent_first() {
    let state = test_state();
    let owner = seed_user(&state, "Seller", "seller@example.com", false).await;

    let mut ids = Vec::new();
    for title in ["First listing", "Second listing", "Third listing"] {
        let ad = ads::create_ad(
            &state,
            &owner.id,
            draft(title, "a perfectly ordinary item", Category::Books),
        )
        .await
        .expect("create ad");
        ids.push(ad.id);
    }

    let page = ads::list_ads(&state, &query(1)).await.expect("list");
    let listed: Vec<&str> = page.items.iter().map(|ad| ad.id.as_str()).collect();
    assert_eq!(listed, vec![ids[2].as_str(), ids[1].as_str(), ids[0].as_str()]);
}

#[tokio::test]
async fn search_is_case_insensitive_over_title_and_description() {
    let state = test_state();
    let owner = seed_user(&state, "Seller", "seller@example.com", false).await;

    ads::create_ad(
        &state,
        &owner.id,
        draft("Laptop Stand", "aluminium, barely used", Category::Electronics),
    )
    .await
    .expect("create");
    ads::create_ad(
        &state,
        &owner.id,
        draft("Desk", "comes with a laptop tray", Category::Furniture),
    )
    .await
    .expect("create");
    ads::create_ad(
        &state,
        &owner.id,
        draft("Office chair", "five wheels, no squeaks", Category::Furniture),
    )
    .await
    .expect("create");

    let found = ads::list_ads(
        &state,
        &ListQuery {
            page: 1,
            category: None,
            search: Some("laptop".into()),
        },
    )
    .await
    .expect("search");
    assert_eq!(found.total, 2);
    assert!(found
        .items
        .iter()
        .any(|ad| ad.title == "Laptop Stand"));
    assert!(found.items.iter().any(|ad| ad.title == "Desk"));
}

#[tokio::test]
async fn category_filter_and_all_sentinel() {
    let state = test_state();
    let owner = seed_user(&state, "Seller", "seller@example.com", false).await;

    ads::create_ad(
        &state,
        &owner.id,
        draft("Calculus textbook", "second edition, some notes", Category::Books),
    )
    .await
    .expect("create");
    ads::create_ad(
        &state,
        &owner.id,
        draft("Road bike", "needs new brake pads", Category::Sports),
    )
    .await
    .expect("create");

    let books = ads::list_ads(
        &state,
        &ListQuery {
            page: 1,
            category: Some("books".into()),
            search: None,
        },
    )
    .await
    .expect("filter");
    assert_eq!(books.total, 1);
    assert_eq!(books.items[0].category, Category::Books);

    let all = ads::list_ads(
        &state,
        &ListQuery {
            page: 1,
            category: Some("all".into()),
            search: None,
        },
    )
    .await
    .expect("all");
    assert_eq!(all.total, 2);

    let unknown = ads::list_ads(
        &state,
        &ListQuery {
            page: 1,
            category: Some("weapons".into()),
            search: None,
        },
    )
    .await;
    assert!(matches!(unknown, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn my_ads_only_shows_own_listings() {
    let state = test_state();
    let alice = seed_user(&state, "Alice", "alice@example.com", false).await;
    let bob = seed_user(&state, "Bob", "bob@example.com", false).await;

    ads::create_ad(
        &state,
        &alice.id,
        draft("Alice's lamp", "warm light, dimmable", Category::Furniture),
    )
    .await
    .expect("create");
    ads::create_ad(
        &state,
        &bob.id,
        draft("Bob's kettle", "boils fast, descaled", Category::Electronics),
    )
    .await
    .expect("create");

    let mine = ads::my_ads(&state, &alice.id, &query(1)).await.expect("my ads");
    assert_eq!(mine.total, 1);
    assert_eq!(mine.items[0].created_by, alice.id);
}

#[tokio::test]
async fn only_owner_or_admin_may_modify() {
    let state = test_state();
    let owner = seed_user(&state, "Owner", "owner@example.com", false).await;
    let stranger = seed_user(&state, "Stranger", "stranger@example.com", false).await;
    let admin = seed_user(&state, "Admin", "admin@example.com", true).await;

    let ad = ads::create_ad(
        &state,
        &owner.id,
        draft("Guitar", "acoustic, new strings", Category::Other),
    )
    .await
    .expect("create");

    let edit = draft("Guitar (reduced)", "acoustic, new strings", Category::Other);

    let denied = ads::edit_ad(&state, &stranger.id, &ad.id, edit.clone()).await;
    assert!(matches!(denied, Err(AppError::Forbidden)));
    let denied_delete = ads::delete_ad(&state, &stranger.id, &ad.id).await;
    assert!(matches!(denied_delete, Err(AppError::Forbidden)));

    let by_owner = ads::edit_ad(&state, &owner.id, &ad.id, edit.clone())
        .await
        .expect("owner edit");
    assert_eq!(by_owner.title, "Guitar (reduced)");

    let by_admin = ads::edit_ad(
        &state,
        &admin.id,
        &ad.id,
        draft("Guitar (admin note)", "acoustic, new strings", Category::Other),
    )
    .await
    .expect("admin edit");
    assert_eq!(by_admin.title, "Guitar (admin note)");

    ads::delete_ad(&state, &admin.id, &ad.id)
        .await
        .expect("admin delete");
    assert!(matches!(
        ads::get_ad(&state, &ad.id).await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn deleting_a_user_cascades_to_their_ads() {
    let state = test_state();
    let doomed = seed_user(&state, "Doomed", "doomed@example.com", false).await;
    let survivor = seed_user(&state, "Survivor", "survivor@example.com", false).await;

    let mut doomed_ads = Vec::new();
    for title in ["Old chair", "Old table", "Old shelf"] {
        let ad = ads::create_ad(
            &state,
            &doomed.id,
            draft(title, "well-loved student furniture", Category::Furniture),
        )
        .await
        .expect("create");
        doomed_ads.push(ad.id);
    }
    let kept = ads::create_ad(
        &state,
        &survivor.id,
        draft("Nice rug", "barely walked on", Category::Furniture),
    )
    .await
    .expect("create");

    users::delete_user(&state, &doomed.id, &doomed.id)
        .await
        .expect("self delete");

    for id in &doomed_ads {
        assert!(matches!(
            ads::get_ad(&state, id).await,
            Err(AppError::NotFound)
        ));
    }
    assert!(ads::get_ad(&state, &kept.id).await.is_ok());
    assert!(state
        .users
        .find_by_id(&doomed.id)
        .await
        .expect("lookup")
        .is_none());

    // deleting again reports NotFound rather than erroring
    let admin = seed_user(&state, "Admin", "admin@example.com", true).await;
    let again = users::delete_user(&state, &admin.id, &doomed.id).await;
    assert!(matches!(again, Err(AppError::NotFound)));
}

#[tokio::test]
async fn non_admin_cannot_delete_other_users() {
    let state = test_state();
    let alice = seed_user(&state, "Alice", "alice@example.com", false).await;
    let bob = seed_user(&state, "Bob", "bob@example.com", false).await;
    let admin = seed_user(&state, "Admin", "admin@example.com", true).await;

    let denied = users::delete_user(&state, &alice.id, &bob.id).await;
    assert!(matches!(denied, Err(AppError::Forbidden)));

    users::delete_user(&state, &admin.id, &bob.id)
        .await
        .expect("admin delete");
    assert!(state
        .users
        .find_by_id(&bob.id)
        .await
        .expect("lookup")
        .is_none());
}

#[tokio::test]
async fn description_html_is_regenerated_and_sanitized_on_every_save() {
    let state = test_state();
    let owner = seed_user(&state, "Seller", "seller@example.com", false).await;

    let ad = ads::create_ad(
        &state,
        &owner.id,
        draft("Markdown ad", "A **sturdy** item, like new.", Category::Other),
    )
    .await
    .expect("create");
    assert!(ad.description_html.contains("<strong>sturdy</strong>"));

    let edited = ads::edit_ad(
        &state,
        &owner.id,
        &ad.id,
        draft(
            "Markdown ad",
            "now with <script>alert('xss')</script> and _emphasis_ instead",
            Category::Other,
        ),
    )
    .await
    .expect("edit");
    assert!(!edited.description_html.contains("<script"));
    assert!(!edited.description_html.contains("alert"));
    assert!(edited.description_html.contains("<em>emphasis</em>"));
    assert!(!edited.description_html.contains("sturdy"));
}

#[tokio::test]
async fn ad_lookup_with_malformed_id_is_not_found() {
    let state = test_state();
    assert!(matches!(
        ads::get_ad(&state, "definitely-not-an-object-id").await,
        Err(AppError::NotFound)
    ));
}
