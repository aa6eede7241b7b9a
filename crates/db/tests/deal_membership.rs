//! Integration tests for deals and deal membership.

use dealroom_db::models::deal::CreateDeal;
use dealroom_db::repositories::DealRepo;
use sqlx::PgPool;

fn new_deal(name: &str) -> CreateDeal {
    CreateDeal {
        name: name.to_string(),
        description: Some("Carve-out of the EMEA business".to_string()),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_creator_becomes_owner(pool: PgPool) {
    let deal = DealRepo::create(&pool, 7, &new_deal("Project Falcon")).await.unwrap();

    assert_eq!(deal.name, "Project Falcon");
    assert_eq!(deal.created_by, 7);

    let role = DealRepo::member_role(&pool, deal.id, 7).await.unwrap();
    assert_eq!(role.as_deref(), Some("owner"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_non_member_has_no_role(pool: PgPool) {
    let deal = DealRepo::create(&pool, 7, &new_deal("Project Falcon")).await.unwrap();

    assert!(DealRepo::member_role(&pool, deal.id, 8).await.unwrap().is_none());
    assert!(DealRepo::member_role(&pool, 999_999, 7).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_for_user_only_returns_own_deals(pool: PgPool) {
    let a = DealRepo::create(&pool, 1, &new_deal("A")).await.unwrap();
    let b = DealRepo::create(&pool, 2, &new_deal("B")).await.unwrap();
    DealRepo::upsert_member(&pool, b.id, 1, "member").await.unwrap();
    DealRepo::create(&pool, 3, &new_deal("C")).await.unwrap();

    let deals = DealRepo::list_for_user(&pool, 1).await.unwrap();
    let ids: Vec<_> = deals.iter().map(|d| d.id).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&a.id));
    assert!(ids.contains(&b.id));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_upsert_member_changes_role(pool: PgPool) {
    let deal = DealRepo::create(&pool, 1, &new_deal("A")).await.unwrap();

    let added = DealRepo::upsert_member(&pool, deal.id, 2, "member").await.unwrap().unwrap();
    assert_eq!(added.role, "member");

    let promoted = DealRepo::upsert_member(&pool, deal.id, 2, "owner").await.unwrap().unwrap();
    assert_eq!(promoted.role, "owner");

    let members = DealRepo::list_members(&pool, deal.id).await.unwrap();
    assert_eq!(members.len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_sole_owner_cannot_be_demoted(pool: PgPool) {
    let deal = DealRepo::create(&pool, 1, &new_deal("A")).await.unwrap();

    let result = DealRepo::upsert_member(&pool, deal.id, 1, "member").await.unwrap();
    assert!(result.is_none());

    let role = DealRepo::member_role(&pool, deal.id, 1).await.unwrap();
    assert_eq!(role.as_deref(), Some("owner"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_owner_can_be_demoted_once_another_exists(pool: PgPool) {
    let deal = DealRepo::create(&pool, 1, &new_deal("A")).await.unwrap();
    DealRepo::upsert_member(&pool, deal.id, 2, "owner").await.unwrap().unwrap();

    let demoted = DealRepo::upsert_member(&pool, deal.id, 1, "member").await.unwrap();
    assert_eq!(demoted.map(|m| m.role).as_deref(), Some("member"));

    // Now user 2 is the only owner.
    let result = DealRepo::upsert_member(&pool, deal.id, 2, "member").await.unwrap();
    assert!(result.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_invalid_role_rejected_by_schema(pool: PgPool) {
    let deal = DealRepo::create(&pool, 1, &new_deal("A")).await.unwrap();
    let result = DealRepo::upsert_member(&pool, deal.id, 2, "viewer").await;
    assert!(result.is_err());
}
