//! Integration tests for the PostgreSQL audit repositories
#![cfg(feature = "postgres")]

use audit_trail::config::DatabaseConfig;
use audit_trail::domain::audit::{
    AuditEntryRepository, AuditItemFilter, AuditItemQuery, AuditItemRepository, AuditItemScope,
    AuditType, NewAuditEntry, NewAuditItem, PagedItemsOptions, WriteAuditEntry,
};
use audit_trail::domain::shared::{Direction, Paging};
use audit_trail::infrastructure::persistence::{
    create_pool, run_migrations, PgAuditEntryRepository, PgAuditItemRepository,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use sqlx::PgPool;

// Each test owns one user id and entity id so cleanup leaves other data alone
const ENTITY_BASE: i32 = 910_000;
const USER_BASE: i32 = 920_000;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 14, 9, 30, 0).unwrap()
}

fn new_entry(user_id: i32, event_type: &str, event_date: DateTime<Utc>) -> NewAuditEntry {
    NewAuditEntry::try_from(WriteAuditEntry {
        performing_user_id: user_id,
        performing_details: "admin".to_string(),
        performing_ip: "127.0.0.1".to_string(),
        event_date,
        affected_user_id: user_id + 1,
        affected_details: "user profile".to_string(),
        event_type: event_type.to_string(),
        event_details: "published page X".to_string(),
    })
    .unwrap()
}

#[tokio::test]
#[ignore] // Requires database
async fn test_create_audit_item() {
    let pool = setup_database().await;
    let (user, entity) = (USER_BASE + 1, ENTITY_BASE + 1);
    let repo = PgAuditItemRepository::new(pool.clone());

    let item = repo
        .create(NewAuditItem::new(AuditType::Publish, "Published", user, entity).at(t0()))
        .await
        .unwrap();

    assert!(item.id > 0);
    assert_eq!(item.audit_type, AuditType::Publish);
    assert_eq!(item.created_at, t0());

    cleanup_database(pool, user).await;
}

#[tokio::test]
#[ignore] // Requires database
async fn test_paged_items_for_entity() {
    let pool = setup_database().await;
    let (user, entity) = (USER_BASE + 2, ENTITY_BASE + 2);
    let repo = PgAuditItemRepository::new(pool.clone());

    let types = [AuditType::Save, AuditType::Publish, AuditType::Move];
    for n in 0..12 {
        let audit_type = types[n % 3];
        repo.create(
            NewAuditItem::new(audit_type, format!("{} #{}", audit_type, n), user, entity)
                .at(t0() + Duration::minutes(n as i64)),
        )
        .await
        .unwrap();
    }

    let query = AuditItemQuery::for_entity(entity, PagedItemsOptions::default());
    let page = repo.get_paged(&query, Paging::new(1, 5)).await.unwrap();
    assert_eq!(page.total_records, 12);
    assert_eq!(page.items.len(), 5);
    assert!(page.items.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    assert_eq!(page.items[0].created_at, t0() + Duration::minutes(6));

    let options = PagedItemsOptions::default()
        .with_direction(Direction::Ascending)
        .with_audit_types(vec![AuditType::Publish]);
    let query = AuditItemQuery::for_entity(entity, options);
    let page = repo.get_paged(&query, Paging::new(0, 2)).await.unwrap();
    assert_eq!(page.total_records, 4);
    assert_eq!(page.items.len(), 2);
    assert!(page.items[0].created_at < page.items[1].created_at);

    let options = PagedItemsOptions::default().with_filter(AuditItemFilter {
        comment_contains: Some("MOVE".to_string()),
        ..Default::default()
    });
    let query = AuditItemQuery::for_user(user, options);
    let page = repo.get_paged(&query, Paging::new(0, 50)).await.unwrap();
    assert_eq!(page.total_records, 4);

    cleanup_database(pool, user).await;
}

#[tokio::test]
#[ignore] // Requires database
async fn test_list_logs_since() {
    let pool = setup_database().await;
    let user = USER_BASE + 3;
    let repo = PgAuditItemRepository::new(pool.clone());

    for minutes in [0, 10, 20] {
        repo.create(
            NewAuditItem::new(AuditType::System, "signed in", user, -1)
                .at(t0() + Duration::minutes(minutes)),
        )
        .await
        .unwrap();
    }

    let mut query = AuditItemQuery::new(AuditItemScope::User(user));
    query.audit_types = vec![AuditType::System];
    query.filter.created_from = Some(t0() + Duration::minutes(10));

    let logs = repo.list(&query).await.unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].created_at, t0() + Duration::minutes(20));

    cleanup_database(pool, user).await;
}

#[tokio::test]
#[ignore] // Requires database
async fn test_delete_older_than() {
    let pool = setup_database().await;
    let (user, entity) = (USER_BASE + 4, ENTITY_BASE + 4);
    let repo = PgAuditItemRepository::new(pool.clone());

    // Older than every other test row so the cutoff only reaches this test's data
    let epoch = Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap();
    repo.create(NewAuditItem::new(AuditType::Save, "old", user, entity).at(epoch))
        .await
        .unwrap();
    repo.create(
        NewAuditItem::new(AuditType::Save, "new", user, entity).at(epoch + Duration::days(2)),
    )
    .await
    .unwrap();

    let removed = repo.delete_older_than(epoch + Duration::days(1)).await.unwrap();
    assert!(removed >= 1);

    let query = AuditItemQuery::for_entity(entity, PagedItemsOptions::default());
    let remaining = repo.list(&query).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].comment, "new");

    cleanup_database(pool, user).await;
}

#[tokio::test]
#[ignore] // Requires database
async fn test_audit_entries() {
    let pool = setup_database().await;
    let user = USER_BASE + 5;
    let repo = PgAuditEntryRepository::new(pool.clone());

    let written = repo
        .create(new_entry(user, "content/publish", t0()))
        .await
        .unwrap();
    assert!(written.id > 0);
    assert_eq!(written.event_type, "content/publish");

    repo.create(new_entry(user, "user/login", t0() + Duration::hours(1)))
        .await
        .unwrap();

    let entries: Vec<_> = repo
        .list()
        .await
        .unwrap()
        .into_iter()
        .filter(|e| e.performing_user_id == user)
        .collect();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].event_type, "user/login");

    let page = repo.get_page(Paging::new(0, 1)).await.unwrap();
    assert!(page.total_records >= 2);
    assert_eq!(page.items.len(), 1);

    cleanup_database(pool, user).await;
}

#[tokio::test]
#[ignore] // Requires database
async fn test_stored_entry_matches_written_entry() {
    use chrono::Timelike;

    let pool = setup_database().await;
    let user = USER_BASE + 6;
    let repo = PgAuditEntryRepository::new(pool.clone());

    let event_date = t0().with_nanosecond(123_456_789).unwrap();
    let written = repo
        .create(new_entry(user, "content/save", event_date))
        .await
        .unwrap();

    let stored = repo
        .list()
        .await
        .unwrap()
        .into_iter()
        .find(|e| e.id == written.id)
        .unwrap();
    assert_eq!(stored, written);

    cleanup_database(pool, user).await;
}

// Helper functions

async fn setup_database() -> PgPool {
    let db_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://postgres@localhost/audit_trail_test".to_string());

    let config = DatabaseConfig {
        url: db_url,
        max_connections: 5,
        min_connections: 1,
        ..Default::default()
    };

    let pool = create_pool(&config).await.expect("Failed to create pool");
    run_migrations(&pool).await.expect("Failed to run migrations");
    pool
}

async fn cleanup_database(pool: PgPool, user_id: i32) {
    // Clean up test data
    sqlx::query("DELETE FROM audit_items WHERE user_id = $1")
        .bind(user_id)
        .execute(&pool)
        .await
        .ok();
    sqlx::query("DELETE FROM audit_entries WHERE performing_user_id = $1")
        .bind(user_id)
        .execute(&pool)
        .await
        .ok();
    pool.close().await;
}
