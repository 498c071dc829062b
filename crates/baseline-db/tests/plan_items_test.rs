//! Integration tests for plan_items queries against real PostgreSQL.
//!
//! Each test creates a unique temporary database with migrations applied
//! and drops it on completion.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use baseline_db::models::{ItemStatus, ItemType, PlanItem, PublishedLink, ScheduleUpdate};
use baseline_db::queries::plan_items;
use baseline_test_utils::date;
use baseline_test_utils::pg::{create_test_db, drop_test_db};

/// Insert a minimal milestone-type row for a fresh project.
async fn insert_milestone_item(pool: &PgPool, project_id: Uuid, name: &str) -> PlanItem {
    plan_items::insert_plan_item(
        pool,
        project_id,
        None,
        ItemType::Milestone,
        name,
        0,
        Some(date("2026-03-01")),
        Some(date("2026-03-10")),
        ItemStatus::NotStarted,
        Some(500.0),
    )
    .await
    .expect("insert_plan_item should succeed")
}

#[tokio::test]
async fn insert_and_get_plan_item() {
    let (pool, db_name) = create_test_db().await;
    let project = Uuid::new_v4();

    let item = insert_milestone_item(&pool, project, "Design").await;
    assert_eq!(item.name, "Design");
    assert_eq!(item.item_type, ItemType::Milestone);
    assert_eq!(item.status, ItemStatus::NotStarted);
    assert_eq!(item.billable, Some(500.0));
    // Server-side defaults.
    assert_eq!(item.progress, 0);
    assert!(!item.is_deleted);
    assert!(!item.is_published);
    assert!(item.published_at.is_none());

    let fetched = plan_items::get_plan_item(&pool, item.id)
        .await
        .expect("get_plan_item should succeed")
        .expect("item should exist");
    assert_eq!(fetched.id, item.id);
    assert_eq!(fetched.start_date, Some(date("2026-03-01")));

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn mark_published_sets_one_linkage_column() {
    let (pool, db_name) = create_test_db().await;
    let project = Uuid::new_v4();

    let m_item = insert_milestone_item(&pool, project, "Design").await;
    let d_item = insert_milestone_item(&pool, project, "Build").await;

    let milestone_id = Uuid::new_v4();
    let deliverable_id = Uuid::new_v4();
    let now = Utc::now();

    plan_items::mark_published(&pool, m_item.id, PublishedLink::Milestone(milestone_id), now)
        .await
        .expect("milestone link should succeed");
    plan_items::mark_published(
        &pool,
        d_item.id,
        PublishedLink::Deliverable(deliverable_id),
        now,
    )
    .await
    .expect("deliverable link should succeed");

    let m_back = plan_items::get_plan_item(&pool, m_item.id)
        .await
        .unwrap()
        .unwrap();
    assert!(m_back.is_published);
    assert_eq!(m_back.published_milestone_id, Some(milestone_id));
    assert_eq!(m_back.published_deliverable_id, None);
    assert!(m_back.published_at.is_some());

    let d_back = plan_items::get_plan_item(&pool, d_item.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(d_back.published_deliverable_id, Some(deliverable_id));
    assert_eq!(d_back.published_milestone_id, None);

    // Published items leave the commit working set.
    let unpublished = plan_items::list_unpublished(&pool, project).await.unwrap();
    assert!(unpublished.is_empty());

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn mark_published_missing_item_errors() {
    let (pool, db_name) = create_test_db().await;

    let result = plan_items::mark_published(
        &pool,
        Uuid::new_v4(),
        PublishedLink::Milestone(Uuid::new_v4()),
        Utc::now(),
    )
    .await;
    assert!(result.is_err());

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn schedule_update_sets_included_columns_only() {
    let (pool, db_name) = create_test_db().await;
    let project = Uuid::new_v4();
    let item = insert_milestone_item(&pool, project, "Design").await;

    // Move the end date and duration; the start date is not in the patch.
    let update = ScheduleUpdate {
        start_date: None,
        end_date: Some(Some(date("2026-03-20"))),
        duration_days: Some(Some(20)),
    };
    plan_items::apply_schedule_update(&pool, item.id, &update)
        .await
        .expect("patch should apply");

    let back = plan_items::get_plan_item(&pool, item.id).await.unwrap().unwrap();
    assert_eq!(back.start_date, Some(date("2026-03-01")));
    assert_eq!(back.end_date, Some(date("2026-03-20")));
    assert_eq!(back.duration_days, Some(20));

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn schedule_update_clears_columns() {
    let (pool, db_name) = create_test_db().await;
    let project = Uuid::new_v4();
    let item = insert_milestone_item(&pool, project, "Design").await;

    let update = ScheduleUpdate {
        start_date: Some(None),
        end_date: None,
        duration_days: Some(None),
    };
    plan_items::apply_schedule_update(&pool, item.id, &update)
        .await
        .expect("clearing patch should apply");

    let back = plan_items::get_plan_item(&pool, item.id).await.unwrap().unwrap();
    assert_eq!(back.start_date, None);
    assert_eq!(back.end_date, Some(date("2026-03-10")));
    assert_eq!(back.duration_days, None);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn empty_schedule_update_is_a_no_op() {
    let (pool, db_name) = create_test_db().await;
    let project = Uuid::new_v4();
    let item = insert_milestone_item(&pool, project, "Design").await;

    // An empty patch must not touch the row (and must not build a
    // malformed UPDATE with no SET clauses).
    plan_items::apply_schedule_update(&pool, item.id, &ScheduleUpdate::default())
        .await
        .expect("empty patch should be a no-op");

    let back = plan_items::get_plan_item(&pool, item.id).await.unwrap().unwrap();
    assert_eq!(back.start_date, item.start_date);
    assert_eq!(back.end_date, item.end_date);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn schedule_update_missing_item_errors() {
    let (pool, db_name) = create_test_db().await;

    let update = ScheduleUpdate {
        start_date: Some(Some(date("2026-03-01"))),
        ..ScheduleUpdate::default()
    };
    let result = plan_items::apply_schedule_update(&pool, Uuid::new_v4(), &update).await;
    assert!(result.is_err());

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn soft_deleted_items_leave_every_listing() {
    let (pool, db_name) = create_test_db().await;
    let project = Uuid::new_v4();
    let keep = insert_milestone_item(&pool, project, "Keep").await;
    let gone = insert_milestone_item(&pool, project, "Gone").await;

    plan_items::soft_delete(&pool, gone.id)
        .await
        .expect("soft_delete should succeed");

    let active = plan_items::list_active(&pool, project).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, keep.id);

    let unpublished = plan_items::list_unpublished(&pool, project).await.unwrap();
    assert_eq!(unpublished.len(), 1);

    // The row itself survives.
    let row = plan_items::get_plan_item(&pool, gone.id).await.unwrap().unwrap();
    assert!(row.is_deleted);

    pool.close().await;
    drop_test_db(&db_name).await;
}
