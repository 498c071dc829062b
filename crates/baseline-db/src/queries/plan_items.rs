//! Database query functions for the `plan_items` table.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use crate::models::{ItemStatus, ItemType, PlanItem, PublishedLink, ScheduleUpdate};

/// Insert a new plan item row. Returns the inserted item with
/// server-generated defaults (id, created_at, flags).
#[allow(clippy::too_many_arguments)]
pub async fn insert_plan_item(
    pool: &PgPool,
    project_id: Uuid,
    parent_id: Option<Uuid>,
    item_type: ItemType,
    name: &str,
    sort_order: i32,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    status: ItemStatus,
    billable: Option<f64>,
) -> Result<PlanItem> {
    let item = sqlx::query_as::<_, PlanItem>(
        "INSERT INTO plan_items \
             (project_id, parent_id, item_type, name, sort_order, start_date, end_date, status, billable) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING *",
    )
    .bind(project_id)
    .bind(parent_id)
    .bind(item_type)
    .bind(name)
    .bind(sort_order)
    .bind(start_date)
    .bind(end_date)
    .bind(status)
    .bind(billable)
    .fetch_one(pool)
    .await
    .context("failed to insert plan item")?;

    Ok(item)
}

/// Fetch a single plan item by ID.
pub async fn get_plan_item(pool: &PgPool, id: Uuid) -> Result<Option<PlanItem>> {
    let item = sqlx::query_as::<_, PlanItem>("SELECT * FROM plan_items WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch plan item")?;

    Ok(item)
}

/// List all non-deleted, unpublished items for a project, ordered by
/// sort_order. This is the commit orchestrator's working set.
pub async fn list_unpublished(pool: &PgPool, project_id: Uuid) -> Result<Vec<PlanItem>> {
    let items = sqlx::query_as::<_, PlanItem>(
        "SELECT * FROM plan_items \
         WHERE project_id = $1 AND NOT is_published AND NOT is_deleted \
         ORDER BY sort_order ASC",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
    .context("failed to list unpublished plan items")?;

    Ok(items)
}

/// List all non-deleted items for a project, ordered by sort_order.
pub async fn list_active(pool: &PgPool, project_id: Uuid) -> Result<Vec<PlanItem>> {
    let items = sqlx::query_as::<_, PlanItem>(
        "SELECT * FROM plan_items \
         WHERE project_id = $1 AND NOT is_deleted \
         ORDER BY sort_order ASC",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
    .context("failed to list plan items")?;

    Ok(items)
}

/// List published items that carry a direct milestone link. Input to the
/// baseline drift detector.
pub async fn list_published_milestone_linked(
    pool: &PgPool,
    project_id: Uuid,
) -> Result<Vec<PlanItem>> {
    let items = sqlx::query_as::<_, PlanItem>(
        "SELECT * FROM plan_items \
         WHERE project_id = $1 AND is_published AND published_milestone_id IS NOT NULL \
         ORDER BY sort_order ASC",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
    .context("failed to list published plan items")?;

    Ok(items)
}

/// Record the publish linkage on a plan item: sets `is_published`, the
/// linkage column matching `link`, and `published_at`.
pub async fn mark_published(
    pool: &PgPool,
    id: Uuid,
    link: PublishedLink,
    published_at: DateTime<Utc>,
) -> Result<()> {
    let result = match link {
        PublishedLink::Milestone(milestone_id) => sqlx::query(
            "UPDATE plan_items \
             SET is_published = TRUE, published_milestone_id = $1, published_at = $2 \
             WHERE id = $3",
        )
        .bind(milestone_id)
        .bind(published_at)
        .bind(id)
        .execute(pool)
        .await
        .context("failed to mark plan item published")?,
        PublishedLink::Deliverable(deliverable_id) => sqlx::query(
            "UPDATE plan_items \
             SET is_published = TRUE, published_deliverable_id = $1, published_at = $2 \
             WHERE id = $3",
        )
        .bind(deliverable_id)
        .bind(published_at)
        .bind(id)
        .execute(pool)
        .await
        .context("failed to mark plan item published")?,
    };

    if result.rows_affected() == 0 {
        anyhow::bail!("plan item {id} not found");
    }

    Ok(())
}

/// Apply a schedule patch to a plan item. Columns not included in the
/// update are left untouched. A no-op when the patch is empty.
pub async fn apply_schedule_update(pool: &PgPool, id: Uuid, update: &ScheduleUpdate) -> Result<()> {
    if update.is_empty() {
        return Ok(());
    }

    let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new("UPDATE plan_items SET ");
    let mut fields = builder.separated(", ");
    if let Some(start) = update.start_date {
        fields.push("start_date = ").push_bind_unseparated(start);
    }
    if let Some(end) = update.end_date {
        fields.push("end_date = ").push_bind_unseparated(end);
    }
    if let Some(duration) = update.duration_days {
        fields
            .push("duration_days = ")
            .push_bind_unseparated(duration);
    }
    builder.push(" WHERE id = ").push_bind(id);

    let result = builder
        .build()
        .execute(pool)
        .await
        .context("failed to apply schedule update")?;

    if result.rows_affected() == 0 {
        anyhow::bail!("plan item {id} not found");
    }

    Ok(())
}

/// Soft-delete a plan item. Deleted items are excluded from every commit
/// operation but the row is never removed.
pub async fn soft_delete(pool: &PgPool, id: Uuid) -> Result<()> {
    let result = sqlx::query("UPDATE plan_items SET is_deleted = TRUE WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .context("failed to soft-delete plan item")?;

    if result.rows_affected() == 0 {
        anyhow::bail!("plan item {id} not found");
    }

    Ok(())
}
