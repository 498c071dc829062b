//! Database query functions for the `tracker_deliverables` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::models::{NewDeliverable, TrackerDeliverable};

/// Insert a new tracker deliverable with its folded tasks checklist.
pub async fn insert_deliverable(
    pool: &PgPool,
    new: &NewDeliverable,
) -> Result<TrackerDeliverable> {
    let deliverable = sqlx::query_as::<_, TrackerDeliverable>(
        "INSERT INTO tracker_deliverables \
             (project_id, milestone_id, deliverable_ref, name, description, \
              start_date, end_date, status, tasks_checklist, created_by) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         RETURNING *",
    )
    .bind(new.project_id)
    .bind(new.milestone_id)
    .bind(&new.deliverable_ref)
    .bind(&new.name)
    .bind(&new.description)
    .bind(new.start_date)
    .bind(new.end_date)
    .bind(new.status)
    .bind(Json(&new.tasks_checklist))
    .bind(new.created_by)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to insert tracker deliverable {:?}", new.name))?;

    Ok(deliverable)
}

/// List existing deliverable refs for a project, newest-numbered first.
pub async fn list_refs(pool: &PgPool, project_id: Uuid) -> Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT deliverable_ref FROM tracker_deliverables \
         WHERE project_id = $1 \
         ORDER BY deliverable_ref DESC",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
    .context("failed to list deliverable refs")?;

    Ok(rows.into_iter().map(|(r,)| r).collect())
}

/// List all deliverables for a project, ordered by ref.
pub async fn list_for_project(
    pool: &PgPool,
    project_id: Uuid,
) -> Result<Vec<TrackerDeliverable>> {
    let deliverables = sqlx::query_as::<_, TrackerDeliverable>(
        "SELECT * FROM tracker_deliverables WHERE project_id = $1 ORDER BY deliverable_ref ASC",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
    .context("failed to list deliverables")?;

    Ok(deliverables)
}
