//! Database query functions for the `tracker_milestones` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{NewMilestone, TrackerMilestone};

/// Insert a new tracker milestone. Baseline columns are seeded with the same
/// values as the live schedule columns (the commit-time snapshot).
pub async fn insert_milestone(pool: &PgPool, new: &NewMilestone) -> Result<TrackerMilestone> {
    let milestone = sqlx::query_as::<_, TrackerMilestone>(
        "INSERT INTO tracker_milestones \
             (project_id, milestone_ref, name, description, start_date, end_date, status, billable, \
              baseline_start_date, baseline_end_date, baseline_billable, created_by) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $5, $6, $8, $9) \
         RETURNING *",
    )
    .bind(new.project_id)
    .bind(&new.milestone_ref)
    .bind(&new.name)
    .bind(&new.description)
    .bind(new.start_date)
    .bind(new.end_date)
    .bind(new.status)
    .bind(new.billable)
    .bind(new.created_by)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to insert tracker milestone {:?}", new.name))?;

    Ok(milestone)
}

/// List existing milestone refs for a project, newest-numbered first.
/// Input to sequential ref assignment.
pub async fn list_refs(pool: &PgPool, project_id: Uuid) -> Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT milestone_ref FROM tracker_milestones \
         WHERE project_id = $1 \
         ORDER BY milestone_ref DESC",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
    .context("failed to list milestone refs")?;

    Ok(rows.into_iter().map(|(r,)| r).collect())
}

/// Fetch milestones by ID set.
pub async fn get_by_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<TrackerMilestone>> {
    let milestones = sqlx::query_as::<_, TrackerMilestone>(
        "SELECT * FROM tracker_milestones WHERE id = ANY($1)",
    )
    .bind(ids)
    .fetch_all(pool)
    .await
    .context("failed to fetch milestones by id")?;

    Ok(milestones)
}

/// List all milestones for a project, ordered by ref.
pub async fn list_for_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<TrackerMilestone>> {
    let milestones = sqlx::query_as::<_, TrackerMilestone>(
        "SELECT * FROM tracker_milestones WHERE project_id = $1 ORDER BY milestone_ref ASC",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
    .context("failed to list milestones")?;

    Ok(milestones)
}

/// Lock the baseline on every milestone of a project that is not yet
/// locked. Returns the number of milestones affected.
pub async fn lock_baselines(pool: &PgPool, project_id: Uuid) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE tracker_milestones \
         SET baseline_locked = TRUE \
         WHERE project_id = $1 AND NOT baseline_locked",
    )
    .bind(project_id)
    .execute(pool)
    .await
    .context("failed to lock baselines")?;

    Ok(result.rows_affected())
}
