//! The `ItemStore` trait -- the engine's seam onto persisted plan and
//! tracker data.
//!
//! The commit engine in baseline-core only ever talks to this trait, so it
//! can run against the real PostgreSQL store ([`PgStore`]) or an in-memory
//! fake in tests. The trait is intentionally object-safe so it can be
//! passed around as `&dyn ItemStore`.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    NewDeliverable, NewMilestone, PlanItem, PublishedLink, TrackerDeliverable, TrackerMilestone,
};
use crate::queries::{deliverables, milestones, plan_items};

/// Store interface consumed by the commit engine.
///
/// Reads are consistent only as of their own fetch; no snapshot isolation
/// is promised across calls. Writes are individual statements with no
/// cross-item transaction.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// All non-deleted, unpublished plan items for a project, ordered by
    /// sort_order. The commit working set.
    async fn unpublished_items(&self, project_id: Uuid) -> Result<Vec<PlanItem>>;

    /// All non-deleted plan items for a project, ordered by sort_order.
    async fn active_items(&self, project_id: Uuid) -> Result<Vec<PlanItem>>;

    /// Published plan items carrying a direct milestone link.
    async fn published_milestone_items(&self, project_id: Uuid) -> Result<Vec<PlanItem>>;

    /// Create a tracker milestone, snapshotting baseline columns.
    async fn create_milestone(&self, new: NewMilestone) -> Result<TrackerMilestone>;

    /// Create a tracker deliverable with its folded tasks checklist.
    async fn create_deliverable(&self, new: NewDeliverable) -> Result<TrackerDeliverable>;

    /// Write the publish linkage back onto a source plan item.
    async fn mark_published(
        &self,
        item_id: Uuid,
        link: PublishedLink,
        published_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Existing milestone refs for a project (for sequential assignment).
    async fn milestone_refs(&self, project_id: Uuid) -> Result<Vec<String>>;

    /// Existing deliverable refs for a project.
    async fn deliverable_refs(&self, project_id: Uuid) -> Result<Vec<String>>;

    /// Fetch tracker milestones by ID set.
    async fn milestones_by_ids(&self, ids: &[Uuid]) -> Result<Vec<TrackerMilestone>>;
}

// Compile-time assertion: ItemStore must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn ItemStore) {}
};

/// PostgreSQL-backed [`ItemStore`] over a connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Access the underlying pool (for queries outside the trait surface).
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ItemStore for PgStore {
    async fn unpublished_items(&self, project_id: Uuid) -> Result<Vec<PlanItem>> {
        plan_items::list_unpublished(&self.pool, project_id).await
    }

    async fn active_items(&self, project_id: Uuid) -> Result<Vec<PlanItem>> {
        plan_items::list_active(&self.pool, project_id).await
    }

    async fn published_milestone_items(&self, project_id: Uuid) -> Result<Vec<PlanItem>> {
        plan_items::list_published_milestone_linked(&self.pool, project_id).await
    }

    async fn create_milestone(&self, new: NewMilestone) -> Result<TrackerMilestone> {
        milestones::insert_milestone(&self.pool, &new).await
    }

    async fn create_deliverable(&self, new: NewDeliverable) -> Result<TrackerDeliverable> {
        deliverables::insert_deliverable(&self.pool, &new).await
    }

    async fn mark_published(
        &self,
        item_id: Uuid,
        link: PublishedLink,
        published_at: DateTime<Utc>,
    ) -> Result<()> {
        plan_items::mark_published(&self.pool, item_id, link, published_at).await
    }

    async fn milestone_refs(&self, project_id: Uuid) -> Result<Vec<String>> {
        milestones::list_refs(&self.pool, project_id).await
    }

    async fn deliverable_refs(&self, project_id: Uuid) -> Result<Vec<String>> {
        deliverables::list_refs(&self.pool, project_id).await
    }

    async fn milestones_by_ids(&self, ids: &[Uuid]) -> Result<Vec<TrackerMilestone>> {
        milestones::get_by_ids(&self.pool, ids).await
    }
}
