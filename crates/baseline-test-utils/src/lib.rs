//! Shared test utilities for baseline integration tests.
//!
//! The engine treats persistence as an external collaborator behind the
//! [`ItemStore`] trait, so engine tests run against [`MemoryStore`]: an
//! in-memory implementation with the same contract as the PostgreSQL
//! store, plus failure injection for exercising partial-failure paths.
//! Database tests run against real PostgreSQL via the [`pg`] harness.

pub mod pg;

use std::collections::HashSet;
use std::sync::Mutex;

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use baseline_db::models::{
    ItemStatus, ItemType, NewDeliverable, NewMilestone, PlanItem, PublishedLink,
    TrackerDeliverable, TrackerMilestone, TrackerStatus,
};
use baseline_db::store::ItemStore;

/// Parse a literal ISO date. Panics on malformed input; tests only.
pub fn date(s: &str) -> NaiveDate {
    s.parse().expect("valid test date")
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Inner {
    items: Vec<PlanItem>,
    milestones: Vec<TrackerMilestone>,
    deliverables: Vec<TrackerDeliverable>,
    /// Entity names whose insert should fail (both tables).
    fail_inserts: HashSet<String>,
}

/// In-memory [`ItemStore`] with the same ordering and filtering semantics
/// as the PostgreSQL store.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a plan item.
    pub fn seed_item(&self, item: PlanItem) {
        self.inner.lock().unwrap().items.push(item);
    }

    /// Seed an existing tracker milestone (e.g. to pre-populate refs).
    pub fn seed_milestone(&self, milestone: TrackerMilestone) {
        self.inner.lock().unwrap().milestones.push(milestone);
    }

    /// Make every insert of an entity with this name fail.
    pub fn fail_insert_named(&self, name: &str) {
        self.inner.lock().unwrap().fail_inserts.insert(name.to_owned());
    }

    /// Remove a seeded plan item (tests emulate edits by replacing rows).
    pub fn remove_item(&self, id: Uuid) {
        self.inner.lock().unwrap().items.retain(|i| i.id != id);
    }

    /// Snapshot of a plan item by id.
    pub fn item(&self, id: Uuid) -> Option<PlanItem> {
        self.inner
            .lock()
            .unwrap()
            .items
            .iter()
            .find(|i| i.id == id)
            .cloned()
    }

    /// Snapshot of all tracker milestones.
    pub fn milestones(&self) -> Vec<TrackerMilestone> {
        self.inner.lock().unwrap().milestones.clone()
    }

    /// Snapshot of all tracker deliverables.
    pub fn deliverables(&self) -> Vec<TrackerDeliverable> {
        self.inner.lock().unwrap().deliverables.clone()
    }

    /// Lock the baseline on every seeded milestone.
    pub fn lock_all_baselines(&self) {
        for m in &mut self.inner.lock().unwrap().milestones {
            m.baseline_locked = true;
        }
    }
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn unpublished_items(&self, project_id: Uuid) -> Result<Vec<PlanItem>> {
        let inner = self.inner.lock().unwrap();
        let mut items: Vec<PlanItem> = inner
            .items
            .iter()
            .filter(|i| i.project_id == project_id && !i.is_published && !i.is_deleted)
            .cloned()
            .collect();
        items.sort_by_key(|i| i.sort_order);
        Ok(items)
    }

    async fn active_items(&self, project_id: Uuid) -> Result<Vec<PlanItem>> {
        let inner = self.inner.lock().unwrap();
        let mut items: Vec<PlanItem> = inner
            .items
            .iter()
            .filter(|i| i.project_id == project_id && !i.is_deleted)
            .cloned()
            .collect();
        items.sort_by_key(|i| i.sort_order);
        Ok(items)
    }

    async fn published_milestone_items(&self, project_id: Uuid) -> Result<Vec<PlanItem>> {
        let inner = self.inner.lock().unwrap();
        let mut items: Vec<PlanItem> = inner
            .items
            .iter()
            .filter(|i| {
                i.project_id == project_id
                    && i.is_published
                    && i.published_milestone_id.is_some()
            })
            .cloned()
            .collect();
        items.sort_by_key(|i| i.sort_order);
        Ok(items)
    }

    async fn create_milestone(&self, new: NewMilestone) -> Result<TrackerMilestone> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_inserts.contains(&new.name) {
            bail!("injected insert failure for milestone {:?}", new.name);
        }
        let milestone = TrackerMilestone {
            id: Uuid::new_v4(),
            project_id: new.project_id,
            milestone_ref: new.milestone_ref,
            name: new.name,
            description: new.description,
            start_date: new.start_date,
            end_date: new.end_date,
            status: new.status,
            billable: new.billable,
            baseline_start_date: new.start_date,
            baseline_end_date: new.end_date,
            baseline_billable: new.billable,
            baseline_locked: false,
            created_by: new.created_by,
            created_at: Utc::now(),
        };
        inner.milestones.push(milestone.clone());
        Ok(milestone)
    }

    async fn create_deliverable(&self, new: NewDeliverable) -> Result<TrackerDeliverable> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_inserts.contains(&new.name) {
            bail!("injected insert failure for deliverable {:?}", new.name);
        }
        let deliverable = TrackerDeliverable {
            id: Uuid::new_v4(),
            project_id: new.project_id,
            milestone_id: new.milestone_id,
            deliverable_ref: new.deliverable_ref,
            name: new.name,
            description: new.description,
            start_date: new.start_date,
            end_date: new.end_date,
            status: new.status,
            tasks_checklist: Json(new.tasks_checklist),
            created_by: new.created_by,
            created_at: Utc::now(),
        };
        inner.deliverables.push(deliverable.clone());
        Ok(deliverable)
    }

    async fn mark_published(
        &self,
        item_id: Uuid,
        link: PublishedLink,
        published_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let Some(item) = inner.items.iter_mut().find(|i| i.id == item_id) else {
            bail!("plan item {item_id} not found");
        };
        item.is_published = true;
        item.published_at = Some(published_at);
        match link {
            PublishedLink::Milestone(id) => item.published_milestone_id = Some(id),
            PublishedLink::Deliverable(id) => item.published_deliverable_id = Some(id),
        }
        Ok(())
    }

    async fn milestone_refs(&self, project_id: Uuid) -> Result<Vec<String>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .milestones
            .iter()
            .filter(|m| m.project_id == project_id)
            .map(|m| m.milestone_ref.clone())
            .collect())
    }

    async fn deliverable_refs(&self, project_id: Uuid) -> Result<Vec<String>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .deliverables
            .iter()
            .filter(|d| d.project_id == project_id)
            .map(|d| d.deliverable_ref.clone())
            .collect())
    }

    async fn milestones_by_ids(&self, ids: &[Uuid]) -> Result<Vec<TrackerMilestone>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .milestones
            .iter()
            .filter(|m| ids.contains(&m.id))
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Builder for plan item fixtures. Starts from a sensible default row and
/// lets tests override only what matters.
pub struct ItemBuilder {
    item: PlanItem,
}

/// Start a plan item fixture.
pub fn item(project_id: Uuid, item_type: ItemType, name: &str) -> ItemBuilder {
    ItemBuilder {
        item: PlanItem {
            id: Uuid::new_v4(),
            project_id,
            parent_id: None,
            item_type,
            sort_order: 0,
            wbs: None,
            name: name.to_owned(),
            description: None,
            start_date: None,
            end_date: None,
            duration_days: None,
            progress: 0,
            status: ItemStatus::NotStarted,
            billable: None,
            cost: None,
            is_deleted: false,
            is_published: false,
            published_milestone_id: None,
            published_deliverable_id: None,
            published_at: None,
            created_at: Utc::now(),
        },
    }
}

impl ItemBuilder {
    pub fn id(mut self, id: Uuid) -> Self {
        self.item.id = id;
        self
    }

    pub fn parent(mut self, parent_id: Uuid) -> Self {
        self.item.parent_id = Some(parent_id);
        self
    }

    pub fn sort(mut self, sort_order: i32) -> Self {
        self.item.sort_order = sort_order;
        self
    }

    pub fn dates(mut self, start: &str, end: &str) -> Self {
        self.item.start_date = Some(date(start));
        self.item.end_date = Some(date(end));
        self
    }

    pub fn status(mut self, status: ItemStatus) -> Self {
        self.item.status = status;
        self
    }

    pub fn billable(mut self, amount: f64) -> Self {
        self.item.billable = Some(amount);
        self
    }

    pub fn wbs(mut self, wbs: &str) -> Self {
        self.item.wbs = Some(wbs.to_owned());
        self
    }

    pub fn deleted(mut self) -> Self {
        self.item.is_deleted = true;
        self
    }

    /// Mark as already published with a direct milestone link.
    pub fn published_to_milestone(mut self, milestone_id: Uuid) -> Self {
        self.item.is_published = true;
        self.item.published_milestone_id = Some(milestone_id);
        self.item.published_at = Some(Utc::now());
        self
    }

    pub fn build(self) -> PlanItem {
        self.item
    }
}

/// Tracker milestone fixture, unlocked baseline by default.
pub fn tracker_milestone(project_id: Uuid, milestone_ref: &str, name: &str) -> TrackerMilestone {
    TrackerMilestone {
        id: Uuid::new_v4(),
        project_id,
        milestone_ref: milestone_ref.to_owned(),
        name: name.to_owned(),
        description: None,
        start_date: None,
        end_date: None,
        status: TrackerStatus::NotStarted,
        billable: None,
        baseline_start_date: None,
        baseline_end_date: None,
        baseline_billable: None,
        baseline_locked: false,
        created_by: None,
        created_at: Utc::now(),
    }
}
