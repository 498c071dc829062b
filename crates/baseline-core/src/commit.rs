//! The commit orchestrator: materialize valid plan items into tracker
//! entities and write the publish linkage back onto the source items.
//!
//! The batch is deliberately not atomic. Each tracker insert is its own
//! store round trip; a failure on one entity is recorded and the batch
//! continues, so large plans can partially succeed. Re-running a commit is
//! safe: the working set only contains unpublished items, so an empty plan
//! commits to a zero outcome.
//!
//! Concurrent commits for the same project are not mutually excluded here;
//! ref assignment is scan-and-increment and can race. Callers serialize
//! commits (e.g. disable-while-in-flight in the UI).

use std::collections::{HashMap, HashSet};
use std::fmt;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use baseline_db::models::{
    ChecklistTask, ItemStatus, ItemType, NewDeliverable, NewMilestone, PlanItem, PublishedLink,
    TrackerDeliverable, TrackerMilestone, TrackerStatus,
};
use baseline_db::store::ItemStore;

use crate::classify::classify_items;
use crate::hierarchy::{ItemIndex, descendant_closure};
use crate::refs::next_ref;

/// Which kind of entity a commit error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Milestone,
    Deliverable,
    Task,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Milestone => "milestone",
            Self::Deliverable => "deliverable",
            Self::Task => "task",
        };
        f.write_str(s)
    }
}

/// A hard per-entity failure during a commit. Collected, never thrown;
/// distinct from a structural skip.
#[derive(Debug, Clone, Serialize, thiserror::Error)]
#[error("{kind} {item:?}: {message}")]
pub struct CommitError {
    pub kind: EntityKind,
    /// Name of the source plan item.
    pub item: String,
    pub message: String,
}

/// A structural skip surfaced to the user, mapped from the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSummary {
    pub name: String,
    pub reason: String,
}

/// Result of a commit run. `count` is the total of created milestones,
/// created deliverables, and folded tasks.
#[derive(Debug, Default, Serialize)]
pub struct CommitOutcome {
    pub milestones: Vec<TrackerMilestone>,
    pub deliverables: Vec<TrackerDeliverable>,
    /// Tasks folded into deliverable checklists (tasks are never tracker
    /// rows of their own).
    pub tasks: usize,
    pub count: usize,
    pub errors: Vec<CommitError>,
    pub skipped: Vec<SkippedSummary>,
}

/// Map a plan item status onto the narrower tracker status set.
///
/// `on_hold` surfaces as `at_risk`; `cancelled` has no tracker counterpart
/// and lands back on `not_started`.
pub fn tracker_status(status: ItemStatus) -> TrackerStatus {
    match status {
        ItemStatus::NotStarted | ItemStatus::Cancelled => TrackerStatus::NotStarted,
        ItemStatus::InProgress => TrackerStatus::InProgress,
        ItemStatus::Completed => TrackerStatus::Completed,
        ItemStatus::OnHold => TrackerStatus::AtRisk,
    }
}

/// Commit a project's plan into the tracker.
///
/// Fetches the unpublished working set (optionally restricted to the
/// descendant closure of `component_ids`), classifies it, creates one
/// tracker milestone per valid milestone item and one tracker deliverable
/// per valid deliverable item (folding each valid task into the checklist
/// of its nearest valid deliverable ancestor), and records the publish
/// linkage on every source item.
///
/// Only the initial fetch can fail the whole call. Individual entity
/// failures land in [`CommitOutcome::errors`] and the batch continues.
pub async fn commit_plan(
    store: &dyn ItemStore,
    project_id: Uuid,
    user_id: Uuid,
    component_ids: Option<&[Uuid]>,
) -> Result<CommitOutcome> {
    // 1. Working set: unpublished, non-deleted items for the project.
    let mut items = store
        .unpublished_items(project_id)
        .await
        .context("failed to fetch plan items for commit")?;

    // 2. Optional component scoping via descendant closure.
    if let Some(roots) = component_ids {
        let closure = descendant_closure(&items, roots);
        items.retain(|i| closure.contains(&i.id));
    }

    // 3. Classify.
    let classification = classify_items(&items);
    let mut outcome = CommitOutcome {
        skipped: classification
            .skipped
            .iter()
            .map(|s| SkippedSummary {
                name: s.item.name.clone(),
                reason: s.reason.clone(),
            })
            .collect(),
        ..CommitOutcome::default()
    };

    // 4. Nothing valid is not an error.
    if classification.valid.is_empty() {
        info!(
            project_id = %project_id,
            skipped = outcome.skipped.len(),
            "commit: no valid items in working set"
        );
        return Ok(outcome);
    }

    let index = ItemIndex::new(&items);
    let now = Utc::now();

    // 5. Milestones, in input order. Map source item id -> tracker id so
    // deliverables can resolve their owner.
    let mut milestone_map: HashMap<Uuid, Uuid> = HashMap::new();

    for item in classification
        .valid
        .iter()
        .filter(|i| i.item_type == ItemType::Milestone)
    {
        let milestone_ref = assign_ref(store, project_id, 'M').await;
        let new = NewMilestone {
            project_id,
            milestone_ref,
            name: item.name.clone(),
            description: item.description.clone(),
            start_date: item.start_date,
            end_date: item.end_date,
            status: tracker_status(item.status),
            billable: item.billable,
            created_by: Some(user_id),
        };

        match store.create_milestone(new).await {
            Ok(milestone) => {
                milestone_map.insert(item.id, milestone.id);
                record_publish(
                    store,
                    item,
                    PublishedLink::Milestone(milestone.id),
                    now,
                    EntityKind::Milestone,
                    &mut outcome.errors,
                )
                .await;
                outcome.milestones.push(milestone);
            }
            Err(e) => {
                warn!(
                    project_id = %project_id,
                    item = %item.name,
                    error = %e,
                    "milestone creation failed, continuing batch"
                );
                outcome.errors.push(CommitError {
                    kind: EntityKind::Milestone,
                    item: item.name.clone(),
                    message: format!("{e:#}"),
                });
            }
        }
    }

    // 6. Deliverables, in input order, owner resolved by walking parents
    // through the milestone map (a deliverable nested under another
    // deliverable resolves to the nearest mapped ancestor).
    //
    // Each task folds into exactly one checklist: the nearest valid
    // deliverable on its parent chain. With nested deliverables a task is
    // a structural descendant of every enclosing one, so filtering per
    // deliverable would fold (and publish) it more than once.
    let valid_deliverable_ids: HashSet<Uuid> = classification
        .valid
        .iter()
        .filter(|i| i.item_type == ItemType::Deliverable)
        .map(|i| i.id)
        .collect();
    let mut tasks_by_owner: HashMap<Uuid, Vec<&PlanItem>> = HashMap::new();
    for task in classification
        .valid
        .iter()
        .filter(|i| i.item_type == ItemType::Task)
    {
        if let Some(owner) = index.find_ancestor(task, |a| valid_deliverable_ids.contains(&a.id)) {
            tasks_by_owner.entry(owner.id).or_default().push(task);
        }
    }

    for item in classification
        .valid
        .iter()
        .filter(|i| i.item_type == ItemType::Deliverable)
    {
        let Some(milestone_id) = index.ancestor_lookup(item, &milestone_map).copied() else {
            outcome.errors.push(CommitError {
                kind: EntityKind::Deliverable,
                item: item.name.clone(),
                message: "no committed milestone found in ancestor chain".to_owned(),
            });
            continue;
        };

        // Fold the tasks owned by this deliverable into the checklist, in
        // traversal order, numbering from 1.
        let folded: &[&PlanItem] = tasks_by_owner
            .get(&item.id)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let checklist: Vec<ChecklistTask> = folded
            .iter()
            .enumerate()
            .map(|(i, t)| ChecklistTask {
                id: t.id,
                name: t.name.clone(),
                completed: t.status == ItemStatus::Completed,
                order: i as i32 + 1,
            })
            .collect();

        let deliverable_ref = assign_ref(store, project_id, 'D').await;
        let new = NewDeliverable {
            project_id,
            milestone_id,
            deliverable_ref,
            name: item.name.clone(),
            description: item.description.clone(),
            start_date: item.start_date,
            end_date: item.end_date,
            status: tracker_status(item.status),
            tasks_checklist: checklist,
            created_by: Some(user_id),
        };

        match store.create_deliverable(new).await {
            Ok(deliverable) => {
                record_publish(
                    store,
                    item,
                    PublishedLink::Deliverable(deliverable.id),
                    now,
                    EntityKind::Deliverable,
                    &mut outcome.errors,
                )
                .await;
                // Folded tasks are published via their deliverable.
                for task in folded {
                    record_publish(
                        store,
                        task,
                        PublishedLink::Deliverable(deliverable.id),
                        now,
                        EntityKind::Task,
                        &mut outcome.errors,
                    )
                    .await;
                }
                outcome.tasks += folded.len();
                outcome.deliverables.push(deliverable);
            }
            Err(e) => {
                warn!(
                    project_id = %project_id,
                    item = %item.name,
                    error = %e,
                    "deliverable creation failed, continuing batch"
                );
                outcome.errors.push(CommitError {
                    kind: EntityKind::Deliverable,
                    item: item.name.clone(),
                    message: format!("{e:#}"),
                });
            }
        }
    }

    // 7. Totals.
    outcome.count = outcome.milestones.len() + outcome.deliverables.len() + outcome.tasks;

    info!(
        project_id = %project_id,
        milestones = outcome.milestones.len(),
        deliverables = outcome.deliverables.len(),
        tasks = outcome.tasks,
        errors = outcome.errors.len(),
        skipped = outcome.skipped.len(),
        "commit finished"
    );

    Ok(outcome)
}

/// Assign the next sequential ref for `prefix`, defaulting to `{prefix}01`
/// when the lookup fails (ref assignment must never sink a commit).
async fn assign_ref(store: &dyn ItemStore, project_id: Uuid, prefix: char) -> String {
    let refs = match prefix {
        'M' => store.milestone_refs(project_id).await,
        _ => store.deliverable_refs(project_id).await,
    };
    match refs {
        Ok(refs) => next_ref(prefix, &refs),
        Err(e) => {
            warn!(
                project_id = %project_id,
                prefix = %prefix,
                error = %e,
                "ref lookup failed, defaulting"
            );
            format!("{prefix}01")
        }
    }
}

/// Write the publish linkage onto a source item; on failure the tracker
/// row already exists, so record the error and keep going.
async fn record_publish(
    store: &dyn ItemStore,
    item: &PlanItem,
    link: PublishedLink,
    published_at: chrono::DateTime<Utc>,
    kind: EntityKind,
    errors: &mut Vec<CommitError>,
) {
    if let Err(e) = store.mark_published(item.id, link, published_at).await {
        warn!(
            item = %item.name,
            error = %e,
            "publish write-back failed; item will be retried on next commit"
        );
        errors.push(CommitError {
            kind,
            item: item.name.clone(),
            message: format!("created tracker entity but failed to record publish linkage: {e:#}"),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_is_total() {
        assert_eq!(
            tracker_status(ItemStatus::NotStarted),
            TrackerStatus::NotStarted
        );
        assert_eq!(
            tracker_status(ItemStatus::InProgress),
            TrackerStatus::InProgress
        );
        assert_eq!(
            tracker_status(ItemStatus::Completed),
            TrackerStatus::Completed
        );
        assert_eq!(tracker_status(ItemStatus::OnHold), TrackerStatus::AtRisk);
        // Lossy by design: the tracker has no cancelled state.
        assert_eq!(
            tracker_status(ItemStatus::Cancelled),
            TrackerStatus::NotStarted
        );
    }

    #[test]
    fn commit_error_display() {
        let err = CommitError {
            kind: EntityKind::Milestone,
            item: "Design".to_owned(),
            message: "boom".to_owned(),
        };
        assert_eq!(err.to_string(), "milestone \"Design\": boom");
    }
}
