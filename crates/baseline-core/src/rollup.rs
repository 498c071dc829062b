//! Per-component commit rollup: how much of the plan has been published,
//! broken down by top-level component containers.

use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use serde::Serialize;
use uuid::Uuid;

use baseline_db::models::ItemType;
use baseline_db::store::ItemStore;

use crate::hierarchy::ItemIndex;

/// Counters for one component container.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentSummary {
    pub id: Uuid,
    pub name: String,
    pub committed: usize,
    pub uncommitted: usize,
    pub total: usize,
}

/// Project-wide commit progress.
#[derive(Debug, Default, Serialize)]
pub struct CommitSummary {
    /// Milestone and deliverable items already published.
    pub committed: usize,
    /// Milestone and deliverable items not yet published.
    pub uncommitted: usize,
    /// Distinct linked tracker milestones with a locked baseline.
    pub baseline_locked: usize,
    /// Breakdown by nearest component ancestor. Items with no component
    /// ancestor appear in the totals only.
    pub by_component: HashMap<Uuid, ComponentSummary>,
}

/// Aggregate commit progress for a project.
pub async fn commit_summary(store: &dyn ItemStore, project_id: Uuid) -> Result<CommitSummary> {
    let items = store
        .active_items(project_id)
        .await
        .context("failed to fetch plan items for commit summary")?;
    let index = ItemIndex::new(&items);

    let mut summary = CommitSummary::default();
    let mut linked_milestones: HashSet<Uuid> = HashSet::new();

    for item in items
        .iter()
        .filter(|i| matches!(i.item_type, ItemType::Milestone | ItemType::Deliverable))
    {
        if item.is_published {
            summary.committed += 1;
        } else {
            summary.uncommitted += 1;
        }
        if let Some(milestone_id) = item.published_milestone_id {
            linked_milestones.insert(milestone_id);
        }

        // Attribute to the nearest component ancestor, when there is one.
        if let Some(component) =
            index.find_ancestor(item, |a| a.item_type == ItemType::Component)
        {
            let entry = summary
                .by_component
                .entry(component.id)
                .or_insert_with(|| ComponentSummary {
                    id: component.id,
                    name: component.name.clone(),
                    committed: 0,
                    uncommitted: 0,
                    total: 0,
                });
            if item.is_published {
                entry.committed += 1;
            } else {
                entry.uncommitted += 1;
            }
            entry.total += 1;
        }
    }

    if !linked_milestones.is_empty() {
        let ids: Vec<Uuid> = linked_milestones.into_iter().collect();
        let milestones = store
            .milestones_by_ids(&ids)
            .await
            .context("failed to fetch linked milestones for commit summary")?;
        summary.baseline_locked = milestones.iter().filter(|m| m.baseline_locked).count();
    }

    Ok(summary)
}
