//! Baseline drift detection: compare current plan item values against the
//! locked baseline snapshots held on linked tracker milestones.
//!
//! Read-only and side-effect-free. Only items with a direct milestone link
//! are considered; items published via a deliverable have no baseline to
//! diff against in this schema.

use std::collections::HashMap;
use std::fmt;

use anyhow::{Context, Result};
use serde::Serialize;
use uuid::Uuid;

use baseline_db::store::ItemStore;

/// Which field pair diverged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftField {
    StartDate,
    EndDate,
    Billable,
}

impl fmt::Display for DriftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::StartDate => "start_date",
            Self::EndDate => "end_date",
            Self::Billable => "billable",
        };
        f.write_str(s)
    }
}

/// One field-level divergence between a plan item and its locked baseline.
#[derive(Debug, Clone, Serialize)]
pub struct BaselineChange {
    pub plan_item_id: Uuid,
    pub plan_item_name: String,
    pub plan_item_wbs: Option<String>,
    pub milestone_id: Uuid,
    pub field: DriftField,
    pub current_value: String,
    pub baseline_value: String,
}

/// Report every field where a published plan item has drifted from its
/// linked milestone's locked baseline.
///
/// A change is emitted only when both sides of a field pair are present
/// and unequal; unlocked baselines are never compared.
pub async fn detect_baseline_changes(
    store: &dyn ItemStore,
    project_id: Uuid,
) -> Result<Vec<BaselineChange>> {
    let items = store
        .published_milestone_items(project_id)
        .await
        .context("failed to fetch published plan items for drift detection")?;

    let milestone_ids: Vec<Uuid> = items
        .iter()
        .filter_map(|i| i.published_milestone_id)
        .collect();
    if milestone_ids.is_empty() {
        return Ok(Vec::new());
    }

    let milestones = store
        .milestones_by_ids(&milestone_ids)
        .await
        .context("failed to fetch linked milestones for drift detection")?;
    let by_id: HashMap<Uuid, _> = milestones.iter().map(|m| (m.id, m)).collect();

    let mut changes = Vec::new();
    for item in &items {
        let Some(milestone) = item.published_milestone_id.and_then(|id| by_id.get(&id)) else {
            continue;
        };
        if !milestone.baseline_locked {
            continue;
        }

        let mut push = |field: DriftField, current: String, baseline: String| {
            changes.push(BaselineChange {
                plan_item_id: item.id,
                plan_item_name: item.name.clone(),
                plan_item_wbs: item.wbs.clone(),
                milestone_id: milestone.id,
                field,
                current_value: current,
                baseline_value: baseline,
            });
        };

        if let (Some(current), Some(baseline)) = (item.start_date, milestone.baseline_start_date) {
            if current != baseline {
                push(DriftField::StartDate, current.to_string(), baseline.to_string());
            }
        }
        if let (Some(current), Some(baseline)) = (item.end_date, milestone.baseline_end_date) {
            if current != baseline {
                push(DriftField::EndDate, current.to_string(), baseline.to_string());
            }
        }
        if let (Some(current), Some(baseline)) = (item.billable, milestone.baseline_billable) {
            if current != baseline {
                push(DriftField::Billable, current.to_string(), baseline.to_string());
            }
        }
    }

    Ok(changes)
}
