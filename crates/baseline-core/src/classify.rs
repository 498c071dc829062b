//! Structural classification of plan items ahead of a commit.
//!
//! Three ordered passes: milestones first, then deliverables (which must
//! sit under a valid milestone), then tasks (which must sit under a valid
//! deliverable). Each pass feeds the ancestor-validity set of the next.
//! A structurally bad item is skipped with a reason; it never fails the
//! classification and never blocks its siblings.

use std::collections::HashSet;

use uuid::Uuid;

use baseline_db::models::{ItemType, PlanItem};

use crate::hierarchy::ItemIndex;

/// Partition of a working set into commit-eligible items and skips.
///
/// Organizational items (components, phases) appear in neither list; they
/// never materialize into tracker entities but stay available to ancestor
/// walks through the original input slice.
#[derive(Debug, Default)]
pub struct Classification {
    /// Items safe to commit, in pass order (milestones, deliverables,
    /// tasks) and input order within each pass.
    pub valid: Vec<PlanItem>,
    /// Items excluded from the commit, each with a user-facing reason.
    pub skipped: Vec<SkippedItem>,
}

/// A plan item excluded from a commit, with the reason shown to the user.
#[derive(Debug, Clone)]
pub struct SkippedItem {
    pub item: PlanItem,
    pub reason: String,
}

/// Classify a working set of plan items.
///
/// `items` is the full working set (non-deleted, unpublished, optionally
/// component-scoped); organizational items must be included so ancestor
/// chains stay intact.
pub fn classify_items(items: &[PlanItem]) -> Classification {
    let index = ItemIndex::new(items);
    let mut result = Classification::default();

    // Pass 1: milestones.
    let mut valid_milestones: HashSet<Uuid> = HashSet::new();
    for item in items.iter().filter(|i| i.item_type == ItemType::Milestone) {
        match milestone_problem(item, &index) {
            None => {
                valid_milestones.insert(item.id);
                result.valid.push(item.clone());
            }
            Some(reason) => result.skipped.push(SkippedItem {
                item: item.clone(),
                reason,
            }),
        }
    }

    // Pass 2: deliverables, against the pass-1 set.
    let mut valid_deliverables: HashSet<Uuid> = HashSet::new();
    for item in items.iter().filter(|i| i.item_type == ItemType::Deliverable) {
        match deliverable_problem(item, &index, &valid_milestones) {
            None => {
                valid_deliverables.insert(item.id);
                result.valid.push(item.clone());
            }
            Some(reason) => result.skipped.push(SkippedItem {
                item: item.clone(),
                reason,
            }),
        }
    }

    // Pass 3: tasks, against the pass-2 set.
    for item in items.iter().filter(|i| i.item_type == ItemType::Task) {
        match task_problem(item, &index, &valid_deliverables) {
            None => result.valid.push(item.clone()),
            Some(reason) => result.skipped.push(SkippedItem {
                item: item.clone(),
                reason,
            }),
        }
    }

    result
}

fn milestone_problem(item: &PlanItem, index: &ItemIndex<'_>) -> Option<String> {
    if item.name.trim().is_empty() {
        return Some("Milestone name is empty".to_owned());
    }
    let (Some(start), Some(end)) = (item.start_date, item.end_date) else {
        return Some("Milestone missing start or end date".to_owned());
    };
    if start > end {
        return Some("Milestone start date is after its end date".to_owned());
    }
    // A milestone must be a root or sit directly under a component.
    if let Some(parent_id) = item.parent_id {
        let parent_is_component = index
            .get(parent_id)
            .is_some_and(|p| p.item_type == ItemType::Component);
        if !parent_is_component {
            return Some("Milestone parent is not a component".to_owned());
        }
    }
    None
}

fn deliverable_problem(
    item: &PlanItem,
    index: &ItemIndex<'_>,
    valid_milestones: &HashSet<Uuid>,
) -> Option<String> {
    if item.name.trim().is_empty() {
        return Some("Deliverable name is empty".to_owned());
    }
    if item.parent_id.is_none() {
        return Some("Deliverable has no parent".to_owned());
    }
    if !index.ancestor_in_set(item, valid_milestones) {
        return Some("Deliverable not under a valid milestone".to_owned());
    }
    None
}

fn task_problem(
    item: &PlanItem,
    index: &ItemIndex<'_>,
    valid_deliverables: &HashSet<Uuid>,
) -> Option<String> {
    if item.name.trim().is_empty() {
        return Some("Task name is empty".to_owned());
    }
    if item.parent_id.is_none() {
        return Some("Task has no parent".to_owned());
    }
    if !index.ancestor_in_set(item, valid_deliverables) {
        return Some("Task not under a valid deliverable".to_owned());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    use baseline_db::models::ItemType;
    use baseline_test_utils::item;

    fn names(items: &[PlanItem]) -> Vec<&str> {
        items.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn full_valid_chain() {
        let project = Uuid::new_v4();
        let component = item(project, ItemType::Component, "Workstream A").build();
        let milestone = item(project, ItemType::Milestone, "Design")
            .parent(component.id)
            .dates("2026-01-01", "2026-01-31")
            .build();
        let deliverable = item(project, ItemType::Deliverable, "Wireframes")
            .parent(milestone.id)
            .build();
        let task = item(project, ItemType::Task, "Draft screens")
            .parent(deliverable.id)
            .build();
        let items = vec![component, milestone, deliverable, task];

        let result = classify_items(&items);
        assert_eq!(names(&result.valid), ["Design", "Wireframes", "Draft screens"]);
        assert!(result.skipped.is_empty());
    }

    #[test]
    fn milestone_without_dates_is_skipped() {
        let project = Uuid::new_v4();
        let milestone = item(project, ItemType::Milestone, "Design").build();
        let result = classify_items(&[milestone]);

        assert!(result.valid.is_empty());
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(
            result.skipped[0].reason,
            "Milestone missing start or end date"
        );
    }

    #[test]
    fn milestone_with_inverted_dates_is_skipped() {
        let project = Uuid::new_v4();
        let milestone = item(project, ItemType::Milestone, "Design")
            .dates("2026-02-01", "2026-01-01")
            .build();
        let result = classify_items(&[milestone]);

        assert_eq!(result.skipped.len(), 1);
        assert_eq!(
            result.skipped[0].reason,
            "Milestone start date is after its end date"
        );
    }

    #[test]
    fn milestone_under_phase_is_skipped() {
        let project = Uuid::new_v4();
        let phase = item(project, ItemType::Phase, "Phase 1").build();
        let milestone = item(project, ItemType::Milestone, "Design")
            .parent(phase.id)
            .dates("2026-01-01", "2026-01-31")
            .build();
        let result = classify_items(&[phase, milestone]);

        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].reason, "Milestone parent is not a component");
    }

    #[test]
    fn deliverable_under_invalid_milestone_is_skipped() {
        let project = Uuid::new_v4();
        // Milestone lacks dates, so it is invalid; its deliverable falls too.
        let milestone = item(project, ItemType::Milestone, "Design").build();
        let deliverable = item(project, ItemType::Deliverable, "Wireframes")
            .parent(milestone.id)
            .build();
        let result = classify_items(&[milestone, deliverable]);

        assert!(result.valid.is_empty());
        assert_eq!(result.skipped.len(), 2);
        assert_eq!(
            result.skipped[1].reason,
            "Deliverable not under a valid milestone"
        );
    }

    #[test]
    fn classification_soundness() {
        // Every valid deliverable reaches a valid milestone; every valid
        // task reaches a valid deliverable.
        let project = Uuid::new_v4();
        let m_ok = item(project, ItemType::Milestone, "M ok")
            .dates("2026-01-01", "2026-01-31")
            .build();
        let m_bad = item(project, ItemType::Milestone, "M bad").build();
        let d_ok = item(project, ItemType::Deliverable, "D ok")
            .parent(m_ok.id)
            .build();
        let d_orphan = item(project, ItemType::Deliverable, "D orphan")
            .parent(m_bad.id)
            .build();
        let t_ok = item(project, ItemType::Task, "T ok").parent(d_ok.id).build();
        let t_orphan = item(project, ItemType::Task, "T orphan")
            .parent(d_orphan.id)
            .build();
        let items = vec![m_ok, m_bad, d_ok, d_orphan, t_ok, t_orphan];

        let result = classify_items(&items);
        let index = ItemIndex::new(&items);
        let valid_milestones: HashSet<Uuid> = result
            .valid
            .iter()
            .filter(|i| i.item_type == ItemType::Milestone)
            .map(|i| i.id)
            .collect();
        let valid_deliverables: HashSet<Uuid> = result
            .valid
            .iter()
            .filter(|i| i.item_type == ItemType::Deliverable)
            .map(|i| i.id)
            .collect();

        for entry in &result.valid {
            match entry.item_type {
                ItemType::Deliverable => {
                    assert!(index.ancestor_in_set(entry, &valid_milestones));
                }
                ItemType::Task => {
                    assert!(index.ancestor_in_set(entry, &valid_deliverables));
                }
                _ => {}
            }
        }
        assert_eq!(names(&result.valid), ["M ok", "D ok", "T ok"]);
    }

    #[test]
    fn blank_names_are_skipped() {
        let project = Uuid::new_v4();
        let milestone = item(project, ItemType::Milestone, "  ")
            .dates("2026-01-01", "2026-01-31")
            .build();
        let result = classify_items(&[milestone]);
        assert_eq!(result.skipped[0].reason, "Milestone name is empty");
    }

    #[test]
    fn organizational_items_in_neither_list() {
        let project = Uuid::new_v4();
        let component = item(project, ItemType::Component, "Workstream").build();
        let phase = item(project, ItemType::Phase, "Phase 1").build();
        let result = classify_items(&[component, phase]);

        assert!(result.valid.is_empty());
        assert!(result.skipped.is_empty());
    }
}
