//! Parent-chain traversal over the flattened plan hierarchy.
//!
//! Plan items form a tree flattened into a list with back-references
//! (`parent_id`). Every operation builds an [`ItemIndex`] once and walks
//! via map lookups bounded by [`MAX_ANCESTOR_HOPS`], so a corrupt chain
//! with a cycle can never hang a walk.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use baseline_db::models::PlanItem;

/// Upper bound on parent-chain hops. Guards against accidental cycles.
pub const MAX_ANCESTOR_HOPS: usize = 100;

/// Id-keyed view over a slice of plan items.
pub struct ItemIndex<'a> {
    by_id: HashMap<Uuid, &'a PlanItem>,
}

impl<'a> ItemIndex<'a> {
    pub fn new(items: &'a [PlanItem]) -> Self {
        Self {
            by_id: items.iter().map(|i| (i.id, i)).collect(),
        }
    }

    pub fn get(&self, id: Uuid) -> Option<&'a PlanItem> {
        self.by_id.get(&id).copied()
    }

    /// Walk up the parent chain; true when any ancestor id is in `targets`.
    pub fn ancestor_in_set(&self, item: &PlanItem, targets: &HashSet<Uuid>) -> bool {
        let mut current = item.parent_id;
        for _ in 0..MAX_ANCESTOR_HOPS {
            let Some(id) = current else {
                return false;
            };
            if targets.contains(&id) {
                return true;
            }
            current = self.get(id).and_then(|p| p.parent_id);
        }
        false
    }

    /// Walk up the parent chain; return the first ancestor matching `pred`.
    pub fn find_ancestor(
        &self,
        item: &PlanItem,
        pred: impl Fn(&PlanItem) -> bool,
    ) -> Option<&'a PlanItem> {
        let mut current = item.parent_id;
        for _ in 0..MAX_ANCESTOR_HOPS {
            let ancestor = self.get(current?)?;
            if pred(ancestor) {
                return Some(ancestor);
            }
            current = ancestor.parent_id;
        }
        None
    }

    /// Walk up the parent chain; return the value keyed by the first
    /// ancestor id present in `map`.
    pub fn ancestor_lookup<'m, V>(
        &self,
        item: &PlanItem,
        map: &'m HashMap<Uuid, V>,
    ) -> Option<&'m V> {
        let mut current = item.parent_id;
        for _ in 0..MAX_ANCESTOR_HOPS {
            let id = current?;
            if let Some(value) = map.get(&id) {
                return Some(value);
            }
            current = self.get(id).and_then(|p| p.parent_id);
        }
        None
    }

    /// True when `ancestor_id` appears in `item`'s parent chain.
    pub fn is_descendant_of(&self, item: &PlanItem, ancestor_id: Uuid) -> bool {
        let mut current = item.parent_id;
        for _ in 0..MAX_ANCESTOR_HOPS {
            let Some(id) = current else {
                return false;
            };
            if id == ancestor_id {
                return true;
            }
            current = self.get(id).and_then(|p| p.parent_id);
        }
        false
    }
}

/// The ids of `roots` plus every structural descendant, computed from a
/// children index over `items` (one pass, no per-child lookups).
pub fn descendant_closure(items: &[PlanItem], roots: &[Uuid]) -> HashSet<Uuid> {
    let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for item in items {
        if let Some(parent_id) = item.parent_id {
            children.entry(parent_id).or_default().push(item.id);
        }
    }

    let mut closure: HashSet<Uuid> = roots.iter().copied().collect();
    let mut queue: Vec<Uuid> = roots.to_vec();
    while let Some(id) = queue.pop() {
        if let Some(child_ids) = children.get(&id) {
            for child_id in child_ids {
                if closure.insert(*child_id) {
                    queue.push(*child_id);
                }
            }
        }
    }
    closure
}
