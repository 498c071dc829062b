//! The baseline engine: converts a mutable hierarchical plan into immutable
//! tracker entities and reports on the result.
//!
//! - [`classify`] partitions plan items into commit-eligible and skipped.
//! - [`commit`] materializes tracker milestones/deliverables and writes the
//!   publish linkage back onto the source items.
//! - [`drift`] reports divergence between plan items and locked baselines.
//! - [`rollup`] aggregates commit progress per component.
//! - [`schedule`] keeps start/end/duration consistent on grid edits.
//!
//! All persistence goes through `baseline_db::store::ItemStore`, so the
//! engine is store-agnostic.

pub mod classify;
pub mod commit;
pub mod drift;
pub mod hierarchy;
pub mod refs;
pub mod rollup;
pub mod schedule;

pub use classify::{Classification, SkippedItem, classify_items};
pub use commit::{CommitError, CommitOutcome, EntityKind, SkippedSummary, commit_plan};
pub use drift::{BaselineChange, DriftField, detect_baseline_changes};
pub use rollup::{CommitSummary, ComponentSummary, commit_summary};
pub use schedule::{Schedule, ScheduleField, schedule_update};
