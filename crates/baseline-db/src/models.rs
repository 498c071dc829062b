use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Structural type of a plan item.
///
/// `Component` and `Phase` are organizational only: they group other items
/// and never materialize into tracker entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Component,
    Milestone,
    Deliverable,
    Task,
    Phase,
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Component => "component",
            Self::Milestone => "milestone",
            Self::Deliverable => "deliverable",
            Self::Task => "task",
            Self::Phase => "phase",
        };
        f.write_str(s)
    }
}

impl FromStr for ItemType {
    type Err = ItemTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "component" => Ok(Self::Component),
            "milestone" => Ok(Self::Milestone),
            "deliverable" => Ok(Self::Deliverable),
            "task" => Ok(Self::Task),
            "phase" => Ok(Self::Phase),
            other => Err(ItemTypeParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`ItemType`] string.
#[derive(Debug, Clone)]
pub struct ItemTypeParseError(pub String);

impl fmt::Display for ItemTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid item type: {:?}", self.0)
    }
}

impl std::error::Error for ItemTypeParseError {}

// ---------------------------------------------------------------------------

/// Status of a plan item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    NotStarted,
    InProgress,
    Completed,
    OnHold,
    Cancelled,
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::OnHold => "on_hold",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

impl FromStr for ItemStatus {
    type Err = ItemStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(Self::NotStarted),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "on_hold" => Ok(Self::OnHold),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(ItemStatusParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`ItemStatus`] string.
#[derive(Debug, Clone)]
pub struct ItemStatusParseError(pub String);

impl fmt::Display for ItemStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid item status: {:?}", self.0)
    }
}

impl std::error::Error for ItemStatusParseError {}

// ---------------------------------------------------------------------------

/// Status of a tracker milestone or deliverable.
///
/// Note the tracker status set is narrower than [`ItemStatus`]: `on_hold`
/// maps to `at_risk` and `cancelled` maps back to `not_started` when a plan
/// item is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TrackerStatus {
    NotStarted,
    InProgress,
    Completed,
    AtRisk,
}

impl TrackerStatus {
    /// Human-readable label as shown in tracker views.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::AtRisk => "At Risk",
        }
    }
}

impl fmt::Display for TrackerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::AtRisk => "at_risk",
        };
        f.write_str(s)
    }
}

impl FromStr for TrackerStatus {
    type Err = TrackerStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(Self::NotStarted),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "at_risk" => Ok(Self::AtRisk),
            other => Err(TrackerStatusParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`TrackerStatus`] string.
#[derive(Debug, Clone)]
pub struct TrackerStatusParseError(pub String);

impl fmt::Display for TrackerStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid tracker status: {:?}", self.0)
    }
}

impl std::error::Error for TrackerStatusParseError {}

// ---------------------------------------------------------------------------
// Row structs
// ---------------------------------------------------------------------------

/// A node in the mutable planning hierarchy.
///
/// `parent_id` is `None` for roots. Publish linkage columns
/// (`published_milestone_id`, `published_deliverable_id`, `published_at`)
/// are set exactly once when the item is committed and never cleared.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PlanItem {
    pub id: Uuid,
    pub project_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub item_type: ItemType,
    pub sort_order: i32,
    /// Display-only work-breakdown-structure code (e.g. "1.2.3").
    pub wbs: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub duration_days: Option<i32>,
    pub progress: i32,
    pub status: ItemStatus,
    pub billable: Option<f64>,
    pub cost: Option<f64>,
    pub is_deleted: bool,
    pub is_published: bool,
    pub published_milestone_id: Option<Uuid>,
    pub published_deliverable_id: Option<Uuid>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A tracker milestone -- immutable once its baseline is locked.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TrackerMilestone {
    pub id: Uuid,
    pub project_id: Uuid,
    /// Sequential human-readable code (M01, M02, ...).
    pub milestone_ref: String,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: TrackerStatus,
    pub billable: Option<f64>,
    pub baseline_start_date: Option<NaiveDate>,
    pub baseline_end_date: Option<NaiveDate>,
    pub baseline_billable: Option<f64>,
    /// Once true, the baseline columns are frozen and divergence from the
    /// source plan item is reported as drift rather than synced.
    pub baseline_locked: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A tracker deliverable, owned by exactly one milestone.
///
/// Task-type plan items do not become tracker rows of their own; they are
/// folded into `tasks_checklist` at commit time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TrackerDeliverable {
    pub id: Uuid,
    pub project_id: Uuid,
    pub milestone_id: Uuid,
    /// Sequential human-readable code (D01, D02, ...).
    pub deliverable_ref: String,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: TrackerStatus,
    pub tasks_checklist: Json<Vec<ChecklistTask>>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// One folded task on a deliverable's checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistTask {
    /// Id of the source task-type plan item.
    pub id: Uuid,
    pub name: String,
    pub completed: bool,
    /// 1-based position in traversal order.
    pub order: i32,
}

// ---------------------------------------------------------------------------
// Write payloads
// ---------------------------------------------------------------------------

/// Which tracker entity a plan item was published into.
///
/// Milestone-type items link via `published_milestone_id`; deliverable-type
/// items and their folded tasks link via `published_deliverable_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishedLink {
    Milestone(Uuid),
    Deliverable(Uuid),
}

/// A partial update to a plan item's schedule columns.
///
/// Outer `Option` means "include this column in the update"; inner `Option`
/// is the new value, with `None` clearing the column. Produced by the date
/// synchronization utility in baseline-core and applied by
/// [`crate::queries::plan_items::apply_schedule_update`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleUpdate {
    pub start_date: Option<Option<NaiveDate>>,
    pub end_date: Option<Option<NaiveDate>>,
    pub duration_days: Option<Option<i32>>,
}

impl ScheduleUpdate {
    /// True when no column is included in the update.
    pub fn is_empty(&self) -> bool {
        self.start_date.is_none() && self.end_date.is_none() && self.duration_days.is_none()
    }
}

// ---------------------------------------------------------------------------
// Insert payloads
// ---------------------------------------------------------------------------

/// Fields for creating a tracker milestone, copied from the source plan item
/// at commit time. Baseline columns are snapshots of the same values.
#[derive(Debug, Clone)]
pub struct NewMilestone {
    pub project_id: Uuid,
    pub milestone_ref: String,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: TrackerStatus,
    pub billable: Option<f64>,
    pub created_by: Option<Uuid>,
}

/// Fields for creating a tracker deliverable.
#[derive(Debug, Clone)]
pub struct NewDeliverable {
    pub project_id: Uuid,
    pub milestone_id: Uuid,
    pub deliverable_ref: String,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: TrackerStatus,
    pub tasks_checklist: Vec<ChecklistTask>,
    pub created_by: Option<Uuid>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
