//! Database query functions, one module per table.

pub mod deliverables;
pub mod milestones;
pub mod plan_items;
