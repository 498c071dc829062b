//! Plan item commands: add, schedule edit, and listing.

use std::collections::HashMap;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use baseline_core::schedule::{Schedule, ScheduleField, parse_date, schedule_update};
use baseline_db::models::{ItemStatus, ItemType, PlanItem};
use baseline_db::queries::plan_items;

/// Run the `baseline add` command.
#[allow(clippy::too_many_arguments)]
pub async fn run_add(
    pool: &PgPool,
    project_id_str: &str,
    item_type_str: &str,
    name: &str,
    parent_str: Option<&str>,
    sort_order: i32,
    start: Option<&str>,
    end: Option<&str>,
    status_str: &str,
    billable: Option<f64>,
) -> Result<()> {
    let project_id = parse_uuid(project_id_str, "project ID")?;
    let item_type: ItemType = item_type_str
        .parse()
        .with_context(|| format!("invalid item type: {item_type_str}"))?;
    let status: ItemStatus = status_str
        .parse()
        .with_context(|| format!("invalid status: {status_str}"))?;
    let parent_id = parent_str
        .map(|s| parse_uuid(s, "parent ID"))
        .transpose()?;

    let start_date = parse_date_arg(start, "start")?;
    let end_date = parse_date_arg(end, "end")?;
    if let (Some(s), Some(e)) = (start_date, end_date) {
        if s > e {
            bail!("start date {s} is after end date {e}");
        }
    }

    let item = plan_items::insert_plan_item(
        pool, project_id, parent_id, item_type, name, sort_order, start_date, end_date, status,
        billable,
    )
    .await?;

    println!("Created {} {:?} ({})", item.item_type, item.name, item.id);
    Ok(())
}

/// Run the `baseline edit` command: apply one schedule field edit through
/// the date synchronization rules and persist the resulting patch.
pub async fn run_edit(pool: &PgPool, item_id_str: &str, field_str: &str, value: &str) -> Result<()> {
    let item_id = parse_uuid(item_id_str, "item ID")?;
    let field = match field_str {
        "start_date" => ScheduleField::StartDate,
        "end_date" => ScheduleField::EndDate,
        "duration_days" => ScheduleField::DurationDays,
        other => bail!(
            "unknown schedule field {other:?} (expected start_date, end_date, or duration_days)"
        ),
    };

    let item = plan_items::get_plan_item(pool, item_id)
        .await?
        .with_context(|| format!("plan item {item_id} not found"))?;

    let current = Schedule {
        start_date: item.start_date,
        end_date: item.end_date,
        duration_days: item.duration_days,
    };
    let update = schedule_update(field, value, &current);
    plan_items::apply_schedule_update(pool, item_id, &update).await?;

    println!("Updated {:?}:", item.name);
    if let Some(start) = update.start_date {
        println!("  start_date = {}", fmt_date(start));
    }
    if let Some(end) = update.end_date {
        println!("  end_date = {}", fmt_date(end));
    }
    if let Some(duration) = update.duration_days {
        match duration {
            Some(d) => println!("  duration_days = {d}"),
            None => println!("  duration_days = (cleared)"),
        }
    }
    Ok(())
}

/// Run the `baseline items` command: list the plan tree for a project.
pub async fn run_items(pool: &PgPool, project_id_str: &str) -> Result<()> {
    let project_id = parse_uuid(project_id_str, "project ID")?;
    let items = plan_items::list_active(pool, project_id).await?;

    if items.is_empty() {
        println!("No plan items for project {project_id}.");
        return Ok(());
    }

    let depths = depth_map(&items);
    println!("Plan items for project {project_id}:");
    for item in &items {
        let depth = depths.get(&item.id).copied().unwrap_or(0);
        let marker = if item.is_published { "+" } else { "." };
        let dates = match (item.start_date, item.end_date) {
            (Some(s), Some(e)) => format!(" {s}..{e}"),
            _ => String::new(),
        };
        println!(
            "  [{marker}] {:indent$}{} {} ({}){dates}",
            "",
            item.item_type,
            item.name,
            item.id,
            indent = depth * 2,
        );
    }
    println!();
    println!("[+] published  [.] unpublished");
    Ok(())
}

/// Run the `baseline remove` command: soft-delete a plan item.
pub async fn run_remove(pool: &PgPool, item_id_str: &str) -> Result<()> {
    let item_id = parse_uuid(item_id_str, "item ID")?;
    plan_items::soft_delete(pool, item_id).await?;
    println!("Removed plan item {item_id}.");
    Ok(())
}

/// Depth of each item in the parent hierarchy, bounded per item.
fn depth_map(items: &[PlanItem]) -> HashMap<Uuid, usize> {
    let parents: HashMap<Uuid, Option<Uuid>> =
        items.iter().map(|i| (i.id, i.parent_id)).collect();
    let mut depths = HashMap::new();
    for item in items {
        let mut depth = 0;
        let mut current = item.parent_id;
        while let Some(id) = current {
            depth += 1;
            if depth >= 100 {
                break;
            }
            current = parents.get(&id).copied().flatten();
        }
        depths.insert(item.id, depth);
    }
    depths
}

fn fmt_date(value: Option<NaiveDate>) -> String {
    match value {
        Some(d) => d.to_string(),
        None => "(cleared)".to_owned(),
    }
}

fn parse_date_arg(raw: Option<&str>, what: &str) -> Result<Option<NaiveDate>> {
    match raw {
        None => Ok(None),
        Some(s) => match parse_date(s) {
            Some(d) => Ok(Some(d)),
            None => bail!("invalid {what} date: {s:?} (expected YYYY-MM-DD)"),
        },
    }
}

pub fn parse_uuid(raw: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).with_context(|| format!("invalid {what}: {raw}"))
}
