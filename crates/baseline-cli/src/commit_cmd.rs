//! `baseline commit` command: publish a project's plan into the tracker.

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use baseline_core::commit::commit_plan;
use baseline_db::store::PgStore;

use crate::item_cmds::parse_uuid;

/// Run the commit command.
///
/// `component_strs` optionally restricts the commit to the subtrees of the
/// given component items. Skips and hard errors are printed as separate
/// sections: a skip means the item was structurally ineligible, an error
/// means the tracker insert (or linkage write-back) itself failed.
pub async fn run_commit(
    pool: &PgPool,
    project_id_str: &str,
    user_str: Option<&str>,
    component_strs: &[String],
) -> Result<()> {
    let project_id = parse_uuid(project_id_str, "project ID")?;
    let user_id = match user_str {
        Some(s) => parse_uuid(s, "user ID")?,
        None => Uuid::nil(),
    };
    let component_ids = component_strs
        .iter()
        .map(|s| parse_uuid(s, "component ID"))
        .collect::<Result<Vec<_>>>()?;

    let store = PgStore::new(pool.clone());
    let scope = if component_ids.is_empty() {
        None
    } else {
        Some(component_ids.as_slice())
    };
    let outcome = commit_plan(&store, project_id, user_id, scope).await?;

    println!(
        "Committed {} entities ({} milestones, {} deliverables, {} folded tasks).",
        outcome.count,
        outcome.milestones.len(),
        outcome.deliverables.len(),
        outcome.tasks,
    );

    for milestone in &outcome.milestones {
        println!("  {} {}", milestone.milestone_ref, milestone.name);
    }
    for deliverable in &outcome.deliverables {
        println!(
            "  {} {} ({} tasks)",
            deliverable.deliverable_ref,
            deliverable.name,
            deliverable.tasks_checklist.len(),
        );
    }

    if !outcome.skipped.is_empty() {
        println!();
        println!("Skipped ({} items not eligible):", outcome.skipped.len());
        for skip in &outcome.skipped {
            println!("  {}: {}", skip.name, skip.reason);
        }
    }

    if !outcome.errors.is_empty() {
        println!();
        println!("Errors ({} entities failed):", outcome.errors.len());
        for error in &outcome.errors {
            println!("  {error}");
        }
    }

    Ok(())
}
