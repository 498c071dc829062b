//! Read-only reporting commands: drift, summary, and lock-baseline.

use anyhow::Result;
use sqlx::PgPool;

use baseline_core::drift::detect_baseline_changes;
use baseline_core::rollup::commit_summary;
use baseline_db::queries::milestones;
use baseline_db::store::PgStore;

use crate::item_cmds::parse_uuid;

/// Run the `baseline drift` command: report every field where a published
/// plan item has diverged from its locked baseline.
pub async fn run_drift(pool: &PgPool, project_id_str: &str) -> Result<()> {
    let project_id = parse_uuid(project_id_str, "project ID")?;
    let store = PgStore::new(pool.clone());
    let changes = detect_baseline_changes(&store, project_id).await?;

    if changes.is_empty() {
        println!("No baseline drift for project {project_id}.");
        return Ok(());
    }

    println!("Baseline drift for project {project_id}:");
    for change in &changes {
        let wbs = change.plan_item_wbs.as_deref().unwrap_or("-");
        println!(
            "  {} {} [{}]: baseline {} -> current {}",
            wbs, change.plan_item_name, change.field, change.baseline_value, change.current_value,
        );
    }
    println!();
    println!("{} divergent field(s).", changes.len());
    Ok(())
}

/// Run the `baseline summary` command: project-wide commit progress with a
/// per-component breakdown.
pub async fn run_summary(pool: &PgPool, project_id_str: &str) -> Result<()> {
    let project_id = parse_uuid(project_id_str, "project ID")?;
    let store = PgStore::new(pool.clone());
    let summary = commit_summary(&store, project_id).await?;

    println!("Commit summary for project {project_id}:");
    println!("  committed:       {}", summary.committed);
    println!("  uncommitted:     {}", summary.uncommitted);
    println!("  locked baselines: {}", summary.baseline_locked);

    if !summary.by_component.is_empty() {
        let mut components: Vec<_> = summary.by_component.values().collect();
        components.sort_by(|a, b| a.name.cmp(&b.name));

        println!();
        println!("By component:");
        for component in components {
            println!(
                "  {}: {}/{} committed",
                component.name, component.committed, component.total,
            );
        }
    }
    Ok(())
}

/// Run the `baseline lock-baseline` command: freeze the baseline snapshot
/// on every unlocked tracker milestone of the project.
pub async fn run_lock_baseline(pool: &PgPool, project_id_str: &str) -> Result<()> {
    let project_id = parse_uuid(project_id_str, "project ID")?;
    let locked = milestones::lock_baselines(pool, project_id).await?;

    if locked == 0 {
        println!("No unlocked baselines for project {project_id}.");
    } else {
        println!("Locked baselines on {locked} milestone(s).");
    }
    Ok(())
}
