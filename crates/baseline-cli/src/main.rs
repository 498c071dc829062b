mod commit_cmd;
mod config;
mod item_cmds;
mod report_cmds;

use clap::{Parser, Subcommand};

use baseline_db::pool;

use config::BaselineConfig;

#[derive(Parser)]
#[command(name = "baseline", about = "Plan commit and baseline tracking engine")]
struct Cli {
    /// Database URL (overrides BASELINE_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a baseline config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = "postgresql://localhost:5432/baseline")]
        db_url: String,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Initialize the baseline database (requires config file or env vars)
    DbInit,
    /// Add a plan item to a project
    Add {
        /// Project ID
        project_id: String,
        /// Item type: component, milestone, deliverable, task, phase
        item_type: String,
        /// Item name
        name: String,
        /// Parent item ID
        #[arg(long)]
        parent: Option<String>,
        /// Position among siblings
        #[arg(long, default_value_t = 0)]
        sort_order: i32,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
        /// Status: not_started, in_progress, completed, on_hold, cancelled
        #[arg(long, default_value = "not_started")]
        status: String,
        /// Billable amount
        #[arg(long)]
        billable: Option<f64>,
    },
    /// Edit one schedule field of a plan item (dates stay synchronized)
    Edit {
        /// Plan item ID
        item_id: String,
        /// Field to edit: start_date, end_date, duration_days
        field: String,
        /// New value (YYYY-MM-DD, a day count, or empty to clear)
        value: String,
    },
    /// List the plan item tree for a project
    Items {
        /// Project ID
        project_id: String,
    },
    /// Soft-delete a plan item (excluded from future commits)
    Remove {
        /// Plan item ID
        item_id: String,
    },
    /// Commit a project's plan into the tracker
    Commit {
        /// Project ID
        project_id: String,
        /// User recorded as creator of the tracker entities
        #[arg(long)]
        user: Option<String>,
        /// Restrict the commit to these component subtrees (repeatable)
        #[arg(long = "component")]
        components: Vec<String>,
    },
    /// Report drift between published items and their locked baselines
    Drift {
        /// Project ID
        project_id: String,
    },
    /// Show commit progress with a per-component breakdown
    Summary {
        /// Project ID
        project_id: String,
    },
    /// Lock the baseline snapshot on every unlocked milestone
    LockBaseline {
        /// Project ID
        project_id: String,
    },
}

/// Execute the `baseline init` command: write config file.
fn cmd_init(db_url: &str, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
        },
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!();
    println!("Next: run `baseline db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `baseline db-init` command: create database and run migrations.
async fn cmd_db_init(cli_db_url: Option<&str>) -> anyhow::Result<()> {
    let resolved = BaselineConfig::resolve(cli_db_url)?;

    println!("Initializing baseline database...");

    // 1. Create the database if it does not exist.
    pool::ensure_database_exists(&resolved.db_config).await?;

    // 2. Connect to the target database.
    let db_pool = pool::create_pool(&resolved.db_config).await?;

    // 3. Run migrations.
    pool::run_migrations(&db_pool).await?;

    // 4. Print success with table counts.
    let counts = pool::table_counts(&db_pool).await?;
    println!("Database ready. Tables:");
    for (table, count) in &counts {
        println!("  {table}: {count} rows");
    }

    // 5. Clean shutdown.
    db_pool.close().await;

    println!("baseline db-init complete.");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { db_url, force } => {
            cmd_init(&db_url, force)?;
        }
        Commands::DbInit => {
            cmd_db_init(cli.database_url.as_deref()).await?;
        }
        command => {
            let resolved = BaselineConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = run_db_command(command, &db_pool).await;
            db_pool.close().await;
            result?;
        }
    }

    Ok(())
}

/// Dispatch every command that needs a live database connection.
async fn run_db_command(command: Commands, pool: &sqlx::PgPool) -> anyhow::Result<()> {
    match command {
        Commands::Init { .. } | Commands::DbInit => unreachable!("handled in main"),
        Commands::Add {
            project_id,
            item_type,
            name,
            parent,
            sort_order,
            start,
            end,
            status,
            billable,
        } => {
            item_cmds::run_add(
                pool,
                &project_id,
                &item_type,
                &name,
                parent.as_deref(),
                sort_order,
                start.as_deref(),
                end.as_deref(),
                &status,
                billable,
            )
            .await
        }
        Commands::Edit {
            item_id,
            field,
            value,
        } => item_cmds::run_edit(pool, &item_id, &field, &value).await,
        Commands::Items { project_id } => item_cmds::run_items(pool, &project_id).await,
        Commands::Remove { item_id } => item_cmds::run_remove(pool, &item_id).await,
        Commands::Commit {
            project_id,
            user,
            components,
        } => commit_cmd::run_commit(pool, &project_id, user.as_deref(), &components).await,
        Commands::Drift { project_id } => report_cmds::run_drift(pool, &project_id).await,
        Commands::Summary { project_id } => report_cmds::run_summary(pool, &project_id).await,
        Commands::LockBaseline { project_id } => {
            report_cmds::run_lock_baseline(pool, &project_id).await
        }
    }
}
