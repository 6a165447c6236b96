//! # WhereHouse Process Entry Point
//!
//! Prepares the store for the request layer:
//!
//! 1. Load configuration (file + environment)
//! 2. Install the tracing subscriber
//! 3. Open the database and apply migrations
//! 4. Create the admin account if it does not exist yet
//!
//! ## Usage
//! ```bash
//! cargo run -p wherehouse-db --bin wherehouse
//! cargo run -p wherehouse-db --bin wherehouse -- --config ./wherehouse.toml
//! WHEREHOUSE_DB_PATH=./dev.db RUST_LOG=debug cargo run -p wherehouse-db --bin wherehouse
//! ```

use std::env;
use std::path::PathBuf;

use tracing::{error, info};
use wherehouse_db::migrations::migration_status;
use wherehouse_db::{bootstrap_admin, AppConfig, Database};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("WhereHouse");
                println!();
                println!("Usage: wherehouse [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --config <PATH>  Config file (default: platform config dir)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let config = AppConfig::load(config_path)?;
    config.init_tracing();
    config.log_origin();

    info!(version = env!("CARGO_PKG_VERSION"), "Starting WhereHouse");

    let db_config = config.db_config();
    if !db_config.is_in_memory() {
        if let Some(parent) = db_config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db = Database::new(db_config).await?;

    let (total, applied) = migration_status(db.pool()).await?;
    info!(total, applied, "Schema ready");

    let created = bootstrap_admin(
        &db,
        &config.bootstrap.admin_username,
        &config.bootstrap.admin_password,
    )
    .await?;
    if created {
        info!(
            username = %config.bootstrap.admin_username,
            "Default admin created; change its password"
        );
    }

    if !db.health_check().await {
        error!("Database failed its health check");
        db.close().await;
        return Err("database health check failed".into());
    }

    info!("Store ready");
    db.close().await;
    Ok(())
}
