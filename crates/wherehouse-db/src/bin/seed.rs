//! # Seed Data Generator
//!
//! Populates the database with a demo inventory for development.
//!
//! ## Usage
//! ```bash
//! # Seed the admin account's inventory in ./wherehouse_dev.db
//! cargo run -p wherehouse-db --bin seed
//!
//! # Seed another user (created if missing, password "password")
//! cargo run -p wherehouse-db --bin seed -- --user alice
//!
//! # Specify database path
//! cargo run -p wherehouse-db --bin seed -- --db ./data/wherehouse.db
//! ```
//!
//! ## Generated Inventory
//! - A location tree per room: room → storage unit → bin
//! - A handful of shared tags
//! - Items spread over the bins, each with one or two tags

use std::env;

use tracing::{info, warn};
use wherehouse_core::{
    Money, NewItem, NewLocation, NewTag, NewUser, DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USERNAME,
};
use wherehouse_db::{bootstrap_admin, AppConfig, Database, DbConfig, DbError};

/// Rooms and the storage units inside each.
const ROOMS: &[(&str, &[&str])] = &[
    ("Garage", &["Shelf A", "Shelf B", "Workbench"]),
    ("Basement", &["Metal Rack", "Chest Freezer"]),
    ("Office", &["Desk", "Filing Cabinet"]),
];

const BINS_PER_UNIT: usize = 2;

/// Tag name and colour.
const TAGS: &[(&str, &str)] = &[
    ("power tools", "#e4572e"),
    ("hand tools", "#f3a712"),
    ("electronics", "#29335c"),
    ("seasonal", "#669bbc"),
    ("fragile", "#a8c686"),
];

/// Item name, manufacturer, model, value, tag indexes.
const ITEMS: &[(&str, &str, &str, &str, &[usize])] = &[
    ("Cordless Drill", "DeWalt", "DCD771C2", "129.99", &[0]),
    ("Circular Saw", "Makita", "5007MG", "159.00", &[0]),
    ("Claw Hammer", "Estwing", "E3-16C", "29.99", &[1]),
    ("Socket Set", "Craftsman", "CMMT12024", "89.99", &[1]),
    ("Label Printer", "Brother", "PT-D210", "39.99", &[2]),
    ("USB Hub", "Anker", "A7516", "19.99", &[2]),
    ("String Lights", "Govee", "H7020", "45.99", &[3, 4]),
    ("Wreath Stand", "Generic", "WS-24", "12.99", &[3]),
    ("Glass Vase", "IKEA", "BERÄKNA", "14.99", &[4]),
    ("Soldering Station", "Hakko", "FX888D", "119.95", &[0, 2]),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./wherehouse_dev.db");
    let mut username = String::from(DEFAULT_ADMIN_USERNAME);

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--user" | "-u" => {
                if i + 1 < args.len() {
                    username = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("WhereHouse Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>     Database file path (default: ./wherehouse_dev.db)");
                println!("  -u, --user <NAME>   Owner of the seeded inventory (default: admin)");
                println!("  -h, --help          Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    AppConfig::default().init_tracing();

    println!("🌱 WhereHouse Seed Data Generator");
    println!("=================================");
    println!("Database: {}", db_path);
    println!("Owner:    {}", username);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    bootstrap_admin(&db, DEFAULT_ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD).await?;

    let owner = match db.users().get_by_username(&username).await? {
        Some(user) => user,
        None => {
            db.users()
                .register(NewUser {
                    username: username.clone(),
                    email: format!("{username}@example.com"),
                    password: DEFAULT_ADMIN_PASSWORD.to_string(),
                    is_admin: false,
                })
                .await?
        }
    };

    let existing = db.items().list(owner.id).await?;
    if !existing.is_empty() {
        println!("⚠ {} already owns {} items", owner.username, existing.len());
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    let start = std::time::Instant::now();

    // Tags are global; reuse any that already exist.
    let mut tag_ids = Vec::with_capacity(TAGS.len());
    let all_tags = db.tags().list().await?;
    for (name, color) in TAGS {
        let id = match all_tags.iter().find(|t| t.name == *name) {
            Some(tag) => tag.id,
            None => {
                db.tags()
                    .create(NewTag {
                        name: name.to_string(),
                        color: Some(color.to_string()),
                    })
                    .await?
                    .id
            }
        };
        tag_ids.push(id);
    }
    println!("✓ {} tags ready", tag_ids.len());

    let mut bins = Vec::new();
    for (room, units) in ROOMS {
        let room_loc = db
            .locations()
            .create(owner.id, location(room, None, None))
            .await?;
        for unit in *units {
            let unit_loc = db
                .locations()
                .create(owner.id, location(unit, Some(room), Some(room_loc.id)))
                .await?;
            for n in 1..=BINS_PER_UNIT {
                let bin = db
                    .locations()
                    .create(
                        owner.id,
                        location(&format!("{unit} Bin {n}"), Some(unit), Some(unit_loc.id)),
                    )
                    .await?;
                bins.push(bin.id);
            }
        }
    }
    println!("✓ {} bins created", bins.len());

    let mut generated = 0;
    for (idx, (name, manufacturer, model, value, tags)) in ITEMS.iter().enumerate() {
        let request = NewItem {
            name: name.to_string(),
            manufacturer: Some(manufacturer.to_string()),
            model_number: Some(model.to_string()),
            serial_number: Some(format!("SN-{:06}", idx * 7919)),
            value: Some(value.parse::<Money>()?),
            location_id: Some(bins[idx % bins.len()]),
            tag_ids: tags.iter().map(|t| tag_ids[*t]).collect(),
            ..Default::default()
        };

        match db.items().create(owner.id, request).await {
            Ok(_) => generated += 1,
            Err(e @ DbError::UniqueViolation { .. }) => warn!(item = %name, error = %e, "Skipped"),
            Err(e) => return Err(e.into()),
        }
    }

    let elapsed = start.elapsed();
    println!("✓ Generated {} items in {:?}", generated, elapsed);

    let items = db.items().list(owner.id).await?;
    let total: Money = items.iter().filter_map(|item| item.value()).sum();
    println!("  Total inventory value: {}", total);

    println!();
    println!("Verifying search...");
    let results = db.search().search(owner.id, "drill").await?;
    println!("  Search 'drill': {} items", results.items.len());
    let results = db.search().search(owner.id, "shelf").await?;
    println!("  Search 'shelf': {} locations", results.locations.len());

    info!(owner_id = owner.id, items = generated, "Seed complete");
    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

fn location(name: &str, inside: Option<&str>, parent: Option<i64>) -> NewLocation {
    NewLocation {
        name: name.to_string(),
        description: inside.map(|p| format!("Inside {p}")),
        parent_location_id: parent,
    }
}
