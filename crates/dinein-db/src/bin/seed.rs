//! # Seed Data Generator
//!
//! Populates an empty database with a floor plan and a small menu for
//! development.
//!
//! ## Usage
//! ```bash
//! cargo run -p dinein-db --bin seed
//!
//! # Specify database path
//! cargo run -p dinein-db --bin seed -- --db ./data/dinein.db
//! ```
//!
//! ## Generated Data
//! - Tables 1-6 with capacities 2, 2, 4, 4, 6, 8
//! - Four categories with a handful of items each

use std::env;

use dinein_core::NewTable;
use dinein_db::{Database, DbConfig};

/// (table_number, capacity, location)
const TABLES: &[(i64, i64, &str)] = &[
    (1, 2, "window"),
    (2, 2, "window"),
    (3, 4, "main_hall"),
    (4, 4, "main_hall"),
    (5, 6, "main_hall"),
    (6, 8, "patio"),
];

/// (category, [(name, description, price_cents)])
#[allow(clippy::type_complexity)]
const MENU: &[(&str, &[(&str, &str, i64)])] = &[
    (
        "Starters",
        &[
            ("Garlic Bread", "Toasted sourdough, herb butter", 650),
            ("Tomato Soup", "Roasted tomato, basil oil", 750),
            ("Calamari", "Lemon aioli", 1150),
        ],
    ),
    (
        "Mains",
        &[
            ("Burger", "Beef patty, cheddar, brioche bun", 1000),
            ("Margherita Pizza", "San Marzano, fior di latte", 1400),
            ("Grilled Salmon", "Seasonal greens", 2200),
            ("Mushroom Risotto", "Parmesan, thyme", 1650),
        ],
    ),
    (
        "Sides",
        &[
            ("Fries", "Sea salt", 500),
            ("House Salad", "Mixed leaves, vinaigrette", 600),
        ],
    ),
    (
        "Drinks",
        &[
            ("Lemonade", "Fresh squeezed", 400),
            ("Espresso", "Double shot", 350),
            ("Sparkling Water", "500ml", 300),
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./dinein_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Dine-in Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./dinein_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Dine-in Seed Data Generator");
    println!("===========================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Tables
    let existing = db.tables().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} tables, skipping floor plan", existing);
    } else {
        for (number, capacity, location) in TABLES {
            db.tables()
                .create(&NewTable {
                    table_number: *number,
                    capacity: *capacity,
                    location: location.to_string(),
                    is_active: true,
                })
                .await?;
        }
        println!("✓ Created {} tables", TABLES.len());
    }

    // Menu
    let existing = db.menu().count_items().await?;
    if existing > 0 {
        println!("⚠ Database already has {} menu items, skipping menu", existing);
    } else {
        let mut created = 0;
        for (order, (category_name, items)) in MENU.iter().enumerate() {
            let category = db.menu().create_category(category_name, order as i64).await?;
            for (name, description, price_cents) in items.iter() {
                db.menu()
                    .create_item(category.id, name, Some(*description), *price_cents)
                    .await?;
                created += 1;
            }
        }
        println!("✓ Created {} menu items in {} categories", created, MENU.len());
    }

    db.close().await;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
