//! # Seed Data Generator
//!
//! Populates a development database with a boutique catalog, a few clients
//! and the owner's login.
//!
//! ## Usage
//! ```bash
//! cargo run -p vitrine-db --bin seed
//!
//! # Specify database path and owner password
//! cargo run -p vitrine-db --bin seed -- --db ./data/vitrine.db --password s3cret
//! ```
//!
//! ## Generated Data
//! - Every piece in `CATALOG` in each of its sizes, stock 1-6 per size
//! - Clients with phones, trust scores and a couple of birthdays
//! - An ADMIN login `dona@vitrine.local`

use chrono::{NaiveDate, Utc};
use std::env;
use uuid::Uuid;
use vitrine_core::{ChangeSet, Client, Product, Role};
use vitrine_db::{Backend, Database, DbConfig};

/// (name, category, gender, color, sale price cents, cost cents, sizes)
const CATALOG: &[(&str, &str, &str, &str, i64, i64, &[&str])] = &[
    ("Vestido Midi Floral", "Vestidos", "Feminino", "Azul", 18990, 8500, &["P", "M", "G"]),
    ("Vestido Longo Linho", "Vestidos", "Feminino", "Areia", 25990, 11000, &["P", "M", "G"]),
    ("Blusa Seda Decote V", "Blusas", "Feminino", "Off-white", 12990, 5200, &["PP", "P", "M", "G"]),
    ("Camisa Tricoline", "Camisas", "Unissex", "Branco", 14990, 6000, &["P", "M", "G", "GG"]),
    ("Calça Pantalona", "Calças", "Feminino", "Preto", 17990, 7400, &["36", "38", "40", "42"]),
    ("Calça Jeans Reta", "Calças", "Unissex", "Jeans Escuro", 19990, 8200, &["38", "40", "42", "44"]),
    ("Saia Plissada", "Saias", "Feminino", "Verde", 11990, 4800, &["P", "M", "G"]),
    ("Blazer Alfaiataria", "Casacos", "Feminino", "Caramelo", 32990, 15000, &["P", "M", "G"]),
    ("Cardigã Tricô", "Casacos", "Unissex", "Cinza", 15990, 6500, &["U"]),
    ("Bolsa Palha", "Acessórios", "Feminino", "Natural", 9990, 3500, &["U"]),
];

/// (name, phone, trust score, credit limit cents, birth date)
const CLIENTS: &[(&str, &str, u8, i64, Option<(i32, u32, u32)>)] = &[
    ("Ana Souza", "(11) 98765-4321", 5, 100000, Some((1990, 5, 17))),
    ("Beatriz Lima", "(11) 99876-1234", 4, 50000, None),
    ("Carolina Alves", "(21) 98888-7777", 3, 30000, Some((1985, 12, 2))),
    ("Daniela Rocha", "(11) 97777-6666", 2, 0, None),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./vitrine_dev.db");
    let mut password = String::from("vitrine123");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--password" | "-p" => {
                if i + 1 < args.len() {
                    password = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Vitrine Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>          Database file path (default: ./vitrine_dev.db)");
                println!("  -p, --password <PASS>    Owner login password (default: vitrine123)");
                println!("  -h, --help               Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Vitrine Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let mut changes = ChangeSet::new();
    let mut seed = 0usize;
    for (name, category, gender, color, price, cost, sizes) in CATALOG {
        for size in sizes.iter() {
            changes.put_product(generate_product(name, category, gender, color, *price, *cost, size, seed));
            seed += 1;
        }
    }
    for (name, phone, trust, limit, birth) in CLIENTS {
        changes.put_client(generate_client(name, phone, *trust, *limit, *birth));
    }

    let start = std::time::Instant::now();
    db.apply(&changes).await?;
    println!();
    println!(
        "✓ Generated {} products and {} clients in {:?}",
        changes.products.len(),
        changes.clients.len(),
        start.elapsed()
    );

    if db.users().count().await? == 0 {
        db.create_user("Dona da Loja", "dona@vitrine.local", &password, Role::Admin)
            .await?;
        println!("✓ Created ADMIN login dona@vitrine.local");
    }

    db.close().await;
    println!();
    println!("✓ Seed complete!");

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn generate_product(
    name: &str,
    category: &str,
    gender: &str,
    color: &str,
    price: i64,
    cost: i64,
    size: &str,
    seed: usize,
) -> Product {
    let now = Utc::now();
    Product {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        category: category.to_string(),
        gender: gender.to_string(),
        size: size.to_string(),
        color: color.to_string(),
        image_url: None,
        cost_price_cents: cost,
        sale_price_cents: price,
        stock_quantity: 1 + (seed * 7 % 6) as i64,
        on_bag_quantity: 0,
        created_at: now,
        updated_at: now,
    }
}

fn generate_client(
    name: &str,
    phone: &str,
    trust_score: u8,
    credit_limit_cents: i64,
    birth: Option<(i32, u32, u32)>,
) -> Client {
    let now = Utc::now();
    Client {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        phone: phone.to_string(),
        trust_score,
        credit_limit_cents,
        current_debt_cents: 0,
        avatar_url: None,
        birth_date: birth.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
        notes: None,
        created_at: now,
        updated_at: now,
    }
}
