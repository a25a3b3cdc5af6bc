//! # Seed Data Generator
//!
//! Populates the database with a small shop for development.
//!
//! ## Usage
//! ```bash
//! # Seed 4 weeks (default)
//! cargo run -p bodega-db --bin seed
//!
//! # Seed a custom number of weeks
//! cargo run -p bodega-db --bin seed -- --weeks 8
//!
//! # Specify database path (or set BODEGA_DB_PATH)
//! cargo run -p bodega-db --bin seed -- --db ./data/bodega.db
//! ```
//!
//! ## Generated Data
//! - Categories with products (cost, price, starting stock)
//! - Consecutive Monday-to-Sunday weeks starting 2024-01-01
//! - Fixed and variable costs
//! - One supplier purchase per week, some with spoilage
//! - Sales recorded through the ledger, so stock moves with them
//! - A few receivables and payables
//!
//! Everything is derived from the loop indices, so runs are repeatable.

use std::env;

use chrono::{Duration, NaiveDate};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bodega_core::{
    AccountEntry, Category, Cost, CostKind, Money, Product, Purchase, Sale, Week,
};
use bodega_db::{Database, DbConfig, DbError, DbResult, ErrorKind, LedgerConfig};

/// Categories and their products: (name, cost cents, price cents, stock).
const CATALOG: &[(&str, &[(&str, i64, i64, i64)])] = &[
    (
        "Abarrotes",
        &[
            ("Arroz 1kg", 110, 160, 60),
            ("Azúcar 1kg", 95, 140, 50),
            ("Aceite 1L", 210, 290, 30),
            ("Fideos", 55, 90, 80),
        ],
    ),
    (
        "Bebidas",
        &[
            ("Agua 600ml", 35, 70, 120),
            ("Refresco 2L", 140, 220, 48),
            ("Jugo de naranja", 90, 150, 36),
        ],
    ),
    (
        "Lácteos",
        &[
            ("Leche 1L", 80, 120, 40),
            ("Queso fresco", 260, 380, 15),
            ("Yogur", 45, 75, 30),
        ],
    ),
    (
        "Panadería",
        &[("Pan francés", 10, 20, 300), ("Galletas", 60, 100, 45)],
    ),
];

/// Monthly fixed costs and reference variable costs.
const COSTS: &[(&str, i64, CostKind)] = &[
    ("Alquiler", 120_000, CostKind::Fixed),
    ("Luz", 18_000, CostKind::Fixed),
    ("Internet", 4_500, CostKind::Fixed),
    ("Bolsas", 2_500, CostKind::Variable),
    ("Transporte", 6_000, CostKind::Variable),
];

const DEFAULT_DB_PATH: &str = "./bodega_dev.db";
const DEFAULT_WEEKS: u32 = 4;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,bodega=debug,sqlx=warn")),
        )
        .init();

    // Parse arguments
    let args: Vec<String> = env::args().collect();
    let mut db_path = env::var("BODEGA_DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
    let mut weeks = DEFAULT_WEEKS;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--weeks" | "-w" => {
                if i + 1 < args.len() {
                    weeks = args[i + 1].parse().unwrap_or(DEFAULT_WEEKS);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Bodega Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -w, --weeks <N>    Number of weeks to generate (default: {DEFAULT_WEEKS})");
                println!("  -d, --db <PATH>    Database file path (default: {DEFAULT_DB_PATH})");
                println!("  -h, --help         Show this help message");
                println!();
                println!("Environment:");
                println!("  BODEGA_DB_PATH                 Database file path");
                println!("  BODEGA_VARIABLE_COST_PERCENT   Variable cost share of revenue (default: 30)");
                println!("  BODEGA_WEEKS_PER_MONTH         Weeks per month (default: 4.33)");
                println!("  RUST_LOG                       Log filter");
                return Ok(());
            }
            other => warn!(argument = other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    println!("🌱 Bodega Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!("Weeks:    {}", weeks);
    println!();

    let ledger = LedgerConfig::from_env();
    let db = Database::new(DbConfig::new(&db_path).ledger(ledger)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();

    let product_ids = seed_catalog(&db).await?;
    println!("✓ {} products in {} categories", product_ids.len(), CATALOG.len());

    for (name, cents, kind) in COSTS {
        db.costs()
            .save(&Cost::new(*name, Money::from_cents(*cents), *kind))
            .await?;
    }
    println!("✓ {} costs", COSTS.len());

    let first_monday = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("invalid start date")?;
    let week_ids = seed_weeks(&db, first_monday, weeks).await?;
    println!("✓ {} weeks", week_ids.len());

    let (recorded, skipped) = seed_sales(&db, &week_ids, &product_ids).await?;
    println!("✓ {} sales recorded ({} skipped for stock)", recorded, skipped);

    seed_purchases(&db, first_monday, weeks).await?;
    seed_accounts(&db).await?;
    println!("✓ Purchases, receivables and payables");

    println!();
    println!("✓ Seeded in {:?}", start.elapsed());

    print_report(&db, &week_ids, first_monday, weeks).await?;

    Ok(())
}

async fn seed_catalog(db: &Database) -> DbResult<Vec<i64>> {
    let mut product_ids = Vec::new();

    for (category_name, products) in CATALOG {
        let category = db.categories().save(&Category::new(*category_name)).await?;
        let category_id = category
            .id
            .ok_or_else(|| DbError::Internal("saved category has no id".to_string()))?;

        for (name, cost, price, stock) in products.iter() {
            let product = db
                .products()
                .save(&Product::new(
                    *name,
                    category_id,
                    Money::from_cents(*cost),
                    Money::from_cents(*price),
                    *stock,
                ))
                .await?;
            if let Some(id) = product.id {
                product_ids.push(id);
            }
        }
    }

    Ok(product_ids)
}

async fn seed_weeks(db: &Database, first_monday: NaiveDate, weeks: u32) -> DbResult<Vec<i64>> {
    let mut ids = Vec::new();
    for n in 0..weeks {
        let start = first_monday + Duration::weeks(n as i64);
        let week = db
            .weeks()
            .save(&Week::new(start, start + Duration::days(6)))
            .await?;
        if let Some(id) = week.id {
            ids.push(id);
        }
    }
    Ok(ids)
}

/// Sells a few units of every product each week. Sales that would oversell
/// are skipped, the same way a cashier would be stopped.
async fn seed_sales(
    db: &Database,
    week_ids: &[i64],
    product_ids: &[i64],
) -> DbResult<(usize, usize)> {
    let mut recorded = 0;
    let mut skipped = 0;

    for (w, week_id) in week_ids.iter().enumerate() {
        for (p, product_id) in product_ids.iter().enumerate() {
            let Some(product) = db.products().get_by_id(*product_id).await? else {
                continue;
            };
            let quantity = 1 + ((w * 7 + p * 3) % 9) as i64;
            let amount = product.sale_price().multiply_quantity(quantity);

            match db
                .sales()
                .create(&Sale::new(*week_id, *product_id, quantity, amount))
                .await
            {
                Ok(_) => recorded += 1,
                Err(e) if e.kind() == ErrorKind::InsufficientStock => {
                    info!(product = %product.name, quantity, "Skipping sale: {}", e);
                    skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    Ok((recorded, skipped))
}

async fn seed_purchases(db: &Database, first_monday: NaiveDate, weeks: u32) -> DbResult<()> {
    for n in 0..weeks {
        let date = first_monday + Duration::weeks(n as i64) + Duration::days(1);
        let spoilage = (n % 3) as i64;
        db.purchases()
            .save(
                &Purchase::new(
                    "Verduras surtidas",
                    Money::from_cents(4_800 + 250 * n as i64),
                    24,
                    date,
                )
                .with_spoilage(spoilage),
            )
            .await?;
    }
    Ok(())
}

async fn seed_accounts(db: &Database) -> DbResult<()> {
    db.receivables()
        .save(&AccountEntry::new("Doña Carmen", Money::from_cents(3_500)).with_description("Fiado semanal"))
        .await?;
    db.receivables()
        .save(&AccountEntry::new("Taller Ruiz", Money::from_cents(1_200)))
        .await?;
    db.payables()
        .save(&AccountEntry::new("Distribuidora Central", Money::from_cents(25_000)).with_description("Factura 0042"))
        .await?;
    Ok(())
}

async fn print_report(
    db: &Database,
    week_ids: &[i64],
    first_monday: NaiveDate,
    weeks: u32,
) -> DbResult<()> {
    let accounting = db.accounting();

    println!();
    println!("Weekly margins");
    println!("--------------");
    for id in week_ids {
        let margin = accounting.net_margin_for_week(*id).await?;
        println!(
            "  week {:>3}: revenue {:>10}  net {:>10}  ({:.1}%)",
            id,
            margin.revenue.to_string(),
            margin.net_margin.to_string(),
            margin.margin_percent
        );
    }

    if let (Some(first), Some(last)) = (week_ids.first(), week_ids.last()) {
        let range = accounting.net_margin_for_range(*first, *last).await?;
        println!(
            "  {} weeks:  revenue {:>10}  net {:>10}  ({:.1}%)",
            range.num_weeks,
            range.revenue.to_string(),
            range.net_margin.to_string(),
            range.margin_percent
        );

        let end = first_monday + Duration::weeks(weeks as i64) - Duration::days(1);
        let balance = accounting.balance(first_monday, end).await?;
        let losses = accounting.total_losses_in_range(first_monday, end).await?;
        println!();
        println!(
            "Balance {} to {}: sales {} - purchases {} = {}",
            balance.start, balance.end, balance.total_sales, balance.total_purchases, balance.balance
        );
        println!("Spoilage losses: {}", losses);
    }

    let accounts = accounting.accounts_summary().await?;
    println!(
        "Receivables {} / payables {} / net {}",
        accounts.receivables, accounts.payables, accounts.net_position
    );

    Ok(())
}
