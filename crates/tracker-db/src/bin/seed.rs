//! # Seed Data Generator
//!
//! Populates a database with demo stock, expenses and sales for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./tracker_dev.db
//! cargo run -p tracker-db --bin seed
//!
//! # Specify database path and number of demo sales
//! cargo run -p tracker-db --bin seed -- --db ./data/tracker.db --sales 40
//! ```
//!
//! No user accounts are created; use `tracker add-user` for that.

use chrono::{Days, NaiveDate, Utc};
use std::env;
use tracker_core::{Money, NewExpense, NewSale, NewStock, PaymentMode, EXPENSE_CATEGORIES};
use tracker_db::{Database, DbConfig, DbError};

/// (item, sizes, unit cost in cents, selling price in cents)
const UNIFORMS: &[(&str, &[&str], i64, i64)] = &[
    ("Shirt", &["S", "M", "L", "XL"], 50_000, 70_000),
    ("Trouser", &["26", "28", "30", "32"], 80_000, 110_000),
    ("Skirt", &["S", "M", "L"], 70_000, 95_000),
    ("Sweater", &["S", "M", "L", "XL"], 90_000, 125_000),
    ("Tie", &["ONE"], 10_000, 20_000),
    ("Socks", &["S", "M", "L"], 5_000, 10_000),
];

const STUDENTS: &[(&str, &str)] = &[
    ("Amani Otieno", "Grade 3"),
    ("Baraka Mwangi", "Grade 5"),
    ("Wanjiru Kamau", "Grade 1"),
    ("Achieng Odhiambo", "Grade 7"),
    ("Kiptoo Ruto", "Grade 2"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut sales: usize = 20;
    let mut db_path = String::from("./tracker_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--sales" | "-s" => {
                if i + 1 < args.len() {
                    sales = args[i + 1].parse().unwrap_or(20);
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
                println!("School Tracker Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -s, --sales <N>    Number of demo sales to record (default: 20)");
                println!("  -d, --db <PATH>    Database file path (default: ./tracker_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 School Tracker Seed Data Generator");
    println!("=====================================");
    println!("Database: {}", db_path);
    println!("Sales:    {}", sales);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    if !db.stock().list().await?.is_empty() {
        println!("⚠ Database already has stock");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let today = Utc::now().date_naive();

    // Stock
    let mut variants = Vec::new();
    for (item, sizes, cost, price) in UNIFORMS {
        for size in sizes.iter() {
            db.stock()
                .add_stock(NewStock {
                    item: item.to_string(),
                    size: size.to_string(),
                    quantity: 30,
                    unit_cost: Money::from_cents(*cost),
                    supplier: Some("Uniform Supplies Ltd".to_string()),
                    invoice_no: Some(format!("INV-{}", variants.len() + 1)),
                })
                .await?;
            variants.push((*item, *size, *price));
        }
    }
    println!("✓ Stocked {} uniform variants", variants.len());

    // Expenses: one per category per month for the last three months
    let mut expenses = 0;
    for month_back in 0..3u64 {
        for (idx, category) in EXPENSE_CATEGORIES.iter().enumerate() {
            let date = days_back(today, month_back * 30 + idx as u64);
            db.expenses()
                .add_expense(NewExpense {
                    date,
                    category: category.to_string(),
                    description: format!("{} for the month", category),
                    amount: Money::from_cents(((idx as i64 % 5) + 1) * 250_000),
                    receipt_no: Some(format!("EXP-{:04}", expenses + 1)),
                })
                .await?;
            expenses += 1;
        }
    }
    println!("✓ Recorded {} expenses", expenses);

    // Sales
    let mut recorded = 0;
    for n in 0..sales {
        let (item, size, price) = variants[(n * 7) % variants.len()];
        let (student, class) = STUDENTS[n % STUDENTS.len()];
        let payment_mode = PaymentMode::ALL[n % PaymentMode::ALL.len()];

        let sale = NewSale {
            date: days_back(today, (n % 60) as u64),
            student_name: Some(student.to_string()),
            student_class: Some(class.to_string()),
            item: item.to_string(),
            size: size.to_string(),
            quantity: (n % 3) as i64 + 1,
            selling_price: Money::from_cents(price),
            payment_mode,
            reference: (payment_mode != PaymentMode::Cash).then(|| format!("TXN{:06}", n)),
        };

        match db.ledger().record_sale(sale, Some("seed")).await {
            Ok(_) => recorded += 1,
            Err(DbError::Domain(e)) => eprintln!("Skipped sale {}: {}", n, e),
            Err(e) => return Err(e.into()),
        }
    }
    println!("✓ Recorded {} sales with receipts", recorded);

    let valuation = db.reports().inventory_valuation().await?;
    println!();
    println!("  Inventory value: {}", valuation.total_value);
    println!("  Units on hand:   {}", valuation.total_items);
    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

fn days_back(today: NaiveDate, days: u64) -> NaiveDate {
    today.checked_sub_days(Days::new(days)).unwrap_or(today)
}
