//! # Seed Data Generator
//!
//! Populates a development database with phone-accessory stock.
//!
//! ## Usage
//! ```bash
//! # Generate 500 items (default)
//! cargo run -p stockroom-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p stockroom-db --bin seed -- --count 2000
//!
//! # Specify database path
//! cargo run -p stockroom-db --bin seed -- --db ./data/stockroom.db
//! ```
//!
//! ## Generated Data
//! - Reference tables: brands, models, categories (some with `+` in the
//!   name, to exercise the `plus` escape), qualities
//! - Items: one per brand/model/category/quality combination, SKU
//!   `{BRAND}-{INDEX}`, in display order
//! - Contacts: a walk-in customer, a few named customers, the
//!   "No Delivery" placeholder plus couriers, and workers
//! - POS invoices spread over the last 30 days, some paid and some
//!   canceled, with a loan on every fifth one

use chrono::{Duration, Local};
use serde_json::json;
use std::env;
use stockroom_core::{NewContact, NewCustomer, NewInvoice, NewItem, NewLoan};
use stockroom_db::{Database, DbConfig, PersonTable, ReferenceTable};

/// Brands with the models sold under each.
const CATALOG: &[(&str, &[&str])] = &[
    (
        "Samsung",
        &["Galaxy S21", "Galaxy S22", "Galaxy S23", "Galaxy A52", "Galaxy A14"],
    ),
    (
        "Apple",
        &["iPhone 12", "iPhone 13", "iPhone 14", "iPhone 15", "iPhone SE"],
    ),
    ("Xiaomi", &["Redmi Note 11", "Redmi Note 12", "Poco X5"]),
    ("Huawei", &["P30", "Nova 9", "Y9 Prime"]),
];

/// Categories with their `circle_ball` flag.
const CATEGORIES: &[(&str, i64)] = &[
    ("Screen", 0),
    ("Screen + Frame", 0),
    ("Battery", 1),
    ("Back Cover", 0),
    ("Charging Port", 1),
];

const QUALITIES: &[(&str, f64)] = &[("Original", 1.6), ("OEM", 1.0), ("Copy", 0.6)];

const CUSTOMERS: &[(&str, f64)] = &[
    ("Walk-in", 0.0),
    ("Omar Phones", 2.0),
    ("Zana Mobile", 3.0),
    ("Dilan Store", 2.5),
];

const COURIERS: &[&str] = &["No Delivery", "Sam Courier", "Rawand Express"];

const WORKERS: &[&str] = &["Lina", "Karwan", "Sara"];

const PRICE_LEVELS: &[&str] = &["Retail", "Wholesale"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 500;
    let mut db_path = String::from("./stockroom_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(500);
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
                println!("Stockroom Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of items to generate (default: 500)");
                println!("  -d, --db <PATH>    Database file path (default: ./stockroom_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Stockroom Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!("Items:    {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.items().list().await?.len();
    if existing > 0 {
        println!("⚠ Database already has {} items", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Reference tables
    let references = db.references();
    let mut brands = Vec::new();
    let mut models = Vec::new();
    for (brand, brand_models) in CATALOG {
        let brand_id = references.insert(ReferenceTable::Brand, brand).await?;
        brands.push((brand_id, *brand));
        for model in brand_models.iter() {
            let model_id = references.insert(ReferenceTable::Model, model).await?;
            models.push((brand_id, model_id));
        }
    }

    let mut categories = Vec::new();
    for (name, circle_ball) in CATEGORIES {
        let id = references.insert(ReferenceTable::Category, name).await?;
        sqlx::query("UPDATE category SET circle_ball = ? WHERE id = ?")
            .bind(circle_ball)
            .bind(id)
            .execute(db.pool())
            .await?;
        categories.push(id);
    }

    let mut qualities = Vec::new();
    for (name, factor) in QUALITIES {
        let id = references.insert(ReferenceTable::Quality, name).await?;
        qualities.push((id, *factor));
    }
    println!(
        "✓ Reference data: {} brands, {} models, {} categories, {} qualities",
        brands.len(),
        models.len(),
        categories.len(),
        qualities.len()
    );

    // Items
    println!();
    println!("Generating items...");

    let start = std::time::Instant::now();
    let mut item_ids = Vec::new();

    'outer: for (brand_id, model_id) in &models {
        let brand_code = brands
            .iter()
            .find(|(id, _)| id == brand_id)
            .map(|(_, name)| name.to_uppercase())
            .unwrap_or_default();

        for (category_idx, category_id) in categories.iter().enumerate() {
            for (quality_id, factor) in &qualities {
                if item_ids.len() >= count {
                    break 'outer;
                }

                let index = item_ids.len();
                let base = 4.0 + (category_idx as f64) * 3.5 + (*model_id % 7) as f64;
                let buy_price = (base * factor * 100.0).round() / 100.0;

                let item = NewItem {
                    id: None,
                    sku: format!("{}-{:04}", brand_code, index),
                    box_id: Some(format!("BX{}", index / 20)),
                    disable: 0,
                    no_excel: 0,
                    brand: *brand_id,
                    model: *model_id,
                    category: *category_id,
                    quality: *quality_id,
                    quantity: ((index * 7) % 40) as i64,
                    buy_price,
                    price_one: (buy_price * 1.35 * 100.0).round() / 100.0,
                    display_order: Some(index as i64),
                    changing_id: None,
                    discription: None,
                };

                match db.items().insert(&item).await {
                    Ok(id) => item_ids.push(id),
                    Err(e) => eprintln!("Failed to insert {}: {}", item.sku, e),
                }

                if item_ids.len() % 100 == 0 && !item_ids.is_empty() {
                    println!("  Generated {} items...", item_ids.len());
                }
            }
        }
    }

    let elapsed = start.elapsed();
    println!("✓ Generated {} items in {:?}", item_ids.len(), elapsed);

    // Contacts
    let contacts = db.contacts();
    let mut customer_ids = Vec::new();
    for (idx, (name, del_fee)) in CUSTOMERS.iter().enumerate() {
        let id = contacts
            .insert_customer(&NewCustomer {
                name: name.to_string(),
                phone_no: Some(format!("0750 000 00{:02}", idx)),
                del_fee: *del_fee,
                address: None,
                remark: None,
                price_level: Some(PRICE_LEVELS[idx % PRICE_LEVELS.len()].to_string()),
            })
            .await?;
        customer_ids.push(id);
    }

    let mut courier_ids = Vec::new();
    for name in COURIERS {
        let id = contacts
            .insert_person(PersonTable::Delivery, &contact(name))
            .await?;
        courier_ids.push(id);
    }

    let mut worker_ids = Vec::new();
    for name in WORKERS {
        let id = contacts
            .insert_person(PersonTable::Worker, &contact(name))
            .await?;
        worker_ids.push(id);
    }
    println!(
        "✓ Contacts: {} customers, {} deliveries, {} workers",
        customer_ids.len(),
        courier_ids.len(),
        worker_ids.len()
    );

    // Invoices and loans
    let invoice_count = if item_ids.is_empty() {
        0
    } else {
        (item_ids.len() / 5).clamp(1, 120)
    };
    let now = Local::now();
    let mut loans = 0;

    for n in 0..invoice_count {
        let picked: Vec<i64> = (0..3)
            .map(|k| item_ids[(n * 3 + k * 11) % item_ids.len()])
            .collect();
        let total = 12.5 * (n % 9 + 1) as f64;
        let discount = if n % 4 == 0 { 1.0 } else { 0.0 };
        let status = if n % 10 == 9 { "Canceled" } else { "Paid" };

        let invoice = NewInvoice {
            new_date: Some(
                (now - Duration::hours((n * 6) as i64))
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string(),
            ),
            items: json!(picked
                .iter()
                .map(|id| json!({"id": id, "quantity": 1}))
                .collect::<Vec<_>>()),
            customer_id: customer_ids[n % customer_ids.len()],
            del_fee: 0.0,
            delivery_id: Some(courier_ids[n % courier_ids.len()]),
            worker_id: Some(worker_ids[n % worker_ids.len()]),
            orders: json!([]),
            total,
            discount,
            net_total: total - discount,
            inv_status: status.to_string(),
            total_quantity: picked.len() as i64,
            note: None,
            price_level: Some(PRICE_LEVELS[n % PRICE_LEVELS.len()].to_string()),
            computer_name: Some("COUNTER-1".to_string()),
            item_ids: json!(picked.iter().map(|id| id.to_string()).collect::<Vec<_>>()),
        };

        let invoice_id = db.invoices().insert(&invoice).await?;

        if n % 5 == 0 {
            db.loans()
                .insert(&NewLoan {
                    amount: invoice.net_total / 2.0,
                    invoice_num: Some(invoice_id),
                    note: Some("Half paid".to_string()),
                    customer_id: invoice.customer_id,
                })
                .await?;
            loans += 1;
        }
    }
    println!("✓ Invoices: {}, loans: {}", invoice_count, loans);

    // Verify search
    println!();
    println!("Verifying item search...");
    let mut params = std::collections::HashMap::new();
    params.insert("search".to_string(), "galaxy screen".to_string());
    let filter = stockroom_core::ItemFilter::from_params(&params).value;
    let results = db.items().search(&filter).await?;
    println!("✓ Search for 'galaxy screen' returned {} results", results.len());

    db.close().await;
    println!();
    println!("🎉 Seed complete!");

    Ok(())
}

fn contact(name: &str) -> NewContact {
    NewContact {
        name: name.to_string(),
        phone_no: None,
        address: None,
    }
}
