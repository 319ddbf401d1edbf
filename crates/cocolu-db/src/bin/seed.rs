//! # Seed Data Generator
//!
//! Populates the database with demo catalog, stock, sellers and
//! manufacturers for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p cocolu-db --bin seed
//!
//! # Specify database path
//! cargo run -p cocolu-db --bin seed -- --db ./data/cocolu.db
//! ```
//!
//! ## Generated Data
//! - Locations: LOCAL (0 days), US (5 days), CN (14 days)
//! - One variant per (product, quality tier), stocked at every location
//! - Sellers at 5%, 10% and 12.5% commission
//! - Three manufacturers
//! - Commission config: smart mode, 50% max profit share

use chrono::Utc;
use std::env;

use cocolu_core::commission::{CONFIG_KEY_MAX_PROFIT_SHARE, CONFIG_KEY_MODE};
use cocolu_core::{Location, Manufacturer, QualityTier, Seller, Variant};
use cocolu_db::{Database, DbConfig};

/// (id, code, name, lead time days)
const LOCATIONS: &[(&str, &str, &str, i64)] = &[
    ("LOC-LOCAL", "LOCAL", "Tienda principal", 0),
    ("LOC-US", "US", "Miami warehouse", 5),
    ("LOC-CN", "CN", "Shenzhen supplier", 14),
];

/// (base product id, name, category, base price cents)
const PRODUCTS: &[(&str, &str, &str, i64)] = &[
    ("BP-RING", "Anillo solitario", "rings", 45_000),
    ("BP-NECK", "Collar eslabones", "necklaces", 30_000),
    ("BP-EARR", "Aretes argolla", "earrings", 12_000),
    ("BP-BRAC", "Pulsera tejida", "bracelets", 18_000),
];

/// (tier, price multiplier in percent, cost share of price in percent)
const TIERS: &[(QualityTier, i64, i64)] = &[
    (QualityTier::Standard, 100, 55),
    (QualityTier::Premium, 180, 70),
    (QualityTier::Luxury, 400, 92),
];

/// (id, name, commission rate bps)
const SELLERS: &[(&str, &str, i64)] = &[
    ("SELLER-ANA", "Ana Pérez", 1000),
    ("SELLER-LUIS", "Luis Gómez", 500),
    ("SELLER-SOFIA", "Sofía Ríos", 1250),
];

/// (id, name, specialty, piece rate in cents)
const MANUFACTURERS: &[(&str, &str, &str, i64)] = &[
    ("MFR-ORO", "Taller Oro Fino", "gold", 2_000),
    ("MFR-PLATA", "Platería del Centro", "silver", 1_200),
    ("MFR-GEMA", "Gemas & Engastes", "stones", 3_500),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./cocolu_dev.db");

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
                println!("Cocolu Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./cocolu_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Cocolu Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.catalog().count_variants().await?;
    if existing > 0 {
        println!("⚠ Database already has {} variants", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let catalog = db.catalog();

    catalog.insert_supplier("SUP-SZ", "Shenzhen Jewelry Co.", Some("CN")).await?;

    for (id, code, name, lead_time_days) in LOCATIONS {
        catalog
            .insert_location(&Location {
                id: id.to_string(),
                code: code.to_string(),
                name: name.to_string(),
                lead_time_days: *lead_time_days,
            })
            .await?;
    }
    println!("✓ {} locations", LOCATIONS.len());

    let mut variants = 0;
    for (product_idx, (product_id, product_name, category, base_price)) in PRODUCTS.iter().enumerate() {
        catalog.insert_base_product(product_id, product_name, Some(*category)).await?;

        for (tier_idx, (tier, price_pct, cost_pct)) in TIERS.iter().enumerate() {
            let variant = generate_variant(product_id, product_name, *tier, base_price * price_pct / 100, *cost_pct);
            catalog.insert_variant(&variant).await?;

            for (loc_idx, (location_id, ..)) in LOCATIONS.iter().enumerate() {
                // local stock stays scarce so orders spill to slower locations
                let quantity = if loc_idx == 0 {
                    1 + ((product_idx + tier_idx) % 4) as i64
                } else {
                    5 + ((product_idx * 7 + tier_idx * 3 + loc_idx) % 20) as i64
                };
                db.inventory().restock(&variant.id, location_id, quantity).await?;
            }

            variants += 1;
        }
    }
    println!("✓ {} variants stocked at {} locations", variants, LOCATIONS.len());

    for (id, name, rate_bps) in SELLERS {
        db.sellers()
            .insert(&Seller {
                id: id.to_string(),
                name: name.to_string(),
                email: None,
                commission_rate_bps: *rate_bps,
                active: true,
            })
            .await?;
    }
    println!("✓ {} sellers", SELLERS.len());

    for (id, name, specialty, piece_rate_cents) in MANUFACTURERS {
        db.manufacturers()
            .insert(&Manufacturer {
                id: id.to_string(),
                name: name.to_string(),
                specialty: specialty.to_string(),
                active: true,
                current_load: 0,
                piece_rate_cents: *piece_rate_cents,
            })
            .await?;
    }
    println!("✓ {} manufacturers", MANUFACTURERS.len());

    db.config().set(CONFIG_KEY_MODE, "smart").await?;
    db.config().set(CONFIG_KEY_MAX_PROFIT_SHARE, "50").await?;
    println!("✓ Commission config: smart, 50% max profit share");

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Builds one variant of a base product.
fn generate_variant(product_id: &str, product_name: &str, tier: QualityTier, price_cents: i64, cost_pct: i64) -> Variant {
    let now = Utc::now();
    let tier_code = match tier {
        QualityTier::Standard => "STD",
        QualityTier::Premium => "PRM",
        QualityTier::Luxury => "LUX",
    };
    let id = format!("{}-{}", product_id.trim_start_matches("BP-"), tier_code);

    Variant {
        sku: format!("SKU-{id}"),
        name: format!("{product_name} ({tier_code})"),
        id,
        base_product_id: product_id.to_string(),
        supplier_id: "SUP-SZ".to_string(),
        unit_cost_cents: price_cents * cost_pct / 100,
        sale_price_cents: price_cents,
        quality_tier: tier,
        created_at: now,
        updated_at: now,
    }
}
