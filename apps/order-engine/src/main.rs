//! # Order Engine Entry Point
//!
//! Runs one engine operation against the configured database and prints
//! JSON on stdout. Logs go to stderr.
//!
//! ## Usage
//! ```bash
//! # Place an order (request JSON from a file or stdin)
//! order-engine place request.json
//! cat request.json | order-engine place
//!
//! # Re-render a stored order
//! order-engine receipt <ORDER_ID>
//!
//! # Seller commissions for a date range [FROM, TO)
//! order-engine report 2024-03-01 2024-04-01
//!
//! # Manufacturer piece-rate earnings for the same kind of range
//! order-engine earnings 2024-03-01 2024-04-01
//! ```
//!
//! ## Exit Codes
//! - 0: success, JSON result on stdout
//! - 1: request failed, `ApiError` JSON on stdout
//! - 2: bad usage or startup failure

use std::io::Read;
use std::process::ExitCode;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{error, info};

use cocolu_db::Database;
use order_engine::{ApiError, EngineConfig, ErrorCode, OrderService, PlaceOrderRequest};

enum Command {
    Place(Option<String>),
    Receipt(String),
    Report(String, String),
    Earnings(String, String),
    Help,
}

#[tokio::main]
async fn main() -> ExitCode {
    order_engine::init_tracing();

    let command = match parse_args(std::env::args().skip(1).collect()) {
        Ok(command) => command,
        Err(usage) => {
            eprintln!("{usage}");
            print_help();
            return ExitCode::from(2);
        }
    };

    if let Command::Help = command {
        print_help();
        return ExitCode::SUCCESS;
    }

    let config = match EngineConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::from(2);
        }
    };

    info!(db_path = %config.db_path.display(), "Starting order engine");

    let db = match Database::new(config.db_config()).await {
        Ok(db) => db,
        Err(e) => {
            error!(error = %e, "Database unavailable");
            return ExitCode::from(2);
        }
    };

    let service = OrderService::new(db.clone(), config);
    let code = run(&service, command).await;
    db.close().await;
    code
}

async fn run(service: &OrderService, command: Command) -> ExitCode {
    match command {
        Command::Place(path) => {
            let request = match read_request(path.as_deref()) {
                Ok(request) => request,
                Err(e) => return respond::<()>(Err(ApiError::new(ErrorCode::ValidationError, e))),
            };
            respond(service.place_order(request).await.map_err(ApiError::from))
        }
        Command::Receipt(order_id) => respond(service.render_receipt(&order_id).await.map_err(ApiError::from)),
        Command::Report(from, to) => match parse_range(&from, &to) {
            Ok((from, to)) => respond(service.seller_report(from, to).await.map_err(ApiError::from)),
            Err(e) => respond::<()>(Err(ApiError::new(ErrorCode::ValidationError, e))),
        },
        Command::Earnings(from, to) => match parse_range(&from, &to) {
            Ok((from, to)) => respond(service.manufacturer_report(from, to).await.map_err(ApiError::from)),
            Err(e) => respond::<()>(Err(ApiError::new(ErrorCode::ValidationError, e))),
        },
        Command::Help => ExitCode::SUCCESS,
    }
}

fn parse_args(args: Vec<String>) -> Result<Command, String> {
    let mut args = args.into_iter();

    match args.next().as_deref() {
        None => Ok(Command::Place(None)),
        Some("place") => Ok(Command::Place(args.next())),
        Some("receipt") => args
            .next()
            .map(Command::Receipt)
            .ok_or_else(|| "receipt needs an order id".to_string()),
        Some("report") => match (args.next(), args.next()) {
            (Some(from), Some(to)) => Ok(Command::Report(from, to)),
            _ => Err("report needs FROM and TO dates".to_string()),
        },
        Some("earnings") => match (args.next(), args.next()) {
            (Some(from), Some(to)) => Ok(Command::Earnings(from, to)),
            _ => Err("earnings needs FROM and TO dates".to_string()),
        },
        Some("--help" | "-h") => Ok(Command::Help),
        Some(other) => Err(format!("unknown command: {other}")),
    }
}

fn print_help() {
    eprintln!("Cocolu Order Engine");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  order-engine place [FILE]          Place an order (JSON from FILE or stdin)");
    eprintln!("  order-engine receipt <ORDER_ID>    Print the receipt of a stored order");
    eprintln!("  order-engine report <FROM> <TO>    Seller commissions, dates as YYYY-MM-DD");
    eprintln!("  order-engine earnings <FROM> <TO>  Manufacturer piece-rate earnings");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  COCOLU_DB_PATH, COCOLU_COMMIT_TIMEOUT_MS, COCOLU_BUSINESS_DAY_DELIVERY,");
    eprintln!("  COCOLU_AUTO_ASSIGN_MANUFACTURER, COCOLU_MAX_CONNECTIONS, RUST_LOG");
}

fn read_request(path: Option<&str>) -> Result<PlaceOrderRequest, String> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path).map_err(|e| format!("cannot read {path}: {e}"))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("cannot read stdin: {e}"))?;
            buf
        }
    };

    serde_json::from_str(&raw).map_err(|e| format!("malformed order request: {e}"))
}

/// Midnight UTC of a `YYYY-MM-DD` day.
fn parse_day(raw: &str) -> Result<DateTime<Utc>, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| format!("invalid date '{raw}', expected YYYY-MM-DD"))
}

fn parse_range(from: &str, to: &str) -> Result<(DateTime<Utc>, DateTime<Utc>), String> {
    Ok((parse_day(from)?, parse_day(to)?))
}

fn respond<T: Serialize>(result: Result<T, ApiError>) -> ExitCode {
    let (json, code) = match &result {
        Ok(value) => (serde_json::to_string_pretty(value), ExitCode::SUCCESS),
        Err(err) => (serde_json::to_string_pretty(err), ExitCode::from(1)),
    };

    match json {
        Ok(json) => {
            println!("{json}");
            code
        }
        Err(e) => {
            error!(error = %e, "Cannot serialize response");
            ExitCode::from(2)
        }
    }
}
