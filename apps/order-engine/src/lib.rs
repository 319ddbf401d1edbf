//! # Cocolu Order Engine
//!
//! The order orchestrator and the in-process surface an HTTP handler calls.
//!
//! ## Module Organization
//! ```text
//! order_engine/
//! ├── lib.rs          ◄─── You are here (exports & tracing setup)
//! ├── service.rs      ◄─── OrderService: validate → allocate → commit
//! ├── locks.rs        ◄─── Per-variant async mutex registry
//! ├── request.rs      ◄─── PlaceOrderRequest DTO + validation
//! ├── receipt.rs      ◄─── OrderReceipt DTO (rounding happens here)
//! ├── report.rs       ◄─── Seller commission + manufacturer earnings rows
//! ├── config.rs       ◄─── EngineConfig from COCOLU_* env vars
//! └── error.rs        ◄─── OrderError + serializable ApiError
//! ```
//!
//! ## Shared State
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         OrderService (Clone)                            │
//! │                                                                         │
//! │  ┌──────────────────┐ ┌──────────────────┐ ┌──────────────────────┐    │
//! │  │    Database      │ │   VariantLocks   │ │    EngineConfig      │    │
//! │  │                  │ │                  │ │                      │    │
//! │  │  • SQLite pool   │ │  • one Mutex per │ │  • commit timeout    │    │
//! │  │  • Repositories  │ │    variant id    │ │  • delivery calendar │    │
//! │  │                  │ │                  │ │  • auto-assignment   │    │
//! │  └──────────────────┘ └──────────────────┘ └──────────────────────┘    │
//! │                                                                         │
//! │  Clones share all three; hand one clone to every request handler.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod locks;
pub mod receipt;
pub mod report;
pub mod request;
pub mod service;

pub use config::{ConfigError, EngineConfig};
pub use error::{ApiError, ErrorCode, OrderError, OrderResult};
pub use locks::VariantLocks;
pub use receipt::{OrderReceipt, ReceiptLine, ReceiptTotals};
pub use report::{ManufacturerEarningsRow, SellerCommissionRow};
pub use request::{CustomerInfo, OrderLineRequest, PlaceOrderRequest};
pub use service::OrderService;

use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=cocolu=trace` - Show trace for cocolu crates only
/// - Default: `info,cocolu=debug,sqlx=warn`
///
/// Logs go to stderr so stdout stays clean for JSON output.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cocolu=debug,order_engine=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}
