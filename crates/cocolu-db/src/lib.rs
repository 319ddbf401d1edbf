//! # cocolu-db: Database Layer for the Order Engine
//!
//! Persistence for the stock ledger, the seller/manufacturer directories,
//! the configuration store and committed orders. SQLite through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Order Engine Data Flow                           │
//! │                                                                         │
//! │  OrderService::place_order                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    cocolu-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │  │   │
//! │  │   │               │    │ CatalogRepo    │   │              │  │   │
//! │  │   │ SqlitePool    │◄───│ InventoryRepo  │   │ 001_initial  │  │   │
//! │  │   │ Connection    │    │ SellerRepo     │   │   _schema    │  │   │
//! │  │   │ Management    │    │ MfrRepo        │   │              │  │   │
//! │  │   │               │    │ ConfigRepo     │   │              │  │   │
//! │  │   │               │    │ OrderRepo ★    │   │              │  │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   ★ OrderRepository::commit is the single atomic write          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cocolu_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("cocolu.db")).await?;
//!
//! let levels = db.inventory().stock_levels("RING-1").await?;
//! let config = db.config().commission_config().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::catalog::CatalogRepository;
pub use repository::config::ConfigRepository;
pub use repository::inventory::InventoryRepository;
pub use repository::manufacturer::{ManufacturerEarningsSummary, ManufacturerRepository};
pub use repository::order::{LineDraft, ManufacturerChoice, OrderDraft, OrderRepository};
pub use repository::seller::{SellerCommissionSummary, SellerRepository};
