//! # Configuration Repository
//!
//! Key/value settings in `meta_config`, changed at runtime by an admin.
//!
//! ## Commission Keys
//! ```text
//! COMMISSION_MODE              "standard" | "smart"     (default smart)
//! COMMISSION_MAX_PROFIT_SHARE  percent, 0-100           (default 50)
//! ```
//!
//! The engine reads a [`CommissionConfig`] snapshot once per order; nothing
//! is cached here.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, DbResult};
use cocolu_core::commission::{CONFIG_KEY_MAX_PROFIT_SHARE, CONFIG_KEY_MODE};
use cocolu_core::{CommissionConfig, CommissionMode, CommissionRate};

/// Repository for the configuration store.
#[derive(Debug, Clone)]
pub struct ConfigRepository {
    pool: SqlitePool,
}

impl ConfigRepository {
    /// Creates a new ConfigRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ConfigRepository { pool }
    }

    /// Raw value of a key.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM meta_config WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    /// Stores a value. Commission keys are checked before they are written.
    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        match key {
            CONFIG_KEY_MODE => {
                value
                    .parse::<CommissionMode>()
                    .map_err(|e| DbError::InvalidValue(e.to_string()))?;
            }
            CONFIG_KEY_MAX_PROFIT_SHARE => {
                CommissionRate::parse_percentage(key, value)
                    .map_err(|e| DbError::InvalidValue(e.to_string()))?;
            }
            _ => {}
        }

        sqlx::query(
            r#"
            INSERT INTO meta_config (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        info!(key = %key, value = %value, "Config updated");
        Ok(())
    }

    /// Current commission settings, defaults filled in.
    ///
    /// ## Errors
    /// [`DbError::InvalidValue`] if a stored value does not parse.
    pub async fn commission_config(&self) -> DbResult<CommissionConfig> {
        let mode = self.get(CONFIG_KEY_MODE).await?;
        let share = self.get(CONFIG_KEY_MAX_PROFIT_SHARE).await?;

        CommissionConfig::from_entries(mode.as_deref(), share.as_deref())
            .map_err(|e| DbError::InvalidValue(e.to_string()))
    }

    /// Writes both commission keys.
    pub async fn set_commission_config(&self, config: &CommissionConfig) -> DbResult<()> {
        self.set(CONFIG_KEY_MODE, config.mode.as_str()).await?;
        self.set(
            CONFIG_KEY_MAX_PROFIT_SHARE,
            &config.max_profit_share.percentage().to_string(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_defaults_when_unset() {
        let db = db().await;

        let config = db.config().commission_config().await.unwrap();
        assert_eq!(config, CommissionConfig::default());
        assert_eq!(config.mode, CommissionMode::Smart);
        assert_eq!(config.max_profit_share.bps(), 5_000);
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let db = db().await;
        let store = db.config();

        store.set(CONFIG_KEY_MODE, "standard").await.unwrap();
        store.set(CONFIG_KEY_MAX_PROFIT_SHARE, "37.5").await.unwrap();
        store.set("STORE_NAME", "Cocolu").await.unwrap();

        assert_eq!(store.get("STORE_NAME").await.unwrap().as_deref(), Some("Cocolu"));

        let config = store.commission_config().await.unwrap();
        assert_eq!(config.mode, CommissionMode::Standard);
        assert_eq!(config.max_profit_share.bps(), 3_750);

        // overwrite
        store.set(CONFIG_KEY_MODE, "smart").await.unwrap();
        assert_eq!(store.commission_config().await.unwrap().mode, CommissionMode::Smart);
    }

    #[tokio::test]
    async fn test_invalid_commission_values_rejected() {
        let db = db().await;
        let store = db.config();

        assert!(store.set(CONFIG_KEY_MODE, "generous").await.is_err());
        assert!(store.set(CONFIG_KEY_MAX_PROFIT_SHARE, "120").await.is_err());
        assert!(store.get(CONFIG_KEY_MODE).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_commission_config_round_trip() {
        let db = db().await;
        let config = CommissionConfig::smart(CommissionRate::from_bps(4_000));

        db.config().set_commission_config(&config).await.unwrap();
        assert_eq!(db.config().commission_config().await.unwrap(), config);
    }
}
