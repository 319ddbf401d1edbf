//! # Commission Calculation
//!
//! Seller commission per order line, under one of two policies.
//!
//! ## Policies
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  revenue  = unit_price × qty                                            │
//! │  profit   = (unit_price − unit_cost) × qty                              │
//! │  standard = revenue × seller_rate                                       │
//! │                                                                         │
//! │  STANDARD:  commission = standard            (may exceed profit)        │
//! │  SMART:     commission = max(0, min(standard, profit × max_share))      │
//! │                                                                         │
//! │  $1000 ring, $950 cost, 10% seller rate, 50% max share:                 │
//! │    standard → $100.00      smart → $25.00                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The configuration is an explicit value. The orchestrator reads it once per
//! order and passes it to every line, so one order never mixes two configs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::{FractionalMoney, Money};
use crate::types::CommissionRate;

/// Configuration key holding the commission mode.
pub const CONFIG_KEY_MODE: &str = "COMMISSION_MODE";

/// Configuration key holding the smart-mode profit share (percent).
pub const CONFIG_KEY_MAX_PROFIT_SHARE: &str = "COMMISSION_MAX_PROFIT_SHARE";

// =============================================================================
// Commission Mode
// =============================================================================

/// Commission policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CommissionMode {
    /// Percentage of revenue, uncapped.
    Standard,
    /// Percentage of revenue, capped at a share of profit.
    Smart,
}

impl CommissionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommissionMode::Standard => "standard",
            CommissionMode::Smart => "smart",
        }
    }
}

impl fmt::Display for CommissionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommissionMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(CommissionMode::Standard),
            "smart" => Ok(CommissionMode::Smart),
            _ => Err(ValidationError::NotAllowed {
                field: CONFIG_KEY_MODE.to_string(),
                allowed: vec!["standard".to_string(), "smart".to_string()],
            }),
        }
    }
}

// =============================================================================
// Commission Config
// =============================================================================

/// Snapshot of the process-wide commission settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CommissionConfig {
    pub mode: CommissionMode,
    /// Share of profit the commission may not exceed (smart mode only).
    pub max_profit_share: CommissionRate,
}

impl Default for CommissionConfig {
    fn default() -> Self {
        CommissionConfig {
            mode: CommissionMode::Smart,
            max_profit_share: CommissionRate::from_bps(5_000),
        }
    }
}

impl CommissionConfig {
    pub fn standard() -> Self {
        CommissionConfig {
            mode: CommissionMode::Standard,
            ..Default::default()
        }
    }

    pub fn smart(max_profit_share: CommissionRate) -> Self {
        CommissionConfig {
            mode: CommissionMode::Smart,
            max_profit_share,
        }
    }

    /// Builds a config from raw key/value store entries.
    ///
    /// Missing entries fall back to the defaults (smart, 50%). Present but
    /// malformed entries are rejected.
    ///
    /// ```rust
    /// use cocolu_core::commission::{CommissionConfig, CommissionMode};
    ///
    /// let config = CommissionConfig::from_entries(Some("standard"), None).unwrap();
    /// assert_eq!(config.mode, CommissionMode::Standard);
    /// assert_eq!(config.max_profit_share.bps(), 5_000);
    ///
    /// assert!(CommissionConfig::from_entries(Some("generous"), None).is_err());
    /// ```
    pub fn from_entries(mode: Option<&str>, max_profit_share: Option<&str>) -> Result<Self, ValidationError> {
        let defaults = CommissionConfig::default();

        let mode = match mode {
            Some(raw) => raw.parse()?,
            None => defaults.mode,
        };

        let max_profit_share = match max_profit_share {
            Some(raw) => CommissionRate::parse_percentage(CONFIG_KEY_MAX_PROFIT_SHARE, raw)?,
            None => defaults.max_profit_share,
        };

        Ok(CommissionConfig { mode, max_profit_share })
    }
}

// =============================================================================
// Calculation
// =============================================================================

/// Commission for one order line, exact (unrounded).
///
/// ## Example
/// ```rust
/// use cocolu_core::commission::{calculate_line_commission, CommissionConfig};
/// use cocolu_core::money::Money;
/// use cocolu_core::types::CommissionRate;
///
/// let commission = calculate_line_commission(
///     Money::from_major(1000),
///     Money::from_major(950),
///     1,
///     CommissionRate::from_bps(1000),
///     &CommissionConfig::default(),
/// );
/// assert_eq!(commission.round_to_cents(), Money::from_major(25));
/// ```
pub fn calculate_line_commission(
    unit_price: Money,
    unit_cost: Money,
    quantity: i64,
    seller_rate: CommissionRate,
    config: &CommissionConfig,
) -> FractionalMoney {
    let revenue = unit_price.multiply_quantity(quantity);
    let standard = revenue.apply_rate(seller_rate);

    match config.mode {
        CommissionMode::Standard => standard,
        CommissionMode::Smart => {
            let profit = (unit_price - unit_cost).multiply_quantity(quantity);
            let cap = profit.apply_rate(config.max_profit_share);

            standard.min(cap).max(FractionalMoney::zero())
        }
    }
}

/// Inputs of one line for [`calculate_order_commission`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommissionLine {
    pub unit_price: Money,
    pub unit_cost: Money,
    pub quantity: i64,
}

/// Per-line commissions and their exact sum for a whole order.
///
/// The seller rate and config are taken once for all lines.
pub fn calculate_order_commission(
    lines: &[CommissionLine],
    seller_rate: CommissionRate,
    config: &CommissionConfig,
) -> (Vec<FractionalMoney>, FractionalMoney) {
    let per_line: Vec<FractionalMoney> = lines
        .iter()
        .map(|l| calculate_line_commission(l.unit_price, l.unit_cost, l.quantity, seller_rate, config))
        .collect();
    let total = per_line.iter().copied().sum();

    (per_line, total)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const TEN_PERCENT: CommissionRate = CommissionRate::from_bps(1000);

    fn ring_commission(config: &CommissionConfig) -> Money {
        calculate_line_commission(
            Money::from_major(1000),
            Money::from_major(950),
            1,
            TEN_PERCENT,
            config,
        )
        .round_to_cents()
    }

    #[test]
    fn test_scenario_c_smart_caps_at_profit_share() {
        let config = CommissionConfig::smart(CommissionRate::from_bps(5000));
        assert_eq!(ring_commission(&config), Money::from_major(25));
    }

    #[test]
    fn test_scenario_d_standard_is_uncapped() {
        assert_eq!(ring_commission(&CommissionConfig::standard()), Money::from_major(100));
    }

    #[test]
    fn test_smart_uses_standard_when_lower() {
        // $100 price, $20 cost: standard $10 < cap $40
        let config = CommissionConfig::default();
        let commission = calculate_line_commission(
            Money::from_major(100),
            Money::from_major(20),
            1,
            TEN_PERCENT,
            &config,
        );
        assert_eq!(commission.round_to_cents(), Money::from_major(10));
    }

    #[test]
    fn test_smart_never_negative() {
        let config = CommissionConfig::default();
        let commission = calculate_line_commission(
            Money::from_major(100),
            Money::from_major(150),
            3,
            TEN_PERCENT,
            &config,
        );
        assert_eq!(commission, FractionalMoney::zero());
    }

    #[test]
    fn test_standard_ignores_loss() {
        let commission = calculate_line_commission(
            Money::from_major(100),
            Money::from_major(150),
            1,
            TEN_PERCENT,
            &CommissionConfig::standard(),
        );
        assert_eq!(commission.round_to_cents(), Money::from_major(10));
    }

    #[test]
    fn test_smart_bounds_hold() {
        let config = CommissionConfig::smart(CommissionRate::from_bps(3_750));

        for price in [0_i64, 1, 99, 1_000, 12_345, 100_000] {
            for cost in [0_i64, 1, 50, 999, 20_000, 150_000] {
                for qty in [1_i64, 2, 7] {
                    let unit_price = Money::from_cents(price);
                    let unit_cost = Money::from_cents(cost);
                    let c = calculate_line_commission(unit_price, unit_cost, qty, TEN_PERCENT, &config);

                    let standard = unit_price.multiply_quantity(qty).apply_rate(TEN_PERCENT);
                    let profit = (unit_price - unit_cost).multiply_quantity(qty);
                    let cap = profit.apply_rate(config.max_profit_share);

                    assert!(!c.is_negative());
                    assert!(c <= standard);
                    if !profit.is_negative() {
                        assert!(c <= cap);
                    }
                }
            }
        }
    }

    #[test]
    fn test_order_commission_sums_exact_amounts() {
        let line = CommissionLine {
            unit_price: Money::from_cents(10),
            unit_cost: Money::zero(),
            quantity: 1,
        };
        let (per_line, total) = calculate_order_commission(
            &[line, line, line],
            CommissionRate::from_bps(750),
            &CommissionConfig::standard(),
        );

        assert_eq!(per_line.len(), 3);
        assert_eq!(total.units(), 22_500);
        assert_eq!(total.round_to_cents().cents(), 2);
    }

    #[test]
    fn test_config_from_entries() {
        assert_eq!(CommissionConfig::from_entries(None, None).unwrap(), CommissionConfig::default());

        let config = CommissionConfig::from_entries(Some(" SMART "), Some("40")).unwrap();
        assert_eq!(config.mode, CommissionMode::Smart);
        assert_eq!(config.max_profit_share.bps(), 4_000);

        assert!(CommissionConfig::from_entries(None, Some("150")).is_err());
        assert!(CommissionConfig::from_entries(None, Some("half")).is_err());
    }

    #[test]
    fn test_mode_round_trip_strings() {
        assert_eq!("standard".parse::<CommissionMode>().unwrap(), CommissionMode::Standard);
        assert_eq!(CommissionMode::Smart.to_string(), "smart");
    }
}
