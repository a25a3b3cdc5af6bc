//! # Ledger Configuration
//!
//! Tunables of the accounting aggregator, loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`BODEGA_*`)
//! 2. Defaults (this file)
//!
//! Configuration is read-only after initialization; the aggregator copies it.

use serde::{Deserialize, Serialize};
use tracing::warn;

use bodega_core::accounting::MarginParams;
use bodega_core::validation::validate_percent;
use bodega_core::{Percent, DEFAULT_VARIABLE_COST_BPS, WEEKS_PER_MONTH_HUNDREDTHS};

/// Environment variable overriding the variable-cost percentage (e.g. "27.5").
pub const ENV_VARIABLE_COST_PERCENT: &str = "BODEGA_VARIABLE_COST_PERCENT";

/// Environment variable overriding weeks per month (e.g. "4.33").
pub const ENV_WEEKS_PER_MONTH: &str = "BODEGA_WEEKS_PER_MONTH";

/// Upper bound for weeks per month in hundredths (10.00 weeks).
pub const MAX_WEEKS_PER_MONTH_HUNDREDTHS: u32 = 1_000;

/// Accounting configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerConfig {
    /// Share of revenue estimated as variable cost.
    /// Default: 30%
    pub variable_cost_percent: Percent,

    /// Weeks per month in hundredths, the divisor for monthly fixed costs.
    /// Default: 433 (4.33)
    pub weeks_per_month_hundredths: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            variable_cost_percent: Percent::from_bps(DEFAULT_VARIABLE_COST_BPS),
            weeks_per_month_hundredths: WEEKS_PER_MONTH_HUNDREDTHS,
        }
    }
}

impl LedgerConfig {
    /// Creates a LedgerConfig from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `BODEGA_VARIABLE_COST_PERCENT`: percentage, 0 to 100
    /// - `BODEGA_WEEKS_PER_MONTH`: decimal, 0.01 to 10
    ///
    /// Unparseable or out-of-range values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = LedgerConfig::default();

        if let Some(raw) = lookup(ENV_VARIABLE_COST_PERCENT) {
            match raw.trim().parse::<f64>() {
                Ok(pct) if pct >= 0.0 => {
                    let percent = Percent::from_percentage(pct);
                    match validate_percent("variable_cost_percent", percent) {
                        Ok(()) => config.variable_cost_percent = percent,
                        Err(e) => warn!(value = %raw, error = %e, "Ignoring {}", ENV_VARIABLE_COST_PERCENT),
                    }
                }
                _ => warn!(value = %raw, "Ignoring unparseable {}", ENV_VARIABLE_COST_PERCENT),
            }
        }

        if let Some(raw) = lookup(ENV_WEEKS_PER_MONTH) {
            match raw.trim().parse::<f64>() {
                Ok(weeks) if weeks.is_finite() => {
                    let hundredths = (weeks * 100.0).round();
                    if hundredths >= 1.0 && hundredths <= MAX_WEEKS_PER_MONTH_HUNDREDTHS as f64 {
                        config.weeks_per_month_hundredths = hundredths as u32;
                    } else {
                        warn!(
                            value = %raw,
                            max = MAX_WEEKS_PER_MONTH_HUNDREDTHS,
                            "Ignoring out-of-range {}", ENV_WEEKS_PER_MONTH
                        );
                    }
                }
                _ => warn!(value = %raw, "Ignoring unparseable {}", ENV_WEEKS_PER_MONTH),
            }
        }

        config
    }

    /// Sets the variable-cost percentage.
    pub fn variable_cost_percent(mut self, percent: Percent) -> Self {
        self.variable_cost_percent = percent;
        self
    }

    /// Parameters handed to the pure margin math.
    pub fn margin_params(&self) -> MarginParams {
        MarginParams {
            variable_cost_percent: self.variable_cost_percent,
            weeks_per_month_hundredths: self.weeks_per_month_hundredths,
        }
    }
}
