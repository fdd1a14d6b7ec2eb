//! Engine configuration loaded from environment variables.
//!
//! | Variable                          | Default     |
//! |-----------------------------------|-------------|
//! | `CREATIVEFI_TOKEN_SUPPLY`         | `1000000`   |
//! | `CREATIVEFI_PLATFORM_FEE_BPS`     | `500`       |
//! | `CREATIVEFI_CLIFF_SECS`           | 90 days     |
//! | `CREATIVEFI_VESTING_SECS`         | 365 days    |

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::distributor::BPS_DENOMINATOR;
use crate::errors::{Error, Result};
use crate::types::Amount;

pub const SECONDS_PER_DAY: u64 = 86_400;

pub const DEFAULT_TOKEN_SUPPLY: Amount = 1_000_000;
pub const DEFAULT_PLATFORM_FEE_BPS: u32 = 500;
pub const DEFAULT_CLIFF_SECS: u64 = 90 * SECONDS_PER_DAY;
pub const DEFAULT_VESTING_SECS: u64 = 365 * SECONDS_PER_DAY;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Token supply minted to the creator when a campaign does not set its own.
    pub default_token_supply: Amount,
    /// Platform share of milestone releases and revenue, in basis points.
    pub platform_fee_bps: u32,
    /// Seconds between the first vesting contribution and the cliff.
    pub cliff_duration_secs: u64,
    /// Length of the linear vesting window after the cliff.
    pub vesting_duration_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_token_supply: DEFAULT_TOKEN_SUPPLY,
            platform_fee_bps: DEFAULT_PLATFORM_FEE_BPS,
            cliff_duration_secs: DEFAULT_CLIFF_SECS,
            vesting_duration_secs: DEFAULT_VESTING_SECS,
        }
    }
}

impl EngineConfig {
    /// Load an optional `.env` file, then read the environment.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_env()
    }

    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Read the configuration from any variable source. Unset keys fall back
    /// to the defaults.
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = EngineConfig {
            default_token_supply: parse_var(&var, "CREATIVEFI_TOKEN_SUPPLY", DEFAULT_TOKEN_SUPPLY)?,
            platform_fee_bps: parse_var(&var, "CREATIVEFI_PLATFORM_FEE_BPS", DEFAULT_PLATFORM_FEE_BPS)?,
            cliff_duration_secs: parse_var(&var, "CREATIVEFI_CLIFF_SECS", DEFAULT_CLIFF_SECS)?,
            vesting_duration_secs: parse_var(&var, "CREATIVEFI_VESTING_SECS", DEFAULT_VESTING_SECS)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_token_supply == 0 {
            return Err(Error::Config(
                "default_token_supply must be greater than zero".to_string(),
            ));
        }
        if self.platform_fee_bps > BPS_DENOMINATOR {
            return Err(Error::Config(format!(
                "platform_fee_bps must be at most {BPS_DENOMINATOR}"
            )));
        }
        Ok(())
    }
}

fn parse_var<F, T>(var: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + ToString,
{
    var(key)
        .unwrap_or_else(|| default.to_string())
        .parse()
        .map_err(|_| Error::Config(format!("Invalid {key}")))
}
