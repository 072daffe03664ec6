/* This file is part of DarkFi (https://dark.fi)
 *
 * Copyright (C) 2020-2026 Dyne.org foundation
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as
 * published by the Free Software Foundation, either version 3 of the
 * License, or (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use std::{fs, path::Path, str::FromStr};

use log::{debug, error};
use serde::Deserialize;

use crate::{model::RuleConfig, Error, Result};

/// Default address whose historical balance anchors `totalVotes`
/// for ticket-weighted phases.
pub const DEFAULT_TOTAL_ADDRESS: &str = "16htvcBNSEA7fZhAdLJphDwQRQJaHpyHTp";

/// Default custody address of the autonomy contract. It holds the
/// bonds in escrow, the forfeited bonds pool and the treasury.
pub const DEFAULT_AUTONOMY_ADDRESS: &str = "16ZKbaWSmJXvTe2MYsfsmmg8wGTCm6sX6E";

/// Represents the governance engine configuration.
///
/// The value is immutable once loaded and is passed by reference to
/// every executed action.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AutonomyConfig {
    /// Base units per coin
    pub coin_precision: u64,
    /// Coins per vote ticket
    pub ticket_price: u64,
    /// Anchor address for ticket-weighted `totalVotes`
    pub total_address: String,
    /// Custody address of the contract
    pub autonomy_address: String,
    /// Minimum committee size
    pub min_boards: usize,
    /// Maximum committee size
    pub max_boards: usize,
    /// Minimum distance between start and end height
    pub start_end_block_period: u64,
    /// Maximum distance between current height and end height
    pub prop_end_block_period: u64,
    /// Length of a committee spending period in blocks
    pub board_period: u64,
    /// Spending cap per committee period, in coins
    pub max_board_period_amount: u64,
    /// Rule in effect until a Rule proposal passes
    pub rule: RuleConfig,
    /// Accepted ranges for Rule proposal overrides
    pub rule_limits: RuleLimits,
    /// Committee installed when the store holds no active board
    pub genesis_board: Vec<String>,
    /// Path to the configuration if read from a file
    #[serde(skip)]
    pub path: Option<String>,
}

impl AutonomyConfig {
    /// Creates a new configuration from a given file path.
    /// If the file cannot be loaded or parsed, an error is returned.
    pub fn new(config_path: &str) -> Result<Self> {
        let config_content = fs::read_to_string(Path::new(config_path)).map_err(|e| {
            Error::ConfigError(format!(
                "Failed to read the configuration file {config_path}: {e:?}"
            ))
        })?;

        let mut config = toml::from_str::<Self>(&config_content).map_err(|e| {
            error!(target: "autonomy::config", "Failed parsing TOML config: {e}");
            Error::ConfigError(format!("Failed to parse the configuration file {config_path}"))
        })?;
        config.validate()?;
        config.path = Some(config_path.to_string());

        debug!(target: "autonomy::config", "Successfully loaded configuration: {config:?}");
        Ok(config)
    }

    /// Sanity checks on values the engine divides by or compares against.
    pub fn validate(&self) -> Result<()> {
        if self.coin_precision == 0 || self.ticket_price == 0 {
            return Err(Error::ConfigError(
                "coin_precision and ticket_price must be non-zero".to_string(),
            ))
        }
        if self.min_boards == 0 || self.min_boards > self.max_boards {
            return Err(Error::ConfigError(format!(
                "Invalid board bounds [{}, {}]",
                self.min_boards, self.max_boards
            )))
        }
        if self.total_address.is_empty() || self.autonomy_address.is_empty() {
            return Err(Error::ConfigError("Anchor and custody addresses must be set".into()))
        }
        Ok(())
    }

    /// Base units a single vote ticket is worth.
    pub fn ticket_unit(&self) -> u64 {
        self.ticket_price.saturating_mul(self.coin_precision)
    }

    /// Spending cap per committee period, in base units.
    pub fn period_amount_cap(&self) -> u64 {
        self.max_board_period_amount.saturating_mul(self.coin_precision)
    }
}

impl Default for AutonomyConfig {
    fn default() -> Self {
        let coin_precision = 100_000_000;
        Self {
            coin_precision,
            ticket_price: 3000,
            total_address: DEFAULT_TOTAL_ADDRESS.to_string(),
            autonomy_address: DEFAULT_AUTONOMY_ADDRESS.to_string(),
            min_boards: 20,
            max_boards: 40,
            start_end_block_period: 720,
            prop_end_block_period: 1_000_000,
            board_period: 17280 * 30,
            max_board_period_amount: 3_000_000,
            rule: RuleConfig::with_precision(coin_precision),
            rule_limits: RuleLimits::default(),
            genesis_board: vec![],
            path: None,
        }
    }
}

/// Deserializes a `&str` containing configuration in TOML format into
/// an [`AutonomyConfig`] instance.
impl FromStr for AutonomyConfig {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let config: AutonomyConfig =
            toml::from_str(s).map_err(|e| format!("Failed to parse AutonomyConfig: {e}"))?;
        config.validate().map_err(|e| e.to_string())?;
        Ok(config)
    }
}

/// Inclusive `[min, max]` bounds accepted for each Rule override.
/// Amounts are expressed in coins.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RuleLimits {
    pub board_approve_ratio: (u32, u32),
    pub pub_oppose_ratio: (u32, u32),
    pub pub_attend_ratio: (u32, u32),
    pub pub_approve_ratio: (u32, u32),
    pub public_period: (u64, u64),
    pub large_project_amount: (u64, u64),
    pub proposal_amount: (u64, u64),
}

impl Default for RuleLimits {
    fn default() -> Self {
        Self {
            board_approve_ratio: (50, 66),
            pub_oppose_ratio: (33, 50),
            pub_attend_ratio: (50, 80),
            pub_approve_ratio: (50, 80),
            public_period: (17280 * 7, 17280 * 14),
            large_project_amount: (1_000_000, 3_000_000),
            proposal_amount: (20, 2000),
        }
    }
}
