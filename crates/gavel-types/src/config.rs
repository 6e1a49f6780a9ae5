//! Auction configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Amount, AuctionError, Result, constants};

/// Immutable parameters of one auction, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionParams {
    /// Unit price at `start_at`.
    pub starting_price: Amount,
    /// Price floor, reached once `duration_secs` have elapsed.
    pub reserve_price: Amount,
    /// Length of the price decay in seconds.
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u64,
    /// Label of the inventory asset held by the custodian (e.g. "AXL").
    pub inventory_asset: String,
}

fn default_duration_secs() -> u64 {
    constants::DEFAULT_DURATION_SECS
}

impl AuctionParams {
    #[must_use]
    pub fn new(
        starting_price: Amount,
        reserve_price: Amount,
        duration_secs: u64,
        inventory_asset: impl Into<String>,
    ) -> Self {
        Self {
            starting_price,
            reserve_price,
            duration_secs,
            inventory_asset: inventory_asset.into(),
        }
    }

    /// Check the constructor preconditions.
    ///
    /// # Errors
    /// Returns [`AuctionError::InvalidAuctionInput`] when the starting price
    /// or reserve price is zero, the reserve exceeds the starting price, or
    /// the duration is zero or above [`constants::MAX_DURATION_SECS`].
    pub fn validate(&self) -> Result<()> {
        if self.starting_price == 0 {
            return Err(AuctionError::invalid_input("starting price must be positive"));
        }
        if self.reserve_price == 0 {
            return Err(AuctionError::invalid_input("reserve price must be positive"));
        }
        if self.reserve_price > self.starting_price {
            return Err(AuctionError::invalid_input(format!(
                "reserve price {} exceeds starting price {}",
                self.reserve_price, self.starting_price
            )));
        }
        if self.duration_secs == 0 {
            return Err(AuctionError::invalid_input("duration must be positive"));
        }
        if self.duration_secs > constants::MAX_DURATION_SECS {
            return Err(AuctionError::invalid_input(format!(
                "duration {}s exceeds maximum {}s",
                self.duration_secs,
                constants::MAX_DURATION_SECS
            )));
        }
        if self.inventory_asset.trim().is_empty() {
            return Err(AuctionError::invalid_input("inventory asset label is empty"));
        }
        Ok(())
    }

    /// Parse and validate parameters from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(json)
            .map_err(|e| AuctionError::Configuration(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    /// Read, parse and validate parameters from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Per-second price decrement (floor division).
    #[must_use]
    pub fn decay_rate(&self) -> Amount {
        self.starting_price.saturating_sub(self.reserve_price)
            / Amount::from(self.duration_secs.max(1))
    }
}
