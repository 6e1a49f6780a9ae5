//! Native currency balances.
//!
//! The chain's native value: what bidders pay with and what refunds and
//! revenue are paid in. Tracks how much was ever issued so the supply can be
//! audited against the sum of balances.

use std::collections::HashMap;

use gavel_types::{AccountId, Amount, AuctionError, Result};

#[derive(Debug, Clone, Default)]
pub struct Treasury {
    balances: HashMap<AccountId, Amount>,
    issued: Amount,
}

impl Treasury {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue `amount` new currency to `to`.
    ///
    /// # Errors
    /// Returns [`AuctionError::ArithmeticOverflow`] if issuance would overflow.
    pub fn fund(&mut self, to: AccountId, amount: Amount) -> Result<()> {
        let issued = self
            .issued
            .checked_add(amount)
            .ok_or(AuctionError::ArithmeticOverflow)?;
        let entry = self.balances.entry(to).or_default();
        *entry = entry
            .checked_add(amount)
            .ok_or(AuctionError::ArithmeticOverflow)?;
        self.issued = issued;
        Ok(())
    }

    /// Move `amount` from `from` to `to`.
    ///
    /// # Errors
    /// Returns [`AuctionError::InsufficientFunds`] if `from` cannot pay.
    pub fn transfer(&mut self, from: AccountId, to: AccountId, amount: Amount) -> Result<()> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(AuctionError::InsufficientFunds {
                needed: amount,
                available,
            });
        }
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(AuctionError::ArithmeticOverflow)?;
        self.balances.insert(from, available - amount);
        self.balances.insert(to, credited);
        Ok(())
    }

    #[must_use]
    pub fn balance_of(&self, account: AccountId) -> Amount {
        self.balances.get(&account).copied().unwrap_or(0)
    }

    /// Σ balances.
    #[must_use]
    pub fn total_supply(&self) -> Amount {
        self.balances
            .values()
            .fold(0, |acc: Amount, b| acc.saturating_add(*b))
    }

    /// Σ ever funded.
    #[must_use]
    pub fn issued(&self) -> Amount {
        self.issued
    }
}
