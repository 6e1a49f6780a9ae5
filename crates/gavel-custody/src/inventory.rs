//! Fungible inventory ledger.
//!
//! Balances and allowances for the asset being auctioned, with ERC-20-like
//! rules: an owner approves a spender, the spender pulls against that
//! allowance, and burning reduces total supply. Every mutation is atomic:
//! either it fully succeeds or the ledger is unchanged.

use std::collections::HashMap;

use gavel_types::{AccountId, Amount, AuctionError, InventoryCustodian, Result};

/// In-memory ledger for one fungible asset.
#[derive(Debug, Clone, Default)]
pub struct InventoryLedger {
    asset: String,
    total_supply: Amount,
    balances: HashMap<AccountId, Amount>,
    /// (owner, spender) → remaining allowance.
    allowances: HashMap<(AccountId, AccountId), Amount>,
}

impl InventoryLedger {
    #[must_use]
    pub fn new(asset: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn asset(&self) -> &str {
        &self.asset
    }

    /// Create `amount` new units in `to`'s balance.
    ///
    /// # Errors
    /// Returns [`AuctionError::ArithmeticOverflow`] if supply would overflow.
    pub fn mint(&mut self, to: AccountId, amount: Amount) -> Result<()> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(AuctionError::ArithmeticOverflow)?;
        self.credit(to, amount)?;
        self.total_supply = supply;
        tracing::debug!(asset = %self.asset, to = %to, amount, "Inventory minted");
        Ok(())
    }

    /// Set (not add to) the allowance `owner` grants `spender`.
    pub fn approve(&mut self, owner: AccountId, spender: AccountId, amount: Amount) {
        if amount == 0 {
            self.allowances.remove(&(owner, spender));
        } else {
            self.allowances.insert((owner, spender), amount);
        }
    }

    /// Sum of all balances. Equals `total_supply` unless the ledger is broken.
    #[must_use]
    pub fn circulating(&self) -> Amount {
        self.balances
            .values()
            .fold(0, |acc: Amount, b| acc.saturating_add(*b))
    }

    fn debit(&mut self, holder: AccountId, amount: Amount) -> Result<()> {
        let available = self.balance_of(holder);
        if available < amount {
            return Err(AuctionError::CustodyRejected {
                reason: format!(
                    "{holder} holds {available} {}, needs {amount}",
                    self.asset
                ),
            });
        }
        let remaining = available - amount;
        if remaining == 0 {
            self.balances.remove(&holder);
        } else {
            self.balances.insert(holder, remaining);
        }
        Ok(())
    }

    fn credit(&mut self, holder: AccountId, amount: Amount) -> Result<()> {
        let entry = self.balances.entry(holder).or_default();
        *entry = entry
            .checked_add(amount)
            .ok_or(AuctionError::ArithmeticOverflow)?;
        Ok(())
    }
}

impl InventoryCustodian for InventoryLedger {
    fn total_supply(&self) -> Amount {
        self.total_supply
    }

    fn balance_of(&self, holder: AccountId) -> Amount {
        self.balances.get(&holder).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: AccountId, spender: AccountId) -> Amount {
        self.allowances.get(&(owner, spender)).copied().unwrap_or(0)
    }

    fn pull_transfer(
        &mut self,
        spender: AccountId,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<()> {
        let allowed = self.allowance(from, spender);
        if allowed < amount {
            return Err(AuctionError::CustodyRejected {
                reason: format!("{spender} may pull {allowed} from {from}, asked {amount}"),
            });
        }
        self.transfer(from, to, amount)?;
        self.approve(from, spender, allowed - amount);
        Ok(())
    }

    fn transfer(&mut self, from: AccountId, to: AccountId, amount: Amount) -> Result<()> {
        if from == to {
            let available = self.balance_of(from);
            if available < amount {
                return Err(AuctionError::CustodyRejected {
                    reason: format!("{from} holds {available} {}, needs {amount}", self.asset),
                });
            }
            return Ok(());
        }
        // Receiver overflow is checked before the sender is debited.
        self.balance_of(to)
            .checked_add(amount)
            .ok_or(AuctionError::ArithmeticOverflow)?;
        self.debit(from, amount)?;
        self.credit(to, amount)
    }

    fn destroy(&mut self, holder: AccountId, amount: Amount) -> Result<()> {
        self.debit(holder, amount)?;
        self.total_supply -= amount;
        tracing::debug!(asset = %self.asset, holder = %holder, amount, "Inventory destroyed");
        Ok(())
    }
}
