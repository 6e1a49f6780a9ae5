//! A complete in-memory [`Host`].
//!
//! `LedgerHost` owns a controllable clock, the inventory ledger, the
//! currency treasury and an optional hook per account. A hook runs whenever
//! the auction pays that account and may call straight back into the
//! auction, which is how hostile recipients are modelled. If a hook fails,
//! the payment and everything the hook did are rolled back.

use std::collections::HashMap;

use gavel_engine::{Auction, Host};
use gavel_types::{AccountId, Amount, AuctionError, InventoryCustodian, Result, Timestamp};

use crate::{InventoryLedger, Treasury};

/// Code that runs when an account receives currency from an auction.
pub trait Recipient {
    /// Called after `amount` has been credited. Returning an error rejects
    /// the payment.
    fn on_receive(
        &mut self,
        auction: &mut Auction,
        host: &mut LedgerHost,
        amount: Amount,
    ) -> Result<()>;
}

pub struct LedgerHost {
    now: Timestamp,
    inventory: InventoryLedger,
    treasury: Treasury,
    recipients: HashMap<AccountId, Box<dyn Recipient>>,
}

impl LedgerHost {
    #[must_use]
    pub fn new(asset: impl Into<String>, now: Timestamp) -> Self {
        Self {
            now,
            inventory: InventoryLedger::new(asset),
            treasury: Treasury::new(),
            recipients: HashMap::new(),
        }
    }

    pub fn set_now(&mut self, now: Timestamp) {
        self.now = now;
    }

    /// Move the clock forward. Saturates at the end of time.
    pub fn advance(&mut self, secs: u64) {
        self.now = Timestamp(self.now.0.saturating_add(secs));
    }

    #[must_use]
    pub fn inventory_ledger(&self) -> &InventoryLedger {
        &self.inventory
    }

    pub fn inventory_ledger_mut(&mut self) -> &mut InventoryLedger {
        &mut self.inventory
    }

    #[must_use]
    pub fn treasury(&self) -> &Treasury {
        &self.treasury
    }

    pub fn treasury_mut(&mut self) -> &mut Treasury {
        &mut self.treasury
    }

    /// Install `hook` for payments to `account`, replacing any previous one.
    pub fn register_recipient(&mut self, account: AccountId, hook: Box<dyn Recipient>) {
        self.recipients.insert(account, hook);
    }

    pub fn remove_recipient(&mut self, account: AccountId) -> Option<Box<dyn Recipient>> {
        self.recipients.remove(&account)
    }

    #[must_use]
    pub fn currency_balance(&self, account: AccountId) -> Amount {
        self.treasury.balance_of(account)
    }

    #[must_use]
    pub fn inventory_balance(&self, account: AccountId) -> Amount {
        self.inventory.balance_of(account)
    }
}

impl Host for LedgerHost {
    fn now(&self) -> Timestamp {
        self.now
    }

    fn inventory(&self) -> &dyn InventoryCustodian {
        &self.inventory
    }

    fn inventory_mut(&mut self) -> &mut dyn InventoryCustodian {
        &mut self.inventory
    }

    fn receive_value(&mut self, from: AccountId, to: AccountId, amount: Amount) -> Result<()> {
        self.treasury.transfer(from, to, amount)
    }

    fn send_value(&mut self, auction: &mut Auction, to: AccountId, amount: Amount) -> Result<()> {
        let from = auction.account();

        if !self.recipients.contains_key(&to) {
            return self.treasury.transfer(from, to, amount);
        }
        let saved = (self.treasury.clone(), self.inventory.clone(), auction.clone());
        self.treasury.transfer(from, to, amount)?;

        // The hook is out of the map while it runs, so a nested payment to
        // the same account completes without running it again.
        let Some(mut hook) = self.recipients.remove(&to) else {
            return Ok(());
        };
        let result = hook.on_receive(auction, self, amount);
        self.recipients.entry(to).or_insert(hook);

        if let Err(err) = result {
            tracing::warn!(
                auction = %auction.id(),
                to = %to,
                amount,
                error = %err,
                "Recipient rejected payment, rolled back"
            );
            (self.treasury, self.inventory, *auction) = saved;
            return Err(match err {
                AuctionError::TransferFailed { .. } => err,
                other => AuctionError::TransferFailed {
                    reason: format!("recipient {to} rejected: {other}"),
                },
            });
        }
        Ok(())
    }
}
