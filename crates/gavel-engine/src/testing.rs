//! Minimal in-memory host for unit tests.

use std::collections::{HashMap, HashSet};

use gavel_types::{AccountId, Amount, AuctionError, InventoryCustodian, Result, Timestamp};

use crate::{Auction, Host};

pub(crate) fn acct(n: u128) -> AccountId {
    AccountId::from_u128(n)
}

#[derive(Debug, Default)]
pub(crate) struct TestInventory {
    supply: Amount,
    balances: HashMap<AccountId, Amount>,
    allowances: HashMap<(AccountId, AccountId), Amount>,
}

impl TestInventory {
    fn debit(&mut self, holder: AccountId, amount: Amount) -> Result<()> {
        let available = self.balance_of(holder);
        if available < amount {
            return Err(AuctionError::CustodyRejected {
                reason: format!("{holder} holds {available}, needs {amount}"),
            });
        }
        self.balances.insert(holder, available - amount);
        Ok(())
    }
}

impl InventoryCustodian for TestInventory {
    fn total_supply(&self) -> Amount {
        self.supply
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
                reason: "allowance exceeded".into(),
            });
        }
        self.transfer(from, to, amount)?;
        self.allowances.insert((from, spender), allowed - amount);
        Ok(())
    }

    fn transfer(&mut self, from: AccountId, to: AccountId, amount: Amount) -> Result<()> {
        self.debit(from, amount)?;
        *self.balances.entry(to).or_default() += amount;
        Ok(())
    }

    fn destroy(&mut self, holder: AccountId, amount: Amount) -> Result<()> {
        self.debit(holder, amount)?;
        self.supply -= amount;
        Ok(())
    }
}

pub(crate) struct TestHost {
    now: Timestamp,
    inventory: TestInventory,
    currency: HashMap<AccountId, Amount>,
    rejecting: HashSet<AccountId>,
}

impl TestHost {
    pub(crate) fn new(now: u64) -> Self {
        Self {
            now: Timestamp(now),
            inventory: TestInventory::default(),
            currency: HashMap::new(),
            rejecting: HashSet::new(),
        }
    }

    pub(crate) fn set_now(&mut self, now: Timestamp) {
        self.now = now;
    }

    pub(crate) fn advance(&mut self, secs: u64) {
        self.now = Timestamp(self.now.0 + secs);
    }

    pub(crate) fn mint_inventory(&mut self, to: AccountId, amount: Amount) {
        self.inventory.supply += amount;
        *self.inventory.balances.entry(to).or_default() += amount;
    }

    pub(crate) fn approve(&mut self, owner: AccountId, spender: AccountId, amount: Amount) {
        self.inventory.allowances.insert((owner, spender), amount);
    }

    pub(crate) fn fund(&mut self, to: AccountId, amount: Amount) {
        *self.currency.entry(to).or_default() += amount;
    }

    pub(crate) fn reject_payments_to(&mut self, account: AccountId) {
        self.rejecting.insert(account);
    }

    pub(crate) fn accept_payments_to(&mut self, account: AccountId) {
        self.rejecting.remove(&account);
    }

    pub(crate) fn currency_balance(&self, account: AccountId) -> Amount {
        self.currency.get(&account).copied().unwrap_or(0)
    }

    pub(crate) fn inventory_balance(&self, account: AccountId) -> Amount {
        self.inventory.balance_of(account)
    }

    pub(crate) fn inventory_supply(&self) -> Amount {
        self.inventory.total_supply()
    }

    fn move_currency(&mut self, from: AccountId, to: AccountId, amount: Amount) -> Result<()> {
        let available = self.currency_balance(from);
        if available < amount {
            return Err(AuctionError::InsufficientFunds {
                needed: amount,
                available,
            });
        }
        self.currency.insert(from, available - amount);
        *self.currency.entry(to).or_default() += amount;
        Ok(())
    }
}

impl Host for TestHost {
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
        self.move_currency(from, to, amount)
    }

    fn send_value(&mut self, auction: &mut Auction, to: AccountId, amount: Amount) -> Result<()> {
        if self.rejecting.contains(&to) {
            return Err(AuctionError::TransferFailed {
                reason: format!("{to} rejected payment"),
            });
        }
        self.move_currency(auction.account(), to, amount)
    }
}
