//! Insertion-ordered per-participant bid ledger.
//!
//! Participants are kept in the order of their first payment; clearing walks
//! them in that order. Positions only grow.

use std::collections::HashMap;

use gavel_types::{AccountId, Amount, AuctionError, BidEntry, Claim, Result};

/// Per-participant positions and, after finalization, claims.
#[derive(Debug, Clone, Default)]
pub struct BidLedger {
    /// First-bid order.
    order: Vec<AccountId>,
    entries: HashMap<AccountId, BidEntry>,
}

impl BidLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// What `bidder`'s position would be after paying `amount`.
    ///
    /// # Errors
    /// Returns [`AuctionError::ArithmeticOverflow`] if the sum overflows.
    pub fn projected_position(&self, bidder: AccountId, amount: Amount) -> Result<Amount> {
        self.position(bidder)
            .checked_add(amount)
            .ok_or(AuctionError::ArithmeticOverflow)
    }

    /// Add `amount` to `bidder`'s position, creating the entry on first
    /// payment. Returns the new position.
    pub fn deposit(&mut self, bidder: AccountId, amount: Amount) -> Result<Amount> {
        let position = self.projected_position(bidder, amount)?;
        self.entry_mut(bidder).position = position;
        Ok(position)
    }

    /// Record a payment that arrived after finalization: it grows the
    /// position and is owed straight back as refund.
    pub fn deposit_late(&mut self, bidder: AccountId, amount: Amount) -> Result<Amount> {
        let position = self.projected_position(bidder, amount)?;
        let refund = self
            .refund(bidder)
            .checked_add(amount)
            .ok_or(AuctionError::ArithmeticOverflow)?;
        let entry = self.entry_mut(bidder);
        entry.position = position;
        entry.refund = refund;
        Ok(position)
    }

    fn entry_mut(&mut self, bidder: AccountId) -> &mut BidEntry {
        let order = &mut self.order;
        self.entries.entry(bidder).or_insert_with(|| {
            order.push(bidder);
            BidEntry::new()
        })
    }

    #[must_use]
    pub fn get(&self, account: AccountId) -> Option<&BidEntry> {
        self.entries.get(&account)
    }

    /// Cumulative payment, zero for unknown accounts.
    #[must_use]
    pub fn position(&self, account: AccountId) -> Amount {
        self.get(account).map_or(0, |e| e.position)
    }

    #[must_use]
    pub fn refund(&self, account: AccountId) -> Amount {
        self.get(account).map_or(0, |e| e.refund)
    }

    #[must_use]
    pub fn allocated_tokens(&self, account: AccountId) -> Amount {
        self.get(account).map_or(0, |e| e.allocated_tokens)
    }

    #[must_use]
    pub fn claim_of(&self, account: AccountId) -> Claim {
        self.get(account).map(BidEntry::claim).unwrap_or_default()
    }

    /// Zero `account`'s claim and return what it held.
    pub fn take_claim(&mut self, account: AccountId) -> Claim {
        self.entries
            .get_mut(&account)
            .map(BidEntry::take_claim)
            .unwrap_or_default()
    }

    /// Zero only `account`'s allocated tokens, returning them.
    pub fn take_tokens(&mut self, account: AccountId) -> Amount {
        self.entries
            .get_mut(&account)
            .map_or(0, |e| std::mem::take(&mut e.allocated_tokens))
    }

    /// Give back a claim taken by [`Self::take_claim`] or [`Self::take_tokens`].
    pub fn restore_claim(&mut self, account: AccountId, claim: Claim) {
        if let Some(entry) = self.entries.get_mut(&account) {
            entry.restore_claim(claim);
        }
    }

    /// Write a finalized allocation into `account`'s entry.
    pub(crate) fn set_claim(&mut self, account: AccountId, tokens: Amount, refund: Amount) {
        if let Some(entry) = self.entries.get_mut(&account) {
            entry.allocated_tokens = tokens;
            entry.refund = refund;
        }
    }

    /// Σ floor(position / price) over all participants.
    #[must_use]
    pub fn implied_demand(&self, price: Amount) -> Amount {
        self.entries
            .values()
            .map(|e| e.implied_tokens(price))
            .fold(0, Amount::saturating_add)
    }

    /// Implied demand if `bidder`'s position were `position`.
    #[must_use]
    pub fn implied_demand_with(&self, bidder: AccountId, position: Amount, price: Amount) -> Amount {
        let others = self
            .entries
            .iter()
            .filter(|(account, _)| **account != bidder)
            .map(|(_, e)| e.implied_tokens(price))
            .fold(0, Amount::saturating_add);
        others.saturating_add(position.checked_div(price).unwrap_or(0))
    }

    /// Σ position over all participants.
    #[must_use]
    pub fn total_position(&self) -> Amount {
        self.entries
            .values()
            .map(|e| e.position)
            .fold(0, Amount::saturating_add)
    }

    /// Σ of every unclaimed allocation and refund.
    #[must_use]
    pub fn outstanding(&self) -> Claim {
        self.entries.values().fold(Claim::default(), |acc, e| Claim {
            tokens: acc.tokens.saturating_add(e.allocated_tokens),
            refund: acc.refund.saturating_add(e.refund),
        })
    }

    /// Entries in first-bid order.
    pub fn iter(&self) -> impl Iterator<Item = (AccountId, &BidEntry)> {
        self.order
            .iter()
            .filter_map(|account| self.entries.get(account).map(|e| (*account, e)))
    }

    /// Number of distinct participants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
