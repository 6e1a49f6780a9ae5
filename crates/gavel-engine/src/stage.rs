//! Lazy end-of-auction detection.
//!
//! Nothing schedules the STARTED → ENDED transition. Every operation asks the
//! guard, with that operation's single time read, whether the auction should
//! already be over:
//!
//! 1. host time ≥ `start_at + duration` → [`EndTrigger::Expired`]
//! 2. Σ floor(position / price(now)) ≥ inventory → [`EndTrigger::DemandExhausted`]
//!
//! Expiry wins when both hold.

use gavel_types::{AccountId, Amount, EndTrigger, Timestamp};

use crate::{BidLedger, PriceCurve};

/// Transition guard for a started auction.
#[derive(Debug, Clone, Copy)]
pub struct StageGuard<'a> {
    curve: &'a PriceCurve,
    start_at: Timestamp,
    total_inventory: Amount,
}

impl<'a> StageGuard<'a> {
    #[must_use]
    pub fn new(curve: &'a PriceCurve, start_at: Timestamp, total_inventory: Amount) -> Self {
        Self {
            curve,
            start_at,
            total_inventory,
        }
    }

    /// Whether the auction, with its current bids, should end at `now`.
    #[must_use]
    pub fn detect(&self, ledger: &BidLedger, now: Timestamp) -> Option<EndTrigger> {
        if self.curve.has_expired(self.start_at, now) {
            return Some(EndTrigger::Expired);
        }
        let price = self.curve.price_at(self.start_at, now);
        (ledger.implied_demand(price) >= self.total_inventory).then_some(EndTrigger::DemandExhausted)
    }

    /// Whether raising `bidder`'s position to `position` at `now` would
    /// consume the whole inventory.
    #[must_use]
    pub fn exhausted_by(
        &self,
        ledger: &BidLedger,
        bidder: AccountId,
        position: Amount,
        now: Timestamp,
    ) -> bool {
        let price = self.curve.price_at(self.start_at, now);
        ledger.implied_demand_with(bidder, position, price) >= self.total_inventory
    }
}
