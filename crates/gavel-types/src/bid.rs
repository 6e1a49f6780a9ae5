//! Per-participant bookkeeping.
//!
//! A participant's `position` only grows while the auction runs. At
//! finalization it is split into `allocated_tokens` and `refund`; a
//! withdrawal zeroes both, and the zero pair is the "already claimed" flag.

use serde::{Deserialize, Serialize};

use crate::Amount;

/// A single participant's entry in the bid ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BidEntry {
    /// Cumulative currency committed.
    pub position: Amount,
    /// Inventory owed, fixed at finalization.
    pub allocated_tokens: Amount,
    /// Currency owed back, fixed at finalization (plus any late payments).
    pub refund: Amount,
}

impl BidEntry {
    /// Create an empty entry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Units this position would buy at `price` (floor division).
    /// Returns zero for a zero price.
    #[must_use]
    pub fn implied_tokens(&self, price: Amount) -> Amount {
        self.position.checked_div(price).unwrap_or(0)
    }

    /// What this participant can still withdraw.
    #[must_use]
    pub fn claim(&self) -> Claim {
        Claim {
            tokens: self.allocated_tokens,
            refund: self.refund,
        }
    }

    /// Zero the claimable fields, returning what they held.
    pub fn take_claim(&mut self) -> Claim {
        let claim = self.claim();
        self.allocated_tokens = 0;
        self.refund = 0;
        claim
    }

    /// Put a claim back (used when a payout is rolled back). Saturates
    /// rather than wrapping.
    pub fn restore_claim(&mut self, claim: Claim) {
        self.allocated_tokens = self.allocated_tokens.saturating_add(claim.tokens);
        self.refund = self.refund.saturating_add(claim.refund);
    }
}

/// Inventory plus currency owed to one participant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub tokens: Amount,
    pub refund: Amount,
}

impl Claim {
    /// Whether there is nothing to withdraw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens == 0 && self.refund == 0
    }
}
