//! Uniform clearing at finalization.
//!
//! The clearing price is the curve price at the instant the end was
//! detected; it is not searched or optimized. Given that price, each
//! participant (in first-bid order) is allocated
//!
//! ```text
//! tokens = min(floor(position / clearing_price), remaining)
//! refund = position − tokens · clearing_price
//! ```
//!
//! When a bid ended the auction, that bidder is allocated last and receives
//! exactly what the others left over, which can be less than its floor
//! quotient. Floor remainders stay with the participants as refund, so
//! `Σ tokens · price + Σ refund = Σ position` always holds.

use gavel_types::{AccountId, Amount, AuctionError, AuctionId, Claim, EndTrigger, Result};
use serde::{Deserialize, Serialize};

use crate::{BidLedger, digest::compute_settlement_root};

/// One participant's finalized share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub account: AccountId,
    pub tokens: Amount,
    pub refund: Amount,
}

impl Allocation {
    #[must_use]
    pub fn claim(&self) -> Claim {
        Claim {
            tokens: self.tokens,
            refund: self.refund,
        }
    }
}

/// Result of clearing, fixed once at finalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearingOutcome {
    /// The single price every unit sold at.
    pub clearing_price: Amount,
    /// Why the auction ended.
    pub trigger: EndTrigger,
    /// Inventory snapshotted at start.
    pub total_inventory: Amount,
    /// Σ allocated tokens.
    pub tokens_sold: Amount,
    /// Allocations in first-bid order.
    pub allocations: Vec<Allocation>,
    /// SHA-256 commitment over the outcome.
    pub settlement_root: [u8; 32],
}

impl ClearingOutcome {
    /// Inventory left for the owner to destroy.
    #[must_use]
    pub fn unsold(&self) -> Amount {
        self.total_inventory.saturating_sub(self.tokens_sold)
    }

    /// Owner proceeds: `tokens_sold · clearing_price`.
    #[must_use]
    pub fn revenue(&self) -> Amount {
        self.tokens_sold.saturating_mul(self.clearing_price)
    }

    #[must_use]
    pub fn allocation_of(&self, account: AccountId) -> Option<&Allocation> {
        self.allocations.iter().find(|a| a.account == account)
    }

    /// Verify `Σ tokens · price + Σ refund == total_position` and
    /// `tokens_sold ≤ total_inventory`.
    ///
    /// # Errors
    /// Returns [`AuctionError::ConservationViolation`] on mismatch.
    pub fn check_conservation(&self, total_position: Amount) -> Result<()> {
        let refunds = self
            .allocations
            .iter()
            .fold(0, |acc: Amount, a| acc.saturating_add(a.refund));
        let accounted = self.revenue().saturating_add(refunds);
        if accounted != total_position {
            return Err(AuctionError::ConservationViolation {
                reason: format!(
                    "sold {} x {} + refunds {refunds} != positions {total_position}",
                    self.tokens_sold, self.clearing_price
                ),
            });
        }
        if self.tokens_sold > self.total_inventory {
            return Err(AuctionError::ConservationViolation {
                reason: format!(
                    "sold {} exceeds inventory {}",
                    self.tokens_sold, self.total_inventory
                ),
            });
        }
        Ok(())
    }
}

/// Split every position into tokens and refund at `clearing_price`.
///
/// `clearing_price` must be positive; a zero price allocates nothing and
/// refunds everything.
#[must_use]
pub fn compute_clearing(
    auction_id: AuctionId,
    ledger: &BidLedger,
    clearing_price: Amount,
    total_inventory: Amount,
    trigger: EndTrigger,
) -> ClearingOutcome {
    let exhauster = trigger.exhauster();
    let mut remaining = total_inventory;
    let mut allocations = Vec::with_capacity(ledger.len());
    let mut exhauster_slot = None;

    for (account, entry) in ledger.iter() {
        if Some(account) == exhauster {
            exhauster_slot = Some((allocations.len(), entry.position));
            allocations.push(Allocation {
                account,
                tokens: 0,
                refund: entry.position,
            });
            continue;
        }
        let tokens = entry.implied_tokens(clearing_price).min(remaining);
        remaining -= tokens;
        allocations.push(Allocation {
            account,
            tokens,
            refund: entry.position - tokens * clearing_price,
        });
    }

    if let Some((idx, position)) = exhauster_slot {
        let tokens = position.checked_div(clearing_price).unwrap_or(0).min(remaining);
        remaining -= tokens;
        allocations[idx].tokens = tokens;
        allocations[idx].refund = position - tokens * clearing_price;
    }

    let tokens_sold = total_inventory - remaining;
    let settlement_root = compute_settlement_root(auction_id, clearing_price, trigger, &allocations);

    ClearingOutcome {
        clearing_price,
        trigger,
        total_inventory,
        tokens_sold,
        allocations,
        settlement_root,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acct(n: u128) -> AccountId {
        AccountId::from_u128(n)
    }

    fn ledger(bids: &[(u128, Amount)]) -> BidLedger {
        let mut ledger = BidLedger::new();
        for (who, amount) in bids {
            ledger.deposit(acct(*who), *amount).unwrap();
        }
        ledger
    }

    fn clear(bids: &[(u128, Amount)], price: Amount, inventory: Amount, trigger: EndTrigger) -> ClearingOutcome {
        let l = ledger(bids);
        let outcome = compute_clearing(AuctionId::new(), &l, price, inventory, trigger);
        outcome.check_conservation(l.total_position()).unwrap();
        outcome
    }

    #[test]
    fn single_bidder_at_reserve() {
        // 10_000 paid, cleared at reserve 5_000 → 2 units, nothing back
        let out = clear(&[(1, 10_000)], 5_000, 100, EndTrigger::Expired);
        assert_eq!(out.allocations[0].tokens, 2);
        assert_eq!(out.allocations[0].refund, 0);
        assert_eq!(out.tokens_sold, 2);
        assert_eq!(out.unsold(), 98);
        assert_eq!(out.revenue(), 10_000);
    }

    #[test]
    fn floor_remainder_is_refunded() {
        let out = clear(&[(1, 250), (2, 199)], 100, 10, EndTrigger::Expired);
        assert_eq!(out.allocation_of(acct(1)).unwrap().claim(), Claim { tokens: 2, refund: 50 });
        assert_eq!(out.allocation_of(acct(2)).unwrap().claim(), Claim { tokens: 1, refund: 99 });
    }

    #[test]
    fn exhausting_bidder_gets_the_remainder() {
        // others take 3 + 4 = 7 of 10; bidder 3 could afford 5 but gets 3
        let out = clear(
            &[(1, 300), (3, 500), (2, 400)],
            100,
            10,
            EndTrigger::BidExhausted(acct(3)),
        );
        let ex = out.allocation_of(acct(3)).unwrap();
        assert_eq!(ex.tokens, 3);
        assert_eq!(ex.refund, 200);
        assert_eq!(out.tokens_sold, 10);
        assert_eq!(out.unsold(), 0);
    }

    #[test]
    fn exhausting_bidder_keeps_first_bid_slot() {
        let out = clear(
            &[(1, 300), (3, 500), (2, 400)],
            100,
            10,
            EndTrigger::BidExhausted(acct(3)),
        );
        let order: Vec<_> = out.allocations.iter().map(|a| a.account).collect();
        assert_eq!(order, vec![acct(1), acct(3), acct(2)]);
    }

    #[test]
    fn decay_exhaustion_caps_in_first_bid_order() {
        // demand 6 + 6 = 12 over 10 units; the later bidder is cut to 4
        let out = clear(&[(1, 600), (2, 600)], 100, 10, EndTrigger::DemandExhausted);
        assert_eq!(out.allocation_of(acct(1)).unwrap().tokens, 6);
        assert_eq!(out.allocation_of(acct(2)).unwrap().tokens, 4);
        assert_eq!(out.allocation_of(acct(2)).unwrap().refund, 200);
        assert_eq!(out.tokens_sold, 10);
    }

    #[test]
    fn no_bids_sells_nothing() {
        let out = clear(&[], 50, 100, EndTrigger::Expired);
        assert!(out.allocations.is_empty());
        assert_eq!(out.tokens_sold, 0);
        assert_eq!(out.unsold(), 100);
        assert_eq!(out.revenue(), 0);
    }

    #[test]
    fn conservation_check_catches_tampering() {
        let l = ledger(&[(1, 250)]);
        let mut out = compute_clearing(AuctionId::new(), &l, 100, 10, EndTrigger::Expired);
        out.allocations[0].refund += 1;
        assert!(matches!(
            out.check_conservation(l.total_position()),
            Err(AuctionError::ConservationViolation { .. })
        ));
    }

    #[test]
    fn rounding_leaves_unfair_looking_but_exact_remainders() {
        // Three bidders, each one unit short of a second token.
        let out = clear(&[(1, 199), (2, 199), (3, 199)], 100, 3, EndTrigger::Expired);
        for a in &out.allocations {
            assert_eq!(a.claim(), Claim { tokens: 1, refund: 99 });
        }
        assert_eq!(out.revenue() + 3 * 99, 597);
    }
}
