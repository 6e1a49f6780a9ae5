//! Settlement digest.
//!
//! A SHA-256 commitment over everything finalization decided. Any replica
//! replaying the same bids at the same host times must arrive at the same
//! `settlement_root`.

use gavel_types::{Amount, AuctionId, EndTrigger, constants};
use sha2::{Digest, Sha256};

use crate::Allocation;

/// Compute the settlement root.
///
/// Depends on, in order: the auction id, the clearing price, the end
/// trigger (tag and exhauster), and every allocation (account, tokens,
/// refund) in first-bid order.
#[must_use]
pub fn compute_settlement_root(
    auction_id: AuctionId,
    clearing_price: Amount,
    trigger: EndTrigger,
    allocations: &[Allocation],
) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(constants::SETTLEMENT_ROOT_DOMAIN);
    hasher.update(auction_id.0.as_bytes());
    hasher.update(clearing_price.to_le_bytes());
    hasher.update([trigger.tag()]);
    if let Some(exhauster) = trigger.exhauster() {
        hasher.update(exhauster.as_bytes());
    }
    hasher.update((allocations.len() as u64).to_le_bytes());

    for allocation in allocations {
        hasher.update(allocation.account.as_bytes());
        hasher.update(allocation.tokens.to_le_bytes());
        hasher.update(allocation.refund.to_le_bytes());
    }

    hasher.finalize().into()
}

/// Recompute the root and compare.
#[must_use]
pub fn verify_settlement_root(
    auction_id: AuctionId,
    clearing_price: Amount,
    trigger: EndTrigger,
    allocations: &[Allocation],
    expected_root: &[u8; 32],
) -> bool {
    compute_settlement_root(auction_id, clearing_price, trigger, allocations) == *expected_root
}
