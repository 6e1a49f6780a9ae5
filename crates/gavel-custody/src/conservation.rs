//! Custody conservation audit.
//!
//! Invariant checked against real ledger balances:
//! ```text
//! currency(auction account)  == auction.liabilities().currency
//! inventory(auction account) == auction.liabilities().inventory
//! Σ currency balances        == Σ currency issued
//! Σ inventory balances       == inventory total supply
//! ```
//!
//! The engine's own bookkeeping says what it owes; the ledgers say what it
//! holds. Any gap means value was created or lost.

use gavel_engine::Auction;
use gavel_types::{AuctionError, InventoryCustodian, Result};

use crate::LedgerHost;

/// Compare the auction account's balances against what the engine owes.
///
/// Runs no stage detection: call it after an operation has committed the
/// stage the auction is meant to be audited in.
///
/// # Errors
/// Returns [`AuctionError::ConservationViolation`] on any mismatch.
pub fn verify_custody(auction: &Auction, host: &LedgerHost) -> Result<()> {
    let owed = auction.liabilities();
    let currency = host.currency_balance(auction.account());
    let inventory = host.inventory_balance(auction.account());

    if currency != owed.currency {
        return Err(AuctionError::ConservationViolation {
            reason: format!(
                "{}: holds {currency} currency, owes {}",
                auction.id(),
                owed.currency
            ),
        });
    }
    if inventory != owed.inventory {
        return Err(AuctionError::ConservationViolation {
            reason: format!(
                "{}: holds {inventory} inventory, owes {}",
                auction.id(),
                owed.inventory
            ),
        });
    }
    verify_supply(host)
}

/// Ledger-wide supply checks, independent of any auction.
///
/// # Errors
/// Returns [`AuctionError::ConservationViolation`] if either ledger's
/// balances do not sum to its supply.
pub fn verify_supply(host: &LedgerHost) -> Result<()> {
    let treasury = host.treasury();
    if treasury.total_supply() != treasury.issued() {
        return Err(AuctionError::ConservationViolation {
            reason: format!(
                "currency: balances {} != issued {}",
                treasury.total_supply(),
                treasury.issued()
            ),
        });
    }
    let inventory = host.inventory_ledger();
    if inventory.circulating() != inventory.total_supply() {
        return Err(AuctionError::ConservationViolation {
            reason: format!(
                "{}: balances {} != supply {}",
                inventory.asset(),
                inventory.circulating(),
                inventory.total_supply()
            ),
        });
    }
    Ok(())
}
