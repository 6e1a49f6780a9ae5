//! The engine's view of the outside world.
//!
//! An [`Auction`] never reads a clock or moves value on its own. Every
//! operation receives a [`Host`] that provides:
//!
//! - one time read per operation,
//! - the inventory custodian,
//! - native currency movement in and out of the auction's account.
//!
//! `send_value` hands the auction back to the host because paying a
//! participant-controlled account may run that participant's code, and that
//! code may call straight back into the engine before `send_value` returns.
//! Every payout path therefore zeroes what it owes *before* calling it.

use gavel_types::{AccountId, Amount, InventoryCustodian, Result, Timestamp};

use crate::Auction;

/// Execution environment for auction operations.
pub trait Host {
    /// Current host time. Read once per operation.
    fn now(&self) -> Timestamp;

    /// Read access to the inventory ledger.
    fn inventory(&self) -> &dyn InventoryCustodian;

    /// Write access to the inventory ledger.
    fn inventory_mut(&mut self) -> &mut dyn InventoryCustodian;

    /// Collect `amount` of currency from `from` into `to` (the auction's
    /// account). Fails without side effects if `from` cannot pay.
    fn receive_value(&mut self, from: AccountId, to: AccountId, amount: Amount) -> Result<()>;

    /// Pay `amount` from the auction's account to `to`.
    ///
    /// The recipient may re-enter `auction` during this call. On failure the
    /// host must leave currency balances as they were.
    fn send_value(&mut self, auction: &mut Auction, to: AccountId, amount: Amount) -> Result<()>;
}
