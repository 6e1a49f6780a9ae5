//! The inventory custodian collaborator.
//!
//! The engine never holds inventory itself. A custodian ledger keeps the
//! balances and the engine asks it to move or destroy units on its behalf.

use crate::{AccountId, Amount, Result};

/// A ledger holding the fungible asset being auctioned.
///
/// Implementations must be all-or-nothing: a failing call changes nothing.
pub trait InventoryCustodian {
    /// Total units in circulation.
    fn total_supply(&self) -> Amount;

    /// Units held by `holder`.
    fn balance_of(&self, holder: AccountId) -> Amount;

    /// Units `owner` has pre-authorized `spender` to pull.
    fn allowance(&self, owner: AccountId, spender: AccountId) -> Amount;

    /// Move `amount` from `from` to `to` on `spender`'s authority,
    /// consuming allowance. Fails if `amount` exceeds allowance or balance.
    fn pull_transfer(
        &mut self,
        spender: AccountId,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<()>;

    /// Move `amount` out of `from`'s own balance.
    fn transfer(&mut self, from: AccountId, to: AccountId, amount: Amount) -> Result<()>;

    /// Burn `amount` held by `holder`, reducing total supply.
    fn destroy(&mut self, holder: AccountId, amount: Amount) -> Result<()>;
}
