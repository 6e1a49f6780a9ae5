//! Post-end payouts.
//!
//! Participants pull their own tokens and refund; the owner pulls revenue
//! (destroying unsold inventory in the same call) and may push outstanding
//! token allocations to every participant at once. Every path zeroes the
//! claim before value leaves the auction account and restores it if the
//! transfer fails.

use gavel_types::{AccountId, Amount, AuctionError, Claim, EventKind, Result, Stage};
use serde::{Deserialize, Serialize};

use crate::auction::Checkpoint;
use crate::{Auction, Host};

/// What the owner received from [`Auction::withdraw_owner_revenue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerPayout {
    pub revenue: Amount,
    /// Unsold units destroyed by this call.
    pub destroyed: Amount,
}

/// Result of [`Auction::distribute_tokens`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    pub recipients: usize,
    pub tokens: Amount,
}

/// What the auction account still owes, by asset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Liabilities {
    /// Currency: unclaimed refunds plus unwithdrawn owner revenue, or every
    /// position while the auction runs.
    pub currency: Amount,
    /// Inventory: unclaimed allocations plus not-yet-destroyed unsold units,
    /// or the whole snapshot while the auction runs.
    pub inventory: Amount,
}

impl Auction {
    /// Pay `caller` its refund and allocated tokens. ENDED only.
    ///
    /// # Errors
    /// [`AuctionError::InvalidWithdrawer`] if nothing is owed to `caller`.
    /// A failed refund transfer restores the whole claim, along with the
    /// end if this call detected it. A failed token transfer after the
    /// refund went out restores only the allocation.
    pub fn withdraw_tokens(&mut self, host: &mut dyn Host, caller: AccountId) -> Result<Claim> {
        let pending = self.prepare(host.now(), &[Stage::Ended])?;
        let now = pending.now;
        let claim = self.claim_after(&pending, caller);
        if claim.is_empty() {
            return Err(AuctionError::InvalidWithdrawer);
        }
        self.ensure_inventory(host, claim.tokens)?;

        let checkpoint = self.commit(pending);
        let claim = self.ledger.take_claim(caller);

        if claim.refund > 0 {
            if let Err(err) = host.send_value(self, caller, claim.refund) {
                tracing::warn!(
                    auction = %self.id,
                    account = %caller,
                    refund = claim.refund,
                    error = %err,
                    "Refund transfer failed, claim restored"
                );
                self.reopen(checkpoint, caller, claim);
                return Err(err);
            }
        }

        if claim.tokens > 0 {
            if let Err(err) = host
                .inventory_mut()
                .transfer(self.account, caller, claim.tokens)
            {
                tracing::warn!(
                    auction = %self.id,
                    account = %caller,
                    tokens = claim.tokens,
                    error = %err,
                    "Token transfer failed, allocation restored"
                );
                if claim.refund == 0 {
                    self.reopen(checkpoint, caller, claim);
                } else {
                    self.ledger.restore_claim(
                        caller,
                        Claim {
                            tokens: claim.tokens,
                            refund: 0,
                        },
                    );
                }
                return Err(err);
            }
        }

        tracing::debug!(
            auction = %self.id,
            account = %caller,
            tokens = claim.tokens,
            refund = claim.refund,
            "Participant withdrew"
        );
        self.emit(
            now,
            EventKind::TokensWithdrawn {
                account: caller,
                tokens: claim.tokens,
                refund: claim.refund,
            },
        );
        Ok(claim)
    }

    /// Owner-only. Pay out revenue, then destroy unsold inventory. ENDED only.
    ///
    /// Succeeds once. Every later call fails with
    /// [`AuctionError::InvalidWithdrawer`] rather than paying zero.
    ///
    /// # Errors
    /// If the revenue transfer fails nothing is destroyed and nothing is
    /// committed, so the call can be retried.
    pub fn withdraw_owner_revenue(
        &mut self,
        host: &mut dyn Host,
        caller: AccountId,
    ) -> Result<OwnerPayout> {
        self.ensure_owner(caller)?;
        let pending = self.prepare(host.now(), &[Stage::Ended])?;
        if self.owner_revenue_withdrawn {
            return Err(AuctionError::InvalidWithdrawer);
        }
        let now = pending.now;
        let (revenue, unsold) = match (&pending.outcome, &self.outcome) {
            (Some(o), _) | (None, Some(o)) => (o.revenue(), o.unsold()),
            (None, None) => {
                return Err(AuctionError::Internal("ended without outcome".into()));
            }
        };
        let to_destroy = if self.unsold_destroyed { 0 } else { unsold };
        self.ensure_inventory(host, to_destroy)?;

        let checkpoint = self.commit(pending);
        self.owner_revenue_withdrawn = true;

        if revenue > 0 {
            if let Err(err) = host.send_value(self, caller, revenue) {
                tracing::warn!(
                    auction = %self.id,
                    revenue,
                    error = %err,
                    "Revenue transfer failed, withdrawal reopened"
                );
                self.owner_revenue_withdrawn = false;
                if let Some(checkpoint) = checkpoint {
                    self.rollback(checkpoint);
                }
                return Err(err);
            }
        }

        if to_destroy > 0 {
            // Prechecked above; only a misbehaving custodian gets here.
            if let Err(err) = host.inventory_mut().destroy(self.account, to_destroy) {
                tracing::error!(
                    auction = %self.id,
                    unsold = to_destroy,
                    error = %err,
                    "Destroying unsold inventory failed after revenue was paid"
                );
                return Err(err);
            }
        }
        self.unsold_destroyed = true;

        tracing::info!(
            auction = %self.id,
            owner = %caller,
            revenue,
            destroyed = to_destroy,
            "Owner withdrew revenue"
        );
        self.emit(
            now,
            EventKind::OwnerRevenueWithdrawn {
                revenue,
                destroyed: to_destroy,
            },
        );
        Ok(OwnerPayout {
            revenue,
            destroyed: to_destroy,
        })
    }

    /// Owner-only. Push every outstanding token allocation to its holder.
    /// Refunds stay pull-only. ENDED only.
    ///
    /// # Errors
    /// [`AuctionError::InvalidWithdrawer`] if no allocation is outstanding.
    /// A failed transfer restores that allocation and stops; recipients
    /// already paid stay paid.
    pub fn distribute_tokens(
        &mut self,
        host: &mut dyn Host,
        caller: AccountId,
    ) -> Result<Distribution> {
        self.ensure_owner(caller)?;
        let pending = self.prepare(host.now(), &[Stage::Ended])?;
        let now = pending.now;

        let due: Vec<(AccountId, Amount)> = match &pending.outcome {
            Some(outcome) => outcome
                .allocations
                .iter()
                .map(|a| (a.account, a.tokens))
                .collect(),
            None => self
                .ledger
                .iter()
                .map(|(account, entry)| (account, entry.allocated_tokens))
                .collect(),
        };
        let due: Vec<(AccountId, Amount)> = due.into_iter().filter(|(_, t)| *t > 0).collect();
        if due.is_empty() {
            return Err(AuctionError::InvalidWithdrawer);
        }
        let total = due.iter().fold(0, |acc: Amount, (_, t)| acc.saturating_add(*t));
        self.ensure_inventory(host, total)?;

        let mut checkpoint = self.commit(pending);

        let mut sent: Amount = 0;
        let mut recipients = 0;
        for (account, _) in due {
            let tokens = self.ledger.take_tokens(account);
            if tokens == 0 {
                continue;
            }
            if let Err(err) = host.inventory_mut().transfer(self.account, account, tokens) {
                tracing::warn!(
                    auction = %self.id,
                    account = %account,
                    tokens,
                    error = %err,
                    "Distribution transfer failed, allocation restored"
                );
                self.reopen(checkpoint, account, Claim { tokens, refund: 0 });
                return Err(err);
            }
            // Value has left the account; the end can no longer be undone.
            checkpoint = None;
            sent += tokens;
            recipients += 1;
        }

        tracing::info!(auction = %self.id, recipients, tokens = sent, "Tokens distributed");
        self.emit(
            now,
            EventKind::TokensDistributed {
                recipients,
                tokens: sent,
            },
        );
        Ok(Distribution {
            recipients,
            tokens: sent,
        })
    }

    /// Outstanding obligations of the auction account. Runs no stage
    /// detection; use after an operation has brought the stage up to date.
    #[must_use]
    pub fn liabilities(&self) -> Liabilities {
        match (self.stage, &self.outcome) {
            (Stage::NotYetStarted, _) => Liabilities::default(),
            (Stage::Ended, Some(outcome)) => {
                let owed = self.ledger.outstanding();
                let revenue = if self.owner_revenue_withdrawn {
                    0
                } else {
                    outcome.revenue()
                };
                let unsold = if self.unsold_destroyed {
                    0
                } else {
                    outcome.unsold()
                };
                Liabilities {
                    currency: owed.refund.saturating_add(revenue),
                    inventory: owed.tokens.saturating_add(unsold),
                }
            }
            _ => Liabilities {
                currency: self.ledger.total_position(),
                inventory: self.total_inventory,
            },
        }
    }

    /// Put back a claim taken by a payout that moved nothing. An end this
    /// call committed is undone whole, which also restores the claim.
    fn reopen(&mut self, checkpoint: Option<Checkpoint>, account: AccountId, claim: Claim) {
        match checkpoint {
            Some(checkpoint) => self.rollback(checkpoint),
            None => self.ledger.restore_claim(account, claim),
        }
    }

    fn ensure_inventory(&self, host: &dyn Host, needed: Amount) -> Result<()> {
        if needed == 0 {
            return Ok(());
        }
        let available = host.inventory().balance_of(self.account);
        if available < needed {
            return Err(AuctionError::InsufficientFunds { needed, available });
        }
        Ok(())
    }
}
