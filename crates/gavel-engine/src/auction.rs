//! The auction record and its bidding-side operations.
//!
//! All mutable state of one sale lives in [`Auction`], passed by `&mut` into
//! every operation. Each operation:
//!
//! 1. reads host time once,
//! 2. asks the stage guard whether the auction should already have ended
//!    and, if so, computes the clearing outcome *without* applying it,
//! 3. runs every check and every fallible external call,
//! 4. only then commits the pending finalization and its own effects.
//!
//! Payouts are the exception: they commit before sending so that a
//! re-entering recipient sees the zeroed claim. When the send fails they
//! roll the committed end back through a `Checkpoint`.
//!
//! A call that fails therefore leaves no trace, not even a detected end.

use gavel_types::{
    AccountId, Amount, AuctionError, AuctionEvent, AuctionId, AuctionParams, Claim, EndTrigger,
    EventKind, Result, Stage, Timestamp,
};
use serde::{Deserialize, Serialize};

use crate::{BidLedger, ClearingOutcome, Host, PriceCurve, StageGuard, compute_clearing};

/// One auction instance.
#[derive(Debug, Clone)]
pub struct Auction {
    pub(crate) id: AuctionId,
    /// The auction's own escrow account for currency and inventory.
    pub(crate) account: AccountId,
    pub(crate) owner: AccountId,
    pub(crate) params: AuctionParams,
    pub(crate) curve: PriceCurve,
    pub(crate) stage: Stage,
    pub(crate) start_at: Option<Timestamp>,
    pub(crate) total_inventory: Amount,
    pub(crate) ledger: BidLedger,
    pub(crate) outcome: Option<ClearingOutcome>,
    pub(crate) owner_revenue_withdrawn: bool,
    pub(crate) unsold_destroyed: bool,
    pub(crate) events: Vec<AuctionEvent>,
}

/// A detected-but-uncommitted view of the auction at one instant.
#[derive(Debug)]
pub(crate) struct Pending {
    pub(crate) now: Timestamp,
    pub(crate) outcome: Option<ClearingOutcome>,
}

/// What a committed finalization overwrote, so a payout whose transfer then
/// fails can put the auction back in STARTED.
#[derive(Debug)]
pub(crate) struct Checkpoint {
    ledger: BidLedger,
    events: usize,
}

/// Cheap read-only view for polling clients. Runs no stage detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionSnapshot {
    pub id: AuctionId,
    pub owner: AccountId,
    pub account: AccountId,
    pub params: AuctionParams,
    pub stage: Stage,
    pub start_at: Option<Timestamp>,
    pub expires_at: Option<Timestamp>,
    pub total_inventory: Amount,
    pub clearing_price: Option<Amount>,
    pub bidders: usize,
}

impl Auction {
    /// Create an auction in NOT_YET_STARTED.
    ///
    /// # Errors
    /// [`AuctionError::InvalidAuctionInput`] if `params` fail validation or
    /// the inventory asset has no units in circulation.
    pub fn new(host: &dyn Host, owner: AccountId, params: AuctionParams) -> Result<Self> {
        params.validate()?;
        if host.inventory().total_supply() == 0 {
            return Err(AuctionError::invalid_input(format!(
                "inventory asset {} has no supply",
                params.inventory_asset
            )));
        }

        let mut auction = Self {
            id: AuctionId::new(),
            account: AccountId::new(),
            owner,
            curve: PriceCurve::new(&params),
            params,
            stage: Stage::NotYetStarted,
            start_at: None,
            total_inventory: 0,
            ledger: BidLedger::new(),
            outcome: None,
            owner_revenue_withdrawn: false,
            unsold_destroyed: false,
            events: Vec::new(),
        };

        tracing::info!(
            auction = %auction.id,
            owner = %owner,
            starting_price = auction.params.starting_price,
            reserve_price = auction.params.reserve_price,
            duration_secs = auction.params.duration_secs,
            asset = %auction.params.inventory_asset,
            "Auction created"
        );
        auction.emit(host.now(), EventKind::Created { owner });
        Ok(auction)
    }

    /// Owner-only. Pull the pre-authorized inventory and start the clock.
    ///
    /// The inventory snapshot is `min(allowance, owner balance)` at this
    /// instant and never changes afterwards. Returns that snapshot.
    pub fn start(&mut self, host: &mut dyn Host, caller: AccountId) -> Result<Amount> {
        self.ensure_owner(caller)?;
        self.stage.require(&[Stage::NotYetStarted])?;
        let now = host.now();

        let allowance = host.inventory().allowance(self.owner, self.account);
        if allowance == 0 {
            return Err(AuctionError::invalid_input(
                "owner has not pre-authorized any inventory",
            ));
        }
        let total_inventory = allowance.min(host.inventory().balance_of(self.owner));
        if total_inventory == 0 {
            return Err(AuctionError::invalid_input("owner holds no inventory"));
        }
        let expires_at = self
            .curve
            .expires_at(now)
            .ok_or(AuctionError::ArithmeticOverflow)?;

        host.inventory_mut()
            .pull_transfer(self.account, self.owner, self.account, total_inventory)?;

        self.stage = Stage::Started;
        self.start_at = Some(now);
        self.total_inventory = total_inventory;

        tracing::info!(
            auction = %self.id,
            total_inventory,
            start_at = %now,
            expires_at = %expires_at,
            "Auction started"
        );
        self.emit(
            now,
            EventKind::Started {
                total_inventory,
                expires_at,
            },
        );
        Ok(total_inventory)
    }

    // ------------------------------------------------------------------
    // Reads (each may commit a detected end)
    // ------------------------------------------------------------------

    /// Current stage. Never fails.
    pub fn get_stage(&mut self, host: &dyn Host) -> Stage {
        let now = host.now();
        if let Some(outcome) = self.detect_end(now) {
            self.finalize(now, outcome);
        }
        self.stage
    }

    /// Curve price while STARTED, clearing price once ENDED.
    pub fn get_price(&mut self, host: &dyn Host) -> Result<Amount> {
        let now = self.enter(host, &[Stage::Started, Stage::Ended])?;
        match &self.outcome {
            Some(outcome) => Ok(outcome.clearing_price),
            None => Ok(self.curve.price_at(self.started_at()?, now)),
        }
    }

    /// Inventory not yet spoken for: `inventory − implied demand` while
    /// STARTED, the unsold remainder once ENDED.
    pub fn get_token_left(&mut self, host: &dyn Host) -> Result<Amount> {
        let now = self.enter(host, &[Stage::Started, Stage::Ended])?;
        match &self.outcome {
            Some(outcome) => Ok(outcome.unsold()),
            None => {
                let price = self.curve.price_at(self.started_at()?, now);
                Ok(self
                    .total_inventory
                    .saturating_sub(self.ledger.implied_demand(price)))
            }
        }
    }

    /// Cumulative payment of `account`.
    pub fn get_position(&mut self, host: &dyn Host, account: AccountId) -> Result<Amount> {
        self.enter(host, &[Stage::Started, Stage::Ended])?;
        Ok(self.ledger.position(account))
    }

    pub fn get_start_at(&mut self, host: &dyn Host) -> Result<Timestamp> {
        self.enter(host, &[Stage::Started, Stage::Ended])?;
        self.started_at()
    }

    pub fn get_expires_at(&mut self, host: &dyn Host) -> Result<Timestamp> {
        self.enter(host, &[Stage::Started, Stage::Ended])?;
        self.curve
            .expires_at(self.started_at()?)
            .ok_or(AuctionError::ArithmeticOverflow)
    }

    /// Unclaimed refund of `account`. ENDED only.
    pub fn get_refund(&mut self, host: &dyn Host, account: AccountId) -> Result<Amount> {
        self.enter(host, &[Stage::Ended])?;
        Ok(self.ledger.refund(account))
    }

    /// Unclaimed allocation of `account`. ENDED only.
    pub fn get_tokens(&mut self, host: &dyn Host, account: AccountId) -> Result<Amount> {
        self.enter(host, &[Stage::Ended])?;
        Ok(self.ledger.allocated_tokens(account))
    }

    /// Unclaimed owner revenue. ENDED only; zero after withdrawal.
    pub fn get_owner_revenue(&mut self, host: &dyn Host) -> Result<Amount> {
        self.enter(host, &[Stage::Ended])?;
        if self.owner_revenue_withdrawn {
            return Ok(0);
        }
        Ok(self.outcome.as_ref().map_or(0, ClearingOutcome::revenue))
    }

    // ------------------------------------------------------------------
    // Bidding
    // ------------------------------------------------------------------

    /// Pay `amount` into the auction on behalf of `bidder`. Returns the
    /// bidder's new position.
    ///
    /// While STARTED the payment must buy at least one unit at the current
    /// price. A bid that pushes implied demand onto the whole inventory ends
    /// the auction within this same call, at this call's price, with this
    /// bidder taking whatever inventory the others left. After the end,
    /// payments are still accepted but only ever come back as refund.
    pub fn place_bid(
        &mut self,
        host: &mut dyn Host,
        bidder: AccountId,
        amount: Amount,
    ) -> Result<Amount> {
        let pending = self.prepare(host.now(), &[Stage::Started, Stage::Ended])?;
        if amount == 0 {
            return Err(AuctionError::invalid_bid("amount must be positive"));
        }
        let now = pending.now;
        let new_position = self.ledger.projected_position(bidder, amount)?;

        if pending.outcome.is_some() || self.stage == Stage::Ended {
            host.receive_value(bidder, self.account, amount)?;
            self.commit(pending);
            self.ledger.deposit_late(bidder, amount)?;
            tracing::debug!(
                auction = %self.id,
                bidder = %bidder.short(),
                amount,
                position = new_position,
                "Late bid recorded as refund"
            );
            self.emit(
                now,
                EventKind::BidPlaced {
                    bidder,
                    amount,
                    position: new_position,
                    late: true,
                },
            );
            return Ok(new_position);
        }

        let start_at = self.started_at()?;
        let price = self.curve.price_at(start_at, now);
        if amount < price {
            return Err(AuctionError::invalid_bid(format!(
                "amount {amount} cannot buy one unit at price {price}"
            )));
        }
        let exhausts = StageGuard::new(&self.curve, start_at, self.total_inventory)
            .exhausted_by(&self.ledger, bidder, new_position, now);

        host.receive_value(bidder, self.account, amount)?;
        self.ledger.deposit(bidder, amount)?;

        tracing::debug!(
            auction = %self.id,
            bidder = %bidder.short(),
            amount,
            position = new_position,
            price,
            "Bid placed"
        );
        self.emit(
            now,
            EventKind::BidPlaced {
                bidder,
                amount,
                position: new_position,
                late: false,
            },
        );

        if exhausts {
            let outcome = compute_clearing(
                self.id,
                &self.ledger,
                price,
                self.total_inventory,
                EndTrigger::BidExhausted(bidder),
            );
            self.finalize(now, outcome);
        }
        Ok(new_position)
    }

    // ------------------------------------------------------------------
    // Accessors (no stage detection)
    // ------------------------------------------------------------------

    #[must_use]
    pub fn id(&self) -> AuctionId {
        self.id
    }

    /// The auction's escrow account. Owners approve inventory to it.
    #[must_use]
    pub fn account(&self) -> AccountId {
        self.account
    }

    #[must_use]
    pub fn owner(&self) -> AccountId {
        self.owner
    }

    #[must_use]
    pub fn params(&self) -> &AuctionParams {
        &self.params
    }

    #[must_use]
    pub fn curve(&self) -> &PriceCurve {
        &self.curve
    }

    #[must_use]
    pub fn total_inventory(&self) -> Amount {
        self.total_inventory
    }

    #[must_use]
    pub fn ledger(&self) -> &BidLedger {
        &self.ledger
    }

    /// The clearing outcome, once committed.
    #[must_use]
    pub fn outcome(&self) -> Option<&ClearingOutcome> {
        self.outcome.as_ref()
    }

    /// Append-only history of committed operations.
    #[must_use]
    pub fn events(&self) -> &[AuctionEvent] {
        &self.events
    }

    #[must_use]
    pub fn snapshot(&self) -> AuctionSnapshot {
        AuctionSnapshot {
            id: self.id,
            owner: self.owner,
            account: self.account,
            params: self.params.clone(),
            stage: self.stage,
            start_at: self.start_at,
            expires_at: self.start_at.and_then(|t| self.curve.expires_at(t)),
            total_inventory: self.total_inventory,
            clearing_price: self.outcome.as_ref().map(|o| o.clearing_price),
            bidders: self.ledger.len(),
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    pub(crate) fn ensure_owner(&self, caller: AccountId) -> Result<()> {
        if caller == self.owner {
            Ok(())
        } else {
            Err(AuctionError::OnlyOwnerCanCallFunction)
        }
    }

    pub(crate) fn started_at(&self) -> Result<Timestamp> {
        self.start_at
            .ok_or(AuctionError::FunctionInvalidAtThisStage { stage: self.stage })
    }

    /// Clearing outcome the auction would commit at `now`, if it should end.
    fn detect_end(&self, now: Timestamp) -> Option<ClearingOutcome> {
        if self.stage != Stage::Started {
            return None;
        }
        let start_at = self.start_at?;
        let trigger = StageGuard::new(&self.curve, start_at, self.total_inventory)
            .detect(&self.ledger, now)?;
        let price = self.curve.price_at(start_at, now);
        Some(compute_clearing(
            self.id,
            &self.ledger,
            price,
            self.total_inventory,
            trigger,
        ))
    }

    /// Detect without committing, then guard the stage the caller would see.
    pub(crate) fn prepare(&self, now: Timestamp, allowed: &[Stage]) -> Result<Pending> {
        let outcome = self.detect_end(now);
        let effective = if outcome.is_some() {
            Stage::Ended
        } else {
            self.stage
        };
        effective.require(allowed)?;
        Ok(Pending { now, outcome })
    }

    /// Apply a pending finalization. Returns the state it replaced, if any.
    pub(crate) fn commit(&mut self, pending: Pending) -> Option<Checkpoint> {
        let outcome = pending.outcome?;
        let checkpoint = Checkpoint {
            ledger: self.ledger.clone(),
            events: self.events.len(),
        };
        self.finalize(pending.now, outcome);
        Some(checkpoint)
    }

    /// Undo a finalization committed by the current call.
    pub(crate) fn rollback(&mut self, checkpoint: Checkpoint) {
        tracing::debug!(auction = %self.id, "Finalization rolled back");
        self.ledger = checkpoint.ledger;
        self.events.truncate(checkpoint.events);
        self.outcome = None;
        self.stage = Stage::Started;
    }

    /// `prepare` + `commit` for operations with no further checks.
    fn enter(&mut self, host: &dyn Host, allowed: &[Stage]) -> Result<Timestamp> {
        let pending = self.prepare(host.now(), allowed)?;
        let now = pending.now;
        self.commit(pending);
        Ok(now)
    }

    fn finalize(&mut self, now: Timestamp, outcome: ClearingOutcome) {
        for allocation in &outcome.allocations {
            self.ledger
                .set_claim(allocation.account, allocation.tokens, allocation.refund);
        }
        debug_assert!(
            outcome
                .check_conservation(self.ledger.total_position())
                .is_ok(),
            "clearing outcome does not conserve value"
        );
        self.stage = Stage::Ended;

        tracing::info!(
            auction = %self.id,
            trigger = %outcome.trigger,
            clearing_price = outcome.clearing_price,
            tokens_sold = outcome.tokens_sold,
            unsold = outcome.unsold(),
            bidders = outcome.allocations.len(),
            settlement_root = hex::encode(outcome.settlement_root),
            "Auction finalized"
        );
        self.emit(
            now,
            EventKind::Finalized {
                clearing_price: outcome.clearing_price,
                tokens_sold: outcome.tokens_sold,
                trigger: outcome.trigger,
                settlement_root: outcome.settlement_root,
            },
        );
        self.outcome = Some(outcome);
    }

    /// What `account` could withdraw once `pending` is committed.
    pub(crate) fn claim_after(&self, pending: &Pending, account: AccountId) -> Claim {
        match &pending.outcome {
            Some(outcome) => outcome
                .allocation_of(account)
                .map(crate::Allocation::claim)
                .unwrap_or_default(),
            None => self.ledger.claim_of(account),
        }
    }

    pub(crate) fn emit(&mut self, at: Timestamp, kind: EventKind) {
        let sequence = self.events.len() as u64;
        self.events.push(AuctionEvent { sequence, at, kind });
    }
}
