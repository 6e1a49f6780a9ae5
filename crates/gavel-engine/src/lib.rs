//! # gavel-engine
//!
//! The **Gavel** descending-price auction engine.
//!
//! One [`Auction`] sells a fixed inventory of a fungible asset at a unit
//! price that falls linearly from a starting price to a reserve. Bidders pay
//! native currency into the auction; the auction ends when the decay window
//! closes or when implied demand covers the whole inventory, and everyone
//! pays the same clearing price.
//!
//! ## Lifecycle
//!
//! ```text
//! NOT_YET_STARTED ──start()──► STARTED ──(expiry | demand ≥ inventory)──► ENDED
//! ```
//!
//! The STARTED → ENDED edge is lazy: it is detected by whichever operation
//! first observes it, using that operation's single time read. See
//! [`StageGuard`].
//!
//! ## Modules
//!
//! - [`curve`]: the price schedule
//! - [`ledger`]: per-participant positions and claims
//! - [`stage`]: end-of-auction detection
//! - [`clearing`]: uniform-price allocation
//! - [`digest`]: SHA-256 settlement root
//! - [`auction`]: construct, start, reads, bidding
//! - [`settlement`]: withdrawals and distribution
//! - [`host`]: time and value-movement boundary

pub mod auction;
pub mod clearing;
pub mod curve;
pub mod digest;
pub mod host;
pub mod ledger;
pub mod settlement;
pub mod stage;

#[cfg(test)]
mod testing;

pub use auction::{Auction, AuctionSnapshot};
pub use clearing::{Allocation, ClearingOutcome, compute_clearing};
pub use curve::PriceCurve;
pub use digest::{compute_settlement_root, verify_settlement_root};
pub use host::Host;
pub use ledger::BidLedger;
pub use settlement::{Distribution, Liabilities, OwnerPayout};
pub use stage::StageGuard;
