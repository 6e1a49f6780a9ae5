//! Auction lifecycle types.
//!
//! An auction moves through three stages, never backwards:
//! **NOT_YET_STARTED → STARTED → ENDED**
//!
//! During NOT_YET_STARTED only the owner's `start` is legal.
//! During STARTED bids accumulate while the price decays.
//! ENDED is terminal: the clearing price is fixed and participants withdraw.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{AccountId, AuctionError, Result};

/// The three stages of an auction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    /// Created, inventory not yet pulled.
    NotYetStarted,
    /// Price is decaying and bids are competing for inventory.
    Started,
    /// Clearing price fixed; only withdrawals and late bids remain.
    Ended,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotYetStarted => write!(f, "NOT_YET_STARTED"),
            Self::Started => write!(f, "STARTED"),
            Self::Ended => write!(f, "ENDED"),
        }
    }
}

impl Stage {
    /// Guard an operation. Returns `Ok(())` if `self` is one of `allowed`,
    /// or [`AuctionError::FunctionInvalidAtThisStage`] otherwise.
    pub fn require(self, allowed: &[Stage]) -> Result<()> {
        if allowed.contains(&self) {
            Ok(())
        } else {
            Err(AuctionError::FunctionInvalidAtThisStage { stage: self })
        }
    }
}

/// Why an auction left the STARTED stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndTrigger {
    /// Host time reached `start_at + duration`.
    Expired,
    /// Price decay alone pushed implied demand onto the whole inventory.
    DemandExhausted,
    /// This participant's bid pushed implied demand onto the whole inventory.
    BidExhausted(AccountId),
}

impl EndTrigger {
    /// The participant whose bid ended the auction, if any.
    #[must_use]
    pub fn exhauster(&self) -> Option<AccountId> {
        match self {
            Self::BidExhausted(account) => Some(*account),
            Self::Expired | Self::DemandExhausted => None,
        }
    }

    /// Stable tag used in digests and logs.
    #[must_use]
    pub fn tag(&self) -> u8 {
        match self {
            Self::Expired => 0,
            Self::DemandExhausted => 1,
            Self::BidExhausted(_) => 2,
        }
    }
}

impl fmt::Display for EndTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expired => write!(f, "EXPIRED"),
            Self::DemandExhausted => write!(f, "DEMAND_EXHAUSTED"),
            Self::BidExhausted(account) => write!(f, "BID_EXHAUSTED({account})"),
        }
    }
}
