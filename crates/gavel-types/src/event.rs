//! Auction event log types.
//!
//! Every committed operation appends one [`AuctionEvent`]. Failed
//! operations append nothing, so the log is an exact history of
//! state changes.

use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, EndTrigger, Timestamp};

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// The auction was constructed.
    Created { owner: AccountId },
    /// The owner started the auction and the inventory was pulled.
    Started {
        total_inventory: Amount,
        expires_at: Timestamp,
    },
    /// A payment was recorded. `late` bids arrived after the auction ended.
    BidPlaced {
        bidder: AccountId,
        amount: Amount,
        position: Amount,
        late: bool,
    },
    /// The clearing price and every allocation were fixed.
    Finalized {
        clearing_price: Amount,
        tokens_sold: Amount,
        trigger: EndTrigger,
        settlement_root: [u8; 32],
    },
    /// A participant withdrew their allocation and refund.
    TokensWithdrawn {
        account: AccountId,
        tokens: Amount,
        refund: Amount,
    },
    /// The owner pushed outstanding allocations to their holders.
    TokensDistributed { recipients: usize, tokens: Amount },
    /// The owner withdrew revenue; unsold inventory was destroyed.
    OwnerRevenueWithdrawn { revenue: Amount, destroyed: Amount },
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created { .. } => write!(f, "CREATED"),
            Self::Started { .. } => write!(f, "STARTED"),
            Self::BidPlaced { late: false, .. } => write!(f, "BID_PLACED"),
            Self::BidPlaced { late: true, .. } => write!(f, "LATE_BID_PLACED"),
            Self::Finalized { .. } => write!(f, "FINALIZED"),
            Self::TokensWithdrawn { .. } => write!(f, "TOKENS_WITHDRAWN"),
            Self::TokensDistributed { .. } => write!(f, "TOKENS_DISTRIBUTED"),
            Self::OwnerRevenueWithdrawn { .. } => write!(f, "OWNER_REVENUE_WITHDRAWN"),
        }
    }
}

/// One entry in an auction's append-only event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionEvent {
    /// Position in the log, starting at zero.
    pub sequence: u64,
    /// Host time of the operation that produced the event.
    pub at: Timestamp,
    pub kind: EventKind,
}
