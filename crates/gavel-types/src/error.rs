//! Error types for the Gavel auction engine.
//!
//! All errors use the `GV_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Input / authorization errors
//! - 2xx: Stage errors
//! - 3xx: Bidding errors
//! - 4xx: Settlement / custody errors
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::{Amount, Stage};

/// Central error enum for all Gavel operations.
///
/// Every failing operation leaves the auction exactly as it found it.
#[derive(Debug, Error)]
pub enum AuctionError {
    // =================================================================
    // Input / Authorization Errors (1xx)
    // =================================================================
    /// Bad constructor or start parameters.
    #[error("GV_ERR_100: Invalid auction input: {reason}")]
    InvalidAuctionInput { reason: String },

    /// The caller is not the auction owner.
    #[error("GV_ERR_101: Only the auction owner can call this function")]
    OnlyOwnerCanCallFunction,

    // =================================================================
    // Stage Errors (2xx)
    // =================================================================
    /// The operation is not legal in the auction's current stage.
    #[error("GV_ERR_200: Function invalid at stage {stage}")]
    FunctionInvalidAtThisStage { stage: Stage },

    // =================================================================
    // Bidding Errors (3xx)
    // =================================================================
    /// The payment is zero or cannot buy a single unit at the current price.
    #[error("GV_ERR_300: Invalid bid value: {reason}")]
    InvalidBidValue { reason: String },

    // =================================================================
    // Settlement / Custody Errors (4xx)
    // =================================================================
    /// Nothing left to claim for this caller.
    #[error("GV_ERR_400: Invalid withdrawer: nothing to claim")]
    InvalidWithdrawer,

    /// A native currency transfer failed (insufficient funds, recipient rejection).
    #[error("GV_ERR_401: Currency transfer failed: {reason}")]
    TransferFailed { reason: String },

    /// The inventory custodian refused an operation.
    #[error("GV_ERR_402: Custodian rejected operation: {reason}")]
    CustodyRejected { reason: String },

    /// Engine bookkeeping and custody holdings disagree.
    #[error("GV_ERR_403: Conservation violation: {reason}")]
    ConservationViolation { reason: String },

    /// Not enough inventory or currency to cover a movement.
    #[error("GV_ERR_404: Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Amount, available: Amount },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// An amount or timestamp computation overflowed.
    #[error("GV_ERR_900: Arithmetic overflow")]
    ArithmeticOverflow,

    /// Unrecoverable internal error.
    #[error("GV_ERR_901: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("GV_ERR_902: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("GV_ERR_903: Configuration error: {0}")]
    Configuration(String),

    /// I/O error.
    #[error("GV_ERR_904: I/O error: {0}")]
    Io(String),
}

impl AuctionError {
    /// Shorthand for [`AuctionError::InvalidAuctionInput`].
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidAuctionInput {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`AuctionError::InvalidBidValue`].
    pub fn invalid_bid(reason: impl Into<String>) -> Self {
        Self::InvalidBidValue {
            reason: reason.into(),
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, AuctionError>;

impl From<std::io::Error> for AuctionError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AuctionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
