//! # gavel-custody
//!
//! In-memory collaborators for the Gavel auction engine.
//!
//! The engine never holds value itself. This crate supplies the ledgers it
//! talks to and a [`LedgerHost`] wiring them together:
//!
//! - [`InventoryLedger`]: the fungible asset being sold (balances,
//!   allowances, pull-transfer, burn)
//! - [`Treasury`]: native currency bidders pay with
//! - [`LedgerHost`]: a [`gavel_engine::Host`] with a controllable clock and
//!   per-account [`Recipient`] hooks that may re-enter the auction
//! - [`verify_custody`]: balances vs. what the engine says it owes

pub mod conservation;
pub mod host;
pub mod inventory;
pub mod treasury;

pub use conservation::{verify_custody, verify_supply};
pub use host::{LedgerHost, Recipient};
pub use inventory::InventoryLedger;
pub use treasury::Treasury;
