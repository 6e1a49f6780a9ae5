//! # gavel-types
//!
//! Shared types, errors, and configuration for the **Gavel** auction engine.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`AccountId`], [`AuctionId`]
//! - **Units**: [`Amount`], [`Timestamp`]
//! - **Lifecycle**: [`Stage`], [`EndTrigger`]
//! - **Bid model**: [`BidEntry`], [`Claim`]
//! - **Events**: [`AuctionEvent`], [`EventKind`]
//! - **Configuration**: [`AuctionParams`]
//! - **Collaborators**: [`InventoryCustodian`]
//! - **Errors**: [`AuctionError`] with `GV_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod bid;
pub mod config;
pub mod constants;
pub mod custody;
pub mod error;
pub mod event;
pub mod ids;
pub mod stage;
pub mod units;

// Re-export all primary types at crate root for ergonomic imports:
//   use gavel_types::{AccountId, AuctionParams, Stage, ...};

pub use bid::*;
pub use config::*;
pub use custody::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use stage::*;
pub use units::*;

// Constants are accessed via `gavel_types::constants::FOO`
// (not re-exported to avoid name collisions).
