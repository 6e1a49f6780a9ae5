//! Linearly decaying unit price.
//!
//! ```text
//! price(t) = max(reserve, starting − rate · (t − start_at))
//! rate     = (starting − reserve) / duration          (floor)
//! price(t) = reserve                                  for t ≥ start_at + duration
//! ```
//!
//! The curve is a pure function of time. Whether the auction *should* have
//! ended already is the stage guard's business, not the curve's.

use gavel_types::{Amount, AuctionParams, Timestamp};
use serde::{Deserialize, Serialize};

/// Price schedule derived from [`AuctionParams`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceCurve {
    starting_price: Amount,
    reserve_price: Amount,
    duration_secs: u64,
    rate: Amount,
}

impl PriceCurve {
    #[must_use]
    pub fn new(params: &AuctionParams) -> Self {
        Self {
            starting_price: params.starting_price,
            reserve_price: params.reserve_price,
            duration_secs: params.duration_secs,
            rate: params.decay_rate(),
        }
    }

    /// Unit price at `now` for an auction that started at `start_at`.
    #[must_use]
    pub fn price_at(&self, start_at: Timestamp, now: Timestamp) -> Amount {
        let elapsed = now.saturating_since(start_at);
        if elapsed >= self.duration_secs {
            return self.reserve_price;
        }
        let decayed = self.rate.saturating_mul(Amount::from(elapsed));
        self.starting_price
            .saturating_sub(decayed)
            .max(self.reserve_price)
    }

    /// Whether the decay window is over at `now`.
    #[must_use]
    pub fn has_expired(&self, start_at: Timestamp, now: Timestamp) -> bool {
        now.saturating_since(start_at) >= self.duration_secs
    }

    /// `start_at + duration`, or `None` on overflow.
    #[must_use]
    pub fn expires_at(&self, start_at: Timestamp) -> Option<Timestamp> {
        start_at.checked_add_secs(self.duration_secs)
    }

    #[must_use]
    pub fn starting_price(&self) -> Amount {
        self.starting_price
    }

    #[must_use]
    pub fn reserve_price(&self) -> Amount {
        self.reserve_price
    }

    /// Per-second decrement.
    #[must_use]
    pub fn rate(&self) -> Amount {
        self.rate
    }
}
