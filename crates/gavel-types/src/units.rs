//! Amount and time units.
//!
//! Currency and inventory are both counted in indivisible integer units.
//! Every division in the engine is floor division on [`Amount`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unsigned quantity of currency or inventory.
pub type Amount = u128;

/// Host-provided time, in whole seconds since the UNIX epoch.
///
/// The engine reads one `Timestamp` per operation and never consults
/// the local wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Timestamp(pub u64);

impl Timestamp {
    #[must_use]
    pub fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    #[must_use]
    pub fn as_secs(self) -> u64 {
        self.0
    }

    /// `self + secs`, or `None` on overflow.
    #[must_use]
    pub fn checked_add_secs(self, secs: u64) -> Option<Self> {
        self.0.checked_add(secs).map(Self)
    }

    /// Seconds elapsed since `earlier`, clamped to zero.
    #[must_use]
    pub fn saturating_since(self, earlier: Self) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Calendar rendering, if the value fits chrono's range.
    #[must_use]
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        i64::try_from(self.0)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.to_rfc3339()),
            None => write!(f, "t+{}s", self.0),
        }
    }
}
