//! System-wide constants for the Gavel auction engine.

/// Default auction duration in seconds (20 minutes).
pub const DEFAULT_DURATION_SECS: u64 = 1200;

/// Longest accepted auction duration in seconds (one year).
pub const MAX_DURATION_SECS: u64 = 365 * 24 * 60 * 60;

/// Domain separator for the settlement digest.
pub const SETTLEMENT_ROOT_DOMAIN: &[u8] = b"gavel:settlement_root:v1:";
