//! Human-facing confirmation numbers
//!
//! Format: prefix, the last 8 digits of the millisecond timestamp, then a
//! 4-digit random suffix (`VR` + `73625190` + `0417`). Codes are short enough
//! to read over the phone but not unique by construction; the ledger stores a
//! code only if no other rental already carries it.

use chrono::{DateTime, Utc};
use rand::Rng;

#[derive(Debug, Clone)]
pub struct ConfirmationGenerator {
    prefix: String,
}

impl ConfirmationGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Generate a code for a booking made at `now`
    pub fn generate(&self, now: DateTime<Utc>) -> String {
        let stamp = now.timestamp_millis().rem_euclid(100_000_000);
        let suffix = rand::thread_rng().gen_range(0..10_000u32);
        format!("{}{:08}{:04}", self.prefix, stamp, suffix)
    }
}

impl Default for ConfirmationGenerator {
    fn default() -> Self {
        Self::new("VR")
    }
}
