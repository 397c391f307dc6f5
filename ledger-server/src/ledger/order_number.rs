//! Order number generation
//!
//! Format: `ORD-<yyyymmddHHMMSS>-<seq>` where `<seq>` is a six character
//! base-36 counter. The counter is process-wide and strictly increasing, so
//! two numbers issued in the same second never collide; its random seed keeps
//! restarts from replaying earlier sequences.

use chrono::{DateTime, Utc};
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of order numbers for purchases created without one
pub trait OrderNumberGenerator: Send + Sync {
    fn next_order_number(&self, at: DateTime<Utc>) -> String;
}

const SEQ_WIDTH: u32 = 6;
/// 36^6, the counter wraps at this value
const SEQ_MODULUS: u64 = 2_176_782_336;
const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Timestamp prefix plus a monotonic base-36 counter
#[derive(Debug)]
pub struct SequentialOrderNumbers {
    seq: AtomicU64,
}

impl SequentialOrderNumbers {
    /// Counter seeded at a random point in the lower half of its range
    pub fn new() -> Self {
        let seed = rand::thread_rng().gen_range(0..SEQ_MODULUS / 2);
        Self::starting_at(seed)
    }

    pub fn starting_at(seed: u64) -> Self {
        Self {
            seq: AtomicU64::new(seed % SEQ_MODULUS),
        }
    }
}

impl Default for SequentialOrderNumbers {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderNumberGenerator for SequentialOrderNumbers {
    fn next_order_number(&self, at: DateTime<Utc>) -> String {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed) % SEQ_MODULUS;
        format!("ORD-{}-{}", at.format("%Y%m%d%H%M%S"), to_base36(seq))
    }
}

/// Zero-padded, fixed-width base-36
fn to_base36(mut value: u64) -> String {
    let mut buf = [b'0'; SEQ_WIDTH as usize];
    for slot in buf.iter_mut().rev() {
        *slot = ALPHABET[(value % 36) as usize];
        value /= 36;
    }
    buf.iter().map(|&b| b as char).collect()
}
