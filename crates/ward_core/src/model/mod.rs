//! Ward registry domain model.
//!
//! # Responsibility
//! - Define households, their members and member service requests.
//! - Own the write-time validation rules shared by every storage backend.
//!
//! # Invariants
//! - Every record is identified by a stable `Uuid` generated at construction.
//! - A member references exactly one family; a request exactly one member.
//! - References are plain ids; no record holds another record.

pub mod family;
pub mod member;
pub mod request;
pub mod validation;

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in Unix epoch milliseconds.
///
/// Returns `0` if the system clock reports a time before the epoch.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
