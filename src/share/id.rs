use crate::share::types::SecretIdentifier;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

pub const SECRET_ID_PREFIX: &str = "secret-";

/// Issues `secret-<nanos>` identifiers.
///
/// The numeric suffix is the wall clock in nanoseconds, bumped past the last
/// issued value when the clock is coarse or steps backwards, so values from
/// one generator are strictly increasing. Keep a single generator per process.
#[derive(Debug)]
pub struct SecretIdGenerator {
    last: AtomicU64,
    clock: fn() -> u64,
}

impl SecretIdGenerator {
    pub fn new() -> Self {
        Self::with_clock(unix_nanos)
    }

    /// Generator reading time from `clock` instead of the system clock.
    pub fn with_clock(clock: fn() -> u64) -> Self {
        Self {
            last: AtomicU64::new(0),
            clock,
        }
    }

    pub fn generate(&self) -> SecretIdentifier {
        let now = (self.clock)();
        let advance = |last: u64| now.max(last.saturating_add(1));
        let previous = match self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(advance(last)))
        {
            Ok(previous) | Err(previous) => previous,
        };
        SecretIdentifier::new(format!("{}{}", SECRET_ID_PREFIX, advance(previous)))
    }
}

impl Default for SecretIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn unix_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// True when `value` can be used as one segment of a store path.
#[cfg(test)]
pub(crate) fn is_path_segment(value: &str) -> bool {
    !value.is_empty()
        && value != "."
        && value != ".."
        && !value.chars().any(|c| c == '/' || c == '\\' || c.is_control())
}
