use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Timestamp confirmed committed by a write
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WriteReceipt {
    pub written_at: DateTime<Utc>,
}

impl WriteReceipt {
    pub fn new(written_at: DateTime<Utc>) -> Self {
        Self { written_at }
    }
}

/// Wall-clock source for probe writes.
///
/// Timestamps are truncated to microseconds, the precision PostgreSQL keeps
/// for `timestamptz`, so a value read back compares equal to the one written.
/// Successive values from one clock never decrease even if the system clock
/// steps backwards.
#[derive(Debug, Default)]
pub struct ReceiptClock {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl ReceiptClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.observe(Utc::now())
    }

    /// Clamp an externally supplied wall-clock reading
    pub fn observe(&self, wall_clock: DateTime<Utc>) -> DateTime<Utc> {
        let truncated = truncate_to_micros(wall_clock);
        let mut last = self.last.lock();
        let next = match *last {
            Some(previous) if previous > truncated => previous,
            _ => truncated,
        };
        *last = Some(next);
        next
    }
}

pub fn truncate_to_micros(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.duration_trunc(TimeDelta::microseconds(1)).unwrap_or(ts)
}
