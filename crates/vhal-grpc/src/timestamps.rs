//! Last-seen timestamp table
//!
//! The remote server stamps values with its own clock and may deliver the
//! same update twice, or an older update after a newer one, across the
//! get-result path and the push stream. Every value from either path is
//! admitted through this table before it is surfaced, which keeps the
//! observable external timestamps of each `(prop, area)` monotonic and
//! restamps accepted values with local monotonic time.

use std::collections::HashMap;

use parking_lot::Mutex;
use vhal_core::{PropIdAreaId, TimestampRecord, VehiclePropValue};

use crate::clock;

/// Outcome of admitting one value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The value is current; carries the local timestamp it was restamped with
    Accepted(i64),
    /// A newer update for the same key was already admitted
    Stale,
}

impl Admission {
    pub fn is_accepted(self) -> bool {
        matches!(self, Admission::Accepted(_))
    }
}

/// Table of the latest admitted timestamps per property area
pub struct TimestampTable {
    records: Mutex<HashMap<PropIdAreaId, TimestampRecord>>,
    clock: fn() -> i64,
}

impl Default for TimestampTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TimestampTable {
    pub fn new() -> Self {
        Self::with_clock(clock::elapsed_realtime_nanos)
    }

    /// Create a table reading local time from `clock`
    pub fn with_clock(clock: fn() -> i64) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Admit `(key, external_timestamp)`.
    ///
    /// Check and update happen in one critical section.
    pub fn admit_timestamp(&self, key: PropIdAreaId, external_timestamp: i64) -> Admission {
        let now = (self.clock)();
        let mut records = self.records.lock();

        match records.get_mut(&key) {
            None => {
                records.insert(
                    key,
                    TimestampRecord {
                        external_timestamp,
                        local_timestamp: now,
                    },
                );
                Admission::Accepted(now)
            }
            Some(record) if external_timestamp > record.external_timestamp => {
                // Newer events of a key must get strictly newer local times.
                let local = now.max(record.local_timestamp.saturating_add(1));
                record.external_timestamp = external_timestamp;
                record.local_timestamp = local;
                Admission::Accepted(local)
            }
            Some(record) if external_timestamp == record.external_timestamp => {
                Admission::Accepted(record.local_timestamp)
            }
            Some(_) => Admission::Stale,
        }
    }

    /// Admit `value`, rewriting its timestamp to local time when accepted.
    ///
    /// Returns false when the value is stale; it is left untouched then.
    pub fn admit(&self, value: &mut VehiclePropValue) -> bool {
        match self.admit_timestamp(value.key(), value.timestamp) {
            Admission::Accepted(local) => {
                value.timestamp = local;
                true
            }
            Admission::Stale => false,
        }
    }

    /// Latest record of `key`, if it was ever admitted
    pub fn record(&self, key: PropIdAreaId) -> Option<TimestampRecord> {
        self.records.lock().get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
