//! Local monotonic clock used to restamp accepted property values

use std::sync::OnceLock;
use std::time::Instant;

static CLOCK_BASE: OnceLock<Instant> = OnceLock::new();

/// Nanoseconds elapsed on the local monotonic clock.
///
/// The epoch is fixed the first time any caller in the process reads the
/// clock, so readings are comparable across the whole process.
pub fn elapsed_realtime_nanos() -> i64 {
    let base = CLOCK_BASE.get_or_init(Instant::now);
    i64::try_from(base.elapsed().as_nanos()).unwrap_or(i64::MAX)
}
