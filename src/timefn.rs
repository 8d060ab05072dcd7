//! Portable high-resolution monotonic timer abstraction for the benchmark
//! harness.
//!
//! `std::time::Instant` is monotonic and thread-safe on all supported
//! platforms, so no per-platform clock selection is needed.

use std::time::Instant;

/// Nanosecond duration type.
pub type DurationNs = u64;

/// Opaque timestamp container. The absolute value is not meaningful;
/// use it only to compute a duration between two measurements.
#[derive(Clone, Copy)]
pub struct TimeT {
    t: Instant,
}

/// Returns the current monotonic timestamp.
pub fn get_time() -> TimeT {
    TimeT { t: Instant::now() }
}

/// Returns the nanosecond duration between `clock_start` and `clock_end`.
pub fn span_ns(clock_start: TimeT, clock_end: TimeT) -> DurationNs {
    clock_end.t.duration_since(clock_start.t).as_nanos() as DurationNs
}

/// Measures nanoseconds elapsed since `clock_start`.
pub fn clock_span_ns(clock_start: TimeT) -> DurationNs {
    clock_start.t.elapsed().as_nanos() as DurationNs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_are_monotonic() {
        let t0 = get_time();
        let t1 = get_time();
        assert!(span_ns(t0, t1) <= clock_span_ns(t0));
    }
}
