#![allow(dead_code)]
//! Tick-time carriers and the reference driver's step rule.
//!
//! All times in this crate are milliseconds. Drivers hand the tree one
//! [`TickStep`] per frame; [`TickStep::sanitized`] reproduces the reference
//! loop's delta handling (tab-switch spikes collapse to a 60 fps step,
//! steps are whole milliseconds).

use serde::{Deserialize, Serialize};

/// Raw frame deltas above this are treated as a stall (e.g. a backgrounded
/// tab) rather than real elapsed time.
pub const MAX_STEP_MS: f64 = 250.0;

/// Step substituted for a stalled or invalid delta: one 60 fps frame.
pub const FALLBACK_STEP_MS: f64 = 1000.0 / 60.0;

/// Per-frame time payload passed to [`Timeline::run`](crate::Timeline::run).
///
/// `step_ms` is the elapsed time since the previous frame; `time_ms` is the
/// driver's cumulative clock, forwarded to every node untouched.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TickStep {
    pub step_ms: f64,
    pub time_ms: f64,
}

impl TickStep {
    pub fn new(step_ms: f64, time_ms: f64) -> Self {
        Self { step_ms, time_ms }
    }

    /// Apply the reference driver's delta rule: non-finite, negative, or
    /// stalled (> [`MAX_STEP_MS`]) deltas collapse to [`FALLBACK_STEP_MS`],
    /// and the result is truncated to whole milliseconds.
    pub fn sanitized(raw_step_ms: f64, time_ms: f64) -> Self {
        let step = if !raw_step_ms.is_finite() || raw_step_ms < 0.0 || raw_step_ms > MAX_STEP_MS {
            FALLBACK_STEP_MS
        } else {
            raw_step_ms
        };
        Self {
            step_ms: step.trunc(),
            time_ms,
        }
    }
}

/// Interpolation fraction of `elapsed` between two keyframe times.
///
/// A zero-length segment (duplicate keyframe times) resolves to 1 so the
/// later value wins instead of dividing by zero.
#[inline]
pub fn segment_fraction(elapsed: f64, from_time: f64, to_time: f64) -> f64 {
    let total = to_time - from_time;
    if total != 0.0 {
        (elapsed - from_time) / total
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitized_truncates_ordinary_steps() {
        let t = TickStep::sanitized(16.7, 100.0);
        assert_eq!(t.step_ms, 16.0);
        assert_eq!(t.time_ms, 100.0);
    }

    #[test]
    fn sanitized_collapses_stalls_to_a_60fps_frame() {
        assert_eq!(TickStep::sanitized(251.0, 0.0).step_ms, 16.0);
        assert_eq!(TickStep::sanitized(4000.0, 0.0).step_ms, 16.0);
        assert_eq!(TickStep::sanitized(-5.0, 0.0).step_ms, 16.0);
        assert_eq!(TickStep::sanitized(f64::NAN, 0.0).step_ms, 16.0);
        // 250 exactly is still a real frame
        assert_eq!(TickStep::sanitized(250.0, 0.0).step_ms, 250.0);
    }

    #[test]
    fn fraction_is_linear_inside_a_segment() {
        assert_eq!(segment_fraction(250.0, 0.0, 1000.0), 0.25);
        assert_eq!(segment_fraction(1000.0, 1000.0, 2000.0), 0.0);
        assert_eq!(segment_fraction(2000.0, 1000.0, 2000.0), 1.0);
    }

    #[test]
    fn zero_length_segment_resolves_to_one() {
        assert_eq!(segment_fraction(500.0, 500.0, 500.0), 1.0);
    }
}
