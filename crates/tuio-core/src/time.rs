//! Time primitives for the simulator
//!
//! Timestamps are microseconds since the Unix epoch. The OSC time tag
//! split keeps the millisecond-based math of the frame encoder: whole
//! seconds in the upper word, the millisecond remainder scaled across
//! the full fractional range.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Wall-clock timestamp in microseconds since the Unix epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    #[inline]
    pub fn from_micros(us: i64) -> Self {
        Timestamp(us)
    }

    #[inline]
    pub fn from_millis(ms: i64) -> Self {
        Timestamp(ms * 1000)
    }

    #[inline]
    pub fn as_micros(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn as_millis(self) -> i64 {
        self.0 / 1000
    }

    #[inline]
    pub fn saturating_add(self, d: Duration) -> Self {
        Timestamp(self.0.saturating_add(d.as_micros() as i64))
    }

    /// Elapsed time since `earlier` in seconds. Negative when `earlier`
    /// is actually later than `self`.
    #[inline]
    pub fn seconds_since(self, earlier: Timestamp) -> f32 {
        (self.0 - earlier.0) as f32 / 1_000_000.0
    }

    /// Split into OSC time-tag words (seconds, fractional).
    pub fn to_time_tag(self) -> (u32, u32) {
        let millis = self.as_millis();
        let seconds = (millis / 1000) as u32;
        let fractional = (((millis % 1000) * u32::MAX as i64) / 1000) as u32;
        (seconds, fractional)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({}us)", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_since() {
        let t0 = Timestamp::from_millis(1000);
        let t1 = Timestamp::from_millis(1100);
        assert!((t1.seconds_since(t0) - 0.1).abs() < 1e-6);
        assert!(t0.seconds_since(t1) < 0.0);
    }

    #[test]
    fn test_time_tag_split() {
        let t = Timestamp::from_millis(1_705_500_000_500);
        let (seconds, fractional) = t.to_time_tag();
        assert_eq!(seconds, 1_705_500_000);
        // 500ms maps to half the fractional range
        let half = u32::MAX / 2;
        assert!(fractional.abs_diff(half) < 4);
    }

    #[test]
    fn test_time_tag_whole_second() {
        let t = Timestamp::from_millis(42_000);
        assert_eq!(t.to_time_tag(), (42, 0));
    }

    #[test]
    fn test_saturating_add() {
        let t = Timestamp::from_micros(i64::MAX - 10);
        let later = t.saturating_add(Duration::from_secs(1));
        assert_eq!(later.as_micros(), i64::MAX);
    }
}
