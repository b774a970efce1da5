//! Velocity derivation from consecutive position samples

use std::time::Duration;

use tuio_core::{Timestamp, TrackedObject};

/// Minimum elapsed time between samples before velocity is recomputed.
/// Guards the derivative against two ticks landing at effectively the
/// same instant.
pub const MIN_SAMPLE_INTERVAL: Duration = Duration::from_millis(1);

/// Velocity smoothing policy.
///
/// The baseline contract is the raw per-tick derivative; smoothing is a
/// separately-toggled policy, never inferred.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Smoothing {
    /// Raw derivative of the last two samples (default).
    #[default]
    None,
    /// Exponential moving average over successive derivatives.
    Ewma { alpha: f32 },
}

/// Derives per-object velocity from the previous sample and elapsed time.
#[derive(Clone, Copy, Debug, Default)]
pub struct MotionEstimator {
    smoothing: Smoothing,
}

impl MotionEstimator {
    pub fn new() -> Self {
        MotionEstimator::default()
    }

    pub fn with_smoothing(smoothing: Smoothing) -> Self {
        MotionEstimator { smoothing }
    }

    /// Update one object's velocity fields in place.
    ///
    /// When `now - last_update` is at or below the guard interval the
    /// previous velocity is kept. The last-sample fields advance to the
    /// current sample in every case.
    pub fn update(&self, obj: &mut TrackedObject, now: Timestamp) {
        let dt = now.seconds_since(obj.last_update);
        if dt > MIN_SAMPLE_INTERVAL.as_secs_f32() {
            let x_vel = (obj.x - obj.last_x) / dt;
            let y_vel = (obj.y - obj.last_y) / dt;
            let angle_vel = (obj.angle - obj.last_angle) / dt;

            match self.smoothing {
                Smoothing::None => {
                    obj.x_vel = x_vel;
                    obj.y_vel = y_vel;
                    obj.angle_vel = angle_vel;
                }
                Smoothing::Ewma { alpha } => {
                    obj.x_vel = alpha * x_vel + (1.0 - alpha) * obj.x_vel;
                    obj.y_vel = alpha * y_vel + (1.0 - alpha) * obj.y_vel;
                    obj.angle_vel = alpha * angle_vel + (1.0 - alpha) * obj.angle_vel;
                }
            }
        }

        obj.last_x = obj.x;
        obj.last_y = obj.y;
        obj.last_angle = obj.angle;
        obj.last_update = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tuio_core::SessionId;

    fn object_at(x: f32, y: f32, t: Timestamp) -> TrackedObject {
        TrackedObject::new(SessionId::new(1), 1, x, y, t)
    }

    #[test]
    fn test_raw_derivative() {
        let t0 = Timestamp::from_millis(0);
        let t1 = Timestamp::from_millis(100);
        let mut obj = object_at(0.0, 0.0, t0);
        obj.set_pose(0.1, 0.0, 1.57);

        MotionEstimator::new().update(&mut obj, t1);

        // 0.1 units over 0.1s
        assert!((obj.x_vel - 1.0).abs() < 1e-4);
        assert!(obj.y_vel.abs() < 1e-6);
        assert!((obj.angle_vel - 15.7).abs() < 1e-3);
    }

    #[test]
    fn test_no_movement_zero_velocity() {
        let mut obj = object_at(0.5, 0.5, Timestamp::from_millis(0));
        MotionEstimator::new().update(&mut obj, Timestamp::from_millis(50));
        assert_eq!(obj.x_vel, 0.0);
        assert_eq!(obj.y_vel, 0.0);
        assert_eq!(obj.angle_vel, 0.0);
    }

    #[test]
    fn test_epsilon_guard_keeps_previous_velocity() {
        let t0 = Timestamp::from_millis(0);
        let mut obj = object_at(0.0, 0.0, t0);
        obj.x_vel = 2.5;
        obj.set_pose(0.9, 0.9, 0.0);

        // Half a millisecond: below the guard, velocity untouched
        MotionEstimator::new().update(&mut obj, Timestamp::from_micros(500));
        assert_eq!(obj.x_vel, 2.5);
    }

    #[test]
    fn test_epsilon_guard_still_advances_sample() {
        let t0 = Timestamp::from_millis(0);
        let t_close = Timestamp::from_micros(500);
        let mut obj = object_at(0.0, 0.0, t0);
        obj.set_pose(0.2, 0.0, 0.0);

        MotionEstimator::new().update(&mut obj, t_close);
        assert_eq!(obj.last_x, 0.2);
        assert_eq!(obj.last_update, t_close);

        // The next well-spaced tick derives from the advanced sample,
        // so an unmoved object reads as at rest.
        MotionEstimator::new().update(&mut obj, Timestamp::from_millis(100));
        assert_eq!(obj.x_vel, 0.0);
    }

    #[test]
    fn test_negative_velocity() {
        let mut obj = object_at(0.8, 0.8, Timestamp::from_millis(0));
        obj.set_pose(0.6, 0.8, 0.0);
        MotionEstimator::new().update(&mut obj, Timestamp::from_millis(200));
        assert!((obj.x_vel + 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_ewma_is_opt_in_only() {
        assert_eq!(Smoothing::default(), Smoothing::None);

        let t0 = Timestamp::from_millis(0);
        let mut obj = object_at(0.0, 0.0, t0);
        obj.x_vel = 1.0;
        obj.set_pose(0.0, 0.0, 0.0);

        let est = MotionEstimator::with_smoothing(Smoothing::Ewma { alpha: 0.5 });
        est.update(&mut obj, Timestamp::from_millis(100));
        // Derivative is 0, EWMA halves the previous velocity
        assert!((obj.x_vel - 0.5).abs() < 1e-6);
    }
}
