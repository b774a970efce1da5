//! Tracked object model and per-tick frame context

use serde::{Deserialize, Serialize};

use crate::{SessionId, Timestamp};

/// One tracked token on the simulated surface.
///
/// Positions are normalized to `[0.0, 1.0]` on both axes; the angle is
/// radians. Velocity fields are derived, overwritten every tick. The
/// `last_*` fields are the previous sample used for that derivation and
/// are not part of the public snapshot contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedObject {
    pub session_id: SessionId,
    pub type_id: u16,
    pub user_id: u16,
    pub component_id: u16,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub x_vel: f32,
    pub y_vel: f32,
    pub angle_vel: f32,
    pub last_x: f32,
    pub last_y: f32,
    pub last_angle: f32,
    pub last_update: Timestamp,
}

impl TrackedObject {
    /// Create an object at rest. `type_id` mirrors `component_id` so
    /// receivers can map tokens to a stable class, `user_id` stays 0.
    pub fn new(session_id: SessionId, component_id: u16, x: f32, y: f32, created: Timestamp) -> Self {
        TrackedObject {
            session_id,
            type_id: component_id,
            user_id: 0,
            component_id,
            x,
            y,
            angle: 0.0,
            x_vel: 0.0,
            y_vel: 0.0,
            angle_vel: 0.0,
            last_x: x,
            last_y: y,
            last_angle: 0.0,
            last_update: created,
        }
    }

    /// Apply an editor position update. Velocity derivation happens later,
    /// on the tick that publishes the new sample.
    pub fn set_pose(&mut self, x: f32, y: f32, angle: f32) {
        self.x = x;
        self.y = y;
        self.angle = angle;
    }
}

/// Ephemeral frame context, one per tick.
#[derive(Debug, Clone)]
pub struct FrameContext {
    /// Monotonically incrementing frame counter.
    pub frame_id: u32,
    pub timestamp: Timestamp,
    /// Sensor dimensions (width, height).
    pub dimensions: (u16, u16),
    /// Source identifier advertised in every Frame message.
    pub source: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_object_at_rest() {
        let obj = TrackedObject::new(SessionId::new(7), 3, 0.25, 0.75, Timestamp::from_millis(10));
        assert_eq!(obj.type_id, 3);
        assert_eq!(obj.user_id, 0);
        assert_eq!(obj.x_vel, 0.0);
        assert_eq!(obj.last_x, 0.25);
        assert_eq!(obj.last_update, Timestamp::from_millis(10));
    }

    #[test]
    fn test_set_pose_keeps_last_sample() {
        let mut obj = TrackedObject::new(SessionId::new(1), 1, 0.1, 0.1, Timestamp::ZERO);
        obj.set_pose(0.2, 0.3, 1.5);
        assert_eq!(obj.x, 0.2);
        assert_eq!(obj.last_x, 0.1);
        assert_eq!(obj.last_update, Timestamp::ZERO);
    }
}
