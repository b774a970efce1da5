//! TUIO 2.0 message construction
//!
//! Addresses and argument layouts follow the TUIO 2.0 profile set:
//! `/tuio2/frm` opens a bundle, one `/tuio2/tok` (or `/tuio2/ptr`) per
//! object, `/tuio2/alv` closes it.

use tuio_core::{SessionId, Timestamp, TrackedObject};

use crate::{OscArg, OscMessage, TimeTag};

pub const FRAME_ADDR: &str = "/tuio2/frm";
pub const TOKEN_ADDR: &str = "/tuio2/tok";
pub const POINTER_ADDR: &str = "/tuio2/ptr";
pub const ALIVE_ADDR: &str = "/tuio2/alv";

/// FRM (Frame) message - opens the bundle.
///
/// Arguments:
/// 1. frame_id (int32) - sequential frame counter
/// 2. timestamp (time tag)
/// 3. dimension (int32) - `(width << 16) | height`
/// 4. source (string) - source identifier
pub struct FrameMessage {
    pub frame_id: u32,
    pub timestamp: Timestamp,
    pub width: u16,
    pub height: u16,
    pub source: String,
}

impl FrameMessage {
    pub fn new(frame_id: u32, timestamp: Timestamp, width: u16, height: u16, source: String) -> Self {
        FrameMessage {
            frame_id,
            timestamp,
            width,
            height,
            source,
        }
    }

    pub fn to_osc(&self) -> OscMessage {
        let dimension = ((self.width as i32) << 16) | (self.height as i32);
        OscMessage::with_args(
            FRAME_ADDR,
            vec![
                OscArg::Int(self.frame_id as i32),
                OscArg::Time(TimeTag::from_timestamp(self.timestamp)),
                OscArg::Int(dimension),
                OscArg::Str(self.source.clone()),
            ],
        )
    }
}

/// TOK (Token) message - one tagged tangible object.
///
/// Nine arguments: session, `(type_id << 16) | user_id`, component, then
/// x, y, angle and the three derived velocities. The acceleration
/// argument of the full profile is intentionally omitted.
pub struct TokenMessage<'a> {
    pub object: &'a TrackedObject,
}

impl<'a> TokenMessage<'a> {
    pub fn new(object: &'a TrackedObject) -> Self {
        TokenMessage { object }
    }

    pub fn to_osc(&self) -> OscMessage {
        let obj = self.object;
        let type_user = ((obj.type_id as i32) << 16) | (obj.user_id as i32);
        OscMessage::with_args(
            TOKEN_ADDR,
            vec![
                OscArg::Int(obj.session_id.as_i32()),
                OscArg::Int(type_user),
                OscArg::Int(obj.component_id as i32),
                OscArg::Float(obj.x),
                OscArg::Float(obj.y),
                OscArg::Float(obj.angle),
                OscArg::Float(obj.x_vel),
                OscArg::Float(obj.y_vel),
                OscArg::Float(obj.angle_vel),
            ],
        )
    }
}

/// PTR (Pointer) message - a pointing gesture.
///
/// Thirteen arguments; shear and radius are zero for simulated objects
/// and pressure is held at 1.0 (touching).
pub struct PointerMessage<'a> {
    pub object: &'a TrackedObject,
}

impl<'a> PointerMessage<'a> {
    pub fn new(object: &'a TrackedObject) -> Self {
        PointerMessage { object }
    }

    pub fn to_osc(&self) -> OscMessage {
        let obj = self.object;
        let type_user = ((obj.type_id as i32) << 16) | (obj.user_id as i32);
        OscMessage::with_args(
            POINTER_ADDR,
            vec![
                OscArg::Int(obj.session_id.as_i32()),
                OscArg::Int(type_user),
                OscArg::Int(obj.component_id as i32),
                OscArg::Float(obj.x),
                OscArg::Float(obj.y),
                OscArg::Float(obj.angle),
                OscArg::Float(0.0), // shear
                OscArg::Float(0.0), // radius
                OscArg::Float(1.0), // pressure
                OscArg::Float(obj.x_vel),
                OscArg::Float(obj.y_vel),
                OscArg::Float(0.0), // pressure velocity
                OscArg::Float(0.0), // acceleration
            ],
        )
    }
}

/// ALV (Alive) message - closes the bundle.
///
/// One int32 per live session id, in Token order. Emitted with zero
/// arguments when no objects are live; omitting it would be a protocol
/// violation.
pub struct AliveMessage {
    pub session_ids: Vec<SessionId>,
}

impl AliveMessage {
    pub fn new(session_ids: Vec<SessionId>) -> Self {
        AliveMessage { session_ids }
    }

    pub fn to_osc(&self) -> OscMessage {
        let args = self
            .session_ids
            .iter()
            .map(|id| OscArg::Int(id.as_i32()))
            .collect();
        OscMessage::with_args(ALIVE_ADDR, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_object() -> TrackedObject {
        let mut obj = TrackedObject::new(SessionId::new(42), 1, 0.5, 0.5, Timestamp::ZERO);
        obj.angle = 1.57;
        obj
    }

    #[test]
    fn test_frame_message_dimension_packing() {
        let frm = FrameMessage::new(
            1234,
            Timestamp::from_millis(1_705_500_000_000),
            1920,
            1080,
            "tuio-simulator".to_string(),
        );
        let osc = frm.to_osc();
        assert_eq!(osc.addr, FRAME_ADDR);
        assert_eq!(osc.args.len(), 4);
        // (1920 << 16) | 1080 = 125830200
        assert_eq!(osc.args[2], OscArg::Int(125_830_200));
    }

    #[test]
    fn test_token_message_type_user_packing() {
        let obj = test_object();
        let osc = TokenMessage::new(&obj).to_osc();
        assert_eq!(osc.addr, TOKEN_ADDR);
        assert_eq!(osc.args.len(), 9);
        // (1 << 16) | 0 = 65536
        assert_eq!(osc.args[1], OscArg::Int(65_536));
    }

    #[test]
    fn test_pointer_message_profile() {
        let obj = test_object();
        let osc = PointerMessage::new(&obj).to_osc();
        assert_eq!(osc.addr, POINTER_ADDR);
        assert_eq!(osc.args.len(), 13);
        assert_eq!(osc.args[8], OscArg::Float(1.0));
    }

    #[test]
    fn test_alive_message() {
        let alv = AliveMessage::new(vec![SessionId::new(42), SessionId::new(43)]);
        let osc = alv.to_osc();
        assert_eq!(osc.addr, ALIVE_ADDR);
        assert_eq!(osc.args.len(), 2);
    }

    #[test]
    fn test_alive_message_empty() {
        let osc = AliveMessage::new(vec![]).to_osc();
        assert_eq!(osc.args.len(), 0);
    }
}
