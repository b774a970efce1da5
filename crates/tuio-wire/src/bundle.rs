//! TUIO 2.0 bundle assembly
//!
//! A bundle is the fixed `#bundle\0` marker, an 8-byte time tag, then
//! each message prefixed by its own int32 big-endian length. Message
//! ordering inside the bundle is a protocol requirement: Frame first,
//! one Token (or Pointer) per object in snapshot order, Alive last.

use bytes::{BufMut, Bytes, BytesMut};

use tuio_core::{FrameContext, SimError, SimResult, TrackedObject};

use crate::{AliveMessage, FrameMessage, OscMessage, PointerMessage, TimeTag, TokenMessage};

/// Fixed OSC bundle marker.
pub const BUNDLE_MARKER: &[u8; 8] = b"#bundle\0";

/// Which per-object message profile a bundle carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageProfile {
    /// `/tuio2/tok` - tagged tangible objects (fiducials).
    Token,
    /// `/tuio2/ptr` - pointing gestures.
    Pointer,
}

/// Encode a complete frame bundle for the given snapshot.
///
/// Fails with the assertion-class `NonFinite` error before emitting a
/// single byte if any float field is NaN or infinite; values inside the
/// declared ranges never fail.
pub fn encode_bundle(
    ctx: &FrameContext,
    objects: &[TrackedObject],
    profile: MessageProfile,
) -> SimResult<Bytes> {
    for obj in objects {
        check_finite(obj)?;
    }

    let frm = FrameMessage::new(
        ctx.frame_id,
        ctx.timestamp,
        ctx.dimensions.0,
        ctx.dimensions.1,
        ctx.source.clone(),
    );
    let alv = AliveMessage::new(objects.iter().map(|o| o.session_id).collect());

    let mut buf = BytesMut::new();
    buf.put_slice(BUNDLE_MARKER);
    buf.put_u32(TimeTag::IMMEDIATE.seconds);
    buf.put_u32(TimeTag::IMMEDIATE.fractional);

    put_element(&mut buf, &frm.to_osc());
    for obj in objects {
        let msg = match profile {
            MessageProfile::Token => TokenMessage::new(obj).to_osc(),
            MessageProfile::Pointer => PointerMessage::new(obj).to_osc(),
        };
        put_element(&mut buf, &msg);
    }
    put_element(&mut buf, &alv.to_osc());

    Ok(buf.freeze())
}

/// Encode the standard Token bundle (the broadcast path).
pub fn encode_token_bundle(ctx: &FrameContext, objects: &[TrackedObject]) -> SimResult<Bytes> {
    encode_bundle(ctx, objects, MessageProfile::Token)
}

fn put_element(buf: &mut BytesMut, msg: &OscMessage) {
    let encoded = msg.encode();
    buf.put_u32(encoded.len() as u32);
    buf.put_slice(&encoded);
}

fn check_finite(obj: &TrackedObject) -> SimResult<()> {
    let fields: [(&'static str, f32); 6] = [
        ("x", obj.x),
        ("y", obj.y),
        ("angle", obj.angle),
        ("x_vel", obj.x_vel),
        ("y_vel", obj.y_vel),
        ("angle_vel", obj.angle_vel),
    ];
    for (field, value) in fields {
        if !value.is_finite() {
            return Err(SimError::NonFinite {
                session: obj.session_id,
                field,
                value,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tuio_core::{SessionId, Timestamp};

    fn ctx() -> FrameContext {
        FrameContext {
            frame_id: 1,
            timestamp: Timestamp::from_millis(1000),
            dimensions: (1920, 1080),
            source: "test".to_string(),
        }
    }

    fn object(id: u32) -> TrackedObject {
        TrackedObject::new(SessionId::new(id), 1, 0.5, 0.5, Timestamp::ZERO)
    }

    #[test]
    fn test_bundle_marker_and_time_tag() {
        let bytes = encode_token_bundle(&ctx(), &[]).unwrap();
        assert_eq!(&bytes[0..8], BUNDLE_MARKER);
        // Immediate tag
        assert_eq!(&bytes[8..16], &[0, 0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_empty_bundle_still_has_alive() {
        let bytes = encode_token_bundle(&ctx(), &[]).unwrap();
        // frm + alv, each length-prefixed; alv with no ids is addr + ","
        let needle = b"/tuio2/alv";
        assert!(bytes
            .windows(needle.len())
            .any(|w| w == needle));
    }

    #[test]
    fn test_element_lengths_cover_bundle() {
        let objects = [object(1), object(2)];
        let bytes = encode_token_bundle(&ctx(), &objects).unwrap();

        let mut offset = 16;
        let mut elements = 0;
        while offset < bytes.len() {
            let len =
                u32::from_be_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
                    as usize;
            assert_eq!(len % 4, 0);
            offset += 4 + len;
            elements += 1;
        }
        assert_eq!(offset, bytes.len());
        // frm + 2 tok + alv
        assert_eq!(elements, 4);
    }

    #[test]
    fn test_non_finite_fails_before_emitting() {
        let mut obj = object(1);
        obj.x_vel = f32::NAN;
        let err = encode_token_bundle(&ctx(), &[obj]).unwrap_err();
        assert!(matches!(err, SimError::NonFinite { field: "x_vel", .. }));
    }

    #[test]
    fn test_pointer_profile_bundle() {
        let objects = [object(1)];
        let bytes = encode_bundle(&ctx(), &objects, MessageProfile::Pointer).unwrap();
        let needle = b"/tuio2/ptr";
        assert!(bytes.windows(needle.len()).any(|w| w == needle));
    }
}
