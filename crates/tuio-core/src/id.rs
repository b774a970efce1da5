//! Identity types for the simulator
//!
//! Session ids are 32-bit to match the wire format, where they travel
//! as OSC int32 arguments.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Session identity - unique handle for one tracked object instance.
///
/// Allocated by wrapping increment; every live object holds a distinct
/// value for its lifetime.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u32);

impl SessionId {
    pub const ZERO: SessionId = SessionId(0);

    #[inline]
    pub fn new(id: u32) -> Self {
        SessionId(id)
    }

    /// Successor id. Wrap-around is accepted rather than rejected; a
    /// single run never gets close to exhausting the u32 space.
    #[inline]
    pub fn next(self) -> Self {
        SessionId(self.0.wrapping_add(1))
    }

    /// Wire representation (OSC int32).
    #[inline]
    pub fn as_i32(self) -> i32 {
        self.0 as i32
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Session({})", self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registry handle for one connected transport client.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(pub u64);

impl ClientId {
    #[inline]
    pub fn new(id: u64) -> Self {
        ClientId(id)
    }

    #[inline]
    pub fn next(self) -> Self {
        ClientId(self.0.wrapping_add(1))
    }
}

impl fmt::Debug for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Client({})", self.0)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_next_wraps() {
        let id = SessionId::new(u32::MAX);
        assert_eq!(id.next(), SessionId::ZERO);
    }

    #[test]
    fn test_session_id_wire_width() {
        // High-bit ids reinterpret as negative int32 on the wire and
        // back without loss.
        let id = SessionId::new(0xFFFF_FFFE);
        assert_eq!(id.as_i32() as u32, 0xFFFF_FFFE);
    }
}
