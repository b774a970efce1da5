//! TUIO simulator wire format - OSC 1.0 binary encoding
//!
//! This crate implements the byte-exact wire layer:
//! - OSC primitives: padded strings, aligned arguments, time tags
//! - TUIO 2.0 messages: Frame, Token, Pointer, Alive
//! - Bundle envelope with the mandatory frm -> tok* -> alv ordering
//! - A reference decoder used by round-trip tests

pub mod bundle;
pub mod decode;
pub mod messages;
pub mod osc;

pub use bundle::*;
pub use decode::*;
pub use messages::*;
pub use osc::*;
