//! TUIO simulator transport - WebSocket sessions and broadcast fan-out
//!
//! This crate provides:
//! - The broadcast registry: live client handles, non-blocking fan-out
//! - The session acceptor: TCP listen, WebSocket upgrade, one writer
//!   task per client bounded by a send timeout

pub mod registry;
pub mod session;

pub use registry::*;
pub use session::*;
