//! TUIO simulator runtime - Frame scheduling and server orchestration
//!
//! This crate drives the broadcast cycle:
//! 1. Wake on the tick interval (drift-skipping, live-adjustable rate)
//! 2. Skip everything while no client is registered
//! 3. Snapshot the object table and derive velocities in one lock
//! 4. Encode the Frame/Token/Alive bundle
//! 5. Fan out to every registered client
//! 6. Notify the observer interface
//!
//! The [`SimServer`] facade owns the lifecycle and exposes the
//! editor-facing operations.

pub mod clock;
pub mod scheduler;
pub mod server;

pub use clock::*;
pub use scheduler::*;
pub use server::*;
