//! TUIO simulator state - Tracked object storage and motion estimation
//!
//! This crate owns the authoritative object collection:
//! - A slot-arena object table with stable `session_id -> slot` mapping
//! - The single mutex that guarantees Alive/Token snapshot consistency
//! - Velocity derivation from consecutive position samples

pub mod motion;
pub mod table;

pub use motion::*;
pub use table::*;
