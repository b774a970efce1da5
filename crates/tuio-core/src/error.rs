//! Error types for the simulator

use thiserror::Error;

use crate::SessionId;

/// Core simulator errors
#[derive(Error, Debug)]
pub enum SimError {
    // User input errors - rejected before any state change
    #[error("port {0} out of range [1024, 65535]")]
    InvalidPort(u16),

    #[error("frame rate {0} out of range [1, 120]")]
    InvalidRate(u32),

    #[error("coordinates ({x}, {y}) out of range [0.0, 1.0]")]
    InvalidCoordinate { x: f32, y: f32 },

    #[error("component id {0} out of range [1, 24]")]
    InvalidComponent(u16),

    #[error("component id {0} already in use")]
    ComponentInUse(u16),

    #[error("dimensions {0}x{1} must be non-zero")]
    InvalidDimensions(u16, u16),

    // Object table errors
    #[error("no object with session id {0}")]
    ObjectNotFound(SessionId),

    // Lifecycle errors
    #[error("server is already running")]
    AlreadyRunning,

    #[error("server is not running")]
    NotRunning,

    // Wire errors
    #[error("invalid wire format: {0}")]
    InvalidWireFormat(String),

    #[error("buffer too short: expected {expected}, got {actual}")]
    BufferTooShort { expected: usize, actual: usize },

    // Transport errors
    #[error("transport error: {0}")]
    Transport(String),

    // Encoding errors - programming-error class, never recoverable
    #[error("non-finite {field} value {value} for session {session}")]
    NonFinite {
        session: SessionId,
        field: &'static str,
        value: f32,
    },
}

/// Result type for simulator operations
pub type SimResult<T> = Result<T, SimError>;
