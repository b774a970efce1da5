//! Runtime configuration and status reporting

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{SimError, SimResult};

/// Default transport port (TUIO convention).
pub const DEFAULT_PORT: u16 = 3343;

/// Lowest acceptable listening port (non-privileged range).
pub const MIN_PORT: u16 = 1024;

/// Frame rate bounds.
pub const MIN_FPS: u32 = 1;
pub const MAX_FPS: u32 = 120;

/// Component id bounds (physical token slots).
pub const MIN_COMPONENT: u16 = 1;
pub const MAX_COMPONENT: u16 = 24;

/// Server configuration. Created at start, mutated by external commands,
/// read every tick by the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub port: u16,
    pub fps: u32,
    pub width: u16,
    pub height: u16,
    pub source: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: DEFAULT_PORT,
            fps: 60,
            width: 1920,
            height: 1080,
            source: "tuio-simulator".to_string(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> SimResult<()> {
        validate_port(self.port)?;
        validate_fps(self.fps)?;
        validate_dimensions(self.width, self.height)?;
        Ok(())
    }
}

pub fn validate_port(port: u16) -> SimResult<()> {
    if port < MIN_PORT {
        return Err(SimError::InvalidPort(port));
    }
    Ok(())
}

pub fn validate_fps(fps: u32) -> SimResult<()> {
    if !(MIN_FPS..=MAX_FPS).contains(&fps) {
        return Err(SimError::InvalidRate(fps));
    }
    Ok(())
}

pub fn validate_dimensions(width: u16, height: u16) -> SimResult<()> {
    if width == 0 || height == 0 {
        return Err(SimError::InvalidDimensions(width, height));
    }
    Ok(())
}

pub fn validate_coordinates(x: f32, y: f32) -> SimResult<()> {
    if !(0.0..=1.0).contains(&x) || !(0.0..=1.0).contains(&y) {
        return Err(SimError::InvalidCoordinate { x, y });
    }
    Ok(())
}

pub fn validate_component(component_id: u16) -> SimResult<()> {
    if !(MIN_COMPONENT..=MAX_COMPONENT).contains(&component_id) {
        return Err(SimError::InvalidComponent(component_id));
    }
    Ok(())
}

/// Tuning for the per-client write path.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Upper bound on one socket write before the client is evicted.
    pub send_timeout: Duration,
    /// Frames queued per client before further ones are skipped.
    pub outbound_queue: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            send_timeout: Duration::from_millis(250),
            outbound_queue: 32,
        }
    }
}

/// Snapshot of server state for the embedding interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerStatus {
    pub running: bool,
    pub port: u16,
    pub fps: u32,
    pub connected_clients: usize,
    pub frame_count: u32,
    pub object_count: usize,
}
