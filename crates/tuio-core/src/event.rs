//! Outbound notifications for the embedding interface
//!
//! The core never renders or logs toward the user; it emits these events
//! and the embedder decides what to do with them.

use serde::Serialize;

use crate::ClientId;

/// Notification emitted by the server toward its observer interface.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    ClientConnected {
        client_id: ClientId,
        peer: String,
        connected_clients: usize,
    },
    ClientDisconnected {
        client_id: ClientId,
        connected_clients: usize,
    },
    FrameSent {
        frame_id: u32,
        object_count: usize,
        message_size: usize,
        connected_clients: usize,
    },
}
