//! Broadcast registry - fan-out of encoded frames to live clients

use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::debug;

use tuio_core::ClientId;

/// Outcome of one broadcast pass.
#[derive(Debug, Default)]
pub struct BroadcastOutcome {
    /// Clients whose outbound queue accepted the frame.
    pub delivered: usize,
    /// Clients evicted because their queue was gone.
    pub evicted: Vec<ClientId>,
}

#[derive(Debug)]
struct ClientHandle {
    outbound: mpsc::Sender<Bytes>,
}

/// Tracks connected transport sessions and fans encoded bundles out to
/// all of them. Frame order per client is queue order: strictly the
/// order frames were broadcast, with no duplication.
#[derive(Debug, Default)]
pub struct BroadcastRegistry {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    clients: HashMap<ClientId, ClientHandle>,
    next_id: ClientId,
}

impl BroadcastRegistry {
    pub fn new() -> Self {
        BroadcastRegistry::default()
    }

    /// Register a client's outbound queue, returning its handle.
    pub fn register(&self, outbound: mpsc::Sender<Bytes>) -> ClientId {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id = id.next();
        inner.clients.insert(id, ClientHandle { outbound });
        id
    }

    /// Drop one client. Returns false if it was already gone.
    pub fn unregister(&self, id: ClientId) -> bool {
        self.inner.lock().clients.remove(&id).is_some()
    }

    /// Drop every client handle. Writer tasks observe their queue
    /// closing and wind down on their own.
    pub fn clear(&self) {
        self.inner.lock().clients.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().clients.is_empty()
    }

    /// Non-blocking fan-out of one encoded frame.
    ///
    /// A closed queue evicts its client on the spot; a full queue skips
    /// this frame for that client only (the writer's send timeout deals
    /// with peers that stay stalled). One failing client never delays
    /// the rest and never blocks the caller.
    pub fn broadcast(&self, frame: &Bytes) -> BroadcastOutcome {
        let mut inner = self.inner.lock();
        let mut outcome = BroadcastOutcome::default();

        for (id, handle) in inner.clients.iter() {
            match handle.outbound.try_send(frame.clone()) {
                Ok(()) => outcome.delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    debug!(client = %id, "outbound queue full, frame skipped");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => outcome.evicted.push(*id),
            }
        }
        for id in &outcome.evicted {
            inner.clients.remove(id);
        }

        outcome
    }
}
