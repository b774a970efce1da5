//! Session acceptor - TCP listen, WebSocket upgrade, per-client tasks
//!
//! Each accepted client gets its own writer task draining a bounded
//! outbound queue into the socket, so one slow peer never holds up the
//! broadcaster or the other clients. Writes are bounded by the send
//! timeout; a peer that stops draining its socket is evicted.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures_util::stream::SplitStream;
use futures_util::{Sink, SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use tracing::{debug, info, warn};

use tuio_core::{SimError, SimEvent, SimResult, TransportConfig};

use crate::BroadcastRegistry;

/// Accepts transport connections and binds them to the registry.
pub struct SessionAcceptor {
    local_addr: SocketAddr,
    accept_task: JoinHandle<()>,
}

impl SessionAcceptor {
    /// Bind the listening socket and start the accept loop. A bind
    /// failure is reported to the caller and aborts server start.
    pub async fn bind(
        port: u16,
        registry: Arc<BroadcastRegistry>,
        config: TransportConfig,
        events: broadcast::Sender<SimEvent>,
    ) -> SimResult<Self> {
        let addr = SocketAddr::from(([127, 0, 0, 1], port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| SimError::Transport(format!("bind {addr} failed: {e}")))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| SimError::Transport(e.to_string()))?;

        info!(%local_addr, "listening for TUIO clients");
        let accept_task = tokio::spawn(accept_loop(listener, registry, config, events));

        Ok(SessionAcceptor {
            local_addr,
            accept_task,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting new connections. Registered clients are left to
    /// the registry.
    pub fn shutdown(&self) {
        self.accept_task.abort();
    }
}

impl Drop for SessionAcceptor {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}

async fn accept_loop(
    listener: TcpListener,
    registry: Arc<BroadcastRegistry>,
    config: TransportConfig,
    events: broadcast::Sender<SimEvent>,
) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let registry = Arc::clone(&registry);
                let config = config.clone();
                let events = events.clone();
                tokio::spawn(async move {
                    if let Err(e) = serve_client(stream, peer, registry, config, events).await {
                        debug!(%peer, error = %e, "client session ended");
                    }
                });
            }
            Err(e) => {
                warn!(error = %e, "accept failed");
            }
        }
    }
}

/// Run one client session to completion: upgrade, register, then pump
/// the outbound queue until the client stalls, errors, or goes away.
async fn serve_client(
    stream: TcpStream,
    peer: SocketAddr,
    registry: Arc<BroadcastRegistry>,
    config: TransportConfig,
    events: broadcast::Sender<SimEvent>,
) -> SimResult<()> {
    let ws = tokio_tungstenite::accept_async(stream)
        .await
        .map_err(|e| SimError::Transport(format!("websocket handshake failed: {e}")))?;
    let (ws_sink, ws_stream) = ws.split();

    let (outbound_tx, outbound_rx) = mpsc::channel(config.outbound_queue);
    let client_id = registry.register(outbound_tx);
    info!(%peer, client = %client_id, "client connected");
    let _ = events.send(SimEvent::ClientConnected {
        client_id,
        peer: peer.to_string(),
        connected_clients: registry.len(),
    });

    let mut reader = tokio::spawn(read_loop(ws_stream));
    let result = tokio::select! {
        res = write_loop(ws_sink, outbound_rx, config.send_timeout) => res,
        _ = &mut reader => Ok(()),
    };
    reader.abort();

    registry.unregister(client_id);
    info!(%peer, client = %client_id, "client disconnected");
    let _ = events.send(SimEvent::ClientDisconnected {
        client_id,
        connected_clients: registry.len(),
    });

    result
}

/// Drain the outbound queue into the socket. Each write is bounded by
/// the send timeout so a peer that never drains cannot accumulate
/// backlog against the broadcaster. Ends cleanly when the queue closes
/// (server stop or registry eviction).
async fn write_loop<S>(
    mut sink: S,
    mut outbound: mpsc::Receiver<Bytes>,
    send_timeout: Duration,
) -> SimResult<()>
where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    while let Some(frame) = outbound.recv().await {
        match time::timeout(send_timeout, sink.send(Message::Binary(frame.to_vec()))).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(SimError::Transport(format!("client write failed: {e}")));
            }
            Err(_) => {
                return Err(SimError::Transport(format!(
                    "client write stalled past {send_timeout:?}"
                )));
            }
        }
    }
    Ok(())
}

/// Inbound side: answer pings (handled by the library), honor Close,
/// discard everything else. Subscribers have nothing to say to us.
async fn read_loop(mut stream: SplitStream<WebSocketStream<TcpStream>>) {
    while let Some(msg) = stream.next().await {
        match msg {
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(error = %e, "client receive error");
                break;
            }
        }
    }
}
