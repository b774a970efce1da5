//! Server facade - lifecycle and the editor-facing interface
//!
//! `Stopped -> Running -> Stopped`. Start binds the acceptor and spawns
//! the tick task; stop aborts both and drops every client handle, so a
//! subsequent start begins with a fresh registry. Object operations
//! work in both states: the table is owned by the server, not by the
//! running transport.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::info;

use tuio_core::{
    validate_dimensions, validate_fps, validate_port, Config, ServerStatus, SessionId, SimError,
    SimEvent, SimResult, TransportConfig,
};
use tuio_state::{MotionEstimator, ObjectStore};
use tuio_transport::{BroadcastRegistry, SessionAcceptor};

use crate::scheduler::{tick_loop, TickContext};
use crate::{Clock, SystemClock};

/// Capacity of the outward notification channel.
const EVENT_CAPACITY: usize = 256;

struct RunningState {
    registry: Arc<BroadcastRegistry>,
    acceptor: SessionAcceptor,
    tick_task: JoinHandle<()>,
    fps_tx: watch::Sender<u32>,
}

/// The simulator server.
pub struct SimServer {
    store: Arc<ObjectStore>,
    config: Arc<Mutex<Config>>,
    transport: TransportConfig,
    clock: Arc<dyn Clock>,
    frame_counter: Arc<AtomicU32>,
    events: broadcast::Sender<SimEvent>,
    running: Mutex<Option<RunningState>>,
}

impl SimServer {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    pub fn with_clock(clock: impl Clock) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        SimServer {
            store: Arc::new(ObjectStore::with_estimator(MotionEstimator::new())),
            config: Arc::new(Mutex::new(Config::default())),
            transport: TransportConfig::default(),
            clock: Arc::new(clock),
            frame_counter: Arc::new(AtomicU32::new(0)),
            events,
            running: Mutex::new(None),
        }
    }

    /// Validated configuration up front; rejected before construction.
    pub fn with_config(config: Config) -> SimResult<Self> {
        config.validate()?;
        let server = Self::new();
        *server.config.lock() = config;
        Ok(server)
    }

    /// Subscribe to connection and frame notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<SimEvent> {
        self.events.subscribe()
    }

    /// Bind the acceptor and begin ticking at the configured rate.
    pub async fn start(&self) -> SimResult<()> {
        if self.running.lock().is_some() {
            return Err(SimError::AlreadyRunning);
        }

        let (port, fps) = {
            let config = self.config.lock();
            config.validate()?;
            (config.port, config.fps)
        };

        let registry = Arc::new(BroadcastRegistry::new());
        let acceptor = SessionAcceptor::bind(
            port,
            Arc::clone(&registry),
            self.transport.clone(),
            self.events.clone(),
        )
        .await?;

        let (fps_tx, fps_rx) = watch::channel(fps);
        let ctx = TickContext {
            store: Arc::clone(&self.store),
            registry: Arc::clone(&registry),
            config: Arc::clone(&self.config),
            frame_counter: Arc::clone(&self.frame_counter),
            clock: Arc::clone(&self.clock),
            events: self.events.clone(),
        };
        let tick_task = tokio::spawn(tick_loop(ctx, fps_rx));

        let mut running = self.running.lock();
        if running.is_some() {
            // Lost a start race; tear the half-built instance down
            tick_task.abort();
            return Err(SimError::AlreadyRunning);
        }
        *running = Some(RunningState {
            registry,
            acceptor,
            tick_task,
            fps_tx,
        });
        info!(port, fps, "server started");
        Ok(())
    }

    /// Stop ticking, close the listener, and drop every client handle.
    /// In-flight sends to doomed clients are abandoned, not awaited.
    pub fn stop(&self) -> SimResult<()> {
        let state = self
            .running
            .lock()
            .take()
            .ok_or(SimError::NotRunning)?;

        state.tick_task.abort();
        state.acceptor.shutdown();
        state.registry.clear();
        info!("server stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running.lock().is_some()
    }

    /// Listening address while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.lock().as_ref().map(|s| s.acceptor.local_addr())
    }

    /// Create a tracked object. Returns its session id.
    pub fn create(&self, component_id: u16, x: f32, y: f32) -> SimResult<SessionId> {
        self.store.insert(component_id, x, y, self.clock.now())
    }

    /// Move or rotate a tracked object.
    pub fn update(&self, id: SessionId, x: f32, y: f32, angle: f32) -> SimResult<()> {
        self.store.update(id, x, y, angle)
    }

    /// Remove a tracked object. The next frame's Alive list excludes it.
    pub fn remove(&self, id: SessionId) -> SimResult<()> {
        self.store.remove(id)
    }

    /// Change the frame rate, live when running.
    pub fn set_rate(&self, fps: u32) -> SimResult<()> {
        validate_fps(fps)?;
        self.config.lock().fps = fps;
        if let Some(state) = self.running.lock().as_ref() {
            let _ = state.fps_tx.send(fps);
        }
        Ok(())
    }

    /// Change the advertised sensor dimensions.
    pub fn set_dimensions(&self, width: u16, height: u16) -> SimResult<()> {
        validate_dimensions(width, height)?;
        let mut config = self.config.lock();
        config.width = width;
        config.height = height;
        Ok(())
    }

    /// Change the listening port. Only valid while stopped; the port is
    /// picked up by the next start.
    pub fn set_port(&self, port: u16) -> SimResult<()> {
        validate_port(port)?;
        if self.is_running() {
            return Err(SimError::AlreadyRunning);
        }
        self.config.lock().port = port;
        Ok(())
    }

    pub fn status(&self) -> ServerStatus {
        let (running, connected_clients) = {
            let running = self.running.lock();
            (
                running.is_some(),
                running.as_ref().map_or(0, |s| s.registry.len()),
            )
        };
        let (port, fps) = {
            let config = self.config.lock();
            (config.port, config.fps)
        };
        ServerStatus {
            running,
            port,
            fps,
            connected_clients,
            frame_count: self.frame_counter.load(Ordering::Relaxed),
            object_count: self.store.len(),
        }
    }
}

impl Default for SimServer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SimServer {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
