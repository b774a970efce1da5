//! Frame scheduler - the tick task
//!
//! One long-lived task drives the broadcast cycle. The interval skips
//! missed ticks instead of replaying them, targeting accurate long-run
//! cadence rather than faithful replay of every nominal tick. A rate
//! change rebuilds the interval on the next wakeup without a stop.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tokio::time::{self, Interval, MissedTickBehavior};
use tracing::{debug, error};

use tuio_core::{Config, FrameContext, SimEvent, SimResult};
use tuio_state::ObjectStore;
use tuio_transport::BroadcastRegistry;
use tuio_wire::encode_token_bundle;

use crate::Clock;

/// Everything one tick needs, shared between the facade and the task.
pub struct TickContext {
    pub store: Arc<ObjectStore>,
    pub registry: Arc<BroadcastRegistry>,
    pub config: Arc<Mutex<Config>>,
    pub frame_counter: Arc<AtomicU32>,
    pub clock: Arc<dyn Clock>,
    pub events: broadcast::Sender<SimEvent>,
}

/// Outcome of one productive tick.
#[derive(Debug, Clone)]
pub struct FrameReport {
    pub frame_id: u32,
    pub object_count: usize,
    pub message_size: usize,
    pub connected_clients: usize,
}

/// Execute one tick of the broadcast cycle.
///
/// Returns `Ok(None)` on the idle fast-path: with zero registered
/// clients nothing is snapshotted, no velocity field is written, and
/// the frame counter does not advance.
pub fn run_tick(ctx: &TickContext) -> SimResult<Option<FrameReport>> {
    if ctx.registry.is_empty() {
        return Ok(None);
    }

    let now = ctx.clock.now();
    let frame_id = ctx.frame_counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1);

    let objects = ctx.store.tick_snapshot(now);
    let (dimensions, source) = {
        let config = ctx.config.lock();
        ((config.width, config.height), config.source.clone())
    };

    let frame_ctx = FrameContext {
        frame_id,
        timestamp: now,
        dimensions,
        source,
    };
    let bytes = encode_token_bundle(&frame_ctx, &objects)?;

    let outcome = ctx.registry.broadcast(&bytes);
    let report = FrameReport {
        frame_id,
        object_count: objects.len(),
        message_size: bytes.len(),
        connected_clients: ctx.registry.len(),
    };
    debug!(
        frame = report.frame_id,
        objects = report.object_count,
        delivered = outcome.delivered,
        "frame broadcast"
    );
    let _ = ctx.events.send(SimEvent::FrameSent {
        frame_id: report.frame_id,
        object_count: report.object_count,
        message_size: report.message_size,
        connected_clients: report.connected_clients,
    });

    Ok(Some(report))
}

/// The tick task. Runs until the fps channel closes (server stop).
pub async fn tick_loop(ctx: TickContext, mut fps_rx: watch::Receiver<u32>) {
    let mut fps = *fps_rx.borrow();
    let mut ticker = make_interval(fps);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match run_tick(&ctx) {
                    Ok(_) => {}
                    // Assertion class: upstream validation lets only
                    // finite values in, so say it loudly if one slips.
                    Err(e) => error!(error = %e, "frame encoding failed"),
                }
            }
            changed = fps_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let next = *fps_rx.borrow();
                if next != fps {
                    fps = next;
                    ticker = make_interval(fps);
                    debug!(fps, "tick interval rebuilt");
                }
            }
        }
    }
}

/// Fixed interval that skips missed ticks instead of bursting.
pub fn make_interval(fps: u32) -> Interval {
    let period = Duration::from_secs_f64(1.0 / fps.max(1) as f64);
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}
