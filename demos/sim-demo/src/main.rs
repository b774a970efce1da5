//! Runnable demo: three tokens orbiting the canvas center.
//!
//! Start it, then point any TUIO 2.0 WebSocket client at
//! `ws://127.0.0.1:3343` to watch the bundles stream.

use std::f32::consts::TAU;
use std::time::Duration;

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use tuio_core::Config;
use tuio_runtime::SimServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let server = SimServer::with_config(Config {
        fps: 30,
        ..Config::default()
    })?;
    server.start().await?;
    info!("TUIO simulator listening on ws://127.0.0.1:3343");

    let mut events = server.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            debug!(?event, "notification");
        }
    });

    let ids = (1..=3)
        .map(|component| server.create(component, 0.5, 0.5))
        .collect::<Result<Vec<_>, _>>()?;

    let mut t = 0.0f32;
    let mut last_report = std::time::Instant::now();
    loop {
        tokio::time::sleep(Duration::from_millis(33)).await;
        t += 0.033;

        for (i, id) in ids.iter().enumerate() {
            let phase = t * 0.5 + i as f32 * (TAU / 3.0);
            let x = 0.5 + 0.3 * phase.cos();
            let y = 0.5 + 0.3 * phase.sin();
            server.update(*id, x, y, phase % TAU)?;
        }

        if last_report.elapsed() >= Duration::from_secs(5) {
            last_report = std::time::Instant::now();
            let status = server.status();
            info!(
                clients = status.connected_clients,
                frames = status.frame_count,
                objects = status.object_count,
                "status"
            );
        }
    }
}
