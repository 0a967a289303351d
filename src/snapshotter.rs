use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::engine::Engine;

/// Background task that periodically writes the engine's calendar to `path`
/// whenever a transaction has committed since the last successful save.
/// A failed save is logged and retried on the next tick.
pub async fn run_snapshotter(engine: Arc<Engine>, path: PathBuf, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut saved_generation = engine.generation();
    loop {
        interval.tick().await;
        if engine.generation() == saved_generation {
            continue;
        }
        let eng = engine.clone();
        let target = path.clone();
        match tokio::task::spawn_blocking(move || eng.save(&target)).await {
            Ok(Ok(generation)) => {
                debug!("snapshot at generation {generation} written");
                saved_generation = generation;
            }
            Ok(Err(e)) => warn!("snapshot to {} failed: {e}", path.display()),
            Err(e) => warn!("snapshot task panicked: {e}"),
        }
    }
}

pub fn spawn_snapshotter(engine: Arc<Engine>, path: PathBuf, period: Duration) -> JoinHandle<()> {
    tokio::spawn(run_snapshotter(engine, path, period))
}
