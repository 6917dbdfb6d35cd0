//! Periodic progress log

use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{error, info};

use super::shared::Shared;
use crate::error::EngineError;
use crate::oracle::Oracle;

pub(crate) struct Reporter {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

impl Reporter {
    pub fn spawn<O: Oracle + 'static>(
        shared: Arc<Shared<O>>,
        interval: Duration,
    ) -> Result<Self, EngineError> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let name = "explorer-progress".to_string();
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                let start = Instant::now();
                let mut last_expanded = 0;
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                    let expanded = shared.stats.expanded();
                    let rate = (expanded - last_expanded) as f64 / interval.as_secs_f64();
                    last_expanded = expanded;
                    info!(
                        "[{:>6.1}s] positions {} depth {} queued {} ({rate:.0}/s)",
                        start.elapsed().as_secs_f64(),
                        shared.graph.len(),
                        shared.stats.max_depth(),
                        shared.queue.len(),
                    );
                }
            })
            .map_err(|source| EngineError::Spawn { name, source })?;
        Ok(Self { stop_tx, handle })
    }

    pub fn stop(self) {
        let _ = self.stop_tx.send(());
        if self.handle.join().is_err() {
            error!("progress reporter panicked");
        }
    }
}
