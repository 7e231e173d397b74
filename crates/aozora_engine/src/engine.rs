use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use aozora_logging::{collector_info, collector_warn};
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::pipeline::Collector;
use crate::{Candidate, CollectorError, CollectorEvent, RunSummary};

/// Runs a collection on a background thread and hands events to a
/// synchronous caller.
pub struct CollectorHandle {
    event_rx: mpsc::Receiver<CollectorEvent>,
    cancel: CancellationToken,
    worker: Option<thread::JoinHandle<()>>,
}

impl CollectorHandle {
    /// Starts processing `index_url`. With a `deadline`, the run is cancelled
    /// once that much wall-clock time has passed.
    pub fn start(
        collector: Collector,
        index_url: impl Into<String>,
        deadline: Option<Duration>,
    ) -> Result<Self, CollectorError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|err| CollectorError::Runtime(err.to_string()))?;
        let (event_tx, event_rx) = mpsc::channel();
        let cancel = CancellationToken::new();
        let index_url = index_url.into();

        let worker_cancel = cancel.clone();
        let worker = thread::spawn(move || {
            runtime.block_on(async move {
                if let Some(deadline) = deadline {
                    let timer_cancel = worker_cancel.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(deadline).await;
                        if !timer_cancel.is_cancelled() {
                            collector_warn!("deadline of {:?} reached, cancelling run", deadline);
                            timer_cancel.cancel();
                        }
                    });
                }
                let result = run_to_channel(&collector, &index_url, worker_cancel, &event_tx).await;
                let _ = event_tx.send(CollectorEvent::Finished(result));
            });
        });

        Ok(Self {
            event_rx,
            cancel,
            worker: Some(worker),
        })
    }

    /// Aborts in-flight requests and stops after the current entries.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn try_recv(&self) -> Option<CollectorEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Blocks until the next event; `None` once the run is over.
    pub fn recv(&self) -> Option<CollectorEvent> {
        self.event_rx.recv().ok()
    }

    /// Iterates events until the run finishes.
    pub fn events(&self) -> impl Iterator<Item = CollectorEvent> + '_ {
        self.event_rx.iter()
    }
}

/// Lists the candidates on `index_url` without visiting them, blocking the caller.
pub fn discover_blocking(
    collector: &Collector,
    index_url: &str,
) -> Result<Vec<Candidate>, CollectorError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| CollectorError::Runtime(err.to_string()))?;
    runtime.block_on(collector.discover(index_url, &CancellationToken::new()))
}

impl Drop for CollectorHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

async fn run_to_channel(
    collector: &Collector,
    index_url: &str,
    cancel: CancellationToken,
    event_tx: &mpsc::Sender<CollectorEvent>,
) -> Result<RunSummary, CollectorError> {
    let candidates = collector.discover(index_url, &cancel).await?;
    let mut summary = RunSummary {
        discovered: candidates.len(),
        ..RunSummary::default()
    };
    let _ = event_tx.send(CollectorEvent::Discovered {
        candidates: candidates.len(),
    });

    let mut outcomes = collector.process_all(candidates, cancel.clone());
    while let Some(outcome) = outcomes.next().await {
        summary.record(&outcome);
        if event_tx.send(CollectorEvent::Outcome(outcome)).is_err() {
            // Receiver dropped; nobody is listening any more.
            cancel.cancel();
            break;
        }
    }
    summary.cancelled = cancel.is_cancelled();

    collector_info!(
        "run finished: {} discovered, {} extracted, {} failed, {} skipped{}",
        summary.discovered,
        summary.extracted,
        summary.failed,
        summary.skipped,
        if summary.cancelled { " (cancelled)" } else { "" }
    );
    Ok(summary)
}
