use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, error};

use crate::ports::PortQueue;
use crate::scanner::PortProbe;
use crate::sink::ResultSink;

/// Totals gathered from all workers after the join.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolReport {
    pub scanned: u64,
    pub open: u64,
}

/// Fixed set of workers draining a shared `PortQueue`.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    /// `workers` is clamped to at least 1.
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Spawn the workers and wait for every one of them to exit.
    ///
    /// Each worker pops a port, probes it, forwards open results to the sink,
    /// and stops on the first empty pop.
    pub async fn run<P: PortProbe>(
        &self,
        queue: Arc<PortQueue>,
        probe: Arc<P>,
        sink: Arc<ResultSink>,
    ) -> PoolReport {
        let mut set = JoinSet::new();
        for id in 0..self.workers {
            let queue = queue.clone();
            let probe = probe.clone();
            let sink = sink.clone();
            set.spawn(async move {
                let mut report = PoolReport::default();
                while let Some(port) = queue.pop() {
                    let outcome = probe.probe(port).await;
                    report.scanned += 1;
                    if let Some(line) = outcome.report_line() {
                        report.open += 1;
                        sink.write(&line).await;
                    }
                }
                debug!(worker = id, scanned = report.scanned, open = report.open, "worker done");
                report
            });
        }

        let mut total = PoolReport::default();
        while let Some(res) = set.join_next().await {
            match res {
                Ok(r) => {
                    total.scanned += r.scanned;
                    total.open += r.open;
                }
                Err(e) => error!("scan worker failed: {e}"),
            }
        }
        total
    }
}
