// Windowed reporting loops and the connection reconciliation loop

use crate::reconcile::ConnectionReconciler;
use crate::report::{BatchSink, Reporter};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info};


/// Collect one batch from `reporter` and publish it on `channel`.
///
/// Publication is best-effort: a failed publish is logged and the batch is
/// not retried. Returns the number of features handed to the sink.
pub async fn report_once(reporter: &dyn Reporter, sink: &dyn BatchSink, channel: &str) -> usize {
    let Some(batch) = reporter.collect() else {
        return 0;
    };

    let count = batch.len();
    match sink.publish(channel, &batch).await {
        Ok(()) => {
            info!(
                kind = %reporter.kind(),
                channel = %channel,
                features = count,
                "Reported features"
            );
        }
        Err(e) => {
            error!(
                kind = %reporter.kind(),
                channel = %channel,
                features = count,
                error = %e,
                "Failed to publish batch"
            );
        }
    }
    count
}

/// Periodically flush one reporter, or earlier when `wake` is notified.
///
/// The first report happens one period after start. Runs until the task
/// is aborted.
pub async fn run_reporting_loop(
    reporter: Arc<dyn Reporter>,
    sink: Arc<dyn BatchSink>,
    channel: String,
    period: Duration,
    wake: Option<Arc<Notify>>,
) {
    let mut ticker = interval_at(Instant::now() + period, period);

    // Skip missed ticks to prevent backlog under load
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        kind = %reporter.kind(),
        channel = %channel,
        period_ms = period.as_millis() as u64,
        "Starting windowed reporting"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = woken(wake.as_deref()) => {
                debug!(kind = %reporter.kind(), "Buffer reached flush threshold, reporting early");
            }
        }

        report_once(reporter.as_ref(), sink.as_ref(), &channel).await;
    }
}

async fn woken(wake: Option<&Notify>) {
    match wake {
        Some(notify) => notify.notified().await,
        None => std::future::pending::<()>().await,
    }
}

/// Run one reconciliation cycle per period until aborted
pub async fn run_reconcile_loop(reconciler: Arc<ConnectionReconciler>, period: Duration) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        let summary = reconciler.run_cycle();
        if summary.connected > 0 || summary.dropped > 0 || summary.rejected > 0 {
            info!(
                connected = summary.connected,
                roots_marked = summary.roots_marked,
                deferred = summary.deferred,
                dropped = summary.dropped,
                rejected = summary.rejected,
                "Reconciled unit connections"
            );
        }
    }
}

/// Handles of the spawned background loops
pub struct Scheduler {
    handles: Vec<JoinHandle<()>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            handles: Vec::new(),
        }
    }

    /// Spawn a reporting loop for `reporter` on the current runtime
    pub fn spawn_reporter(
        &mut self,
        reporter: Arc<dyn Reporter>,
        sink: Arc<dyn BatchSink>,
        channel: String,
        period: Duration,
        wake: Option<Arc<Notify>>,
    ) {
        self.handles.push(tokio::spawn(run_reporting_loop(
            reporter, sink, channel, period, wake,
        )));
    }

    pub fn spawn_reconciler(&mut self, reconciler: Arc<ConnectionReconciler>, period: Duration) {
        self.handles
            .push(tokio::spawn(run_reconcile_loop(reconciler, period)));
    }

    pub fn task_count(&self) -> usize {
        self.handles.len()
    }

    /// Abort every loop
    pub fn shutdown(self) {
        for handle in &self.handles {
            handle.abort();
        }
        info!(tasks = self.handles.len(), "Reporting scheduler stopped");
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
