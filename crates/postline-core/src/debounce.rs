// ── Search debouncer ──
//
// Trailing-edge debounce over query edits. One background task owns the
// timer; every new value restarts it, and only the last value of a burst
// reaches the settle callback. Dropping the debouncer cancels anything
// still pending.

use std::future::Future;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

enum DebounceMsg {
    Value(String),
    Flush(oneshot::Sender<()>),
}

/// Cheap, cloneable sender side of a [`SearchDebouncer`].
#[derive(Clone)]
pub struct DebounceHandle {
    tx: mpsc::UnboundedSender<DebounceMsg>,
}

impl DebounceHandle {
    /// Queue a new value, restarting the quiet period.
    /// Returns `false` if the debouncer is gone.
    pub fn push(&self, value: impl Into<String>) -> bool {
        self.tx.send(DebounceMsg::Value(value.into())).is_ok()
    }

    /// Settle any pending value now instead of waiting out the timer.
    /// Resolves once the settle callback has finished (or immediately if
    /// nothing was pending).
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(DebounceMsg::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
    }
}

/// Owns the debounce task and its timer.
pub struct SearchDebouncer {
    handle: DebounceHandle,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl SearchDebouncer {
    /// Spawn the debounce task on the current runtime.
    ///
    /// `on_settle` runs once per burst with the last value, after `quiet`
    /// has elapsed with no further value. Cancelling `parent` (or dropping
    /// the debouncer) abandons any pending value, including one whose
    /// settle callback is mid-flight.
    pub fn spawn<F, Fut>(quiet: Duration, parent: &CancellationToken, on_settle: F) -> Self
    where
        F: FnMut(String) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = parent.child_token();
        let task = tokio::spawn(debounce_task(quiet, rx, cancel.clone(), on_settle));

        Self {
            handle: DebounceHandle { tx },
            cancel,
            task: Some(task),
        }
    }

    pub fn handle(&self) -> DebounceHandle {
        self.handle.clone()
    }

    pub fn push(&self, value: impl Into<String>) -> bool {
        self.handle.push(value)
    }

    pub async fn flush(&self) {
        self.handle.flush().await;
    }

    /// Cancel pending work and wait for the task to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn debounce_task<F, Fut>(
    quiet: Duration,
    mut rx: mpsc::UnboundedReceiver<DebounceMsg>,
    cancel: CancellationToken,
    mut on_settle: F,
) where
    F: FnMut(String) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let timer = sleep_until(Instant::now() + quiet);
    tokio::pin!(timer);
    let mut pending: Option<String> = None;

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            msg = rx.recv() => match msg {
                Some(DebounceMsg::Value(value)) => {
                    trace!(len = value.len(), "debounce timer restarted");
                    pending = Some(value);
                    timer.as_mut().reset(Instant::now() + quiet);
                }
                Some(DebounceMsg::Flush(ack)) => {
                    if let Some(value) = pending.take() {
                        if !settle(&cancel, on_settle(value)).await {
                            break;
                        }
                    }
                    let _ = ack.send(());
                }
                None => break,
            },

            () = &mut timer, if pending.is_some() => {
                if let Some(value) = pending.take() {
                    if !settle(&cancel, on_settle(value)).await {
                        break;
                    }
                }
            }
        }
    }

    if pending.is_some() {
        debug!("debouncer stopped with an uncommitted value");
    }
}

/// Run a settle future unless cancelled first. Returns `false` on cancel.
async fn settle(cancel: &CancellationToken, fut: impl Future<Output = ()>) -> bool {
    tokio::select! {
        biased;
        () = cancel.cancelled() => false,
        () = fut => true,
    }
}
