// Integration tests for `Controller` using scripted collaborators.
#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use tokio::sync::oneshot;

use tokio_stream::StreamExt;

use postline_core::{
    ConnectivityProbe, Controller, ControllerConfig, CoreError, ErrorKind, FetchStatus,
    MemorySearchStore, Notification, NotificationSink, Record, RecordSource, RefreshTrigger,
    SEARCH_KEY, SearchStore, Services, SourceError,
};

// ── Fakes ───────────────────────────────────────────────────────────

type FetchResult = Result<Vec<Record>, SourceError>;

enum Script {
    Ready(FetchResult),
    Gated(oneshot::Receiver<FetchResult>),
}

/// Record source that replays queued results in call order. With an
/// empty queue it returns the fallback collection.
#[derive(Default)]
struct ScriptedSource {
    scripts: Mutex<VecDeque<Script>>,
    fallback: Mutex<Vec<Record>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn with_records(records: Vec<Record>) -> Self {
        let source = Self::default();
        *source.fallback.lock().unwrap() = records;
        source
    }

    fn push(&self, result: FetchResult) {
        self.scripts.lock().unwrap().push_back(Script::Ready(result));
    }

    fn push_gated(&self) -> oneshot::Sender<FetchResult> {
        let (tx, rx) = oneshot::channel();
        self.scripts.lock().unwrap().push_back(Script::Gated(rx));
        tx
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn wait_for_calls(&self, n: usize) {
        while self.calls() < n {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl RecordSource for ScriptedSource {
    async fn fetch_all(&self) -> FetchResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let script = self.scripts.lock().unwrap().pop_front();
        match script {
            Some(Script::Ready(result)) => result,
            Some(Script::Gated(rx)) => rx.await.unwrap(),
            None => Ok(self.fallback.lock().unwrap().clone()),
        }
    }
}

struct FakeProbe {
    connected: AtomicBool,
}

impl FakeProbe {
    fn new(connected: bool) -> Self {
        Self {
            connected: AtomicBool::new(connected),
        }
    }

    fn set(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }
}

#[async_trait]
impl ConnectivityProbe for FakeProbe {
    async fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    fn seen(&self) -> Vec<Notification> {
        self.seen.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().unwrap().push(notification);
    }
}

/// Search store whose first read blocks until the test releases it.
struct GatedStore {
    gate: Mutex<Option<oneshot::Receiver<Option<String>>>>,
    reading: AtomicBool,
}

impl GatedStore {
    fn new() -> (Self, oneshot::Sender<Option<String>>) {
        let (tx, rx) = oneshot::channel();
        let store = Self {
            gate: Mutex::new(Some(rx)),
            reading: AtomicBool::new(false),
        };
        (store, tx)
    }

    async fn wait_for_read(&self) {
        while !self.reading.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl SearchStore for GatedStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, CoreError> {
        self.reading.store(true, Ordering::SeqCst);
        let gate = self.gate.lock().unwrap().take();
        match gate {
            Some(rx) => Ok(rx.await.unwrap()),
            None => Ok(None),
        }
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), CoreError> {
        Ok(())
    }
}

// ── Harness ─────────────────────────────────────────────────────────

struct Harness {
    controller: Controller,
    source: Arc<ScriptedSource>,
    probe: Arc<FakeProbe>,
    store: Arc<MemorySearchStore>,
    notifier: Arc<RecordingNotifier>,
}

fn sample_records() -> Vec<Record> {
    vec![
        Record::new(1, 1, "Alpha post", "first body"),
        Record::new(1, 2, "Beta", "second body"),
        Record::new(2, 3, "alphabet soup", "third body"),
    ]
}

fn harness_with(source: ScriptedSource, store: MemorySearchStore) -> Harness {
    harness_sharing(Arc::new(source), Arc::new(store))
}

fn harness_sharing(source: Arc<ScriptedSource>, store: Arc<MemorySearchStore>) -> Harness {
    let probe = Arc::new(FakeProbe::new(true));
    let notifier = Arc::new(RecordingNotifier::default());
    let services = Services {
        source: source.clone(),
        probe: probe.clone(),
        store: store.clone(),
        notifier: notifier.clone(),
    };
    Harness {
        controller: Controller::new(ControllerConfig::default(), services),
        source,
        probe,
        store,
        notifier,
    }
}

fn harness() -> Harness {
    harness_with(
        ScriptedSource::with_records(sample_records()),
        MemorySearchStore::new(),
    )
}

fn ids(records: &[Arc<Record>]) -> Vec<i64> {
    records.iter().map(|r| r.id).collect()
}

// ── Fetch lifecycle ─────────────────────────────────────────────────

#[tokio::test]
async fn test_new_controller_is_idle() {
    let h = harness();
    assert_eq!(h.controller.status(), FetchStatus::Idle);
    assert!(h.controller.collection().is_empty());
    assert_eq!(h.source.calls(), 0);
}

#[tokio::test]
async fn test_start_fetches_and_succeeds() {
    let h = harness();

    let status = h.controller.start().await.unwrap();

    assert_eq!(status, FetchStatus::Succeeded);
    let state = h.controller.state();
    assert_eq!(ids(&state.collection), vec![1, 2, 3]);
    assert_eq!(ids(&state.filtered), vec![1, 2, 3]);
    assert!(state.error.is_none());
    assert!(state.last_fetched_at.is_some());
    assert!(h.notifier.seen().is_empty());
}

#[tokio::test]
async fn test_start_is_idempotent() {
    let h = harness();

    h.controller.start().await.unwrap();
    let second = h.controller.start().await.unwrap();

    assert_eq!(second, FetchStatus::Succeeded);
    assert_eq!(h.source.calls(), 1);
}

#[tokio::test]
async fn test_start_is_loading_while_persisted_query_is_read() {
    let source = Arc::new(ScriptedSource::with_records(sample_records()));
    let (store, release) = GatedStore::new();
    let store = Arc::new(store);
    let services = Services {
        source: source.clone(),
        probe: Arc::new(FakeProbe::new(true)),
        store: store.clone(),
        notifier: Arc::new(RecordingNotifier::default()),
    };
    let controller = Controller::new(ControllerConfig::default(), services);

    let pending = tokio::spawn({
        let controller = controller.clone();
        async move { controller.start().await }
    });
    store.wait_for_read().await;

    assert_eq!(controller.status(), FetchStatus::Loading);
    assert_eq!(controller.start().await.unwrap(), FetchStatus::Loading);
    assert_eq!(source.calls(), 0);

    release.send(Some("beta".into())).unwrap();
    assert_eq!(pending.await.unwrap().unwrap(), FetchStatus::Succeeded);
    assert_eq!(source.calls(), 1);
    assert_eq!(ids(&controller.filtered()), vec![2]);
}

#[tokio::test]
async fn test_server_error_keeps_collection_and_notifies_once() {
    let h = harness();
    h.controller.start().await.unwrap();
    let before = h.controller.collection();

    h.source.push(Err(SourceError::Server { status: 500 }));
    let status = h.controller.refresh(RefreshTrigger::UserPull).await;

    assert_eq!(status, FetchStatus::Failed(ErrorKind::ServerError(500)));
    assert!(Arc::ptr_eq(&before, &h.controller.collection()));
    let state = h.controller.state();
    assert_eq!(state.error.unwrap().kind, ErrorKind::ServerError(500));

    let seen = h.notifier.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].kind, ErrorKind::ServerError(500));
    assert!(seen[0].detail.contains("500"));
}

#[tokio::test]
async fn test_network_error_is_classified() {
    let h = harness_with(ScriptedSource::default(), MemorySearchStore::new());
    h.source.push(Err(SourceError::Network {
        message: "connection refused".into(),
    }));

    let status = h.controller.start().await.unwrap();

    assert_eq!(status, FetchStatus::Failed(ErrorKind::NetworkError));
    assert!(h.controller.collection().is_empty());
    assert_eq!(h.notifier.seen().len(), 1);
    assert_eq!(h.notifier.seen()[0].kind, ErrorKind::NetworkError);
}

#[tokio::test]
async fn test_offline_short_circuits_remote_call() {
    let h = harness();
    h.probe.set(false);

    let status = h.controller.start().await.unwrap();

    assert_eq!(status, FetchStatus::Failed(ErrorKind::Offline));
    assert_eq!(h.source.calls(), 0);
    let seen = h.notifier.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].kind, ErrorKind::Offline);
}

#[tokio::test]
async fn test_retry_after_failure_clears_error() {
    let h = harness();
    h.probe.set(false);
    h.controller.start().await.unwrap();

    h.probe.set(true);
    let status = h.controller.refresh(RefreshTrigger::UserPull).await;

    assert_eq!(status, FetchStatus::Succeeded);
    assert!(h.controller.state().error.is_none());
    assert_eq!(h.controller.collection().len(), 3);
    assert_eq!(h.notifier.seen().len(), 1);
}

#[tokio::test]
async fn test_refresh_clears_error_at_invocation() {
    let h = harness();
    h.source.push(Err(SourceError::Server { status: 503 }));
    h.controller.start().await.unwrap();
    assert!(h.controller.state().error.is_some());

    let gate = h.source.push_gated();
    let pending = tokio::spawn(h.controller.refresh(RefreshTrigger::Initial));

    let state = h.controller.state();
    assert!(state.error.is_none());
    assert_eq!(state.status, FetchStatus::Loading);

    gate.send(Ok(sample_records())).unwrap();
    assert_eq!(pending.await.unwrap(), FetchStatus::Succeeded);
}

#[tokio::test]
async fn test_user_pull_with_collection_refreshes_in_background() {
    let h = harness();
    h.controller.start().await.unwrap();

    let gate = h.source.push_gated();
    let pending = tokio::spawn(h.controller.refresh(RefreshTrigger::UserPull));

    assert_eq!(h.controller.status(), FetchStatus::RefreshingInBackground);
    assert_eq!(h.controller.collection().len(), 3);

    gate.send(Ok(vec![Record::new(9, 9, "Fresh", "")])).unwrap();
    assert_eq!(pending.await.unwrap(), FetchStatus::Succeeded);
    assert_eq!(ids(&h.controller.collection()), vec![9]);
}

#[tokio::test]
async fn test_user_pull_without_collection_is_loading() {
    let h = harness();
    h.probe.set(false);
    h.controller.start().await.unwrap();
    h.probe.set(true);

    let gate = h.source.push_gated();
    let pending = tokio::spawn(h.controller.refresh(RefreshTrigger::UserPull));

    assert_eq!(h.controller.status(), FetchStatus::Loading);

    gate.send(Ok(sample_records())).unwrap();
    pending.await.unwrap();
}

// ── Stale-result suppression ────────────────────────────────────────

#[tokio::test]
async fn test_older_fetch_resolving_last_is_discarded() {
    let h = harness_with(ScriptedSource::default(), MemorySearchStore::new());
    let first_gate = h.source.push_gated();
    let second_gate = h.source.push_gated();

    let first = tokio::spawn(h.controller.refresh(RefreshTrigger::Initial));
    h.source.wait_for_calls(1).await;
    let second = tokio::spawn(h.controller.refresh(RefreshTrigger::UserPull));
    h.source.wait_for_calls(2).await;

    second_gate
        .send(Ok(vec![Record::new(1, 20, "Second", "")]))
        .unwrap();
    assert_eq!(second.await.unwrap(), FetchStatus::Succeeded);

    first_gate
        .send(Ok(vec![Record::new(1, 10, "First", "")]))
        .unwrap();
    first.await.unwrap();

    assert_eq!(ids(&h.controller.collection()), vec![20]);
    assert_eq!(h.controller.status(), FetchStatus::Succeeded);
}

#[tokio::test]
async fn test_older_failure_after_newer_success_is_silent() {
    let h = harness_with(ScriptedSource::default(), MemorySearchStore::new());
    let first_gate = h.source.push_gated();
    let second_gate = h.source.push_gated();

    let first = tokio::spawn(h.controller.refresh(RefreshTrigger::Initial));
    h.source.wait_for_calls(1).await;
    let second = tokio::spawn(h.controller.refresh(RefreshTrigger::Initial));
    h.source.wait_for_calls(2).await;

    second_gate.send(Ok(sample_records())).unwrap();
    second.await.unwrap();
    first_gate
        .send(Err(SourceError::Server { status: 500 }))
        .unwrap();
    first.await.unwrap();

    assert_eq!(h.controller.status(), FetchStatus::Succeeded);
    assert!(h.controller.state().error.is_none());
    assert!(h.notifier.seen().is_empty());
}

#[tokio::test]
async fn test_older_success_first_keeps_newer_in_progress() {
    let h = harness_with(ScriptedSource::default(), MemorySearchStore::new());
    let first_gate = h.source.push_gated();
    let second_gate = h.source.push_gated();

    let first = tokio::spawn(h.controller.refresh(RefreshTrigger::Initial));
    h.source.wait_for_calls(1).await;
    let second = tokio::spawn(h.controller.refresh(RefreshTrigger::Initial));
    h.source.wait_for_calls(2).await;

    first_gate
        .send(Ok(vec![Record::new(1, 10, "First", "")]))
        .unwrap();
    first.await.unwrap();

    assert_eq!(ids(&h.controller.collection()), vec![10]);
    assert_eq!(h.controller.status(), FetchStatus::Loading);

    second_gate
        .send(Ok(vec![Record::new(1, 20, "Second", "")]))
        .unwrap();
    assert_eq!(second.await.unwrap(), FetchStatus::Succeeded);
    assert_eq!(ids(&h.controller.collection()), vec![20]);
}

#[tokio::test]
async fn test_older_failure_while_newer_pending_is_dropped() {
    let h = harness_with(ScriptedSource::default(), MemorySearchStore::new());
    let first_gate = h.source.push_gated();
    let second_gate = h.source.push_gated();

    let first = tokio::spawn(h.controller.refresh(RefreshTrigger::Initial));
    h.source.wait_for_calls(1).await;
    let second = tokio::spawn(h.controller.refresh(RefreshTrigger::Initial));
    h.source.wait_for_calls(2).await;

    first_gate
        .send(Err(SourceError::Network {
            message: "timeout".into(),
        }))
        .unwrap();
    first.await.unwrap();
    assert_eq!(h.controller.status(), FetchStatus::Loading);
    assert!(h.notifier.seen().is_empty());

    second_gate
        .send(Err(SourceError::Server { status: 502 }))
        .unwrap();
    second.await.unwrap();
    assert_eq!(
        h.controller.status(),
        FetchStatus::Failed(ErrorKind::ServerError(502))
    );
    assert_eq!(h.notifier.seen().len(), 1);
}

// ── Search pipeline ─────────────────────────────────────────────────

#[tokio::test]
async fn test_persisted_query_filters_first_fetch() {
    let h = harness_with(
        ScriptedSource::with_records(vec![
            Record::new(1, 1, "Alpha post", ""),
            Record::new(1, 2, "Beta", ""),
        ]),
        MemorySearchStore::with_value(SEARCH_KEY, "alp"),
    );

    h.controller.start().await.unwrap();

    assert_eq!(h.controller.query(), "alp");
    assert_eq!(ids(&h.controller.filtered()), vec![1]);
}

#[tokio::test]
async fn test_set_query_before_start_is_rejected() {
    let h = harness();
    assert!(matches!(
        h.controller.set_query("x"),
        Err(CoreError::NotStarted)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_query_burst_commits_once_after_quiet_period() {
    let h = harness();
    h.controller.start().await.unwrap();

    h.controller.set_query("b").unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    h.controller.set_query("be").unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    h.controller.set_query("bet").unwrap();

    assert_eq!(h.controller.query(), "bet");

    tokio::time::sleep(Duration::from_millis(299)).await;
    assert!(h.store.writes().is_empty());
    assert_eq!(h.controller.filtered().len(), 3);

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(
        h.store.writes(),
        vec![(SEARCH_KEY.to_owned(), "bet".to_owned())]
    );
    assert_eq!(ids(&h.controller.filtered()), vec![2, 3]);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_filters_with_query_current_at_completion() {
    let h = harness();
    h.controller.start().await.unwrap();

    let gate = h.source.push_gated();
    let pending = tokio::spawn(h.controller.refresh(RefreshTrigger::UserPull));
    h.source.wait_for_calls(2).await;

    h.controller.set_query("ALPHA").unwrap();
    gate.send(Ok(sample_records())).unwrap();
    pending.await.unwrap();

    assert_eq!(ids(&h.controller.filtered()), vec![1, 3]);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_pending_write() {
    let h = harness();
    h.controller.start().await.unwrap();

    h.controller.set_query("never saved").unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    h.controller.shutdown().await;
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert!(h.store.writes().is_empty());
    assert!(matches!(
        h.controller.set_query("late"),
        Err(CoreError::ShutDown)
    ));
}

#[tokio::test]
async fn test_search_calls_after_shutdown_report_shut_down() {
    let h = harness();
    h.controller.start().await.unwrap();
    h.controller.shutdown().await;

    assert!(matches!(
        h.controller.flush_query().await,
        Err(CoreError::ShutDown)
    ));
    assert!(matches!(h.controller.start().await, Err(CoreError::ShutDown)));
}

#[tokio::test]
async fn test_flush_before_start_is_rejected() {
    let h = harness();
    assert!(matches!(
        h.controller.flush_query().await,
        Err(CoreError::NotStarted)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_flush_commits_without_waiting() {
    let h = harness();
    h.controller.start().await.unwrap();

    h.controller.set_query("beta").unwrap();
    h.controller.flush_query().await.unwrap();

    assert_eq!(
        h.store.writes(),
        vec![(SEARCH_KEY.to_owned(), "beta".to_owned())]
    );
    assert_eq!(ids(&h.controller.filtered()), vec![2]);
}

#[tokio::test(start_paused = true)]
async fn test_query_survives_restart() {
    let source = Arc::new(ScriptedSource::with_records(sample_records()));
    let store = Arc::new(MemorySearchStore::new());

    let first = harness_sharing(source.clone(), store.clone());
    first.controller.start().await.unwrap();
    first.controller.set_query("alpha").unwrap();
    tokio::time::sleep(Duration::from_millis(400)).await;
    first.controller.shutdown().await;
    drop(first);

    let second = harness_sharing(source, store);
    second.controller.start().await.unwrap();

    assert_eq!(second.controller.query(), "alpha");
    assert_eq!(ids(&second.controller.filtered()), vec![1, 3]);
}

#[tokio::test(start_paused = true)]
async fn test_empty_query_persists_and_restores_as_unfiltered() {
    let source = Arc::new(ScriptedSource::with_records(sample_records()));
    let store = Arc::new(MemorySearchStore::with_value(SEARCH_KEY, "beta"));

    let first = harness_sharing(source.clone(), store.clone());
    first.controller.start().await.unwrap();
    assert_eq!(first.controller.filtered().len(), 1);

    first.controller.set_query("").unwrap();
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(first.controller.filtered().len(), 3);
    first.controller.shutdown().await;

    assert_eq!(
        store.writes().last().cloned(),
        Some((SEARCH_KEY.to_owned(), String::new()))
    );

    let second = harness_sharing(source, store);
    second.controller.start().await.unwrap();
    assert_eq!(second.controller.query(), "");
    assert!(!second.controller.state().is_filtered());
}

// ── Observation ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_subscribers_see_loading_then_success() {
    let h = harness();
    let mut stream = h.controller.subscribe();
    assert_eq!(stream.current().status, FetchStatus::Idle);

    let gate = h.source.push_gated();
    let pending = tokio::spawn({
        let controller = h.controller.clone();
        async move { controller.start().await }
    });

    while stream.changed().await.unwrap().status != FetchStatus::Loading {}
    assert!(stream.current().collection.is_empty());

    gate.send(Ok(sample_records())).unwrap();
    pending.await.unwrap().unwrap();

    assert_eq!(stream.latest().status, FetchStatus::Succeeded);
    assert_eq!(stream.latest().collection.len(), 3);
}

#[tokio::test]
async fn test_state_stream_yields_loading_then_success() {
    let h = harness();
    let gate = h.source.push_gated();
    let mut stream = h.controller.subscribe().into_stream();

    assert_eq!(stream.next().await.unwrap().status, FetchStatus::Idle);

    let pending = tokio::spawn({
        let controller = h.controller.clone();
        async move { controller.start().await }
    });
    h.source.wait_for_calls(1).await;

    let loading = stream.next().await.unwrap();
    assert_eq!(loading.status, FetchStatus::Loading);
    assert!(loading.collection.is_empty());

    gate.send(Ok(sample_records())).unwrap();
    pending.await.unwrap().unwrap();

    let done = stream.next().await.unwrap();
    assert_eq!(done.status, FetchStatus::Succeeded);
    assert_eq!(ids(&done.filtered), vec![1, 2, 3]);
}
